//! Call-site metadata for log records
//!
//! Two entry points share one stack walker:
//!
//! - [`CallerInfo::from_stack`] reports the frame `skip + 1` above itself.
//! - [`CallerInfo::at`] takes file and line from a `#[track_caller]`
//!   [`Location`] and resolves the enclosing function from the stack. The
//!   logger uses this one, so the reported site does not depend on how many
//!   internal frames sit between the application and the extraction point.
//!
//! Frames are searched only above this crate's own frames. Source
//! file and line come from debug line tables. Without them (a default
//! release build), function names still resolve from the symbol table and
//! `from_stack` reports `"unknown"` for file and line.
//!
//! Extraction never fails: anything that cannot be resolved is reported as
//! `"unknown"` (line `0`).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const UNKNOWN: &str = "unknown";

/// Paths below `<crate>::core::` whose frames sit between the application
/// and the stack walk
const OWN_FRAMES: [&str; 5] = [
    "caller::CallerInfo",
    "caller::capture_frames",
    "caller::function_at",
    "caller::resolve_function",
    "logger::Logger",
];

/// Source location of a log call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerInfo {
    /// File base name, without directories
    pub file: String,
    pub line: u32,
    /// Function name without its module path
    pub function: String,
}

impl CallerInfo {
    /// The sentinel reported when the stack cannot be inspected
    pub fn unknown() -> Self {
        Self {
            file: UNKNOWN.to_string(),
            line: 0,
            function: UNKNOWN.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.line == 0 && self.file == UNKNOWN
    }

    /// Inspect the stack `skip + 1` frames above this function
    ///
    /// `from_stack(0)` describes the function that called `from_stack`.
    /// Inlined functions count as frames of their own.
    #[inline(never)]
    pub fn from_stack(skip: usize) -> Self {
        let frames = capture_frames();

        match application_frames(&frames).get(skip) {
            Some(frame) => Self {
                file: frame
                    .file
                    .as_deref()
                    .map(base_name)
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                line: frame.line.unwrap_or(0),
                function: frame
                    .name
                    .as_deref()
                    .map(unqualified)
                    .unwrap_or_else(|| UNKNOWN.to_string()),
            },
            None => Self::unknown(),
        }
    }

    /// Describe the call site captured by `#[track_caller]`
    ///
    /// Function names are resolved once per call site and cached for the
    /// life of the process.
    pub fn at(location: &'static Location<'static>) -> Self {
        Self {
            file: base_name(Path::new(location.file())),
            line: location.line(),
            function: function_at(location),
        }
    }
}

impl Default for CallerInfo {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Formats as `file:line`, the value of the `caller` record field
impl fmt::Display for CallerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One logical frame; inlined calls are expanded into separate entries
struct Frame {
    name: Option<String>,
    file: Option<PathBuf>,
    line: Option<u32>,
}

// Kept out of line so at least one own frame survives inlining
#[inline(never)]
fn capture_frames() -> Vec<Frame> {
    let mut frames = Vec::new();
    backtrace::trace(|raw| {
        backtrace::resolve_frame(raw, |symbol| {
            frames.push(Frame {
                // `{:#}` drops the trailing hash of legacy mangling
                name: symbol.name().map(|n| format!("{:#}", n)),
                file: symbol.filename().map(Path::to_path_buf),
                line: symbol.lineno(),
            });
        });
        true
    });
    frames
}

type SiteKey = (&'static str, u32, u32);

fn function_cache() -> &'static RwLock<HashMap<SiteKey, String>> {
    static CACHE: OnceLock<RwLock<HashMap<SiteKey, String>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

fn function_at(location: &'static Location<'static>) -> String {
    let key = (location.file(), location.line(), location.column());
    if let Some(name) = function_cache().read().get(&key) {
        return name.clone();
    }

    let name = resolve_function(location);
    function_cache().write().insert(key, name.clone());
    name
}

fn resolve_function(location: &Location<'_>) -> String {
    let frames = capture_frames();
    function_in(application_frames(&frames), Path::new(location.file()), location.line())
}

/// Whether `name` belongs to the logging machinery of this crate
fn is_own_frame(name: &str) -> bool {
    let krate = module_path!().split("::").next().unwrap_or_default();
    // v0 mangling writes inherent methods as `<krate::Type>::method`
    name.trim_start_matches('<')
        .strip_prefix(krate)
        .and_then(|rest| rest.strip_prefix("::core::"))
        .is_some_and(|rest| OWN_FRAMES.iter().any(|own| rest.starts_with(own)))
}

/// Frames above the innermost run of this crate's own frames
///
/// Frames of the stack walker itself come first and are skipped along
/// with the run. The result is empty when no own frame was resolved.
fn application_frames(frames: &[Frame]) -> &[Frame] {
    let is_own = |frame: &Frame| frame.name.as_deref().is_some_and(is_own_frame);

    let Some(start) = frames.iter().position(is_own) else {
        return &[];
    };
    let end = frames[start..]
        .iter()
        .position(|frame| !is_own(frame))
        .map_or(frames.len(), |offset| start + offset);
    &frames[end..]
}

/// Name of the function calling from `file:line`
///
/// Prefers the frame with that exact line; a multi-line call expression may
/// be attributed to a neighbouring line, so any frame in the file comes next.
/// Without line tables the innermost application frame is used.
fn function_in(frames: &[Frame], file: &Path, line: u32) -> String {
    let in_file = |frame: &&Frame| frame.file.as_deref().is_some_and(|f| f.ends_with(file));

    frames
        .iter()
        .filter(in_file)
        .find(|frame| frame.line == Some(line))
        .or_else(|| frames.iter().find(in_file))
        .or_else(|| frames.first())
        .and_then(|frame| frame.name.as_deref())
        .map(unqualified)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// `my_crate::handlers::create_user::{{closure}}` becomes `create_user`
fn unqualified(name: &str) -> String {
    let path = strip_generics(name);
    // Closure segments look like `{{closure}}` or `{closure#0}`
    path.split("::")
        .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .last()
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Drop `<...>` groups, which may nest and contain `::` of their own
fn strip_generics(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;
    for c in name.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline(never)]
    fn locate(skip: usize) -> (CallerInfo, u32) {
        (CallerInfo::from_stack(skip), line!())
    }

    #[inline(never)]
    fn outer_locate() -> CallerInfo {
        locate(1).0
    }

    fn frame(name: &str, file: Option<&str>, line: Option<u32>) -> Frame {
        Frame {
            name: Some(name.to_string()),
            file: file.map(PathBuf::from),
            line,
        }
    }

    /// A stack as seen from inside `resolve_function`, innermost first
    fn stack(with_line_tables: bool) -> Vec<Frame> {
        let at = |file: &str, line: u32| {
            if with_line_tables {
                (Some(file.to_string()), Some(line))
            } else {
                (None, None)
            }
        };
        [
            ("backtrace::backtrace::libunwind::trace", at("/cargo/backtrace/src/libunwind.rs", 93)),
            ("_Unwind_Backtrace", (None, None)),
            ("backtrace::backtrace::trace", at("/cargo/backtrace/src/mod.rs", 66)),
            ("service_logger::core::caller::capture_frames", at("/src/core/caller.rs", 130)),
            ("service_logger::core::caller::resolve_function", at("/src/core/caller.rs", 162)),
            ("service_logger::core::caller::function_at", at("/src/core/caller.rs", 155)),
            ("service_logger::core::caller::CallerInfo::at", at("/src/core/caller.rs", 90)),
            ("service_logger::core::logger::Logger::emit", at("/src/core/logger.rs", 240)),
            ("service_logger::core::logger::Logger::log", at("/src/core/logger.rs", 160)),
            ("service_logger::core::logger::Logger::info", at("/src/core/logger.rs", 181)),
            ("app::core::logger::rotate_keys", at("/app/src/core/logger.rs", 12)),
            ("app::main", at("/app/src/main.rs", 4)),
            ("std::rt::lang_start", (None, None)),
        ]
        .into_iter()
        .map(|(name, (file, line))| Frame {
            name: Some(name.to_string()),
            file: file.map(PathBuf::from),
            line,
        })
        .collect()
    }

    #[test]
    fn test_from_stack_reports_immediate_caller() {
        let (info, _) = locate(0);
        assert_eq!(info.function, "locate");
    }

    #[test]
    #[cfg_attr(not(debug_assertions), ignore = "file and line need debug line tables")]
    fn test_from_stack_reports_file_and_line() {
        let (info, line) = locate(0);
        assert_eq!(info.file, "caller.rs");
        assert_eq!(info.line, line);
    }

    #[test]
    fn test_from_stack_skip_walks_further_up() {
        let info = outer_locate();
        assert_eq!(info.function, "outer_locate");
    }

    #[test]
    fn test_depth_beyond_stack_is_unknown() {
        let info = CallerInfo::from_stack(100_000);
        assert_eq!(info, CallerInfo::unknown());
        assert!(info.is_unknown());
    }

    #[test]
    fn test_at_uses_location() {
        let expected_line = line!() + 1;
        let info = CallerInfo::at(Location::caller());
        assert_eq!(info.file, "caller.rs");
        assert_eq!(info.line, expected_line);
        assert_eq!(info.function, "test_at_uses_location");
    }

    #[test]
    fn test_application_frames_skip_own_and_walker_frames() {
        let frames = stack(true);
        let names: Vec<&str> = application_frames(&frames)
            .iter()
            .filter_map(|f| f.name.as_deref())
            .collect();
        assert_eq!(names, ["app::core::logger::rotate_keys", "app::main", "std::rt::lang_start"]);

        let foreign = [frame("app::main", None, None)];
        assert!(application_frames(&foreign).is_empty());
    }

    #[test]
    fn test_own_frame_detection() {
        assert!(is_own_frame("service_logger::core::logger::Logger::info"));
        assert!(is_own_frame("<service_logger::core::logger::Logger>::warn"));
        assert!(is_own_frame("service_logger::core::caller::capture_frames::{{closure}}"));
        assert!(!is_own_frame("service_logger::core::caller::tests::locate"));
        assert!(!is_own_frame("service_logger::core::logger::tests::test_level_filtering"));
        assert!(!is_own_frame("app::core::logger::Logger::info"));
        assert!(!is_own_frame("backtrace::backtrace::trace"));
    }

    #[test]
    fn test_function_matches_file_and_line() {
        let frames = stack(true);
        let app = application_frames(&frames);
        assert_eq!(function_in(app, Path::new("src/main.rs"), 4), "main");
    }

    #[test]
    fn test_same_named_file_only_matches_application_frames() {
        let frames = stack(true);
        let app = application_frames(&frames);
        // The crate's own logger.rs frames are never candidates
        assert_eq!(function_in(app, Path::new("src/core/logger.rs"), 181), "rotate_keys");
    }

    #[test]
    fn test_function_without_line_tables_uses_symbols() {
        let frames = stack(false);
        let app = application_frames(&frames);
        assert_eq!(function_in(app, Path::new("src/main.rs"), 4), "rotate_keys");
        assert_eq!(function_in(&[], Path::new("src/main.rs"), 4), "unknown");
    }

    #[test]
    fn test_display_is_file_colon_line() {
        let info = CallerInfo {
            file: "main.rs".into(),
            line: 42,
            function: "main".into(),
        };
        assert_eq!(info.to_string(), "main.rs:42");
        assert_eq!(CallerInfo::unknown().to_string(), "unknown:0");
    }

    #[test]
    fn test_unqualified_names() {
        assert_eq!(unqualified("app::handlers::create_user"), "create_user");
        assert_eq!(unqualified("app::run::{{closure}}::{{closure}}"), "run");
        assert_eq!(unqualified("app::run::{closure#0}"), "run");
        assert_eq!(unqualified("main"), "main");
        assert_eq!(unqualified("app::Store<alloc::string::String>::get"), "get");
        assert_eq!(unqualified("<app::User as core::fmt::Display>::fmt"), "fmt");
        assert_eq!(unqualified(""), "unknown");
    }

    #[test]
    fn test_base_name_drops_directories() {
        assert_eq!(base_name(Path::new("src/core/logger.rs")), "logger.rs");
        assert_eq!(base_name(Path::new("/")), "unknown");
    }
}
