//! Appender implementations

pub mod memory;
pub mod rotating_file;
pub mod stdout;

pub use memory::MemoryAppender;
pub use rotating_file::{RotatingFileAppender, RotationPolicy};
pub use stdout::StdoutAppender;

// Re-export trait for convenience
pub use crate::core::Appender;
