//! Composed log record and its JSON encoding

use super::field::Field;
use super::level::Level;
use chrono::{DateTime, Utc};

/// Timestamp layout written to the `timestamp` key
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// One log call, with its fields already in emission order
///
/// Field order is: `service`, `env`, optional `caller` and `function`, the
/// logger's bound fields, then call-site fields.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub fields: Vec<Field>,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Encode as a JSON object
    ///
    /// Keys keep the position of their first occurrence; a repeated key takes
    /// the last value written.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut json_obj = serde_json::Map::new();

        json_obj.insert(
            "timestamp".to_string(),
            serde_json::Value::String(self.timestamp.format(TIMESTAMP_FORMAT).to_string()),
        );
        json_obj.insert(
            "level".to_string(),
            serde_json::Value::String(self.level.as_str().to_string()),
        );
        json_obj.insert(
            "message".to_string(),
            serde_json::Value::String(self.message.clone()),
        );

        for field in &self.fields {
            json_obj.insert(field.key().to_string(), field.to_json_value());
        }

        serde_json::Value::Object(json_obj)
    }

    /// Encode as a single line of JSON, newline included
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(&self.to_json())?;
        line.push('\n');
        Ok(line)
    }

    /// Value of the last field named `key`
    pub fn field(&self, key: &str) -> Option<serde_json::Value> {
        self.fields
            .iter()
            .rev()
            .find(|f| f.key() == key)
            .map(Field::to_json_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_keys_come_first() {
        let record = LogRecord::new(Level::Info, "hello").with_fields([
            Field::string("service", "s"),
            Field::string("env", "dev"),
        ]);

        let json = record.to_json();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["timestamp", "level", "message", "service", "env"]);
        assert_eq!(json["level"], json!("info"));
        assert_eq!(json["message"], json!("hello"));
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let record = LogRecord::new(Level::Warn, "dup").with_fields([
            Field::string("user", "first"),
            Field::int("attempt", 1),
            Field::string("user", "second"),
        ]);

        let json = record.to_json();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["timestamp", "level", "message", "user", "attempt"]);
        assert_eq!(json["user"], json!("second"));
        assert_eq!(record.field("user"), Some(json!("second")));
    }

    #[test]
    fn test_json_line_is_single_line() {
        let record = LogRecord::new(Level::Error, "line one\nline two");
        let line = record.to_json_line().unwrap();

        assert!(line.ends_with('\n'));
        assert_eq!(line.trim_end().lines().count(), 1);

        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["message"], json!("line one\nline two"));
    }

    #[test]
    fn test_timestamp_format() {
        let record = LogRecord::new(Level::Debug, "t");
        let json = record.to_json();
        let ts = json["timestamp"].as_str().unwrap();

        assert!(ts.ends_with('Z'));
        assert!(chrono::NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).is_ok());
    }
}
