//! JSON-lines logger on stderr
//!
//! Each line is one object: `event`, `severity` and `ts` first, then the
//! caller's fields sorted by key. A repeated key keeps its last value, and
//! caller fields never shadow the three leading keys. stdout is reserved
//! for emitted records.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

const LEADING_KEYS: [&str; 3] = ["event", "severity", "ts"];

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    /// Recoverable, the operation continues
    Warn,
    /// The operation fails, the process continues
    Error,
    /// The process should stop
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes one JSON line per call to stderr.
pub struct Logger;

impl Logger {
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let line = render(severity, event, &timestamp(), fields);
        // a log line that cannot be written is dropped
        let _ = io::stderr().lock().write_all(line.as_bytes());
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One complete log line, newline included.
fn render(severity: Severity, event: &str, ts: &str, fields: &[(&str, &str)]) -> String {
    let sorted: BTreeMap<&str, &str> = fields
        .iter()
        .copied()
        .filter(|(key, _)| !LEADING_KEYS.contains(key))
        .collect();

    let mut line = String::with_capacity(96 + 32 * sorted.len());
    line.push('{');
    push_pair(&mut line, "event", event);
    line.push(',');
    push_pair(&mut line, "severity", severity.as_str());
    line.push(',');
    push_pair(&mut line, "ts", ts);
    for (key, value) in sorted {
        line.push(',');
        push_pair(&mut line, key, value);
    }
    line.push_str("}\n");
    line
}

fn push_pair(line: &mut String, key: &str, value: &str) {
    line.push_str(&Value::from(key).to_string());
    line.push(':');
    line.push_str(&Value::from(value).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "2024-01-01T00:00:00.000Z";

    fn parse(line: &str) -> serde_json::Map<String, Value> {
        match serde_json::from_str::<Value>(line).unwrap() {
            Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        }
    }

    #[test]
    fn test_leading_keys_come_first() {
        let line = render(Severity::Warn, "DECODE_FAILED", TS, &[("a", "1")]);
        assert!(line.starts_with(r#"{"event":"DECODE_FAILED","severity":"WARN","ts":"#));
        assert!(line.ends_with("}\n"));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_fields_sorted_regardless_of_input_order() {
        let a = render(Severity::Info, "SCAN", TS, &[("zeta", "1"), ("alpha", "2"), ("m", "3")]);
        let b = render(Severity::Info, "SCAN", TS, &[("m", "3"), ("zeta", "1"), ("alpha", "2")]);
        assert_eq!(a, b);
        assert!(a.find("\"alpha\"").unwrap() < a.find("\"m\"").unwrap());
        assert!(a.find("\"m\"").unwrap() < a.find("\"zeta\"").unwrap());
    }

    #[test]
    fn test_repeated_key_keeps_last_value() {
        let line = render(Severity::Info, "SCAN", TS, &[("limit", "2"), ("limit", "5")]);
        let map = parse(&line);
        assert_eq!(map["limit"], "5");
        assert_eq!(line.matches("\"limit\"").count(), 1);
    }

    #[test]
    fn test_fields_cannot_shadow_leading_keys() {
        let fields = [("event", "other"), ("ts", "x")];
        let line = render(Severity::Error, "STATS_EMIT_FAILED", TS, &fields);
        let map = parse(&line);
        assert_eq!(map["event"], "STATS_EMIT_FAILED");
        assert_eq!(map["ts"], TS);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_values_are_escaped() {
        let reason = "bad \"key\"\n\u{1}tail\\";
        let line = render(Severity::Warn, "DECODE_FAILED", TS, &[("reason", reason)]);
        assert_eq!(parse(&line)["reason"], reason);
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_timestamp_is_rfc3339_utc() {
        let ts = timestamp();
        assert!(ts.ends_with('Z'));
        chrono::DateTime::parse_from_rfc3339(&ts).unwrap();
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Error < Severity::Fatal);
        assert_eq!(Severity::Fatal.to_string(), "FATAL");
    }
}
