//! Begin/end logging around one unit of work
//!
//! `{NAME}_BEGIN` is logged when the scope opens. Closing it logs
//! `{NAME}_COMPLETE` or `{NAME}_FAILED` with the opening fields and the
//! elapsed time. A scope dropped without being closed logs
//! `{NAME}_INCOMPLETE` at WARN.

use std::time::Instant;

use super::logger::{Logger, Severity};

pub struct ObservationScope<'a> {
    name: &'a str,
    fields: Vec<(&'a str, String)>,
    timer: Timer,
    closed: bool,
}

impl<'a> ObservationScope<'a> {
    pub fn begin(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);
        Self {
            name,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            timer: Timer::new(),
            closed: false,
        }
    }

    pub fn complete(self, extra: &[(&str, &str)]) {
        self.close(Severity::Info, "COMPLETE", extra);
    }

    /// Logs at the failing error's own severity.
    pub fn fail(self, severity: Severity, code: &str, reason: &str) {
        self.close(severity, "FAILED", &[("code", code), ("reason", reason)]);
    }

    fn close(mut self, severity: Severity, outcome: &str, extra: &[(&str, &str)]) {
        self.closed = true;
        let elapsed = self.timer.elapsed_ms();
        let fields = self.closing_fields(extra, &elapsed);
        Logger::log(severity, &format!("{}_{}", self.name, outcome), &fields);
    }

    fn closing_fields<'f>(
        &'f self,
        extra: &[(&'f str, &'f str)],
        elapsed: &'f str,
    ) -> Vec<(&'f str, &'f str)> {
        let mut fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        fields.extend(extra.iter().copied());
        fields.push(("elapsed_ms", elapsed));
        fields
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.closed {
            let elapsed = self.timer.elapsed_ms();
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &self.closing_fields(&[], &elapsed),
            );
        }
    }
}

/// Wall-clock timer for `elapsed_ms` log fields.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
