use serde::Serialize;
use strum_macros::Display;
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum Severity {
    #[strum(serialize = "info")]
    Info,
    #[strum(serialize = "warning")]
    Warning,
    #[strum(serialize = "error")]
    Error,
}

#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub zone: String,
    pub message: String,
}

/// Collects the diagnostic record for one zone-processing call.
///
/// Engine functions take this sink explicitly and it is returned as part of
/// the zone outcome; every entry is also emitted through `tracing` so callers
/// with a subscriber installed see messages as they happen. Warnings and
/// errors recorded here are non-fatal; fatal conditions are raised as
/// [`crate::errors::DecompositionError`] instead.
#[derive(Debug, Default)]
pub struct Diagnostics {
    zone: String,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn for_zone(zone: &str) -> Self {
        Self {
            zone: zone.to_string(),
            entries: vec![],
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(zone = %self.zone, "{message}");
        self.push(Severity::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(zone = %self.zone, "{message}");
        self.push(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!(zone = %self.zone, "{message}");
        self.push(Severity::Error, message);
    }

    fn push(&mut self, severity: Severity, message: String) {
        self.entries.push(Diagnostic {
            severity,
            zone: self.zone.clone(),
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn count_of(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count_of(Severity::Error) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_record_entries_with_severity() {
        let mut diagnostics = Diagnostics::for_zone("living space");
        diagnostics.info("surface convection annual gain error: 0.2%");
        diagnostics.warning("no exterior windows with shading found");
        diagnostics.error("radiant delay failed conservation check");

        assert_eq!(diagnostics.entries().len(), 3);
        assert_eq!(diagnostics.count_of(Severity::Info), 1);
        assert_eq!(diagnostics.count_of(Severity::Warning), 1);
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.entries()[1].zone, "living space");
    }

    #[rstest]
    fn should_report_no_errors_when_only_informational() {
        let mut diagnostics = Diagnostics::for_zone("attic");
        diagnostics.info("processed");
        assert!(!diagnostics.has_errors());
    }

    #[rstest]
    #[case(Severity::Info, "info")]
    #[case(Severity::Warning, "warning")]
    #[case(Severity::Error, "error")]
    fn should_render_severities_lowercase(#[case] severity: Severity, #[case] rendered: &str) {
        assert_eq!(severity.to_string(), rendered);
    }
}
