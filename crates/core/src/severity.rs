//! Severity levels and alert codes produced by the evaluator.

use std::fmt;

use serde::{Serialize, Serializer};

/// Server-side status of a reading.
///
/// Variants are declared in escalation order so the derived `Ord` gives
/// `Normal < Warning < Critical`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Severity {
    /// Raise to `level` if that is more severe. Never lowers.
    pub fn escalate(&mut self, level: Severity) {
        if level > *self {
            *self = level;
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    pub fn is_critical(self) -> bool {
        self == Severity::Critical
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction qualifier half of an alert code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertQualifier {
    /// Critical breach of an upper bound.
    High,
    /// Critical breach of a lower bound.
    Low,
    /// Warning-level breach in either direction.
    Elevated,
}

impl AlertQualifier {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertQualifier::High => "high",
            AlertQualifier::Low => "low",
            AlertQualifier::Elevated => "elevated",
        }
    }
}

/// A `metric:qualifier` tag such as `heartRate:high`.
///
/// Serializes as its textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlertCode {
    pub metric: &'static str,
    pub qualifier: AlertQualifier,
}

impl AlertCode {
    pub fn new(metric: &'static str, qualifier: AlertQualifier) -> Self {
        Self { metric, qualifier }
    }
}

impl fmt::Display for AlertCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.metric, self.qualifier.as_str())
    }
}

impl Serialize for AlertCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
