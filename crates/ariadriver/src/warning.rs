//! Non-fatal semantic findings.
//!
//! Operations never throw warnings. They write them into a caller-supplied
//! [`WarningSink`], so findings recorded before a failure stay observable.

use serde::Serialize;
use serde_json::Value;

/// Stable warning codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WarningCode {
    /// A locator matched more than one element
    AmbiguousReference,
    /// Markup works but violates an authoring practice
    PoorSemantics,
}

impl WarningCode {
    /// Stable string form of the code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AmbiguousReference => "ARIADRIVER-AMBIGUOUS-REFERENCE",
            Self::PoorSemantics => "ARIADRIVER-POOR-SEMANTICS",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured, non-fatal finding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    /// Warning code
    pub code: WarningCode,
    /// Structured details (locator, counts, label text)
    pub data: Value,
    /// How to improve the markup
    pub recommendation: Option<String>,
    /// Specification reference URL
    pub reference: Option<String>,
}

impl Warning {
    /// Create a new warning with no details
    #[must_use]
    pub fn new(code: WarningCode) -> Self {
        Self {
            code,
            data: Value::Null,
            recommendation: None,
            reference: None,
        }
    }

    /// Locator matched `count` elements
    #[must_use]
    pub fn ambiguous_reference(locator: impl std::fmt::Display, count: usize) -> Self {
        Self::new(WarningCode::AmbiguousReference)
            .with_data(serde_json::json!({
                "locator": locator.to_string(),
                "count": count,
            }))
            .with_recommendation("Ensure the locator matches exactly one element.")
    }

    /// Markup violates an authoring practice
    #[must_use]
    pub fn poor_semantics(recommendation: impl Into<String>) -> Self {
        Self::new(WarningCode::PoorSemantics).with_recommendation(recommendation)
    }

    /// Attach structured details
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Attach a recommendation
    #[must_use]
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    /// Attach a reference URL
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(recommendation) = &self.recommendation {
            write!(f, ": {recommendation}")?;
        }
        Ok(())
    }
}

// =============================================================================
// SINKS
// =============================================================================

/// Destination for emitted warnings
pub trait WarningSink: Send {
    /// Receive one warning
    fn emit(&mut self, warning: Warning);
}

impl WarningSink for Vec<Warning> {
    fn emit(&mut self, warning: Warning) {
        self.push(warning);
    }
}

impl WarningSink for tokio::sync::mpsc::UnboundedSender<Warning> {
    fn emit(&mut self, warning: Warning) {
        if self.send(warning).is_err() {
            tracing::debug!("warning receiver dropped");
        }
    }
}

/// Collector that discards nothing and counts by code
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected warnings
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of warnings with the given code
    #[must_use]
    pub fn count(&self, code: WarningCode) -> usize {
        self.items.iter().filter(|w| w.code == code).count()
    }

    /// Iterate in emission order
    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.items.iter()
    }

    /// Drop everything collected so far
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Take ownership of the collected warnings
    #[must_use]
    pub fn into_vec(self) -> Vec<Warning> {
        self.items
    }
}

impl WarningSink for Warnings {
    fn emit(&mut self, warning: Warning) {
        self.items.push(warning);
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Log a warning and hand it to the sink
pub(crate) fn report(sink: &mut dyn WarningSink, warning: Warning) {
    tracing::warn!(code = %warning.code, data = %warning.data, "{}", warning);
    sink.emit(warning);
}
