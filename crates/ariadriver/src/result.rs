//! Result and error types for AriaDriver.
//!
//! Every failure carries a stable [`ErrorCode`], a human message, and where
//! an authoring rule was broken, a recommendation and a reference URL.

use thiserror::Error;

/// Result type for AriaDriver operations
pub type AriaResult<T> = Result<T, AriaError>;

/// Reference for focusability failures
pub const FOCUS_REFERENCE: &str =
    "https://www.w3.org/TR/html5/editing.html#sequential-focus-navigation-and-the-tabindex-attribute";

/// Stable machine-readable failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Caller supplied a malformed argument
    Usage,
    /// No perceptible element matched a required lookup
    ElementNotFound,
    /// Target element cannot receive focus
    ElementUnfocusable,
    /// A structural ARIA precondition is violated
    InvalidMarkup,
    /// An awaited condition did not hold within the patience window
    Timeout,
    /// The remote session reported a failure
    Session,
    /// An in-page script returned an unexpected value
    Script,
    /// Driver configuration could not be read
    Config,
}

impl ErrorCode {
    /// Stable string form of the code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Usage => "ARIADRIVER-USAGE",
            Self::ElementNotFound => "ARIADRIVER-ELEMENT-NOT-FOUND",
            Self::ElementUnfocusable => "ARIADRIVER-ELEMENT-UNFOCUSABLE",
            Self::InvalidMarkup => "ARIADRIVER-INVALID-MARKUP",
            Self::Timeout => "ARIADRIVER-TIMEOUT",
            Self::Session => "ARIADRIVER-SESSION",
            Self::Script => "ARIADRIVER-SCRIPT",
            Self::Config => "ARIADRIVER-CONFIG",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in AriaDriver
#[derive(Debug, Error)]
pub enum AriaError {
    /// Malformed arguments (e.g. a locator with no or several strategies)
    #[error("{message}")]
    Usage {
        /// Explanation of the misuse
        message: String,
    },

    /// Zero perceptible elements matched
    #[error("No element found at \"{locator}\".")]
    ElementNotFound {
        /// Echo of the locator that failed
        locator: String,
    },

    /// Element is hidden from assistive technology or rejected focus
    #[error("Element at \"{locator}\" cannot receive focus.")]
    ElementUnfocusable {
        /// Echo of the locator that failed
        locator: String,
    },

    /// Markup violates an ARIA precondition
    #[error("Markup does not accurately reflect the semantic value.\nRecommendation: {recommendation}")]
    InvalidMarkup {
        /// How to fix the markup
        recommendation: String,
        /// Specification reference
        reference: String,
    },

    /// Awaited condition did not hold in time
    #[error("Timeout waiting {ms} milliseconds for moment when {condition}.")]
    Timeout {
        /// Patience in milliseconds
        ms: u64,
        /// Description of the awaited condition
        condition: String,
    },

    /// Remote session failure
    #[error("Browser session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Script result had an unexpected shape
    #[error("Unexpected script result: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },
}

impl AriaError {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a session error
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create an invalid-markup error
    pub fn invalid_markup(recommendation: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::InvalidMarkup {
            recommendation: recommendation.into(),
            reference: reference.into(),
        }
    }

    /// Stable code for this failure
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Usage { .. } => ErrorCode::Usage,
            Self::ElementNotFound { .. } => ErrorCode::ElementNotFound,
            Self::ElementUnfocusable { .. } => ErrorCode::ElementUnfocusable,
            Self::InvalidMarkup { .. } => ErrorCode::InvalidMarkup,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Session { .. } => ErrorCode::Session,
            Self::Json(_) => ErrorCode::Script,
            Self::Config { .. } => ErrorCode::Config,
        }
    }

    /// Recommendation text, if the failure has one
    #[must_use]
    pub fn recommendation(&self) -> Option<&str> {
        match self {
            Self::InvalidMarkup { recommendation, .. } => Some(recommendation),
            _ => None,
        }
    }

    /// Specification reference URL, if the failure has one
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::InvalidMarkup { reference, .. } => Some(reference),
            Self::ElementUnfocusable { .. } => Some(FOCUS_REFERENCE),
            _ => None,
        }
    }

    /// Render the full report: code, message and reference
    #[must_use]
    pub fn expand(&self) -> String {
        let mut report = format!("{}: {self}", self.code());
        if let Some(reference) = self.reference() {
            report.push_str("\nReference: ");
            report.push_str(reference);
        }
        report
    }
}
