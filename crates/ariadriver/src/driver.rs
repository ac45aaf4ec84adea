//! AriaDriver - accessibility-aware interaction over a [`BrowserSession`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │   Locator    │──►│   Resolver   │──►│  select_one      │
//! │ (css/label)  │   │ + perceptible│   │ (not found /     │
//! └──────────────┘   └──────────────┘   │  ambiguous)      │
//!                                       └────────┬─────────┘
//!                                                ▼
//!        ┌──────────────────────────────────────────────────┐
//!        │ AriaDriver: touch, read, count, role, widgets     │
//!        │   uses role inference + Waiter (patience)         │
//!        └──────────────────────────────────────────────────┘
//! ```
//!
//! Operations are issued one at a time against a single session. Every
//! operation takes a [`WarningSink`] that receives non-fatal findings, even
//! when the operation itself fails.

use crate::config::DriverConfig;
use crate::dom::ElementSnapshot;
use crate::locator::{IntoLocator, Locator};
use crate::resolve::Resolver;
use crate::result::{AriaError, AriaResult};
use crate::role::{infer_role, AriaRole};
use crate::script::PageScript;
use crate::session::{BrowserSession, ElementHandle, Key};
use crate::wait::Waiter;
use crate::warning::{report, Warning, WarningSink};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reference for the positive `tabindex` warning
pub const TABINDEX_REFERENCE: &str = "https://www.w3.org/TR/wai-aria-practices-1.1/#kbd_general_between";

/// Value presented by an element, as returned by [`AriaDriver::read`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadValue {
    /// Text, or the value of a form control
    Text(String),
    /// Numeric value of a `meter` or `progress`
    Number(f64),
}

impl ReadValue {
    /// Text value, if this is text
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) => None,
        }
    }

    /// Numeric value, if this is a number
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for ReadValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Interaction driver bound to one browser session
#[derive(Debug)]
pub struct AriaDriver<S> {
    session: S,
    config: DriverConfig,
}

impl<S: BrowserSession> AriaDriver<S> {
    /// Create a driver that owns `session`
    #[must_use]
    pub fn new(session: S, config: DriverConfig) -> Self {
        tracing::debug!(patience = ?config.patience, "driver created");
        Self { session, config }
    }

    /// Create a driver with default configuration
    #[must_use]
    pub fn with_defaults(session: S) -> Self {
        Self::new(session, DriverConfig::default())
    }

    /// Underlying session
    #[must_use]
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// Configuration in effect
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Patience for polling operations
    #[must_use]
    pub const fn patience(&self) -> Duration {
        self.config.patience
    }

    /// Give back the session
    #[must_use]
    pub fn into_session(self) -> S {
        self.session
    }

    pub(crate) const fn resolver(&self) -> Resolver<'_, S> {
        Resolver::new(&self.session)
    }

    pub(crate) fn waiter(&self) -> Waiter {
        Waiter::new(self.config.wait_options())
    }

    /// All perceptible elements named by `locator`
    pub async fn resolve(
        &self,
        locator: impl IntoLocator,
        warnings: &mut dyn WarningSink,
    ) -> AriaResult<Vec<ElementHandle>> {
        let locator = locator.into_locator()?;
        self.resolver().resolve(&locator, warnings).await
    }

    /// Exactly one element named by `locator`
    pub async fn select_one(
        &self,
        locator: impl IntoLocator,
        warnings: &mut dyn WarningSink,
    ) -> AriaResult<ElementHandle> {
        let locator = locator.into_locator()?;
        self.resolver().select_one(&locator, warnings).await
    }

    /// Number of perceptible elements named by `locator`
    pub async fn count(
        &self,
        locator: impl IntoLocator,
        warnings: &mut dyn WarningSink,
    ) -> AriaResult<usize> {
        Ok(self.resolve(locator, warnings).await?.len())
    }

    /// Value the selected element presents to the user
    pub async fn read(
        &self,
        locator: impl IntoLocator,
        warnings: &mut dyn WarningSink,
    ) -> AriaResult<ReadValue> {
        let element = self.select_one(locator, warnings).await?;
        let value = self
            .session
            .execute(PageScript::ReadValue, std::slice::from_ref(&element))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Role of the selected element, explicit or implicit
    pub async fn role(
        &self,
        locator: impl IntoLocator,
        warnings: &mut dyn WarningSink,
    ) -> AriaResult<Option<AriaRole>> {
        let element = self.select_one(locator, warnings).await?;
        self.role_of(&element).await
    }

    /// Focus the selected element and press Enter
    pub async fn touch(
        &self,
        locator: impl IntoLocator,
        warnings: &mut dyn WarningSink,
    ) -> AriaResult<()> {
        let locator = locator.into_locator()?;
        let element = self.resolver().select_one(&locator, warnings).await?;
        self.touch_element(&element, &locator, warnings).await
    }

    pub(crate) async fn role_of(&self, element: &ElementHandle) -> AriaResult<Option<AriaRole>> {
        let snapshot = ElementSnapshot::capture(&self.session, element).await?;
        Ok(snapshot.subject().and_then(infer_role))
    }

    /// Focus an already selected element and press Enter.
    ///
    /// Fails with [`AriaError::ElementUnfocusable`] when the element is
    /// `aria-hidden` or the page does not move focus to it.
    pub(crate) async fn touch_element(
        &self,
        element: &ElementHandle,
        locator: &Locator,
        warnings: &mut dyn WarningSink,
    ) -> AriaResult<()> {
        if let Some(tabindex) = self.session.attribute(element, "tabindex").await? {
            if let Ok(value) = tabindex.trim().parse::<i64>() {
                if value > 0 {
                    report(
                        warnings,
                        Warning::poor_semantics(format!(
                            "The tabindex property is set to {value}, but it should not exceed 0."
                        ))
                        .with_data(serde_json::json!({ "locator": locator.to_string(), "tabindex": value }))
                        .with_reference(TABINDEX_REFERENCE),
                    );
                }
            }
        }

        let unfocusable = || AriaError::ElementUnfocusable {
            locator: locator.to_string(),
        };

        if self.session.attribute(element, "aria-hidden").await?.as_deref() == Some("true") {
            return Err(unfocusable());
        }

        let focused = self
            .session
            .execute(PageScript::Focus, std::slice::from_ref(element))
            .await?;
        if !serde_json::from_value::<bool>(focused)? {
            return Err(unfocusable());
        }

        tracing::debug!(locator = %locator, "activating element");
        self.session.send_key(element, Key::Enter).await
    }
}
