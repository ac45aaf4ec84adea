//! AriaDriver: accessibility-aware interaction for remote browser sessions
//!
//! Interactions go through the keyboard and the accessibility semantics of
//! the page rather than raw clicks. An element that assistive technology
//! cannot perceive is treated as absent, widgets are validated against the
//! WAI-ARIA authoring patterns before they are operated, and markup that
//! works but is semantically weak produces warnings.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    ARIADRIVER Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────────┐        │
//! │   │ Locator    │    │ Resolver   │    │ AriaDriver     │        │
//! │   │ css/label  │───►│ perceptible│───►│ touch, widgets │        │
//! │   └────────────┘    └────────────┘    └───────┬────────┘        │
//! │                                               ▼                 │
//! │   ┌────────────┐    ┌────────────┐    ┌────────────────┐        │
//! │   │ Role       │◄───│ Element    │◄───│ BrowserSession │        │
//! │   │ inference  │    │ Snapshot   │    │ (chromium/mock)│        │
//! │   └────────────┘    └────────────┘    └────────────────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use ariadriver::{AriaDriver, MockSession, Warnings};
//!
//! # async fn demo() -> ariadriver::AriaResult<()> {
//! let driver = AriaDriver::with_defaults(MockSession::new());
//! let mut warnings = Warnings::new();
//! driver.push_button("#save", &mut warnings).await?;
//! for warning in &warnings {
//!     eprintln!("{warning}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod config;
mod dom;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::doc_markdown
)]
mod driver;
mod locator;
mod perceptibility;
#[allow(clippy::missing_errors_doc)]
mod resolve;
mod result;
mod role;
mod script;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod session;
mod wait;
mod warning;
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
mod widgets;

/// Chrome DevTools backend
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc)]
pub mod chromium;

/// Tracing subscriber setup for binaries and tests
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;

pub use config::{DriverConfig, DEFAULT_PATIENCE_MS};
pub use dom::{DocumentFacts, DomNode, ElementSnapshot, NodeRef};
pub use driver::{AriaDriver, ReadValue, TABINDEX_REFERENCE};
pub use locator::{css_attr_value, IntoLocator, Locator, CSS_SELECTOR_KEY, LABEL_TEXT_KEY};
pub use perceptibility::{filter_perceptible, hides_subtree, is_element_perceptible, is_perceptible};
pub use resolve::{Resolver, LABELABLE_SELECTOR, LABEL_REFERENCE};
pub use result::{AriaError, AriaResult, ErrorCode, FOCUS_REFERENCE};
pub use role::{implicit_role, infer_role, AriaRole, RoleRule, INPUT_RULES, SECTIONING_TAGS, TAG_RULES};
pub use script::PageScript;
pub use session::{BrowserSession, ElementHandle, Key, MockSession};
pub use wait::{wait_until, WaitOptions, WaitResult, Waiter, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
pub use warning::{Warning, WarningCode, WarningSink, Warnings};
pub use widgets::{
    NameInputs, PopupRole, ACCNAME_REFERENCE, BUTTON_REFERENCE, HASPOPUP_REFERENCE,
    MODAL_REFERENCE, OPEN_DIALOG_SELECTOR,
};

#[cfg(feature = "browser")]
pub use chromium::ChromiumSession;
