//! Remote browser session abstraction.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  BrowserSession (Abstract Trait)                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────┐  ┌──────────────────┐                   │
//! │  │  ChromiumSession │  │  MockSession     │                   │
//! │  │  (CDP, feature   │  │  (unit tests)    │                   │
//! │  │   "browser")     │  │                  │                   │
//! │  └──────────────────┘  └──────────────────┘                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The driver only ever talks to the page through this trait: CSS queries,
//! attribute reads, script execution, key dispatch and the active element.

use crate::result::{AriaError, AriaResult};
use crate::script::PageScript;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Opaque, session-scoped reference to a remote DOM node.
///
/// Two handles are equal exactly when they refer to the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    /// Create a handle from a backend identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Backend identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// Keys dispatched by the interaction protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Activation key
    Enter,
    /// Dismissal key
    Escape,
}

impl Key {
    /// DOM `KeyboardEvent.key` name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "Enter",
            Self::Escape => "Escape",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities the driver needs from a remote browser session.
///
/// Implementations own the wire protocol. All methods take `&self`; a
/// session that mutates local bookkeeping uses interior mutability.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// All elements in the current document matching a CSS selector, in document order
    async fn find_elements(&self, selector: &str) -> AriaResult<Vec<ElementHandle>>;

    /// Descendants of `scope` matching a CSS selector, in document order
    async fn find_elements_within(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> AriaResult<Vec<ElementHandle>>;

    /// Content attribute value, `None` when absent
    async fn attribute(&self, element: &ElementHandle, name: &str) -> AriaResult<Option<String>>;

    /// Run an in-page script with `args` as its parameters and return its JSON result
    async fn execute(&self, script: PageScript, args: &[ElementHandle]) -> AriaResult<Value>;

    /// Dispatch a key to an element
    async fn send_key(&self, element: &ElementHandle, key: Key) -> AriaResult<()>;

    /// Focused element, or the document body when nothing has focus
    async fn active_element(&self) -> AriaResult<ElementHandle>;
}

// =============================================================================
// MOCK SESSION
// =============================================================================

/// Scripted session for unit testing
#[derive(Debug, Default)]
pub struct MockSession {
    elements: HashMap<String, Vec<ElementHandle>>,
    scoped: HashMap<(ElementHandle, String), Vec<ElementHandle>>,
    attributes: HashMap<(ElementHandle, String), String>,
    script_results: HashMap<(PageScript, ElementHandle), Value>,
    active: Option<ElementHandle>,
    call_history: Mutex<Vec<String>>,
}

impl MockSession {
    /// Create an empty mock session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the result of a document query
    #[must_use]
    pub fn with_elements(mut self, selector: &str, ids: &[&str]) -> Self {
        self.elements
            .insert(selector.to_string(), ids.iter().map(|id| ElementHandle::new(*id)).collect());
        self
    }

    /// Register the result of a scoped query
    #[must_use]
    pub fn with_elements_within(mut self, scope: &str, selector: &str, ids: &[&str]) -> Self {
        self.scoped.insert(
            (ElementHandle::new(scope), selector.to_string()),
            ids.iter().map(|id| ElementHandle::new(*id)).collect(),
        );
        self
    }

    /// Register an attribute value
    #[must_use]
    pub fn with_attribute(mut self, id: &str, name: &str, value: &str) -> Self {
        self.attributes
            .insert((ElementHandle::new(id), name.to_string()), value.to_string());
        self
    }

    /// Register the value a script returns for an element
    #[must_use]
    pub fn with_script_result(mut self, script: PageScript, id: &str, value: Value) -> Self {
        self.script_results.insert((script, ElementHandle::new(id)), value);
        self
    }

    /// Set the focused element
    #[must_use]
    pub fn with_active_element(mut self, id: &str) -> Self {
        self.active = Some(ElementHandle::new(id));
        self
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.call_history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(method))
    }

    fn record(&self, call: String) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(call);
        }
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn find_elements(&self, selector: &str) -> AriaResult<Vec<ElementHandle>> {
        self.record(format!("find_elements:{selector}"));
        Ok(self.elements.get(selector).cloned().unwrap_or_default())
    }

    async fn find_elements_within(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> AriaResult<Vec<ElementHandle>> {
        self.record(format!("find_elements_within:{scope}:{selector}"));
        Ok(self
            .scoped
            .get(&(scope.clone(), selector.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> AriaResult<Option<String>> {
        self.record(format!("attribute:{element}:{name}"));
        Ok(self
            .attributes
            .get(&(element.clone(), name.to_string()))
            .cloned())
    }

    async fn execute(&self, script: PageScript, args: &[ElementHandle]) -> AriaResult<Value> {
        let target = args
            .first()
            .ok_or_else(|| AriaError::session("script requires an element argument"))?;
        self.record(format!("execute:{}:{target}", script.name()));
        self.script_results
            .get(&(script, target.clone()))
            .cloned()
            .ok_or_else(|| AriaError::session(format!("no scripted {} result for {target}", script.name())))
    }

    async fn send_key(&self, element: &ElementHandle, key: Key) -> AriaResult<()> {
        self.record(format!("send_key:{element}:{key}"));
        Ok(())
    }

    async fn active_element(&self) -> AriaResult<ElementHandle> {
        self.record("active_element".to_string());
        Ok(self
            .active
            .clone()
            .unwrap_or_else(|| ElementHandle::new("body")))
    }
}
