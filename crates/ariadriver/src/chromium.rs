//! [`BrowserSession`] over the Chrome DevTools Protocol.
//!
//! Requires the `browser` feature. Element handles are keyed by the
//! backend DOM node id, so the same node always yields the same handle
//! across queries.

use crate::result::{AriaError, AriaResult};
use crate::script::PageScript;
use crate::session::{BrowserSession, ElementHandle, Key};
use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::{CallArgument, CallFunctionOnParams};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Session bound to one Chromium page
pub struct ChromiumSession {
    page: Page,
    elements: Mutex<HashMap<ElementHandle, Element>>,
}

impl std::fmt::Debug for ChromiumSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromiumSession").finish_non_exhaustive()
    }
}

fn cdp_error(e: impl std::fmt::Display) -> AriaError {
    AriaError::session(e.to_string())
}

impl ChromiumSession {
    /// Wrap an open page
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            page,
            elements: Mutex::new(HashMap::new()),
        }
    }

    /// Underlying page
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    /// Navigate and forget every handle issued for the previous document
    pub async fn goto(&self, url: &str) -> AriaResult<()> {
        self.page.goto(url).await.map_err(cdp_error)?;
        self.elements.lock().await.clear();
        tracing::debug!(url, "navigated");
        Ok(())
    }

    async fn register(&self, found: Vec<Element>) -> Vec<ElementHandle> {
        let mut elements = self.elements.lock().await;
        found
            .into_iter()
            .map(|element| {
                let handle = ElementHandle::new(format!("node-{}", element.backend_node_id.inner()));
                elements.entry(handle.clone()).or_insert(element);
                handle
            })
            .collect()
    }

    fn unknown(element: &ElementHandle) -> AriaError {
        AriaError::session(format!("unknown element handle {element}"))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn find_elements(&self, selector: &str) -> AriaResult<Vec<ElementHandle>> {
        let found = self.page.find_elements(selector).await.map_err(cdp_error)?;
        Ok(self.register(found).await)
    }

    async fn find_elements_within(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> AriaResult<Vec<ElementHandle>> {
        let found = {
            let elements = self.elements.lock().await;
            let scope = elements.get(scope).ok_or_else(|| Self::unknown(scope))?;
            scope.find_elements(selector).await.map_err(cdp_error)?
        };
        Ok(self.register(found).await)
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> AriaResult<Option<String>> {
        let elements = self.elements.lock().await;
        let target = elements.get(element).ok_or_else(|| Self::unknown(element))?;
        target.attribute(name).await.map_err(cdp_error)
    }

    async fn execute(&self, script: PageScript, args: &[ElementHandle]) -> AriaResult<Value> {
        let params = {
            let elements = self.elements.lock().await;
            let mut object_ids = Vec::with_capacity(args.len());
            for arg in args {
                let element = elements.get(arg).ok_or_else(|| Self::unknown(arg))?;
                object_ids.push(element.remote_object_id.clone());
            }
            let receiver = object_ids
                .first()
                .cloned()
                .ok_or_else(|| AriaError::session("script requires an element argument"))?;
            CallFunctionOnParams::builder()
                .function_declaration(script.source())
                .object_id(receiver)
                .arguments(
                    object_ids
                        .into_iter()
                        .map(|id| CallArgument::builder().object_id(id).build())
                        .collect::<Vec<_>>(),
                )
                .return_by_value(true)
                .await_promise(true)
                .build()
                .map_err(cdp_error)?
        };

        let response = self.page.execute(params).await.map_err(cdp_error)?;
        if let Some(exception) = &response.result.exception_details {
            return Err(AriaError::session(format!(
                "{script} script threw: {}",
                exception.text
            )));
        }
        Ok(response.result.result.value.clone().unwrap_or(Value::Null))
    }

    async fn send_key(&self, element: &ElementHandle, key: Key) -> AriaResult<()> {
        let elements = self.elements.lock().await;
        let target = elements.get(element).ok_or_else(|| Self::unknown(element))?;
        target.press_key(key.as_str()).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn active_element(&self) -> AriaResult<ElementHandle> {
        let focused = self.find_elements(":focus").await?;
        if let Some(first) = focused.into_iter().next() {
            return Ok(first);
        }
        self.find_elements("body")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AriaError::session("document has no body"))
    }
}
