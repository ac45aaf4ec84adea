//! Locator resolution and single-element selection.
//!
//! Resolution turns a [`Locator`] into the ordered set of perceptible
//! elements it names. Selection narrows that set to one element, failing
//! when it is empty and warning when it holds more than one.

use crate::locator::{css_attr_value, Locator};
use crate::perceptibility::{filter_perceptible, is_element_perceptible};
use crate::result::{AriaError, AriaResult};
use crate::script::PageScript;
use crate::session::{BrowserSession, ElementHandle};
use crate::warning::{report, Warning, WarningSink};
use serde_json::json;

/// Elements that a `<label>` can be associated with
pub const LABELABLE_SELECTOR: &str =
    "button, input:not([type=\"hidden\"]), meter, output, progress, select, textarea";

/// Reference for label association warnings
pub const LABEL_REFERENCE: &str = "https://html.spec.whatwg.org/multipage/forms.html#the-label-element";

/// Resolves locators against a session
#[derive(Debug)]
pub struct Resolver<'a, S: ?Sized> {
    session: &'a S,
}

impl<'a, S> Resolver<'a, S>
where
    S: BrowserSession + ?Sized,
{
    /// Create a resolver over `session`
    #[must_use]
    pub const fn new(session: &'a S) -> Self {
        Self { session }
    }

    /// All perceptible elements named by `locator`, in document order
    pub async fn resolve(
        &self,
        locator: &Locator,
        sink: &mut dyn WarningSink,
    ) -> AriaResult<Vec<ElementHandle>> {
        let elements = match locator {
            Locator::Css(selector) => self.resolve_css(selector).await?,
            Locator::LabelText(text) => self.resolve_label(text, sink).await?,
        };
        tracing::debug!(locator = %locator, count = elements.len(), "resolved locator");
        Ok(elements)
    }

    /// Perceptible matches of a CSS selector. Never emits warnings.
    pub async fn resolve_css(&self, selector: &str) -> AriaResult<Vec<ElementHandle>> {
        let raw = self.session.find_elements(selector).await?;
        filter_perceptible(self.session, raw).await
    }

    /// Exactly one element for `locator`.
    ///
    /// Zero matches fail with [`AriaError::ElementNotFound`]. Several matches
    /// emit an ambiguous-reference warning and yield the first in document order.
    pub async fn select_one(
        &self,
        locator: &Locator,
        sink: &mut dyn WarningSink,
    ) -> AriaResult<ElementHandle> {
        let elements = self.resolve(locator, sink).await?;
        if elements.len() > 1 {
            report(sink, Warning::ambiguous_reference(locator, elements.len()));
        }
        elements
            .into_iter()
            .next()
            .ok_or_else(|| AriaError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    async fn resolve_label(
        &self,
        text: &str,
        sink: &mut dyn WarningSink,
    ) -> AriaResult<Vec<ElementHandle>> {
        let mut controls: Vec<ElementHandle> = Vec::new();
        for label in self.session.find_elements("label").await? {
            let content = self
                .session
                .execute(PageScript::TextContent, std::slice::from_ref(&label))
                .await?;
            let content: Option<String> = serde_json::from_value(content)?;
            if content.as_deref().map(str::trim) != Some(text) {
                continue;
            }
            if let Some(control) = self.labelled_control(&label, text, sink).await? {
                if !controls.contains(&control) {
                    controls.push(control);
                }
            }
        }
        Ok(controls)
    }

    /// The control a matching label refers to: its `for` target when that
    /// is perceptible, otherwise its first perceptible labelable descendant
    async fn labelled_control(
        &self,
        label: &ElementHandle,
        text: &str,
        sink: &mut dyn WarningSink,
    ) -> AriaResult<Option<ElementHandle>> {
        let primary = match self.session.attribute(label, "for").await? {
            Some(id) if !id.is_empty() => self.element_by_id(&id).await?,
            _ => None,
        };

        let descendants = self
            .session
            .find_elements_within(label, LABELABLE_SELECTOR)
            .await?;
        let descendants = filter_perceptible(self.session, descendants).await?;

        if let Some(primary) = &primary {
            if descendants.iter().any(|d| d != primary) {
                report(
                    sink,
                    Warning::poor_semantics(
                        "Associate the label with one control: its `for` attribute and the controls it contains refer to different elements.",
                    )
                    .with_data(json!({ "label": text }))
                    .with_reference(LABEL_REFERENCE),
                );
            }
        }
        if descendants.len() > 1 {
            report(
                sink,
                Warning::poor_semantics("Place at most one labelable element inside a `<label>`.")
                    .with_data(json!({ "label": text, "count": descendants.len() }))
                    .with_reference(LABEL_REFERENCE),
            );
        }

        Ok(primary.or_else(|| descendants.into_iter().next()))
    }

    /// First element with the given id, if it is perceptible
    async fn element_by_id(&self, id: &str) -> AriaResult<Option<ElementHandle>> {
        let selector = format!("[id={}]", css_attr_value(id));
        let Some(first) = self.session.find_elements(&selector).await?.into_iter().next() else {
            return Ok(None);
        };
        if is_element_perceptible(self.session, &first).await? {
            Ok(Some(first))
        } else {
            Ok(None)
        }
    }
}
