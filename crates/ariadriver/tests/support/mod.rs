//! In-memory page for driving `AriaDriver` without a browser.
//!
//! Fixtures are plain HTML parsed with `scraper`. Behaviour is attached
//! with data attributes:
//!
//! - `data-click-count="0"`: incremented on every Enter
//! - `data-toggle="pressed"`: Enter flips `aria-pressed`
//! - `data-opens="<id>"`: Enter reveals the element with that id
//! - `data-delay-ms="<n>"`: defer the reaction by `n` ms
//! - `data-escape="ignore"`: Escape leaves this dialog open
//!
//! Escape hides the last open `role="dialog"`, after that dialog's own
//! `data-delay-ms`.

#![allow(dead_code)]

use ariadriver::{
    AriaDriver, AriaError, AriaResult, BrowserSession, DriverConfig, ElementHandle, Key,
    PageScript,
};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Node as HtmlNode, Selector};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Tags the user agent stylesheet renders with `display: none`
const UA_HIDDEN_TAGS: &[&str] = &[
    "datalist", "head", "link", "meta", "script", "style", "template", "title",
];

/// Patience used by [`driver`]
pub const TEST_PATIENCE_MS: u64 = 250;

#[derive(Debug, Clone)]
enum Content {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    content: Content,
    parent: Option<usize>,
    children: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    FlipPressed(usize),
    Show(usize),
    Hide(usize),
}

#[derive(Debug, Default)]
struct Dom {
    nodes: Vec<Node>,
    root: usize,
    focused: Option<usize>,
    pending: Vec<(Instant, Mutation)>,
    keys: Vec<String>,
}

impl Dom {
    fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut dom = Self::default();
        dom.root = dom.import(document.root_element(), None);
        dom
    }

    fn import(&mut self, element: ElementRef<'_>, parent: Option<usize>) -> usize {
        let value = element.value();
        let idx = self.push(
            Content::Element {
                tag: value.name().to_ascii_lowercase(),
                attrs: value
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            },
            parent,
        );
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                self.import(child_element, Some(idx));
            } else if let HtmlNode::Text(text) = child.value() {
                self.push(Content::Text(String::from(&**text)), Some(idx));
            }
        }
        idx
    }

    fn push(&mut self, content: Content, parent: Option<usize>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Node {
            content,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(idx);
        }
        idx
    }

    // ---------------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------------

    fn tag(&self, idx: usize) -> &str {
        match &self.nodes[idx].content {
            Content::Element { tag, .. } => tag,
            Content::Text(_) => "",
        }
    }

    fn attrs(&self, idx: usize) -> &[(String, String)] {
        match &self.nodes[idx].content {
            Content::Element { attrs, .. } => attrs,
            Content::Text(_) => &[],
        }
    }

    fn attr(&self, idx: usize, name: &str) -> Option<&str> {
        self.attrs(idx)
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attr(&mut self, idx: usize, name: &str, value: &str) {
        if let Content::Element { attrs, .. } = &mut self.nodes[idx].content {
            match attrs.iter_mut().find(|(key, _)| key == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn remove_attr(&mut self, idx: usize, name: &str) {
        if let Content::Element { attrs, .. } = &mut self.nodes[idx].content {
            attrs.retain(|(key, _)| key != name);
        }
    }

    fn is_element(&self, idx: usize) -> bool {
        matches!(self.nodes[idx].content, Content::Element { .. })
    }

    /// Elements in document order
    fn elements(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.nodes.len()).filter(|&idx| self.is_element(idx))
    }

    fn by_id(&self, id: &str) -> Option<usize> {
        self.elements().find(|&idx| self.attr(idx, "id") == Some(id))
    }

    fn lineage(&self, idx: usize) -> Vec<usize> {
        let mut chain = vec![idx];
        let mut current = idx;
        while let Some(parent) = self.nodes[current].parent {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    fn is_descendant(&self, idx: usize, ancestor: usize) -> bool {
        idx != ancestor && self.lineage(idx).contains(&ancestor)
    }

    // ---------------------------------------------------------------------
    // Rendering state
    // ---------------------------------------------------------------------

    fn display_none(&self, idx: usize) -> bool {
        if UA_HIDDEN_TAGS.contains(&self.tag(idx)) || self.attr(idx, "hidden").is_some() {
            return true;
        }
        self.attr(idx, "style").is_some_and(|style| {
            let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
            compact.to_ascii_lowercase().contains("display:none")
        })
    }

    fn rendered(&self, idx: usize) -> bool {
        self.lineage(idx).iter().all(|&n| !self.display_none(n))
    }

    fn perceptible(&self, idx: usize) -> bool {
        self.lineage(idx)
            .iter()
            .all(|&n| !self.display_none(n) && self.attr(n, "aria-hidden") != Some("true"))
    }

    fn focusable(&self, idx: usize) -> bool {
        if !self.rendered(idx) {
            return false;
        }
        if self
            .attr(idx, "tabindex")
            .and_then(|value| value.trim().parse::<i64>().ok())
            .is_some()
        {
            return true;
        }
        let disabled = self.attr(idx, "disabled").is_some();
        match self.tag(idx) {
            "button" | "select" | "textarea" => !disabled,
            "input" => {
                !disabled
                    && !self
                        .attr(idx, "type")
                        .is_some_and(|kind| kind.eq_ignore_ascii_case("hidden"))
            }
            "a" | "area" => self.attr(idx, "href").is_some(),
            "summary" => true,
            _ => false,
        }
    }

    fn text_content(&self, idx: usize) -> String {
        match &self.nodes[idx].content {
            Content::Text(text) => text.clone(),
            Content::Element { .. } => self.nodes[idx]
                .children
                .iter()
                .map(|&child| self.text_content(child))
                .collect(),
        }
    }

    fn inner_text(&self, idx: usize) -> String {
        match &self.nodes[idx].content {
            Content::Text(text) => text.clone(),
            Content::Element { .. } if self.display_none(idx) => String::new(),
            Content::Element { .. } => self.nodes[idx]
                .children
                .iter()
                .map(|&child| self.inner_text(child))
                .collect(),
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    fn render(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>");
        self.render_node(self.root, &mut out);
        out
    }

    fn render_node(&self, idx: usize, out: &mut String) {
        match &self.nodes[idx].content {
            Content::Text(text) => out.push_str(&escape(text)),
            Content::Element { tag, attrs } => {
                let _ = write!(out, "<{tag} data-fake-node=\"{idx}\"");
                for (name, value) in attrs {
                    let _ = write!(out, " {name}=\"{}\"", escape(value));
                }
                out.push('>');
                if VOID_TAGS.contains(&tag.as_str()) {
                    return;
                }
                for &child in &self.nodes[idx].children {
                    self.render_node(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn query(&self, selector: &str) -> AriaResult<Vec<usize>> {
        let parsed = Selector::parse(selector)
            .map_err(|e| AriaError::session(format!("invalid selector {selector:?}: {e:?}")))?;
        let document = Html::parse_document(&self.render());
        Ok(document
            .select(&parsed)
            .filter_map(|element| element.value().attr("data-fake-node"))
            .filter_map(|idx| idx.parse().ok())
            .collect())
    }

    // ---------------------------------------------------------------------
    // Scripts
    // ---------------------------------------------------------------------

    fn snapshot(&self, idx: usize) -> Value {
        let lineage = self.lineage(idx);
        let connected = lineage.last() == Some(&self.root);
        let mut existing_list_targets = BTreeSet::new();
        let mut referenced_datalists = BTreeSet::new();
        let mut chain = Vec::with_capacity(lineage.len());

        for &node in &lineage {
            if let Some(list) = self.attr(node, "list") {
                if self.by_id(list).is_some() {
                    existing_list_targets.insert(list.to_string());
                }
            }
            if self.tag(node) == "datalist" {
                if let Some(id) = self.attr(node, "id") {
                    let referenced = self
                        .elements()
                        .any(|e| self.tag(e) == "input" && self.attr(e, "list") == Some(id));
                    if referenced {
                        referenced_datalists.insert(id.to_string());
                    }
                }
            }
            let attributes: Map<String, Value> = self
                .attrs(node)
                .iter()
                .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                .collect();
            chain.push(json!({
                "tagName": self.tag(node),
                "attributes": attributes,
                "displayNone": self.display_none(node),
            }));
        }

        json!({
            "connected": connected,
            "chain": chain,
            "existingListTargets": existing_list_targets,
            "referencedDatalists": referenced_datalists,
        })
    }

    fn focus(&mut self, idx: usize) -> bool {
        if self.focusable(idx) {
            self.focused = Some(idx);
        }
        self.focused == Some(idx)
    }

    fn read_value(&self, idx: usize) -> Value {
        match self.tag(idx) {
            "meter" | "progress" => {
                let value = self
                    .attr(idx, "value")
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .unwrap_or(0.0);
                json!({ "number": value })
            }
            "input" => json!({ "text": self.attr(idx, "value").unwrap_or_default() }),
            "textarea" | "output" => json!({ "text": self.text_content(idx) }),
            "select" => {
                let options: Vec<usize> = self
                    .elements()
                    .filter(|&e| self.tag(e) == "option" && self.is_descendant(e, idx))
                    .collect();
                let chosen = options
                    .iter()
                    .copied()
                    .find(|&o| self.attr(o, "selected").is_some())
                    .or_else(|| options.first().copied());
                let value = chosen.map_or_else(String::new, |o| {
                    self.attr(o, "value")
                        .map_or_else(|| self.text_content(o).trim().to_string(), str::to_string)
                });
                json!({ "text": value })
            }
            _ => {
                let text = self.inner_text(idx);
                json!({ "text": text.split_whitespace().collect::<Vec<_>>().join(" ") })
            }
        }
    }

    fn name_inputs(&self, idx: usize) -> Value {
        json!({
            "ariaPressed": self.attr(idx, "aria-pressed"),
            "ariaLabel": self.attr(idx, "aria-label"),
            "ariaLabelledBy": self.attr(idx, "aria-labelledby"),
            "innerText": self.inner_text(idx),
        })
    }

    // ---------------------------------------------------------------------
    // Behaviour
    // ---------------------------------------------------------------------

    fn delay(&self, idx: usize) -> u64 {
        self.attr(idx, "data-delay-ms")
            .and_then(|ms| ms.parse().ok())
            .unwrap_or(0)
    }

    fn schedule(&mut self, delay_ms: u64, mutation: Mutation) {
        if delay_ms == 0 {
            self.apply(mutation);
        } else {
            self.pending
                .push((Instant::now() + Duration::from_millis(delay_ms), mutation));
        }
    }

    fn settle(&mut self) {
        let now = Instant::now();
        let (due, later): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(at, _)| *at <= now);
        self.pending = later;
        for (_, mutation) in due {
            self.apply(mutation);
        }
    }

    fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::FlipPressed(idx) => {
                let next = if self.attr(idx, "aria-pressed") == Some("true") {
                    "false"
                } else {
                    "true"
                };
                self.set_attr(idx, "aria-pressed", next);
            }
            Mutation::Show(idx) => {
                self.remove_attr(idx, "hidden");
                self.remove_attr(idx, "aria-hidden");
            }
            Mutation::Hide(idx) => self.set_attr(idx, "hidden", ""),
        }
    }

    fn activate(&mut self, idx: usize) {
        if let Some(count) = self
            .attr(idx, "data-click-count")
            .and_then(|count| count.parse::<u64>().ok())
        {
            self.set_attr(idx, "data-click-count", &(count + 1).to_string());
        }
        let delay = self.delay(idx);
        if self.attr(idx, "data-toggle") == Some("pressed") {
            self.schedule(delay, Mutation::FlipPressed(idx));
        }
        if let Some(target) = self.attr(idx, "data-opens").and_then(|id| self.by_id(id)) {
            self.schedule(delay, Mutation::Show(target));
        }
    }

    fn dismiss(&mut self) {
        let open = self
            .elements()
            .filter(|&e| self.attr(e, "role") == Some("dialog") && self.perceptible(e))
            .last();
        if let Some(dialog) = open {
            if self.attr(dialog, "data-escape") != Some("ignore") {
                let delay = self.delay(dialog);
                self.schedule(delay, Mutation::Hide(dialog));
            }
        }
    }

    fn label(&self, idx: usize) -> String {
        self.attr(idx, "id")
            .map_or_else(|| self.tag(idx).to_string(), |id| format!("#{id}"))
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn handle(idx: usize) -> ElementHandle {
    ElementHandle::new(format!("n{idx}"))
}

/// Browser session over an HTML fixture
#[derive(Debug)]
pub struct FakePage {
    dom: Mutex<Dom>,
}

impl FakePage {
    /// Parse a fixture
    pub fn new(html: &str) -> Self {
        Self {
            dom: Mutex::new(Dom::parse(html)),
        }
    }

    fn dom(&self) -> MutexGuard<'_, Dom> {
        let mut dom = self.dom.lock().unwrap();
        dom.settle();
        dom
    }

    fn resolve_handle(dom: &Dom, element: &ElementHandle) -> AriaResult<usize> {
        element
            .id()
            .strip_prefix('n')
            .and_then(|idx| idx.parse::<usize>().ok())
            .filter(|&idx| idx < dom.nodes.len())
            .ok_or_else(|| AriaError::session(format!("stale handle {element}")))
    }

    /// Attribute of the first element matching `selector`
    pub fn attr(&self, selector: &str, name: &str) -> Option<String> {
        let dom = self.dom();
        let idx = *dom.query(selector).unwrap().first()?;
        dom.attr(idx, name).map(str::to_string)
    }

    /// Click count recorded on the first element matching `selector`
    pub fn clicks(&self, selector: &str) -> u64 {
        self.attr(selector, "data-click-count")
            .and_then(|count| count.parse().ok())
            .unwrap_or(0)
    }

    /// `id` of the focused element
    pub fn focused_id(&self) -> Option<String> {
        let dom = self.dom();
        dom.focused
            .and_then(|idx| dom.attr(idx, "id"))
            .map(str::to_string)
    }

    /// Keys dispatched so far, as `Key@target`
    pub fn keys(&self) -> Vec<String> {
        self.dom().keys.clone()
    }
}

#[async_trait]
impl BrowserSession for FakePage {
    async fn find_elements(&self, selector: &str) -> AriaResult<Vec<ElementHandle>> {
        Ok(self.dom().query(selector)?.into_iter().map(handle).collect())
    }

    async fn find_elements_within(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> AriaResult<Vec<ElementHandle>> {
        let dom = self.dom();
        let scope = Self::resolve_handle(&dom, scope)?;
        Ok(dom
            .query(selector)?
            .into_iter()
            .filter(|&idx| dom.is_descendant(idx, scope))
            .map(handle)
            .collect())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> AriaResult<Option<String>> {
        let dom = self.dom();
        let idx = Self::resolve_handle(&dom, element)?;
        Ok(dom.attr(idx, name).map(str::to_string))
    }

    async fn execute(&self, script: PageScript, args: &[ElementHandle]) -> AriaResult<Value> {
        let mut dom = self.dom();
        let target = args
            .first()
            .ok_or_else(|| AriaError::session("script requires an element argument"))?;
        let idx = Self::resolve_handle(&dom, target)?;
        Ok(match script {
            PageScript::Snapshot => dom.snapshot(idx),
            PageScript::Focus => Value::Bool(dom.focus(idx)),
            PageScript::TextContent => Value::String(dom.text_content(idx)),
            PageScript::ReadValue => dom.read_value(idx),
            PageScript::NameInputs => dom.name_inputs(idx),
        })
    }

    async fn send_key(&self, element: &ElementHandle, key: Key) -> AriaResult<()> {
        let mut dom = self.dom();
        let idx = Self::resolve_handle(&dom, element)?;
        let entry = format!("{key}@{}", dom.label(idx));
        dom.keys.push(entry);
        match key {
            Key::Enter => dom.activate(idx),
            Key::Escape => dom.dismiss(),
        }
        Ok(())
    }

    async fn active_element(&self) -> AriaResult<ElementHandle> {
        let dom = self.dom();
        let body = dom.elements().find(|&idx| dom.tag(idx) == "body");
        dom.focused
            .or(body)
            .map(handle)
            .ok_or_else(|| AriaError::session("document has no body"))
    }
}

/// Driver over `html` with [`TEST_PATIENCE_MS`] patience
pub fn driver(html: &str) -> AriaDriver<FakePage> {
    driver_with_patience(html, TEST_PATIENCE_MS)
}

/// Driver over `html` with the given patience
pub fn driver_with_patience(html: &str, patience_ms: u64) -> AriaDriver<FakePage> {
    AriaDriver::new(
        FakePage::new(html),
        DriverConfig::new()
            .with_patience_ms(patience_ms)
            .with_poll_interval(Duration::from_millis(5)),
    )
}
