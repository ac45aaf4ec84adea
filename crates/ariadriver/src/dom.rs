//! Element snapshots.
//!
//! A snapshot is the element plus its ancestor chain up to the document
//! element, captured in one round trip by [`PageScript::Snapshot`]. Role
//! inference and the perceptibility rule are pure functions over it.
//!
//! [`PageScript::Snapshot`]: crate::script::PageScript::Snapshot

use crate::result::AriaResult;
use crate::script::PageScript;
use crate::session::{BrowserSession, ElementHandle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One element of a snapshot chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomNode {
    /// Lower-case local name
    pub tag_name: String,
    /// Content attributes
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Computed `display` is `none`
    #[serde(default)]
    pub display_none: bool,
}

impl DomNode {
    /// Create a node with no attributes
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            display_none: false,
        }
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Mark computed `display: none`
    #[must_use]
    pub const fn with_display_none(mut self) -> Self {
        self.display_none = true;
        self
    }

    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the attribute is present, whatever its value
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

/// Document-level facts needed by the `list` and `datalist` rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFacts {
    /// `list` attribute values in the chain that name an existing element
    #[serde(default)]
    pub existing_list_targets: BTreeSet<String>,
    /// Datalist ids in the chain referenced by some `input[list]`
    #[serde(default)]
    pub referenced_datalists: BTreeSet<String>,
}

/// An element and its ancestors, subject first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    /// The chain ends at the document element
    pub connected: bool,
    /// Subject, parent, grandparent, ...
    pub chain: Vec<DomNode>,
    /// Lookups against the whole document
    #[serde(flatten)]
    pub facts: DocumentFacts,
}

impl ElementSnapshot {
    /// Build a connected snapshot from a chain (subject first)
    #[must_use]
    pub fn connected(chain: Vec<DomNode>) -> Self {
        Self {
            connected: true,
            chain,
            facts: DocumentFacts::default(),
        }
    }

    /// Record that a `list` attribute value names an existing element
    #[must_use]
    pub fn with_list_target(mut self, id: impl Into<String>) -> Self {
        self.facts.existing_list_targets.insert(id.into());
        self
    }

    /// Record that a datalist id is referenced by an input
    #[must_use]
    pub fn with_referenced_datalist(mut self, id: impl Into<String>) -> Self {
        self.facts.referenced_datalists.insert(id.into());
        self
    }

    /// Cursor at the subject, `None` for an empty chain
    #[must_use]
    pub fn subject(&self) -> Option<NodeRef<'_>> {
        NodeRef::new(&self.chain, &self.facts)
    }

    /// Capture a snapshot of `element`
    pub async fn capture<S>(session: &S, element: &ElementHandle) -> AriaResult<Self>
    where
        S: BrowserSession + ?Sized,
    {
        let value = session
            .execute(PageScript::Snapshot, std::slice::from_ref(element))
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Cursor into a snapshot chain. The node's ancestors are the rest of the chain.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    chain: &'a [DomNode],
    facts: &'a DocumentFacts,
}

impl<'a> NodeRef<'a> {
    /// Cursor at the head of `chain`
    #[must_use]
    pub fn new(chain: &'a [DomNode], facts: &'a DocumentFacts) -> Option<Self> {
        if chain.is_empty() {
            None
        } else {
            Some(Self { chain, facts })
        }
    }

    /// The node under the cursor
    #[must_use]
    pub fn node(&self) -> &'a DomNode {
        &self.chain[0]
    }

    /// Lower-case tag name
    #[must_use]
    pub fn tag(&self) -> &'a str {
        &self.chain[0].tag_name
    }

    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node().attr(name)
    }

    /// Parent cursor
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        Self::new(&self.chain[1..], self.facts)
    }

    /// Parent, grandparent, ... outward
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> {
        let facts = self.facts;
        let chain = self.chain;
        (1..chain.len()).map(move |i| NodeRef {
            chain: &chain[i..],
            facts,
        })
    }

    /// Document facts shared by the whole chain
    #[must_use]
    pub const fn facts(&self) -> &'a DocumentFacts {
        self.facts
    }
}
