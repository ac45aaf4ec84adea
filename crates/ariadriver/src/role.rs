//! Implicit ARIA role inference.
//!
//! A pure mapping from a node snapshot to the role a user agent assigns it,
//! following the HTML-AAM implicit role table. Two lookup tables drive the
//! mapping, one keyed by tag name and one by `input` type. Each entry is
//! either a fixed role or a function of the node and its ancestor chain.
//!
//! An explicit `role` attribute always wins.

use crate::dom::NodeRef;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// ROLES
// =============================================================================

/// An ARIA role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
#[non_exhaustive]
pub enum AriaRole {
    /// `article`
    Article,
    /// `banner`
    Banner,
    /// `button`
    Button,
    /// `cell`
    Cell,
    /// `checkbox`
    Checkbox,
    /// `columnheader`
    ColumnHeader,
    /// `combobox`
    Combobox,
    /// `complementary`
    Complementary,
    /// `contentinfo`
    ContentInfo,
    /// `definition`
    Definition,
    /// `dialog`
    Dialog,
    /// `figure`
    Figure,
    /// `graphics-document`
    GraphicsDocument,
    /// `grid`
    Grid,
    /// `gridcell`
    GridCell,
    /// `group`
    Group,
    /// `heading`
    Heading,
    /// `img`
    Img,
    /// `link`
    Link,
    /// `list`
    List,
    /// `listbox`
    Listbox,
    /// `listitem`
    ListItem,
    /// `main`
    Main,
    /// `math`
    Math,
    /// `menu`
    Menu,
    /// `menuitem`
    MenuItem,
    /// `menuitemcheckbox`
    MenuItemCheckbox,
    /// `menuitemradio`
    MenuItemRadio,
    /// `navigation`
    Navigation,
    /// `option`
    Option,
    /// `presentation`
    Presentation,
    /// `progressbar`
    ProgressBar,
    /// `radio`
    Radio,
    /// `row`
    Row,
    /// `rowgroup`
    RowGroup,
    /// `rowheader`
    RowHeader,
    /// `separator`
    Separator,
    /// `slider`
    Slider,
    /// `spinbutton`
    SpinButton,
    /// `status`
    Status,
    /// `table`
    Table,
    /// `term`
    Term,
    /// `textbox`
    Textbox,
    /// `tree`
    Tree,
    /// Any other explicit role value, kept verbatim
    Custom(String),
}

static NAMED_ROLES: &[(&str, AriaRole)] = &[
    ("article", AriaRole::Article),
    ("banner", AriaRole::Banner),
    ("button", AriaRole::Button),
    ("cell", AriaRole::Cell),
    ("checkbox", AriaRole::Checkbox),
    ("columnheader", AriaRole::ColumnHeader),
    ("combobox", AriaRole::Combobox),
    ("complementary", AriaRole::Complementary),
    ("contentinfo", AriaRole::ContentInfo),
    ("definition", AriaRole::Definition),
    ("dialog", AriaRole::Dialog),
    ("figure", AriaRole::Figure),
    ("graphics-document", AriaRole::GraphicsDocument),
    ("grid", AriaRole::Grid),
    ("gridcell", AriaRole::GridCell),
    ("group", AriaRole::Group),
    ("heading", AriaRole::Heading),
    ("img", AriaRole::Img),
    ("link", AriaRole::Link),
    ("list", AriaRole::List),
    ("listbox", AriaRole::Listbox),
    ("listitem", AriaRole::ListItem),
    ("main", AriaRole::Main),
    ("math", AriaRole::Math),
    ("menu", AriaRole::Menu),
    ("menuitem", AriaRole::MenuItem),
    ("menuitemcheckbox", AriaRole::MenuItemCheckbox),
    ("menuitemradio", AriaRole::MenuItemRadio),
    ("navigation", AriaRole::Navigation),
    ("option", AriaRole::Option),
    ("presentation", AriaRole::Presentation),
    ("progressbar", AriaRole::ProgressBar),
    ("radio", AriaRole::Radio),
    ("row", AriaRole::Row),
    ("rowgroup", AriaRole::RowGroup),
    ("rowheader", AriaRole::RowHeader),
    ("separator", AriaRole::Separator),
    ("slider", AriaRole::Slider),
    ("spinbutton", AriaRole::SpinButton),
    ("status", AriaRole::Status),
    ("table", AriaRole::Table),
    ("term", AriaRole::Term),
    ("textbox", AriaRole::Textbox),
    ("tree", AriaRole::Tree),
];

impl AriaRole {
    /// Role token as it appears in a `role` attribute
    #[must_use]
    pub fn as_str(&self) -> &str {
        if let Self::Custom(name) = self {
            return name;
        }
        NAMED_ROLES
            .iter()
            .find(|(_, role)| role == self)
            .map_or("", |(name, _)| *name)
    }

    /// Parse a role token; unknown tokens become [`AriaRole::Custom`]
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        NAMED_ROLES
            .iter()
            .find(|(name, _)| *name == token)
            .map_or_else(|| Self::Custom(token.to_string()), |(_, role)| role.clone())
    }
}

impl FromStr for AriaRole {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_token(s))
    }
}

impl From<String> for AriaRole {
    fn from(token: String) -> Self {
        Self::from_token(&token)
    }
}

impl From<AriaRole> for String {
    fn from(role: AriaRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for AriaRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// RULE TABLES
// =============================================================================

/// How a table entry computes a role
pub enum RoleRule {
    /// Always this role
    Fixed(AriaRole),
    /// Computed from the node and its context
    Computed(fn(NodeRef<'_>) -> Option<AriaRole>),
}

impl std::fmt::Debug for RoleRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(role) => f.debug_tuple("Fixed").field(role).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl RoleRule {
    fn apply(&self, node: NodeRef<'_>) -> Option<AriaRole> {
        match self {
            Self::Fixed(role) => Some(role.clone()),
            Self::Computed(rule) => rule(node),
        }
    }
}

/// Per-tag rules, keyed by lower-case tag name
pub static TAG_RULES: &[(&str, RoleRule)] = &[
    ("a", RoleRule::Computed(hyperlink)),
    ("area", RoleRule::Computed(hyperlink)),
    ("article", RoleRule::Fixed(AriaRole::Article)),
    ("aside", RoleRule::Fixed(AriaRole::Complementary)),
    ("button", RoleRule::Fixed(AriaRole::Button)),
    ("datalist", RoleRule::Computed(datalist)),
    ("dd", RoleRule::Fixed(AriaRole::Definition)),
    ("dfn", RoleRule::Fixed(AriaRole::Term)),
    ("dialog", RoleRule::Fixed(AriaRole::Dialog)),
    ("dt", RoleRule::Fixed(AriaRole::Term)),
    ("fieldset", RoleRule::Fixed(AriaRole::Group)),
    ("figure", RoleRule::Fixed(AriaRole::Figure)),
    ("footer", RoleRule::Computed(footer)),
    ("h1", RoleRule::Fixed(AriaRole::Heading)),
    ("h2", RoleRule::Fixed(AriaRole::Heading)),
    ("h3", RoleRule::Fixed(AriaRole::Heading)),
    ("h4", RoleRule::Fixed(AriaRole::Heading)),
    ("h5", RoleRule::Fixed(AriaRole::Heading)),
    ("h6", RoleRule::Fixed(AriaRole::Heading)),
    ("header", RoleRule::Computed(header)),
    ("hr", RoleRule::Fixed(AriaRole::Separator)),
    ("img", RoleRule::Computed(image)),
    ("input", RoleRule::Computed(input)),
    ("li", RoleRule::Fixed(AriaRole::ListItem)),
    ("main", RoleRule::Fixed(AriaRole::Main)),
    ("math", RoleRule::Fixed(AriaRole::Math)),
    ("menu", RoleRule::Fixed(AriaRole::Menu)),
    ("nav", RoleRule::Fixed(AriaRole::Navigation)),
    ("ol", RoleRule::Fixed(AriaRole::List)),
    ("optgroup", RoleRule::Fixed(AriaRole::Group)),
    ("option", RoleRule::Fixed(AriaRole::Option)),
    ("output", RoleRule::Fixed(AriaRole::Status)),
    ("progress", RoleRule::Fixed(AriaRole::ProgressBar)),
    ("select", RoleRule::Computed(select)),
    ("svg", RoleRule::Fixed(AriaRole::GraphicsDocument)),
    ("table", RoleRule::Fixed(AriaRole::Table)),
    ("tbody", RoleRule::Fixed(AriaRole::RowGroup)),
    ("td", RoleRule::Computed(table_cell)),
    ("textarea", RoleRule::Fixed(AriaRole::Textbox)),
    ("tfoot", RoleRule::Fixed(AriaRole::RowGroup)),
    ("th", RoleRule::Computed(table_header)),
    ("thead", RoleRule::Fixed(AriaRole::RowGroup)),
    ("tr", RoleRule::Fixed(AriaRole::Row)),
    ("ul", RoleRule::Fixed(AriaRole::List)),
];

/// Per-type rules for `input`, keyed by lower-case `type`.
/// Types not listed (hidden, password, color, file, date and time types) have no role.
pub static INPUT_RULES: &[(&str, RoleRule)] = &[
    ("button", RoleRule::Computed(input_button)),
    ("checkbox", RoleRule::Computed(input_checkbox)),
    ("email", RoleRule::Computed(text_entry)),
    ("image", RoleRule::Computed(input_button)),
    ("number", RoleRule::Fixed(AriaRole::SpinButton)),
    ("radio", RoleRule::Computed(input_radio)),
    ("range", RoleRule::Fixed(AriaRole::Slider)),
    ("reset", RoleRule::Fixed(AriaRole::Button)),
    ("search", RoleRule::Computed(text_entry)),
    ("submit", RoleRule::Fixed(AriaRole::Button)),
    ("tel", RoleRule::Computed(text_entry)),
    ("telephone", RoleRule::Computed(text_entry)),
    ("text", RoleRule::Computed(text_entry)),
    ("url", RoleRule::Computed(text_entry)),
];

/// Ancestors that strip `header`/`footer` of their landmark role
pub const SECTIONING_TAGS: &[&str] = &[
    "main",
    "article",
    "aside",
    "nav",
    "section",
    "blockquote",
    "details",
    "dialog",
    "fieldset",
    "figure",
    "td",
];

fn lookup<'t>(table: &'t [(&str, RoleRule)], key: &str) -> Option<&'t RoleRule> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, rule)| rule)
}

// =============================================================================
// INFERENCE
// =============================================================================

/// Role of the node under the cursor: the explicit `role` attribute if
/// present and non-blank, otherwise the implicit role from the tag table
#[must_use]
pub fn infer_role(node: NodeRef<'_>) -> Option<AriaRole> {
    if let Some(explicit) = node.attr("role").filter(|role| !role.trim().is_empty()) {
        return Some(AriaRole::from_token(explicit));
    }
    implicit_role(node)
}

/// Implicit role, ignoring any `role` attribute on the node itself
#[must_use]
pub fn implicit_role(node: NodeRef<'_>) -> Option<AriaRole> {
    lookup(TAG_RULES, node.tag()).and_then(|rule| rule.apply(node))
}

/// Role of the nearest ancestor that has one
fn nearest_ancestor_role(node: NodeRef<'_>) -> Option<AriaRole> {
    node.ancestors().find_map(infer_role)
}

fn within_menu(node: NodeRef<'_>) -> bool {
    nearest_ancestor_role(node) == Some(AriaRole::Menu)
}

fn in_sectioning_content(node: NodeRef<'_>) -> bool {
    node.ancestors()
        .any(|ancestor| SECTIONING_TAGS.contains(&ancestor.tag()))
}

fn hyperlink(node: NodeRef<'_>) -> Option<AriaRole> {
    if node.attr("href").is_none() {
        return None;
    }
    if within_menu(node) {
        Some(AriaRole::MenuItem)
    } else {
        Some(AriaRole::Link)
    }
}

fn datalist(node: NodeRef<'_>) -> Option<AriaRole> {
    let id = node.attr("id").filter(|id| !id.is_empty())?;
    node.facts()
        .referenced_datalists
        .contains(id)
        .then_some(AriaRole::Listbox)
}

fn header(node: NodeRef<'_>) -> Option<AriaRole> {
    (!in_sectioning_content(node)).then_some(AriaRole::Banner)
}

fn footer(node: NodeRef<'_>) -> Option<AriaRole> {
    (!in_sectioning_content(node)).then_some(AriaRole::ContentInfo)
}

fn image(node: NodeRef<'_>) -> Option<AriaRole> {
    if node.attr("alt") == Some("") {
        Some(AriaRole::Presentation)
    } else {
        Some(AriaRole::Img)
    }
}

fn select(node: NodeRef<'_>) -> Option<AriaRole> {
    let multiple = node.attr("multiple").is_some();
    let tall = node
        .attr("size")
        .and_then(leading_integer)
        .is_some_and(|size| size > 1);
    if multiple || tall {
        Some(AriaRole::Listbox)
    } else {
        Some(AriaRole::Combobox)
    }
}

/// Integer prefix of an attribute value, so `"3px"` reads as 3 and
/// `"2.5"` as 2
fn leading_integer(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let digits_from = usize::from(value.starts_with(['+', '-']));
    let end = value[digits_from..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(value.len(), |offset| digits_from + offset);
    value[..end].parse().ok()
}

fn table_cell(node: NodeRef<'_>) -> Option<AriaRole> {
    let table = node.ancestors().find(|ancestor| ancestor.tag() == "table");
    if table.and_then(infer_role) == Some(AriaRole::Grid) {
        Some(AriaRole::GridCell)
    } else {
        Some(AriaRole::Cell)
    }
}

fn table_header(node: NodeRef<'_>) -> Option<AriaRole> {
    if node.attr("context") == Some("row") {
        Some(AriaRole::RowHeader)
    } else {
        Some(AriaRole::ColumnHeader)
    }
}

fn input(node: NodeRef<'_>) -> Option<AriaRole> {
    let kind = node
        .attr("type")
        .map_or_else(|| "text".to_string(), str::to_ascii_lowercase);
    lookup(INPUT_RULES, &kind).and_then(|rule| rule.apply(node))
}

fn input_button(node: NodeRef<'_>) -> Option<AriaRole> {
    Some(if within_menu(node) {
        AriaRole::MenuItem
    } else {
        AriaRole::Button
    })
}

fn input_checkbox(node: NodeRef<'_>) -> Option<AriaRole> {
    Some(if within_menu(node) {
        AriaRole::MenuItemCheckbox
    } else {
        AriaRole::Checkbox
    })
}

fn input_radio(node: NodeRef<'_>) -> Option<AriaRole> {
    Some(if within_menu(node) {
        AriaRole::MenuItemRadio
    } else {
        AriaRole::Radio
    })
}

fn text_entry(node: NodeRef<'_>) -> Option<AriaRole> {
    let has_list = node
        .attr("list")
        .is_some_and(|id| node.facts().existing_list_targets.contains(id));
    Some(if has_list {
        AriaRole::Combobox
    } else {
        AriaRole::Textbox
    })
}
