//! Locators.
//!
//! A locator names the element(s) an operation targets, either by CSS
//! selector or by the text of an associated `<label>`. A bare string is a
//! CSS selector. The object form `{"<strategy>": "<value>"}` must carry
//! exactly one recognised strategy; anything else is a usage error.

use crate::result::{AriaError, AriaResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Object key for the CSS strategy
pub const CSS_SELECTOR_KEY: &str = "cssSelector";

/// Object key for the label-text strategy
pub const LABEL_TEXT_KEY: &str = "labelText";

/// Element locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Locator {
    /// Native CSS query against the document
    Css(String),
    /// Controls associated with `<label>` elements whose trimmed text
    /// equals this value
    LabelText(String),
}

impl Locator {
    /// CSS selector locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Label text locator
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::LabelText(text.into())
    }

    /// Strategy key as used in the object form
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => CSS_SELECTOR_KEY,
            Self::LabelText(_) => LABEL_TEXT_KEY,
        }
    }

    /// Strategy value
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Css(value) | Self::LabelText(value) => value,
        }
    }

    /// Validate a JSON locator
    pub fn from_json(value: &Value) -> AriaResult<Self> {
        match value {
            Value::String(selector) => Ok(Self::Css(selector.clone())),
            Value::Object(map) => {
                let mut entries = map.iter();
                let (key, raw) = match (entries.next(), entries.next()) {
                    (Some(entry), None) => entry,
                    (None, _) => {
                        return Err(AriaError::usage(
                            "Locator must specify a strategy (`cssSelector` or `labelText`).",
                        ))
                    }
                    (Some(_), Some(_)) => {
                        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                        return Err(AriaError::usage(format!(
                            "Locator must specify exactly one strategy; found {}.",
                            keys.join(", ")
                        )));
                    }
                };
                let Value::String(text) = raw else {
                    return Err(AriaError::usage(format!(
                        "Locator strategy `{key}` requires a string value."
                    )));
                };
                match key.as_str() {
                    CSS_SELECTOR_KEY => Ok(Self::Css(text.clone())),
                    LABEL_TEXT_KEY => Ok(Self::LabelText(text.clone())),
                    other => Err(AriaError::usage(format!(
                        "Unrecognized locator strategy: `{other}`."
                    ))),
                }
            }
            other => Err(AriaError::usage(format!(
                "Locator must be a string or an object, not {other}."
            ))),
        }
    }

    /// Object form of the locator
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(self.strategy().to_string(), Value::String(self.value().to_string()));
        Value::Object(map)
    }
}

impl From<&str> for Locator {
    fn from(selector: &str) -> Self {
        Self::Css(selector.to_string())
    }
}

impl From<String> for Locator {
    fn from(selector: String) -> Self {
        Self::Css(selector)
    }
}

impl TryFrom<Value> for Locator {
    type Error = AriaError;

    fn try_from(value: Value) -> AriaResult<Self> {
        Self::from_json(&value)
    }
}

impl TryFrom<&Value> for Locator {
    type Error = AriaError;

    fn try_from(value: &Value) -> AriaResult<Self> {
        Self::from_json(value)
    }
}

impl From<Locator> for Value {
    fn from(locator: Locator) -> Self {
        locator.to_json()
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(selector) => f.write_str(selector),
            Self::LabelText(text) => write!(f, "{{{LABEL_TEXT_KEY}: {text:?}}}"),
        }
    }
}

/// Conversion into a validated [`Locator`].
///
/// Driver operations accept anything implementing this trait, so a
/// malformed JSON locator fails the operation with a usage error.
pub trait IntoLocator {
    /// Validate and convert
    fn into_locator(self) -> AriaResult<Locator>;
}

impl IntoLocator for Locator {
    fn into_locator(self) -> AriaResult<Locator> {
        Ok(self)
    }
}

impl IntoLocator for &Locator {
    fn into_locator(self) -> AriaResult<Locator> {
        Ok(self.clone())
    }
}

impl IntoLocator for &str {
    fn into_locator(self) -> AriaResult<Locator> {
        Ok(Locator::from(self))
    }
}

impl IntoLocator for String {
    fn into_locator(self) -> AriaResult<Locator> {
        Ok(Locator::from(self))
    }
}

impl IntoLocator for Value {
    fn into_locator(self) -> AriaResult<Locator> {
        Locator::from_json(&self)
    }
}

impl IntoLocator for &Value {
    fn into_locator(self) -> AriaResult<Locator> {
        Locator::from_json(self)
    }
}

/// Quote a value for use inside a CSS attribute selector
#[must_use]
pub fn css_attr_value(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for c in raw.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
