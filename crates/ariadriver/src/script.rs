//! In-page scripts.
//!
//! Scripts cross the remote-execution boundary as source text. Each one is
//! a self-contained function declaration whose only inputs are its
//! parameters; the element argument arrives as the first parameter.

/// Snapshot of an element and its ancestor chain, consumed by
/// [`crate::dom::ElementSnapshot`]
const SNAPSHOT: &str = r#"function (element) {
  var chain = [];
  var existingListTargets = [];
  var referencedDatalists = [];
  var node = element;
  while (node && node.nodeType === 1) {
    var attributes = {};
    for (var i = 0; i < node.attributes.length; i += 1) {
      attributes[node.attributes[i].name] = node.attributes[i].value;
    }
    var listId = node.getAttribute('list');
    if (listId && document.getElementById(listId)) {
      existingListTargets.push(listId);
    }
    if (node.localName === 'datalist' && node.id &&
        document.querySelector('input[list="' + CSS.escape(node.id) + '"]')) {
      referencedDatalists.push(node.id);
    }
    chain.push({
      tagName: node.localName.toLowerCase(),
      attributes: attributes,
      displayNone: window.getComputedStyle(node).display === 'none'
    });
    node = node.parentNode;
  }
  return {
    connected: node === document,
    chain: chain,
    existingListTargets: existingListTargets,
    referencedDatalists: referencedDatalists
  };
}"#;

const FOCUS: &str = r"function (element) {
  element.focus();
  return document.activeElement === element;
}";

const TEXT_CONTENT: &str = r"function (element) {
  return element.textContent;
}";

const READ_VALUE: &str = r"function (element) {
  var tag = element.localName;
  if (tag === 'meter' || tag === 'progress') {
    return { number: element.value };
  }
  if (tag === 'input' || tag === 'textarea' || tag === 'select' || tag === 'output') {
    return { text: element.value };
  }
  var text = element.innerText || element.textContent || '';
  return { text: text.replace(/\s+/g, ' ').trim() };
}";

const NAME_INPUTS: &str = r"function (element) {
  return {
    ariaPressed: element.getAttribute('aria-pressed'),
    ariaLabel: element.getAttribute('aria-label'),
    ariaLabelledBy: element.getAttribute('aria-labelledby'),
    innerText: element.innerText
  };
}";

/// Scripts the driver runs inside the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageScript {
    /// Tag, attributes and computed `display` for the element and every
    /// ancestor, plus the `list`/`datalist` facts role inference needs
    Snapshot,
    /// Focus the element and report whether it became the active element
    Focus,
    /// Raw `textContent`
    TextContent,
    /// Value shown to the user, tagged `number` or `text`
    ReadValue,
    /// `aria-pressed`, `aria-label`, `aria-labelledby` and `innerText`
    NameInputs,
}

impl PageScript {
    /// Function declaration source
    #[must_use]
    pub const fn source(&self) -> &'static str {
        match self {
            Self::Snapshot => SNAPSHOT,
            Self::Focus => FOCUS,
            Self::TextContent => TEXT_CONTENT,
            Self::ReadValue => READ_VALUE,
            Self::NameInputs => NAME_INPUTS,
        }
    }

    /// Short name for logs and call histories
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Focus => "focus",
            Self::TextContent => "text_content",
            Self::ReadValue => "read_value",
            Self::NameInputs => "name_inputs",
        }
    }
}

impl std::fmt::Display for PageScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
