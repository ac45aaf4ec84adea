//! Perceptibility filter.
//!
//! An element is perceptible when neither it nor any ancestor up to the
//! document element is rendered `display: none`, carries `hidden`, or
//! carries `aria-hidden="true"`. Detached elements are never perceptible.

use crate::dom::{DomNode, ElementSnapshot};
use crate::result::AriaResult;
use crate::session::{BrowserSession, ElementHandle};

/// Whether a single node hides itself (and therefore its subtree)
#[must_use]
pub fn hides_subtree(node: &DomNode) -> bool {
    node.display_none || node.has_attr("hidden") || node.attr("aria-hidden") == Some("true")
}

/// Apply the rule to every level of the snapshot chain
#[must_use]
pub fn is_perceptible(snapshot: &ElementSnapshot) -> bool {
    if !snapshot.connected || snapshot.chain.is_empty() {
        return false;
    }
    !snapshot.chain.iter().any(hides_subtree)
}

/// Snapshot `element` remotely and apply the rule
pub async fn is_element_perceptible<S>(session: &S, element: &ElementHandle) -> AriaResult<bool>
where
    S: BrowserSession + ?Sized,
{
    let snapshot = ElementSnapshot::capture(session, element).await?;
    Ok(is_perceptible(&snapshot))
}

/// Keep the perceptible elements, preserving order
pub async fn filter_perceptible<S>(
    session: &S,
    elements: Vec<ElementHandle>,
) -> AriaResult<Vec<ElementHandle>>
where
    S: BrowserSession + ?Sized,
{
    let mut kept = Vec::with_capacity(elements.len());
    for element in elements {
        if is_element_perceptible(session, &element).await? {
            kept.push(element);
        }
    }
    Ok(kept)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::script::PageScript;
    use crate::session::MockSession;
    use proptest::prelude::*;

    fn chain(subject: DomNode) -> Vec<DomNode> {
        vec![subject, DomNode::new("div"), DomNode::new("body"), DomNode::new("html")]
    }

    mod rule_tests {
        use super::*;

        #[test]
        fn test_plain_element_is_perceptible() {
            let snapshot = ElementSnapshot::connected(chain(DomNode::new("button")));
            assert!(is_perceptible(&snapshot));
        }

        #[test]
        fn test_self_hidden_variants() {
            for node in [
                DomNode::new("button").with_display_none(),
                DomNode::new("button").with_attr("hidden", ""),
                DomNode::new("button").with_attr("aria-hidden", "true"),
            ] {
                assert!(!is_perceptible(&ElementSnapshot::connected(chain(node))));
            }
        }

        #[test]
        fn test_aria_hidden_false_is_perceptible() {
            let node = DomNode::new("div").with_attr("aria-hidden", "false");
            assert!(is_perceptible(&ElementSnapshot::connected(chain(node))));
        }

        #[test]
        fn test_hidden_ancestor_propagates() {
            for ancestor in [
                DomNode::new("div").with_display_none(),
                DomNode::new("div").with_attr("hidden", ""),
                DomNode::new("div").with_attr("aria-hidden", "true"),
            ] {
                let snapshot = ElementSnapshot::connected(vec![
                    DomNode::new("span"),
                    ancestor,
                    DomNode::new("body"),
                    DomNode::new("html"),
                ]);
                assert!(!is_perceptible(&snapshot));
            }
        }

        #[test]
        fn test_detached_is_imperceptible() {
            let mut snapshot = ElementSnapshot::connected(vec![DomNode::new("div")]);
            snapshot.connected = false;
            assert!(!is_perceptible(&snapshot));
        }

        #[test]
        fn test_document_element_alone_is_perceptible() {
            let snapshot = ElementSnapshot::connected(vec![DomNode::new("html")]);
            assert!(is_perceptible(&snapshot));
        }

        #[test]
        fn test_empty_chain_is_imperceptible() {
            assert!(!is_perceptible(&ElementSnapshot::default()));
        }
    }

    mod remote_tests {
        use super::*;

        fn snapshot_json(hidden: bool) -> serde_json::Value {
            let mut subject = serde_json::json!({"tagName": "li", "attributes": {}});
            if hidden {
                subject["attributes"]["hidden"] = serde_json::json!("");
            }
            serde_json::json!({
                "connected": true,
                "chain": [subject, {"tagName": "html"}]
            })
        }

        #[tokio::test]
        async fn test_filter_preserves_order() {
            let session = MockSession::new()
                .with_script_result(PageScript::Snapshot, "a", snapshot_json(false))
                .with_script_result(PageScript::Snapshot, "b", snapshot_json(true))
                .with_script_result(PageScript::Snapshot, "c", snapshot_json(false));
            let elements = ["a", "b", "c"].map(ElementHandle::new).to_vec();
            let kept = filter_perceptible(&session, elements).await.unwrap();
            assert_eq!(kept, vec![ElementHandle::new("a"), ElementHandle::new("c")]);
        }
    }

    proptest! {
        #[test]
        fn prop_any_hiding_level_hides_subject(depth in 1usize..8, hidden_at in 0usize..8, kind in 0u8..3) {
            let hidden_at = hidden_at % depth;
            let mut nodes: Vec<DomNode> = (0..depth).map(|_| DomNode::new("div")).collect();
            nodes[hidden_at] = match kind {
                0 => DomNode::new("div").with_display_none(),
                1 => DomNode::new("div").with_attr("hidden", ""),
                _ => DomNode::new("div").with_attr("aria-hidden", "true"),
            };
            prop_assert!(!is_perceptible(&ElementSnapshot::connected(nodes)));
        }

        #[test]
        fn prop_clean_chain_is_perceptible(depth in 1usize..8) {
            let nodes: Vec<DomNode> = (0..depth).map(|_| DomNode::new("section")).collect();
            prop_assert!(is_perceptible(&ElementSnapshot::connected(nodes)));
        }
    }
}
