use crate::dom::{DomError, DomTree, ElementTag, NodeId};
use crate::style::{HREF_ATTRIBUTE, RunKind};
use crate::token::Token;

/// Builds the smallest node that represents `token`.
///
/// Plain runs without an active flag become bare text. Everything else becomes a
/// span (or an anchor for links) with one marker per active flag around a text node.
pub fn materialize<T: DomTree + ?Sized>(tree: &mut T, token: &Token) -> Result<NodeId, DomError> {
    debug_assert!(!token.content.is_empty(), "tokens never carry empty content");

    let text = tree.create_text(&token.content);
    let element = match &token.kind {
        RunKind::PlainText => {
            if !token.style.is_some_and(|style| style.has_any_active()) {
                return Ok(text);
            }
            tree.create_element(ElementTag::Span)
        }
        RunKind::Link { href } => {
            let anchor = tree.create_element(ElementTag::Anchor);
            tree.set_attribute(anchor, HREF_ATTRIBUTE, href)?;
            anchor
        }
    };

    for name in token.effective_style().active() {
        tree.set_attribute(element, name.marker_attribute(), name.marker_value())?;
    }
    tree.append_child(element, text)?;
    Ok(element)
}

pub fn materialize_all<T: DomTree + ?Sized>(
    tree: &mut T,
    tokens: &[Token],
) -> Result<Vec<NodeId>, DomError> {
    tokens.iter().map(|token| materialize(tree, token)).collect()
}
