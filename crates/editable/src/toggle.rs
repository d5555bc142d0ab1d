use crate::dom::{DomError, DomTree, ElementTag, NodeId};
use crate::materialize::{materialize, materialize_all};
use crate::selection::{
    Range, Selection, is_direct_child, is_forward, is_single_node, is_well_formed,
    text_offset_within,
};
use crate::style::{RunKind, StyleFlags, StyleName};
use crate::text::split_utf16;
use crate::token::{Token, TokenizeContext, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Extract the selection, retokenize it and insert fresh runs in its place.
    InsertStyledRun,
    /// Replace the enclosing styled element with before/selected/after pieces.
    SplitStyledElement,
}

/// Picks the reconstruction strategy for a non-collapsed range.
///
/// A range whose boundaries sit on a styling or link container itself splits
/// that container, even when it is a direct child of the root.
pub fn classify<T: DomTree + ?Sized>(tree: &T, range: &Range, root: NodeId) -> Strategy {
    if !is_single_node(range) {
        return Strategy::InsertStyledRun;
    }
    if is_styled_container(tree, range.start.node) {
        return Strategy::SplitStyledElement;
    }
    if is_direct_child(tree, range, root) {
        return Strategy::InsertStyledRun;
    }
    match enclosing_element(tree, range.start.node) {
        Some(element) if is_styled_container(tree, element) => Strategy::SplitStyledElement,
        _ => Strategy::InsertStyledRun,
    }
}

fn is_styled_container<T: DomTree + ?Sized>(tree: &T, node: NodeId) -> bool {
    matches!(tree.tag(node), Some(ElementTag::Span | ElementTag::Anchor))
}

/// Toggles `name` over the current selection and reselects the restyled content.
///
/// Absent, collapsed or malformed selections leave tree and selection untouched.
/// The tree is mutated on a scratch copy and only committed once every step succeeded.
pub fn toggle_style<T: DomTree + Clone>(
    tree: &mut T,
    selection: &mut Selection,
    root: NodeId,
    name: StyleName,
) {
    let Some(range) = usable_range(tree, selection, root) else {
        return;
    };

    let strategy = classify(tree, &range, root);
    tracing::debug!(style = %name, ?strategy, "toggling inline style");

    let mut scratch = tree.clone();
    let result = match strategy {
        Strategy::InsertStyledRun => {
            insert_styled_run(&mut scratch, &range, &TokenizeContext::forced(name))
        }
        Strategy::SplitStyledElement => split_styled_element(&mut scratch, &range, name),
    };
    commit(tree, selection, scratch, result);
}

/// Turns the selected runs into links to `href`, or back into plain runs when
/// `href` is `None`. Style flags of every run are kept.
pub fn set_link<T: DomTree + Clone>(
    tree: &mut T,
    selection: &mut Selection,
    root: NodeId,
    href: Option<&str>,
) {
    let Some(range) = usable_range(tree, selection, root) else {
        return;
    };

    let kind = href.map(RunKind::link).unwrap_or_default();
    tracing::debug!(?kind, "setting run kind");

    let mut scratch = tree.clone();
    let result = insert_styled_run(&mut scratch, &range, &TokenizeContext::with_kind(kind));
    commit(tree, selection, scratch, result);
}

fn usable_range<T: DomTree + ?Sized>(
    tree: &T,
    selection: &Selection,
    root: NodeId,
) -> Option<Range> {
    let Some(range) = selection.range().copied() else {
        tracing::trace!("no selection");
        return None;
    };
    if range.is_collapsed() {
        tracing::trace!("selection is collapsed");
        return None;
    }
    if !is_well_formed(tree, &range, root) {
        tracing::trace!(?range, "selection is outside the editable root");
        return None;
    }
    if !is_forward(tree, &range, root) {
        tracing::trace!(?range, "backward selection");
        return Some(Range::new(range.end, range.start));
    }
    Some(range)
}

fn commit<T: DomTree>(
    tree: &mut T,
    selection: &mut Selection,
    scratch: T,
    result: Result<Option<Range>, DomError>,
) {
    match result {
        Ok(Some(range)) => {
            *tree = scratch;
            selection.remove_all_ranges();
            selection.add_range(range);
        }
        Ok(None) => tracing::trace!("nothing to restyle"),
        Err(err) => tracing::warn!("inline restyle abandoned: {err}"),
    }
}

/// [`Strategy::InsertStyledRun`]: extract, retokenize with `context`,
/// rematerialize and reinsert.
fn insert_styled_run<T: DomTree + ?Sized>(
    tree: &mut T,
    range: &Range,
    context: &TokenizeContext,
) -> Result<Option<Range>, DomError> {
    let (fragment, at) = tree.extract_contents(range)?;
    let tokens = tokenize(tree, fragment, context)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let (parent, reference) = tree.insertion_point(at)?;
    let nodes = materialize_all(tree, &tokens)?;
    for &node in &nodes {
        tree.insert_before(parent, node, reference)?;
    }
    prune_empty_runs(tree, parent)?;

    let (Some(&first), Some(&last)) = (nodes.first(), nodes.last()) else {
        return Ok(None);
    };
    Ok(Range::select_nodes(tree, first, last))
}

/// [`Strategy::SplitStyledElement`]: replace the element around a single-node
/// selection with up to three pieces, only the selected one carrying the
/// toggled style.
fn split_styled_element<T: DomTree + ?Sized>(
    tree: &mut T,
    range: &Range,
    name: StyleName,
) -> Result<Option<Range>, DomError> {
    let Some(enclosing) = enclosing_element(tree, range.start.node) else {
        return Ok(None);
    };
    let Some(parent) = tree.parent(enclosing) else {
        return Ok(None);
    };
    let (Some(start), Some(end)) = (
        text_offset_within(tree, enclosing, range.start),
        text_offset_within(tree, enclosing, range.end),
    ) else {
        return Ok(None);
    };

    let original = StyleFlags::from_markers(tree, enclosing);
    let toggled = original.flip(name);
    let kind = RunKind::of_node(tree, enclosing);

    let text = tree.text_content(enclosing);
    let (before, selected, after) = split_utf16(&text, start, end);
    if selected.is_empty() {
        return Ok(None);
    }

    let selected_node = materialize(tree, &Token::new(selected, kind.clone(), Some(toggled)))?;
    let mut pieces = Vec::with_capacity(3);
    if !before.is_empty() {
        pieces.push(materialize(tree, &Token::new(before, kind.clone(), Some(original)))?);
    }
    pieces.push(selected_node);
    if !after.is_empty() {
        pieces.push(materialize(tree, &Token::new(after, kind, Some(original)))?);
    }

    for piece in pieces {
        tree.insert_before(parent, piece, Some(enclosing))?;
    }
    tree.remove_child(parent, enclosing)?;

    Ok(Range::select_node(tree, selected_node))
}

/// The container itself when it is an element, its parent element otherwise.
fn enclosing_element<T: DomTree + ?Sized>(tree: &T, container: NodeId) -> Option<NodeId> {
    if tree.is_element(container) {
        return Some(container);
    }
    tree.parent(container).filter(|&parent| tree.is_element(parent))
}

/// Drops text nodes and inline containers under `parent` that extraction left empty.
fn prune_empty_runs<T: DomTree + ?Sized>(tree: &mut T, parent: NodeId) -> Result<(), DomError> {
    let children = tree.children(parent).to_vec();
    for child in children {
        let prunable = tree.is_text(child) || is_styled_container(tree, child);
        if prunable && tree.text_content(child).is_empty() {
            tree.remove_child(parent, child)?;
        }
    }
    Ok(())
}
