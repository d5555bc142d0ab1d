use crate::dom::{DomTree, NodeId, NodeKind};
use crate::text::utf16_len;

/// A point in the tree: a UTF-16 offset into a text node, or a child index into
/// any other node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A start/end pair with `start` not after `end` in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Boundary,
    pub end: Boundary,
}

impl Range {
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    pub fn collapsed(at: Boundary) -> Self {
        Self { start: at, end: at }
    }

    /// A range within a single container, offsets given in either order.
    pub fn within(node: NodeId, a: usize, b: usize) -> Self {
        Self::new(Boundary::new(node, a.min(b)), Boundary::new(node, a.max(b)))
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Spans `node` entirely, expressed as child offsets in its parent.
    pub fn select_node<T: DomTree + ?Sized>(tree: &T, node: NodeId) -> Option<Self> {
        Self::select_nodes(tree, node, node)
    }

    /// Spans the siblings from `first` through `last`.
    pub fn select_nodes<T: DomTree + ?Sized>(tree: &T, first: NodeId, last: NodeId) -> Option<Self> {
        let parent = tree.parent(first)?;
        if tree.parent(last) != Some(parent) {
            return None;
        }
        let start = tree.index_in_parent(first)?;
        let end = tree.index_in_parent(last)?;
        Some(Self::within(parent, start, end + 1))
    }
}

/// The host's selection object. Holds at most one range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    range: Option<Range>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_range(range: Range) -> Self {
        Self { range: Some(range) }
    }

    pub fn range_count(&self) -> usize {
        usize::from(self.range.is_some())
    }

    pub fn range(&self) -> Option<&Range> {
        self.range.as_ref()
    }

    pub fn remove_all_ranges(&mut self) {
        self.range = None;
    }

    pub fn add_range(&mut self, range: Range) {
        self.range = Some(range);
    }

    pub fn collapse(&mut self, at: Boundary) {
        self.range = Some(Range::collapsed(at));
    }

    /// An absent selection counts as collapsed.
    pub fn is_collapsed(&self) -> bool {
        self.range.is_none_or(|range| range.is_collapsed())
    }
}

pub fn common_ancestor<T: DomTree + ?Sized>(tree: &T, range: &Range) -> Option<NodeId> {
    tree.common_ancestor(range.start.node, range.end.node)
}

/// Both boundaries sit in the same container node.
pub fn is_single_node(range: &Range) -> bool {
    range.start.node == range.end.node
}

/// The selection's container is the root itself or one of its direct children,
/// i.e. it is not nested inside an existing styled container.
pub fn is_direct_child<T: DomTree + ?Sized>(tree: &T, range: &Range, root: NodeId) -> bool {
    let container = range.start.node;
    container == root || tree.parent(container) == Some(root)
}

/// Maps a boundary to an offset into the flattened text of `ancestor`.
///
/// Returns `None` when the boundary's container does not live inside `ancestor`.
pub fn text_offset_within<T: DomTree + ?Sized>(
    tree: &T,
    ancestor: NodeId,
    boundary: Boundary,
) -> Option<usize> {
    if !tree.contains(ancestor, boundary.node) {
        return None;
    }

    let mut offset = match tree.kind(boundary.node)? {
        NodeKind::Text(text) => boundary.offset.min(utf16_len(text)),
        NodeKind::Comment => 0,
        NodeKind::Element(_) | NodeKind::Fragment => tree
            .children(boundary.node)
            .iter()
            .take(boundary.offset)
            .map(|&child| utf16_len(&tree.text_content(child)))
            .sum(),
    };

    let mut node = boundary.node;
    while node != ancestor {
        let parent = tree.parent(node)?;
        for &sibling in tree.children(parent) {
            if sibling == node {
                break;
            }
            offset += utf16_len(&tree.text_content(sibling));
        }
        node = parent;
    }
    Some(offset)
}

/// Start and end offsets relative to the text of the range's common ancestor
/// element (the parent, when the common ancestor is a text node).
pub fn range_position<T: DomTree + ?Sized>(tree: &T, range: &Range) -> Option<(usize, usize)> {
    let ancestor = common_ancestor(tree, range)?;
    let ancestor = if tree.is_text(ancestor) {
        tree.parent(ancestor)?
    } else {
        ancestor
    };
    let start = text_offset_within(tree, ancestor, range.start)?;
    let end = text_offset_within(tree, ancestor, range.end)?;
    Some((start, end))
}

/// The range starts at the very end of a non-empty container.
pub fn is_end_of_line<T: DomTree + ?Sized>(tree: &T, range: &Range) -> bool {
    let len = utf16_len(&tree.text_content(range.start.node));
    len > 0 && len == range.start.offset
}

pub fn is_empty_line<T: DomTree + ?Sized>(tree: &T, range: &Range) -> bool {
    tree.text_content(range.start.node).is_empty()
}

/// Checks that both boundaries live under `root` and their offsets are in bounds.
pub fn is_well_formed<T: DomTree + ?Sized>(tree: &T, range: &Range, root: NodeId) -> bool {
    [range.start, range.end].iter().all(|boundary| {
        tree.contains(root, boundary.node) && boundary.offset <= tree.node_length(boundary.node)
    })
}

/// Child-index path from `root` down to the boundary's container, ending with
/// the boundary offset. Paths of two boundaries under the same root compare in
/// document order.
pub fn boundary_path<T: DomTree + ?Sized>(
    tree: &T,
    root: NodeId,
    boundary: Boundary,
) -> Option<Vec<usize>> {
    let mut path = vec![boundary.offset];
    let mut node = boundary.node;
    while node != root {
        path.push(tree.index_in_parent(node)?);
        node = tree.parent(node)?;
    }
    path.reverse();
    Some(path)
}

/// `start` does not come after `end` in document order.
pub fn is_forward<T: DomTree + ?Sized>(tree: &T, range: &Range, root: NodeId) -> bool {
    match (
        boundary_path(tree, root, range.start),
        boundary_path(tree, root, range.end),
    ) {
        (Some(start), Some(end)) => start <= end,
        _ => false,
    }
}
