use std::collections::BTreeMap;
use std::fmt;

use crate::selection::{Boundary, Range};
use crate::text::{split_utf16, utf16_len};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementTag {
    Div,
    Span,
    Anchor,
    Br,
    Other(String),
}

impl ElementTag {
    pub fn name(&self) -> &str {
        match self {
            ElementTag::Div => "div",
            ElementTag::Span => "span",
            ElementTag::Anchor => "a",
            ElementTag::Br => "br",
            ElementTag::Other(name) => name,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, ElementTag::Br)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    Text(&'a str),
    Element(&'a ElementTag),
    Comment,
    Fragment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    UnknownNode(NodeId),
    NotAContainer(NodeId),
    NotText(NodeId),
    NotAChild { parent: NodeId, child: NodeId },
    OffsetOutOfBounds { node: NodeId, offset: usize, len: usize },
    HierarchyViolation(NodeId),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::UnknownNode(node) => write!(f, "unknown node {node}"),
            DomError::NotAContainer(node) => write!(f, "node {node} cannot hold children"),
            DomError::NotText(node) => write!(f, "node {node} is not a text node"),
            DomError::NotAChild { parent, child } => {
                write!(f, "node {child} is not a child of {parent}")
            }
            DomError::OffsetOutOfBounds { node, offset, len } => {
                write!(f, "offset {offset} is out of bounds for {node} (length {len})")
            }
            DomError::HierarchyViolation(node) => {
                write!(f, "inserting {node} would break the tree hierarchy")
            }
        }
    }
}

impl std::error::Error for DomError {}

/// Node-tree primitives the editing core consumes from its host.
///
/// Implementors provide storage and the structural primitives; range algorithms
/// (`extract_contents`, `insertion_point`) are built on top of them.
pub trait DomTree {
    fn create_text(&mut self, text: &str) -> NodeId;
    fn create_element(&mut self, tag: ElementTag) -> NodeId;
    fn create_fragment(&mut self) -> NodeId;
    fn clone_shallow(&mut self, node: NodeId) -> Result<NodeId, DomError>;

    fn kind(&self, node: NodeId) -> Option<NodeKind<'_>>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> &[NodeId];

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;
    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError>;

    /// Replaces the data of a text node.
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError>;

    /// Inserts `node` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. A fragment is consumed: its children move instead.
    fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError>;

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError>;

    /// Flattened text of the subtree. Comments contribute nothing.
    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        collect_text(self, node, &mut out);
        out
    }

    fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, node, None)
    }

    fn is_text(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Text(_)))
    }

    fn is_element(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Element(_)))
    }

    fn tag(&self, node: NodeId) -> Option<&ElementTag> {
        match self.kind(node)? {
            NodeKind::Element(tag) => Some(tag),
            _ => None,
        }
    }

    /// Inclusive: a node contains itself.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&child| child == node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let ix = self.index_in_parent(node)?;
        self.children(parent).get(ix + 1).copied()
    }

    /// UTF-16 length for character data, child count for everything else.
    fn node_length(&self, node: NodeId) -> usize {
        match self.kind(node) {
            Some(NodeKind::Text(text)) => utf16_len(text),
            Some(_) => self.children(node).len(),
            None => 0,
        }
    }

    fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut current = Some(a);
        while let Some(id) = current {
            if self.contains(id, b) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    /// Splits a text node at `offset`, returning the new node holding the tail.
    /// The tail is inserted right after the original when it has a parent.
    fn split_text(&mut self, node: NodeId, offset: usize) -> Result<NodeId, DomError> {
        let Some(NodeKind::Text(data)) = self.kind(node) else {
            return Err(DomError::NotText(node));
        };
        let len = utf16_len(data);
        if offset > len {
            return Err(DomError::OffsetOutOfBounds { node, offset, len });
        }
        let (head, _, tail) = split_utf16(data, offset, offset);
        let (head, tail) = (head.to_string(), tail.to_string());

        let tail_node = self.create_text(&tail);
        self.set_text(node, &head)?;
        if let Some(parent) = self.parent(node) {
            let reference = self.next_sibling(node);
            self.insert_before(parent, tail_node, reference)?;
        }
        Ok(tail_node)
    }

    /// Moves the content covered by `range` into a new detached fragment.
    ///
    /// Containers only partially covered by the range are shallow-cloned (markers
    /// included) into the fragment and keep their uncovered content in place.
    /// Returns the fragment and the collapsed point the range ends up at.
    fn extract_contents(&mut self, range: &Range) -> Result<(NodeId, Boundary), DomError> {
        let fragment = self.create_fragment();
        if range.is_collapsed() {
            return Ok((fragment, range.start));
        }

        let Range { start, end } = *range;
        if start.node == end.node && self.is_text(start.node) {
            let data = self.text_content(start.node);
            let (before, selected, after) = split_utf16(&data, start.offset, end.offset);
            let clone = self.clone_shallow(start.node)?;
            self.set_text(clone, selected)?;
            self.append_child(fragment, clone)?;
            self.set_text(start.node, &format!("{before}{after}"))?;
            return Ok((fragment, start));
        }

        let common = self
            .common_ancestor(start.node, end.node)
            .ok_or(DomError::HierarchyViolation(end.node))?;

        let first_partial = if self.contains(start.node, end.node) {
            None
        } else {
            Some(child_towards(self, common, start.node)?)
        };
        let last_partial = if self.contains(end.node, start.node) {
            None
        } else {
            Some(child_towards(self, common, end.node)?)
        };

        let children = self.children(common).to_vec();
        let lo = match first_partial {
            Some(child) => position_of(&children, common, child)? + 1,
            None => start.offset,
        };
        let hi = match last_partial {
            Some(child) => position_of(&children, common, child)?,
            None => end.offset,
        };
        let contained: Vec<NodeId> = children
            .get(lo..hi.min(children.len()))
            .map(|slice| slice.to_vec())
            .unwrap_or_default();

        let collapsed_at = if self.contains(start.node, end.node) {
            start
        } else {
            let mut reference = start.node;
            loop {
                let parent = self
                    .parent(reference)
                    .ok_or(DomError::HierarchyViolation(reference))?;
                if self.contains(parent, end.node) {
                    let offset = self
                        .index_in_parent(reference)
                        .ok_or(DomError::HierarchyViolation(reference))?;
                    break Boundary::new(parent, offset + 1);
                }
                reference = parent;
            }
        };

        if let Some(child) = first_partial {
            if self.is_text(child) {
                let data = self.text_content(child);
                let (kept, _, moved) = split_utf16(&data, start.offset, start.offset);
                let clone = self.clone_shallow(child)?;
                self.set_text(clone, moved)?;
                self.set_text(child, kept)?;
                self.append_child(fragment, clone)?;
            } else {
                let clone = self.clone_shallow(child)?;
                self.append_child(fragment, clone)?;
                let sub = Range::new(start, Boundary::new(child, self.node_length(child)));
                let (sub_fragment, _) = self.extract_contents(&sub)?;
                self.append_child(clone, sub_fragment)?;
            }
        }

        for child in contained {
            self.append_child(fragment, child)?;
        }

        if let Some(child) = last_partial {
            if self.is_text(child) {
                let data = self.text_content(child);
                let (moved, _, kept) = split_utf16(&data, end.offset, end.offset);
                let clone = self.clone_shallow(child)?;
                self.set_text(clone, moved)?;
                self.set_text(child, kept)?;
                self.append_child(fragment, clone)?;
            } else {
                let clone = self.clone_shallow(child)?;
                self.append_child(fragment, clone)?;
                let sub = Range::new(Boundary::new(child, 0), end);
                let (sub_fragment, _) = self.extract_contents(&sub)?;
                self.append_child(clone, sub_fragment)?;
            }
        }

        Ok((fragment, collapsed_at))
    }

    /// Resolves a collapsed point to `(parent, reference)` for `insert_before`.
    ///
    /// A point inside a text node splits it; points at either edge of a text node
    /// resolve to its siblings without producing empty text nodes.
    fn insertion_point(&mut self, at: Boundary) -> Result<(NodeId, Option<NodeId>), DomError> {
        match self.kind(at.node) {
            Some(NodeKind::Text(_)) => {
                let parent = self
                    .parent(at.node)
                    .ok_or(DomError::HierarchyViolation(at.node))?;
                let len = self.node_length(at.node);
                if at.offset == 0 {
                    Ok((parent, Some(at.node)))
                } else if at.offset >= len {
                    Ok((parent, self.next_sibling(at.node)))
                } else {
                    let tail = self.split_text(at.node, at.offset)?;
                    Ok((parent, Some(tail)))
                }
            }
            Some(_) => Ok((at.node, self.children(at.node).get(at.offset).copied())),
            None => Err(DomError::UnknownNode(at.node)),
        }
    }
}

fn collect_text<T: DomTree + ?Sized>(tree: &T, node: NodeId, out: &mut String) {
    match tree.kind(node) {
        Some(NodeKind::Text(text)) => out.push_str(text),
        Some(NodeKind::Element(_)) | Some(NodeKind::Fragment) => {
            for &child in tree.children(node) {
                collect_text(tree, child, out);
            }
        }
        Some(NodeKind::Comment) | None => {}
    }
}

/// The child of `ancestor` on the path down to `node`.
fn child_towards<T: DomTree + ?Sized>(
    tree: &T,
    ancestor: NodeId,
    node: NodeId,
) -> Result<NodeId, DomError> {
    let mut current = node;
    loop {
        match tree.parent(current) {
            Some(parent) if parent == ancestor => return Ok(current),
            Some(parent) => current = parent,
            None => return Err(DomError::HierarchyViolation(node)),
        }
    }
}

fn position_of(children: &[NodeId], parent: NodeId, child: NodeId) -> Result<usize, DomError> {
    children
        .iter()
        .position(|&c| c == child)
        .ok_or(DomError::NotAChild { parent, child })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeData {
    Text(String),
    Element {
        tag: ElementTag,
        attrs: BTreeMap<String, String>,
    },
    Comment(String),
    Fragment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeEntry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed node tree. Detached nodes stay allocated until the tree is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dom {
    nodes: Vec<NodeEntry>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, DomError> {
        let node = self.create_text(text);
        self.append_child(parent, node)?;
        Ok(node)
    }

    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: ElementTag,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        let node = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attribute(node, name, value)?;
        }
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Serializes a node as HTML-like markup with attributes in sorted order.
    pub fn markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    pub fn inner_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_markup(child, &mut out);
        }
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        let Some(entry) = self.entry(node) else {
            return;
        };
        match &entry.data {
            NodeData::Text(text) => out.push_str(&escape(text)),
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Fragment => {
                for &child in &entry.children {
                    self.write_markup(child, out);
                }
            }
            NodeData::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag.name());
                for (name, value) in attrs {
                    out.push_str(&format!(" {name}=\"{}\"", escape(value)));
                }
                out.push('>');
                if tag.is_void() {
                    return;
                }
                for &child in &entry.children {
                    self.write_markup(child, out);
                }
                out.push_str("</");
                out.push_str(tag.name());
                out.push('>');
            }
        }
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn entry(&self, node: NodeId) -> Option<&NodeEntry> {
        self.nodes.get(node.0)
    }

    fn entry_mut(&mut self, node: NodeId) -> Result<&mut NodeEntry, DomError> {
        self.nodes.get_mut(node.0).ok_or(DomError::UnknownNode(node))
    }

    fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        if let Some(parent) = self.parent(node) {
            self.remove_child(parent, node)?;
        }
        Ok(())
    }
}

impl DomTree for Dom {
    fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    fn create_element(&mut self, tag: ElementTag) -> NodeId {
        self.push(NodeData::Element {
            tag,
            attrs: BTreeMap::new(),
        })
    }

    fn create_fragment(&mut self) -> NodeId {
        self.push(NodeData::Fragment)
    }

    fn clone_shallow(&mut self, node: NodeId) -> Result<NodeId, DomError> {
        let data = self
            .entry(node)
            .map(|entry| entry.data.clone())
            .ok_or(DomError::UnknownNode(node))?;
        Ok(self.push(data))
    }

    fn kind(&self, node: NodeId) -> Option<NodeKind<'_>> {
        Some(match &self.entry(node)?.data {
            NodeData::Text(text) => NodeKind::Text(text),
            NodeData::Element { tag, .. } => NodeKind::Element(tag),
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::Fragment => NodeKind::Fragment,
        })
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.entry(node)?.parent
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.entry(node)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[])
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.entry(node)?.data {
            NodeData::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            _ => None,
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        match &mut self.entry_mut(node)?.data {
            NodeData::Element { attrs, .. } => {
                attrs.insert(name.to_string(), value.to_string());
                Ok(())
            }
            _ => Err(DomError::NotAContainer(node)),
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        match &mut self.entry_mut(node)?.data {
            NodeData::Element { attrs, .. } => {
                attrs.remove(name);
                Ok(())
            }
            _ => Err(DomError::NotAContainer(node)),
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        match &mut self.entry_mut(node)?.data {
            NodeData::Text(data) => {
                *data = text.to_string();
                Ok(())
            }
            _ => Err(DomError::NotText(node)),
        }
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        match self.entry(parent).map(|entry| &entry.data) {
            None => return Err(DomError::UnknownNode(parent)),
            Some(NodeData::Element { tag, .. }) if !tag.is_void() => {}
            Some(NodeData::Fragment) => {}
            Some(_) => return Err(DomError::NotAContainer(parent)),
        }
        if self.entry(node).is_none() {
            return Err(DomError::UnknownNode(node));
        }
        if self.contains(node, parent) {
            return Err(DomError::HierarchyViolation(node));
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }
        let reference = match reference {
            Some(reference) if reference == node => self.next_sibling(node),
            other => other,
        };

        let moved = if matches!(self.kind(node), Some(NodeKind::Fragment)) {
            let children = std::mem::take(&mut self.entry_mut(node)?.children);
            for &child in &children {
                self.entry_mut(child)?.parent = None;
            }
            children
        } else {
            self.detach(node)?;
            vec![node]
        };

        let mut ix = match reference {
            Some(reference) => self
                .children(parent)
                .iter()
                .position(|&child| child == reference)
                .ok_or(DomError::NotAChild {
                    parent,
                    child: reference,
                })?,
            None => self.children(parent).len(),
        };
        for child in moved {
            self.entry_mut(child)?.parent = Some(parent);
            self.entry_mut(parent)?.children.insert(ix, child);
            ix += 1;
        }
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let entry = self.entry_mut(parent)?;
        let ix = entry
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(DomError::NotAChild { parent, child })?;
        entry.children.remove(ix);
        self.entry_mut(child)?.parent = None;
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
