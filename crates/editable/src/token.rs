use serde::{Deserialize, Serialize};

use crate::dom::{DomError, DomTree, ElementTag, NodeId, NodeKind};
use crate::style::{RunKind, StyleFlags, StyleName};

/// One contiguous run of text with a single kind and style.
///
/// `style: None` means the run was never styled; it behaves like all-false but
/// lets the materializer emit a bare text node. Equality compares the effective
/// style, so an absent style equals an all-false one.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Token {
    pub content: String,
    #[serde(default)]
    pub kind: RunKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleFlags>,
}

impl Token {
    pub fn new(content: impl Into<String>, kind: RunKind, style: Option<StyleFlags>) -> Self {
        Self {
            content: content.into(),
            kind,
            style,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(content, RunKind::PlainText, None)
    }

    pub fn styled(content: impl Into<String>, style: StyleFlags) -> Self {
        Self::new(content, RunKind::PlainText, Some(style))
    }

    pub fn link(content: impl Into<String>, href: impl Into<String>) -> Self {
        Self::new(content, RunKind::link(href), None)
    }

    pub fn effective_style(&self) -> StyleFlags {
        self.style.unwrap_or_default()
    }

    /// Two plain-text runs with the same effective style read as one run.
    pub fn continues(&self, next: &Token) -> bool {
        self.kind.is_plain_text()
            && next.kind.is_plain_text()
            && self.effective_style() == next.effective_style()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
            && self.kind == other.kind
            && self.effective_style() == other.effective_style()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizeContext {
    /// Flag XOR-ed into every run's current style.
    pub forced_style: Option<StyleName>,
    /// Style given to leaves that carry no markers of their own.
    pub inherited_style: Option<StyleFlags>,
    /// Replaces the run kind of every emitted token.
    pub forced_kind: Option<RunKind>,
}

impl TokenizeContext {
    pub fn forced(name: StyleName) -> Self {
        Self {
            forced_style: Some(name),
            ..Self::default()
        }
    }

    pub fn with_kind(kind: RunKind) -> Self {
        Self {
            forced_kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn inherit(mut self, style: StyleFlags) -> Self {
        self.inherited_style = Some(style);
        self
    }

    fn leaf_style(&self) -> Option<StyleFlags> {
        match self.forced_style {
            Some(name) => Some(self.inherited_style.unwrap_or_default().flip(name)),
            None => self.inherited_style,
        }
    }

    fn container_style(&self, markers: StyleFlags) -> StyleFlags {
        match self.forced_style {
            Some(name) => markers.flip(name),
            None => markers,
        }
    }
}

/// Converts the children of `parent` into an ordered run sequence.
///
/// Children without text are removed from `parent` as they are encountered.
/// Adjacent plain-text runs with equal style are merged.
pub fn tokenize<T: DomTree + ?Sized>(
    tree: &mut T,
    parent: NodeId,
    context: &TokenizeContext,
) -> Result<Vec<Token>, DomError> {
    let children = tree.children(parent).to_vec();
    let mut tokens: Vec<Token> = Vec::with_capacity(children.len());

    for child in children {
        let Some(token) = token_from_node(tree, child, context) else {
            tree.remove_child(parent, child)?;
            continue;
        };

        match tokens.last_mut() {
            Some(last) if last.continues(&token) => last.content.push_str(&token.content),
            _ => tokens.push(token),
        }
    }

    Ok(tokens)
}

pub fn token_from_node<T: DomTree + ?Sized>(
    tree: &T,
    node: NodeId,
    context: &TokenizeContext,
) -> Option<Token> {
    let content = tree.text_content(node);
    if content.is_empty() {
        return None;
    }

    let (kind, style) = match tree.kind(node)? {
        NodeKind::Comment | NodeKind::Fragment => return None,
        NodeKind::Text(_) => (RunKind::PlainText, context.leaf_style()),
        NodeKind::Element(ElementTag::Span) => {
            let markers = StyleFlags::from_markers(tree, node);
            (RunKind::PlainText, Some(context.container_style(markers)))
        }
        NodeKind::Element(ElementTag::Anchor) => {
            let markers = StyleFlags::from_markers(tree, node);
            let style = (context.forced_style.is_some() || markers.has_any_active())
                .then(|| context.container_style(markers));
            (RunKind::of_node(tree, node), style)
        }
        NodeKind::Element(_) => (RunKind::PlainText, context.leaf_style()),
    };

    let kind = context.forced_kind.clone().unwrap_or(kind);
    Some(Token::new(content, kind, style))
}
