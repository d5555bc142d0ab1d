use crate::config::{EditableConfig, KeyChord};
use crate::dom::{Dom, DomError, DomTree, ElementTag, NodeId};
use crate::selection::{Range, Selection};
use crate::style::{RunKind, StyleFlags, StyleName};
use crate::toggle;

/// An editable surface: a root element, the tree below it and the selection.
#[derive(Debug, Clone)]
pub struct RichEditable {
    dom: Dom,
    root: NodeId,
    selection: Selection,
    config: EditableConfig,
}

impl RichEditable {
    pub fn new(config: EditableConfig) -> Self {
        let mut dom = Dom::new();
        let root = dom.create_element(ElementTag::Div);
        Self::attach(dom, root, config)
    }

    /// Wraps an existing element of `dom` as the editable root.
    pub fn with_root(dom: Dom, root: NodeId, config: EditableConfig) -> Result<Self, DomError> {
        if !dom.is_element(root) {
            return Err(DomError::NotAContainer(root));
        }
        Ok(Self::attach(dom, root, config))
    }

    fn attach(mut dom: Dom, root: NodeId, config: EditableConfig) -> Self {
        let config = config.with_defaults();
        dom.set_attribute(root, "contenteditable", "true").ok();
        if let Some(placeholder) = &config.placeholder {
            dom.set_attribute(root, "placeholder", placeholder).ok();
        }
        Self {
            dom,
            root,
            selection: Selection::new(),
            config,
        }
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &EditableConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn select(&mut self, range: Range) {
        self.selection.remove_all_ranges();
        self.selection.add_range(range);
    }

    pub fn toggle_inline_style(&mut self, name: StyleName) {
        toggle::toggle_style(&mut self.dom, &mut self.selection, self.root, name);
    }

    pub fn set_link(&mut self, href: Option<&str>) {
        toggle::set_link(&mut self.dom, &mut self.selection, self.root, href);
    }

    /// Flags of the innermost styled container holding the selection start.
    pub fn active_style(&self) -> StyleFlags {
        self.active_container(|tag| matches!(tag, ElementTag::Span | ElementTag::Anchor))
            .map(|node| StyleFlags::from_markers(&self.dom, node))
            .unwrap_or_default()
    }

    pub fn active_run_kind(&self) -> RunKind {
        self.active_container(|tag| matches!(tag, ElementTag::Anchor))
            .map(|node| RunKind::of_node(&self.dom, node))
            .unwrap_or_default()
    }

    fn active_container(&self, accept: impl Fn(&ElementTag) -> bool) -> Option<NodeId> {
        let start = self.selection.range()?.start;
        let first_selected = if self.dom.is_text(start.node) {
            None
        } else {
            self.dom.children(start.node).get(start.offset).copied()
        };
        let mut current = Some(first_selected.unwrap_or(start.node));
        while let Some(node) = current {
            if node == self.root {
                return None;
            }
            if self.dom.tag(node).is_some_and(&accept) {
                return Some(node);
            }
            current = self.dom.parent(node);
        }
        None
    }

    pub fn style_for_chord(&self, chord: &KeyChord) -> Option<StyleName> {
        self.config.style_for(chord)
    }

    /// Toggles the style bound to `chord`. Returns whether a binding matched.
    pub fn handle_chord(&mut self, chord: &KeyChord) -> bool {
        let Some(style) = self.style_for_chord(chord) else {
            return false;
        };
        self.toggle_inline_style(style);
        true
    }

    pub fn markup(&self) -> String {
        self.dom.inner_markup(self.root)
    }

    pub fn text(&self) -> String {
        self.dom.text_content(self.root)
    }
}

impl Default for RichEditable {
    fn default() -> Self {
        Self::new(EditableConfig::default())
    }
}
