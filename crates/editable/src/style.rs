use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::{DomTree, ElementTag, NodeId};

pub const FONT_WEIGHT_ATTRIBUTE: &str = "data-font-weight";
pub const FONT_STYLE_ATTRIBUTE: &str = "data-font-style";
pub const UNDERLINED_ATTRIBUTE: &str = "data-text-underlined";
pub const LINETHROUGH_ATTRIBUTE: &str = "data-text-linethrough";
pub const INLINE_CODE_ATTRIBUTE: &str = "data-inline-code";
pub const HREF_ATTRIBUTE: &str = "href";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleName {
    Bold,
    Italic,
    Underlined,
    Linethrough,
    Code,
}

impl StyleName {
    /// Every toggleable style, in the order markers are written.
    pub const ALL: [StyleName; 5] = [
        StyleName::Bold,
        StyleName::Italic,
        StyleName::Underlined,
        StyleName::Linethrough,
        StyleName::Code,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleName::Bold => "bold",
            StyleName::Italic => "italic",
            StyleName::Underlined => "underlined",
            StyleName::Linethrough => "linethrough",
            StyleName::Code => "code",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.as_str() == name)
    }

    pub fn marker_attribute(self) -> &'static str {
        match self {
            StyleName::Bold => FONT_WEIGHT_ATTRIBUTE,
            StyleName::Italic => FONT_STYLE_ATTRIBUTE,
            StyleName::Underlined => UNDERLINED_ATTRIBUTE,
            StyleName::Linethrough => LINETHROUGH_ATTRIBUTE,
            StyleName::Code => INLINE_CODE_ATTRIBUTE,
        }
    }

    pub fn marker_value(self) -> &'static str {
        match self {
            StyleName::Bold => "bold",
            StyleName::Italic => "italic",
            StyleName::Underlined | StyleName::Linethrough | StyleName::Code => "true",
        }
    }
}

impl fmt::Display for StyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StyleFlags {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underlined: bool,
    #[serde(default)]
    pub linethrough: bool,
    #[serde(default)]
    pub code: bool,
}

impl StyleFlags {
    pub fn only(name: StyleName) -> Self {
        Self::default().flip(name)
    }

    pub fn get(&self, name: StyleName) -> bool {
        match name {
            StyleName::Bold => self.bold,
            StyleName::Italic => self.italic,
            StyleName::Underlined => self.underlined,
            StyleName::Linethrough => self.linethrough,
            StyleName::Code => self.code,
        }
    }

    pub fn set(&mut self, name: StyleName, value: bool) {
        let flag = match name {
            StyleName::Bold => &mut self.bold,
            StyleName::Italic => &mut self.italic,
            StyleName::Underlined => &mut self.underlined,
            StyleName::Linethrough => &mut self.linethrough,
            StyleName::Code => &mut self.code,
        };
        *flag = value;
    }

    /// Copy with exactly one flag inverted.
    pub fn flip(mut self, name: StyleName) -> Self {
        let value = !self.get(name);
        self.set(name, value);
        self
    }

    pub fn has_any_active(&self) -> bool {
        StyleName::ALL.into_iter().any(|name| self.get(name))
    }

    pub fn active(self) -> impl Iterator<Item = StyleName> {
        StyleName::ALL.into_iter().filter(move |&name| self.get(name))
    }

    /// Reads the style markers carried by `node`. Non-elements carry none.
    pub fn from_markers<T: DomTree + ?Sized>(tree: &T, node: NodeId) -> Self {
        let mut style = Self::default();
        for name in StyleName::ALL {
            let present = tree
                .attribute(node, name.marker_attribute())
                .is_some_and(|value| !value.is_empty());
            style.set(name, present);
        }
        style
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunKind {
    #[default]
    PlainText,
    Link {
        href: String,
    },
}

impl RunKind {
    pub fn link(href: impl Into<String>) -> Self {
        RunKind::Link { href: href.into() }
    }

    pub fn is_plain_text(&self) -> bool {
        matches!(self, RunKind::PlainText)
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            RunKind::PlainText => None,
            RunKind::Link { href } => Some(href),
        }
    }

    /// The run kind an element represents: link containers carry their target.
    pub fn of_node<T: DomTree + ?Sized>(tree: &T, node: NodeId) -> Self {
        match tree.tag(node) {
            Some(ElementTag::Anchor) => {
                RunKind::link(tree.attribute(node, HREF_ATTRIBUTE).unwrap_or_default())
            }
            _ => RunKind::PlainText,
        }
    }
}
