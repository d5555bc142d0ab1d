use std::fmt;

use serde::{Deserialize, Serialize};

use crate::style::StyleName;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Keys compare case-insensitively; modifiers must match exactly.
    pub fn matches(&self, other: &KeyChord) -> bool {
        self.key.eq_ignore_ascii_case(&other.key)
            && self.ctrl == other.ctrl
            && self.shift == other.shift
            && self.alt == other.alt
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    #[serde(flatten)]
    pub chord: KeyChord,
    pub style: StyleName,
}

impl KeyBinding {
    pub fn new(chord: KeyChord, style: StyleName) -> Self {
        Self { chord, style }
    }
}

pub fn default_keymap() -> Vec<KeyBinding> {
    vec![
        KeyBinding::new(KeyChord::new("b").ctrl(), StyleName::Bold),
        KeyBinding::new(KeyChord::new("i").ctrl(), StyleName::Italic),
        KeyBinding::new(KeyChord::new("u").ctrl(), StyleName::Underlined),
        KeyBinding::new(KeyChord::new("x").ctrl().shift(), StyleName::Linethrough),
        KeyBinding::new(KeyChord::new("e").ctrl(), StyleName::Code),
    ]
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    ConflictingBinding {
        chord: KeyChord,
        first: StyleName,
        second: StyleName,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(err) => write!(f, "invalid editable config: {err}"),
            ConfigError::ConflictingBinding {
                chord,
                first,
                second,
            } => write!(
                f,
                "key {:?} is bound to both {first} and {second}",
                chord.key
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(err) => Some(err),
            ConfigError::ConflictingBinding { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        ConfigError::Parse(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditableConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub keymap: Vec<KeyBinding>,
}

impl EditableConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.keymap.is_empty() {
            self.keymap = default_keymap();
        }
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        let config = config.with_defaults();
        config.validate()?;
        tracing::debug!(bindings = config.keymap.len(), "loaded editable config");
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (ix, binding) in self.keymap.iter().enumerate() {
            let conflict = self.keymap[..ix].iter().find(|earlier| {
                earlier.chord.matches(&binding.chord) && earlier.style != binding.style
            });
            if let Some(earlier) = conflict {
                return Err(ConfigError::ConflictingBinding {
                    chord: binding.chord.clone(),
                    first: earlier.style,
                    second: binding.style,
                });
            }
        }
        Ok(())
    }

    pub fn style_for(&self, chord: &KeyChord) -> Option<StyleName> {
        self.keymap
            .iter()
            .find(|binding| binding.chord.matches(chord))
            .map(|binding| binding.style)
    }
}
