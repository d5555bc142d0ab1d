mod config;
mod dom;
mod editable;
mod materialize;
mod selection;
mod style;
mod text;
mod token;
mod toggle;

pub use crate::config::*;
pub use crate::dom::*;
pub use crate::editable::*;
pub use crate::materialize::*;
pub use crate::selection::*;
pub use crate::style::*;
pub use crate::text::*;
pub use crate::token::*;
pub use crate::toggle::*;
