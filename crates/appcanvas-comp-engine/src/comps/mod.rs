//! Built-in widget definitions.

pub mod switch;

pub use switch::{switch_definition, toggle, SwitchChildren, SwitchView};
