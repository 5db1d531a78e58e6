//! Data model for the property panel.
//!
//! The panel is consumed by the editor shell as plain data: the layout
//! function projects the widget's controls into [`Section`]s of
//! [`PropertyItem`]s. Which sections appear depends on the editor mode,
//! passed explicitly through [`PropertyViewCtx`] so visibility rules are
//! unit-testable without a rendering environment.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::i18n::Translator;

/// What the user is currently editing. Layout functions branch on this to
/// show interaction-only sections in logic mode and style/label sections
/// in layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Layout,
    Logic,
    Both,
}

impl EditorMode {
    /// Whether interaction sections (events, disabled, hidden) are shown.
    pub fn shows_logic(self) -> bool {
        matches!(self, Self::Logic | Self::Both)
    }

    /// Whether layout sections (label, styles) are shown.
    pub fn shows_layout(self) -> bool {
        matches!(self, Self::Layout | Self::Both)
    }
}

/// Explicit context threaded into layout functions and property items.
#[derive(Clone)]
pub struct PropertyViewCtx {
    pub mode: EditorMode,
    pub translator: Arc<dyn Translator>,
}

impl PropertyViewCtx {
    pub fn new(mode: EditorMode, translator: Arc<dyn Translator>) -> Self {
        Self { mode, translator }
    }

    /// Shorthand for a parameterless translation lookup.
    pub fn trans(&self, key: &str) -> String {
        self.translator.trans(key, &[])
    }
}

/// A titled group of property rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: String,
    pub items: Vec<PropertyItem>,
    /// Section header renders an info tooltip.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub tooltip: bool,
}

impl Section {
    pub fn new(name: impl Into<String>, items: Vec<PropertyItem>) -> Self {
        Self {
            name: name.into(),
            items,
            tooltip: false,
        }
    }

    pub fn with_tooltip(mut self) -> Self {
        self.tooltip = true;
        self
    }
}

/// One labeled row in the property panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyItem {
    pub label: String,
    pub editor: EditorWidget,
}

impl PropertyItem {
    pub fn new(label: impl Into<String>, editor: EditorWidget) -> Self {
        Self {
            label: label.into(),
            editor,
        }
    }
}

/// The concrete editor a property row renders, with its current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
#[non_exhaustive]
pub enum EditorWidget {
    /// On/off toggle.
    Toggle { checked: bool },
    /// Single-line text input.
    TextInput { value: String },
    /// Code editor bound to a boolean expression.
    Expression { code: String },
    /// Event binding editor: the recognized events and current bindings.
    EventConfig {
        options: Vec<EventOptionView>,
        bindings: Vec<EventBindingView>,
    },
    /// Per-token style inputs with resolved values.
    StyleFields { tokens: BTreeMap<String, String> },
    /// Label configuration (text, visibility, placement).
    LabelConfig {
        text: String,
        hidden: bool,
        position: String,
        align: String,
    },
}

/// A recognized event shown in the binding editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventOptionView {
    pub value: String,
    pub label: String,
    pub description: String,
}

/// An existing binding shown in the binding editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventBindingView {
    pub event: String,
    pub action: serde_json::Value,
}
