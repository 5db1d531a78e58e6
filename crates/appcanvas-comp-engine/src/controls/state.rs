//! Value-state controls: semantically typed values with a change signal.
//!
//! `on_change` both updates the value and bumps a revision counter — the
//! owning instance uses the counter as the signal to resynchronize the
//! externally observed copy in the exposure namespace.

use serde_json::Value;

use crate::property_view::{EditorWidget, PropertyItem, PropertyViewCtx};

use super::Control;

/// Boolean value state (e.g. a switch's checked state).
#[derive(Debug, Clone)]
pub struct BoolStateControl {
    value: bool,
    default_value: bool,
    revision: u64,
}

impl BoolStateControl {
    pub fn new(default_value: bool) -> Self {
        Self {
            value: default_value,
            default_value,
            revision: 0,
        }
    }

    pub fn value(&self) -> bool {
        self.value
    }

    /// Update the value. Returns `true` if the value actually changed.
    pub fn on_change(&mut self, value: bool) -> bool {
        let changed = self.value != value;
        self.value = value;
        self.revision += 1;
        changed
    }

    /// Monotonic change counter, bumped on every `on_change`.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Control for BoolStateControl {
    fn kind(&self) -> &'static str {
        "bool_state"
    }

    fn persisted(&self) -> Value {
        Value::Bool(self.value)
    }

    fn restore(&mut self, raw: &Value) {
        match raw.as_bool() {
            Some(b) => self.value = b,
            None => {
                if !raw.is_null() {
                    tracing::warn!(kind = self.kind(), "malformed persisted value, keeping default");
                }
                self.value = self.default_value;
            }
        }
    }

    fn property_item(&self, _ctx: &PropertyViewCtx, label: &str) -> Option<PropertyItem> {
        Some(PropertyItem::new(
            label,
            EditorWidget::Toggle {
                checked: self.value,
            },
        ))
    }
}

/// String value state (label text, form data keys).
#[derive(Debug, Clone)]
pub struct TextStateControl {
    value: String,
    default_value: String,
    revision: u64,
}

impl TextStateControl {
    pub fn new(default_value: impl Into<String>) -> Self {
        let default_value = default_value.into();
        Self {
            value: default_value.clone(),
            default_value,
            revision: 0,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn on_change(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        let changed = self.value != value;
        self.value = value;
        self.revision += 1;
        changed
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Control for TextStateControl {
    fn kind(&self) -> &'static str {
        "text_state"
    }

    fn persisted(&self) -> Value {
        Value::String(self.value.clone())
    }

    fn restore(&mut self, raw: &Value) {
        match raw.as_str() {
            Some(s) => self.value = s.to_string(),
            None => {
                if !raw.is_null() {
                    tracing::warn!(kind = self.kind(), "malformed persisted value, keeping default");
                }
                self.value = self.default_value.clone();
            }
        }
    }

    fn property_item(&self, _ctx: &PropertyViewCtx, label: &str) -> Option<PropertyItem> {
        Some(PropertyItem::new(
            label,
            EditorWidget::TextInput {
                value: self.value.clone(),
            },
        ))
    }
}
