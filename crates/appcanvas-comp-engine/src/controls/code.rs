//! Boolean code control: a user-authored expression plus its last result.
//!
//! Evaluation failures never propagate — the control degrades to `false`
//! (the safe value for disabled/hidden flags) and the editor shows the
//! expression for correction.

use serde_json::Value;

use crate::property_view::{EditorWidget, PropertyItem, PropertyViewCtx};

use super::expr;
use super::Control;

#[derive(Debug, Clone, Default)]
pub struct BoolCodeControl {
    code: String,
    last: bool,
}

impl BoolCodeControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build with an initial expression. The result stays `false` until
    /// the first `refresh`.
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            last: false,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    /// Last evaluated result. `false` until evaluated, and after any
    /// evaluation failure.
    pub fn value(&self) -> bool {
        self.last
    }
}

impl Control for BoolCodeControl {
    fn kind(&self) -> &'static str {
        "bool_code"
    }

    fn persisted(&self) -> Value {
        Value::String(self.code.clone())
    }

    fn restore(&mut self, raw: &Value) {
        match raw.as_str() {
            Some(s) => self.code = s.to_string(),
            None => {
                if !raw.is_null() {
                    tracing::warn!(kind = self.kind(), "malformed persisted value, clearing code");
                }
                self.code.clear();
            }
        }
        self.last = false;
    }

    fn refresh(&mut self, ctx: &Value) {
        if self.code.trim().is_empty() {
            self.last = false;
            return;
        }
        self.last = match expr::evaluate(&self.code, ctx) {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!(code = %self.code, error = %e, "expression failed, defaulting to false");
                false
            }
        };
    }

    fn property_item(&self, _ctx: &PropertyViewCtx, label: &str) -> Option<PropertyItem> {
        Some(PropertyItem::new(
            label,
            EditorWidget::Expression {
                code: self.code.clone(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn evaluates_against_namespace_snapshot() {
        let mut c = BoolCodeControl::with_code("form1.disabled == true");
        c.refresh(&json!({"form1": {"disabled": true}}));
        assert!(c.value());

        c.refresh(&json!({"form1": {"disabled": false}}));
        assert!(!c.value());
    }

    #[test]
    fn failure_defaults_to_false() {
        let mut c = BoolCodeControl::with_code("'unterminated");
        c.refresh(&json!({}));
        assert!(!c.value());
    }

    #[test]
    fn empty_code_is_false() {
        let mut c = BoolCodeControl::new();
        c.refresh(&json!({}));
        assert!(!c.value());
    }

    #[test]
    fn restore_resets_last_result() {
        let mut c = BoolCodeControl::with_code("true");
        c.refresh(&json!({}));
        assert!(c.value());

        c.restore(&json!("false"));
        assert!(!c.value());
        assert_eq!(c.code(), "false");
    }
}
