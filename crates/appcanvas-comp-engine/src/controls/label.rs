//! Label control: text, visibility, and placement of a widget's label.

use serde::Serialize;
use serde_json::{json, Value};

use crate::property_view::{EditorWidget, PropertyItem, PropertyViewCtx};

use super::Control;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPosition {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelAlign {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct LabelControl {
    text: String,
    hidden: bool,
    position: LabelPosition,
    align: LabelAlign,
}

/// Render projection of the label, wrapped around the widget body by the
/// rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelView {
    pub text: String,
    pub hidden: bool,
    pub position: LabelPosition,
    pub align: LabelAlign,
}

impl Default for LabelControl {
    fn default() -> Self {
        Self {
            text: String::new(),
            hidden: false,
            position: LabelPosition::Row,
            align: LabelAlign::Left,
        }
    }
}

impl LabelControl {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn view(&self) -> LabelView {
        LabelView {
            text: self.text.clone(),
            hidden: self.hidden,
            position: self.position,
            align: self.align,
        }
    }
}

impl Control for LabelControl {
    fn kind(&self) -> &'static str {
        "label"
    }

    fn persisted(&self) -> Value {
        json!({
            "text": self.text,
            "hidden": self.hidden,
            "position": match self.position {
                LabelPosition::Row => "row",
                LabelPosition::Column => "column",
            },
            "align": match self.align {
                LabelAlign::Left => "left",
                LabelAlign::Right => "right",
            },
        })
    }

    fn restore(&mut self, raw: &Value) {
        if !raw.is_object() {
            if !raw.is_null() {
                tracing::warn!(kind = self.kind(), "malformed persisted label, keeping defaults");
            }
            return;
        }
        if let Some(text) = raw.get("text").and_then(|v| v.as_str()) {
            self.text = text.to_string();
        }
        if let Some(hidden) = raw.get("hidden").and_then(|v| v.as_bool()) {
            self.hidden = hidden;
        }
        if let Some(position) = raw.get("position").and_then(|v| v.as_str()) {
            match position {
                "row" => self.position = LabelPosition::Row,
                "column" => self.position = LabelPosition::Column,
                _ => {}
            }
        }
        if let Some(align) = raw.get("align").and_then(|v| v.as_str()) {
            match align {
                "left" => self.align = LabelAlign::Left,
                "right" => self.align = LabelAlign::Right,
                _ => {}
            }
        }
    }

    fn property_item(&self, _ctx: &PropertyViewCtx, label: &str) -> Option<PropertyItem> {
        Some(PropertyItem::new(
            label,
            EditorWidget::LabelConfig {
                text: self.text.clone(),
                hidden: self.hidden,
                position: match self.position {
                    LabelPosition::Row => "row".into(),
                    LabelPosition::Column => "column".into(),
                },
                align: match self.align {
                    LabelAlign::Left => "left".into(),
                    LabelAlign::Right => "right".into(),
                },
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut control = LabelControl::new("Switch");
        control.restore(&json!({"text": "Toggle", "hidden": true, "position": "column", "align": "right"}));
        let view = control.view();
        assert_eq!(view.text, "Toggle");
        assert!(view.hidden);
        assert_eq!(view.position, LabelPosition::Column);
        assert_eq!(view.align, LabelAlign::Right);
    }

    #[test]
    fn partial_restore_keeps_other_fields() {
        let mut control = LabelControl::new("Switch");
        control.restore(&json!({"hidden": true}));
        assert_eq!(control.text(), "Switch");
        assert!(control.view().hidden);
    }

    #[test]
    fn unknown_position_is_ignored() {
        let mut control = LabelControl::new("Switch");
        control.restore(&json!({"position": "diagonal"}));
        assert_eq!(control.view().position, LabelPosition::Row);
    }
}
