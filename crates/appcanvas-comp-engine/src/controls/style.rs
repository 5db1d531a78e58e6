//! Style control: a named token-to-value map over a recognized token set.
//!
//! The recognized set is fixed per widget slot at definition time and can
//! be filtered down at configuration time. Restore tolerates payloads
//! with fewer or unrecognized keys — schema renames are handled by the
//! migration chain in front of the control, not here.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::property_view::{EditorWidget, PropertyItem, PropertyViewCtx};

use super::Control;

/// A recognized style token and its theme default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTokenDef {
    pub name: &'static str,
    pub default: &'static str,
}

/// Token sets for the built-in widgets.
pub mod token_sets {
    use super::StyleTokenDef;

    /// The switch body: track colors per state plus the handle.
    pub const SWITCH_STYLE: &[StyleTokenDef] = &[
        StyleTokenDef { name: "label", default: "#222222" },
        StyleTokenDef { name: "handle", default: "#ffffff" },
        StyleTokenDef { name: "unchecked", default: "#d7d9e0" },
        StyleTokenDef { name: "checked", default: "#1e88e5" },
    ];

    /// Generic input-field frame.
    pub const INPUT_FIELD_STYLE: &[StyleTokenDef] = &[
        StyleTokenDef { name: "background", default: "#ffffff" },
        StyleTokenDef { name: "border", default: "#d7d9e0" },
        StyleTokenDef { name: "radius", default: "4px" },
    ];

    /// Label typography and validation accents.
    pub const LABEL_STYLE: &[StyleTokenDef] = &[
        StyleTokenDef { name: "label", default: "#222222" },
        StyleTokenDef { name: "accent", default: "#1e88e5" },
        StyleTokenDef { name: "validate", default: "#f73131" },
    ];

    pub const ANIMATION_STYLE: &[StyleTokenDef] = &[
        StyleTokenDef { name: "animation", default: "none" },
        StyleTokenDef { name: "animationDelay", default: "0s" },
        StyleTokenDef { name: "animationDuration", default: "0s" },
        StyleTokenDef { name: "animationIterationCount", default: "1" },
    ];
}

#[derive(Debug, Clone)]
pub struct StyleControl {
    tokens: Vec<StyleTokenDef>,
    values: BTreeMap<String, String>,
}

impl StyleControl {
    pub fn new(tokens: &[StyleTokenDef]) -> Self {
        Self {
            tokens: tokens.to_vec(),
            values: BTreeMap::new(),
        }
    }

    /// Restrict the recognized token set. Values for dropped tokens are
    /// discarded.
    pub fn filter(mut self, keep: impl Fn(&StyleTokenDef) -> bool) -> Self {
        self.tokens.retain(|t| keep(t));
        let names: Vec<&str> = self.tokens.iter().map(|t| t.name).collect();
        self.values.retain(|k, _| names.contains(&k.as_str()));
        self
    }

    pub fn token_defs(&self) -> &[StyleTokenDef] {
        &self.tokens
    }

    /// Current value of a token: the override if set, the default
    /// otherwise, `None` for unrecognized names.
    pub fn token(&self, name: &str) -> Option<&str> {
        let def = self.tokens.iter().find(|t| t.name == name)?;
        Some(self.values.get(name).map(String::as_str).unwrap_or(def.default))
    }

    /// Override a token value. Returns `false` for unrecognized names.
    pub fn set_token(&mut self, name: &str, value: impl Into<String>) -> bool {
        if !self.tokens.iter().any(|t| t.name == name) {
            return false;
        }
        self.values.insert(name.to_string(), value.into());
        true
    }

    /// Fully resolved token map (overrides over defaults), for the render
    /// projection.
    pub fn resolved(&self) -> BTreeMap<String, String> {
        self.tokens
            .iter()
            .map(|t| {
                let value = self
                    .values
                    .get(t.name)
                    .cloned()
                    .unwrap_or_else(|| t.default.to_string());
                (t.name.to_string(), value)
            })
            .collect()
    }
}

impl Control for StyleControl {
    fn kind(&self) -> &'static str {
        "style"
    }

    fn persisted(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }

    fn restore(&mut self, raw: &Value) {
        self.values.clear();
        let Some(map) = raw.as_object() else {
            if !raw.is_null() {
                tracing::warn!(kind = self.kind(), "malformed persisted style, using defaults");
            }
            return;
        };
        for (key, value) in map {
            let Some(value) = value.as_str() else { continue };
            // Unrecognized keys (older or renamed schemas) are dropped.
            if self.tokens.iter().any(|t| t.name == key) {
                self.values.insert(key.clone(), value.to_string());
            }
        }
    }

    fn property_item(&self, _ctx: &PropertyViewCtx, label: &str) -> Option<PropertyItem> {
        Some(PropertyItem::new(
            label,
            EditorWidget::StyleFields {
                tokens: self.resolved(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::token_sets::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_until_overridden() {
        let mut style = StyleControl::new(SWITCH_STYLE);
        assert_eq!(style.token("handle"), Some("#ffffff"));

        assert!(style.set_token("handle", "#abcabc"));
        assert_eq!(style.token("handle"), Some("#abcabc"));
    }

    #[test]
    fn unrecognized_token_rejected() {
        let mut style = StyleControl::new(SWITCH_STYLE);
        assert!(!style.set_token("glow", "#fff"));
        assert_eq!(style.token("glow"), None);
    }

    #[test]
    fn filter_drops_tokens_and_values() {
        let mut style = StyleControl::new(LABEL_STYLE);
        style.set_token("accent", "#123456");
        let filtered = style.filter(|t| !["accent", "validate"].contains(&t.name));

        assert_eq!(filtered.token("accent"), None);
        assert_eq!(filtered.token("label"), Some("#222222"));
        assert_eq!(filtered.resolved().len(), 1);
    }

    #[test]
    fn restore_tolerates_fewer_and_unknown_keys() {
        let mut style = StyleControl::new(SWITCH_STYLE);
        style.restore(&json!({"checked": "#000000", "legacyKey": "#ffffff"}));

        assert_eq!(style.token("checked"), Some("#000000"));
        // Unknown key dropped, missing keys fall back to defaults.
        assert_eq!(style.token("unchecked"), Some("#d7d9e0"));
        assert_eq!(style.persisted(), json!({"checked": "#000000"}));
    }
}
