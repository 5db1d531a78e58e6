//! Event handler control: ordered bindings over a fixed event set.
//!
//! A widget declares the events it can emit (`change`, `true`, `false`
//! for a switch); users bind actions to them. Firing an event runs every
//! binding for that name in registration order; firing an unregistered
//! name is a no-op, not an error.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::property_view::{
    EditorWidget, EventBindingView, EventOptionView, PropertyItem, PropertyViewCtx,
};

use super::Control;

/// A recognized event: the wire name plus i18n keys for the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDef {
    pub value: &'static str,
    pub label_key: &'static str,
    pub description_key: &'static str,
}

/// One configured binding: the event name, the persisted action
/// descriptor, and the runnable action.
#[derive(Clone)]
pub struct EventBinding {
    pub event: String,
    pub descriptor: Value,
    action: Arc<dyn Fn() + Send + Sync>,
}

pub struct EventHandlerControl {
    options: Vec<EventDef>,
    bindings: Vec<EventBinding>,
}

impl Clone for EventHandlerControl {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            bindings: self.bindings.clone(),
        }
    }
}

impl EventHandlerControl {
    pub fn new(options: &[EventDef]) -> Self {
        Self {
            options: options.to_vec(),
            bindings: Vec::new(),
        }
    }

    pub fn options(&self) -> &[EventDef] {
        &self.options
    }

    pub fn bindings(&self) -> &[EventBinding] {
        &self.bindings
    }

    /// Bind an action to a recognized event. Unrecognized event names are
    /// rejected with a validation message.
    pub fn bind(
        &mut self,
        event: &str,
        descriptor: Value,
        action: impl Fn() + Send + Sync + 'static,
    ) -> Result<(), Vec<String>> {
        if !self.options.iter().any(|o| o.value == event) {
            return Err(vec![format!("unrecognized event: {event}")]);
        }
        self.bindings.push(EventBinding {
            event: event.to_string(),
            descriptor,
            action: Arc::new(action),
        });
        Ok(())
    }

    /// Fire an event: run all bindings for `event` in registration order.
    /// Returns the number of bindings executed (0 for unregistered names).
    pub fn fire(&self, event: &str) -> usize {
        let mut fired = 0;
        for binding in &self.bindings {
            if binding.event == event {
                (binding.action)();
                fired += 1;
            }
        }
        fired
    }
}

impl Control for EventHandlerControl {
    fn kind(&self) -> &'static str {
        "event_handler"
    }

    fn persisted(&self) -> Value {
        Value::Array(
            self.bindings
                .iter()
                .map(|b| json!({"event": b.event, "action": b.descriptor}))
                .collect(),
        )
    }

    fn restore(&mut self, raw: &Value) {
        self.bindings.clear();
        let Some(entries) = raw.as_array() else {
            if !raw.is_null() {
                tracing::warn!(kind = self.kind(), "malformed persisted bindings, dropping");
            }
            return;
        };
        for entry in entries {
            let Some(event) = entry.get("event").and_then(|v| v.as_str()) else {
                continue;
            };
            if !self.options.iter().any(|o| o.value == event) {
                continue;
            }
            let descriptor = entry.get("action").cloned().unwrap_or(Value::Null);
            // Script re-linking belongs to the editor runtime; restored
            // bindings start inert.
            self.bindings.push(EventBinding {
                event: event.to_string(),
                descriptor,
                action: Arc::new(|| {}),
            });
        }
    }

    fn property_item(&self, ctx: &PropertyViewCtx, label: &str) -> Option<PropertyItem> {
        let options = self
            .options
            .iter()
            .map(|o| EventOptionView {
                value: o.value.to_string(),
                label: ctx.trans(o.label_key),
                description: ctx.trans(o.description_key),
            })
            .collect();
        let bindings = self
            .bindings
            .iter()
            .map(|b| EventBindingView {
                event: b.event.clone(),
                action: b.descriptor.clone(),
            })
            .collect();
        Some(PropertyItem::new(
            label,
            EditorWidget::EventConfig { options, bindings },
        ))
    }
}
