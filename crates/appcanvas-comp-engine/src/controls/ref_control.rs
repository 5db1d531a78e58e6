//! Ref control: an opaque handle to the rendered instance.
//!
//! Imperative operations (focus, blur, click) forward to the attached
//! view handle and are silent no-ops while nothing is mounted — scripts
//! may run before the widget appears on screen.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::property_view::{PropertyItem, PropertyViewCtx};

use super::Control;

/// Options for an imperative focus call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusOptions {
    #[serde(default)]
    pub prevent_scroll: bool,
}

/// The rendered instance's imperative surface, provided by the rendering
/// collaborator when the widget mounts.
pub trait ViewHandle: Send + Sync {
    fn focus(&self, options: FocusOptions);
    fn blur(&self);
    fn click(&self);
}

#[derive(Default)]
pub struct RefControl {
    handle: Option<Box<dyn ViewHandle>>,
}

impl Clone for RefControl {
    // A cloned instance starts detached; handles belong to exactly one
    // mounted view.
    fn clone(&self) -> Self {
        Self { handle: None }
    }
}

impl RefControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, handle: Box<dyn ViewHandle>) {
        self.handle = Some(handle);
    }

    pub fn detach(&mut self) {
        self.handle = None;
    }

    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }

    /// Focus the mounted view. Returns `false` (without error) when
    /// detached.
    pub fn focus(&self, options: FocusOptions) -> bool {
        match &self.handle {
            Some(h) => {
                h.focus(options);
                true
            }
            None => {
                tracing::debug!("focus on detached ref, ignoring");
                false
            }
        }
    }

    pub fn blur(&self) -> bool {
        match &self.handle {
            Some(h) => {
                h.blur();
                true
            }
            None => false,
        }
    }

    pub fn click(&self) -> bool {
        match &self.handle {
            Some(h) => {
                h.click();
                true
            }
            None => false,
        }
    }
}

impl Control for RefControl {
    fn kind(&self) -> &'static str {
        "ref"
    }

    // Handles are runtime-only; nothing persists.
    fn persisted(&self) -> Value {
        Value::Null
    }

    fn restore(&mut self, _raw: &Value) {}

    fn property_item(&self, _ctx: &PropertyViewCtx, _label: &str) -> Option<PropertyItem> {
        None
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts imperative calls for assertions.
    #[derive(Default)]
    pub struct CountingHandle {
        pub focus_calls: Arc<AtomicUsize>,
        pub blur_calls: Arc<AtomicUsize>,
        pub click_calls: Arc<AtomicUsize>,
    }

    impl ViewHandle for CountingHandle {
        fn focus(&self, _options: FocusOptions) {
            self.focus_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn blur(&self) {
            self.blur_calls.fetch_add(1, Ordering::SeqCst);
        }

        fn click(&self) {
            self.click_calls.fetch_add(1, Ordering::SeqCst);
        }
    }
}
