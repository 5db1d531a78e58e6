//! Component builder: assembles a widget definition from a children
//! composition, a render projection, a property-pane layout function,
//! exposed methods, and a migration chain.
//!
//! Definitions are built once per widget type; all configuration defects
//! (duplicate control or method names) surface here, never at instance
//! render time.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::children::{validate_composition, ChildrenComposition};
use crate::controls::{FocusOptions, RefControl};
use crate::errors::BuildError;
use crate::migration::MigrationChain;
use crate::property_view::{PropertyViewCtx, Section};

/// Static widget-type metadata shown in the editor's widget palette.
#[derive(Debug, Clone, Serialize)]
pub struct CompMeta {
    pub comp_type: String,
    pub label: String,
    pub category: String,
}

/// Collects partial-state updates emitted during a render pass (style
/// re-derivation on theme change and the like). The owning instance
/// drains and applies them atomically after the pass.
#[derive(Default)]
pub struct DispatchHandle {
    pending: Mutex<Vec<BTreeMap<String, Value>>>,
}

impl DispatchHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a partial update keyed by control name.
    pub fn update(&self, partial: BTreeMap<String, Value>) {
        self.pending.lock().push(partial);
    }

    pub(crate) fn drain(&self) -> Vec<BTreeMap<String, Value>> {
        std::mem::take(&mut self.pending.lock())
    }
}

pub type RenderFn<C, V> = Arc<dyn Fn(&C, &DispatchHandle) -> V + Send + Sync>;
pub type LayoutFn<C> = Arc<dyn Fn(&C, &PropertyViewCtx) -> Vec<Section> + Send + Sync>;

/// An exposed imperative method: external name plus the operation over
/// the children.
pub struct MethodConfig<C> {
    name: String,
    invoke: Arc<dyn Fn(&mut C, Value) -> Option<Value> + Send + Sync>,
}

impl<C> Clone for MethodConfig<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            invoke: self.invoke.clone(),
        }
    }
}

impl<C> MethodConfig<C> {
    pub fn new(
        name: impl Into<String>,
        invoke: impl Fn(&mut C, Value) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            invoke: Arc::new(invoke),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn invoke(&self, children: &mut C, args: Value) -> Option<Value> {
        (self.invoke)(children, args)
    }
}

/// Access to the children's view-ref slot, required by [`ref_methods`].
pub trait HasViewRef {
    fn view_ref(&self) -> &RefControl;
}

/// The fixed imperative operations a view ref can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefMethod {
    Focus,
    Blur,
    Click,
}

/// Standard method configs forwarding to the attached view handle.
/// Every method resolves to `None` while the view is unmounted — scripts
/// calling into a widget that is not on screen must not fail.
pub fn ref_methods<C: HasViewRef>(methods: &[RefMethod]) -> Vec<MethodConfig<C>> {
    methods
        .iter()
        .map(|method| match method {
            RefMethod::Focus => MethodConfig::new("focus", |children: &mut C, args: Value| {
                let options = parse_focus_options(&args);
                children.view_ref().focus(options).then(|| Value::Null)
            }),
            RefMethod::Blur => MethodConfig::new("blur", |children: &mut C, _args| {
                children.view_ref().blur().then(|| Value::Null)
            }),
            RefMethod::Click => MethodConfig::new("click", |children: &mut C, _args| {
                children.view_ref().click().then(|| Value::Null)
            }),
        })
        .collect()
}

/// Script callers pass either an options object or a one-element argument
/// list. Anything else falls back to defaults.
fn parse_focus_options(args: &Value) -> FocusOptions {
    let candidate = match args {
        Value::Array(items) => items.first().cloned().unwrap_or(Value::Null),
        other => other.clone(),
    };
    serde_json::from_value(candidate).unwrap_or_default()
}

/// Fluent builder for a widget definition.
pub struct CompBuilder<C, V> {
    meta: CompMeta,
    children: C,
    render: RenderFn<C, V>,
    layout: Option<LayoutFn<C>>,
    methods: Vec<MethodConfig<C>>,
    migrations: MigrationChain,
}

impl<C: ChildrenComposition, V> CompBuilder<C, V> {
    pub fn new(
        comp_type: impl Into<String>,
        children: C,
        render: impl Fn(&C, &DispatchHandle) -> V + Send + Sync + 'static,
    ) -> Self {
        let comp_type = comp_type.into();
        Self {
            meta: CompMeta {
                label: comp_type.clone(),
                category: "common".into(),
                comp_type,
            },
            children,
            render: Arc::new(render),
            layout: None,
            methods: Vec::new(),
            migrations: MigrationChain::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.meta.label = label.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.meta.category = category.into();
        self
    }

    pub fn set_property_view_fn(
        mut self,
        layout: impl Fn(&C, &PropertyViewCtx) -> Vec<Section> + Send + Sync + 'static,
    ) -> Self {
        self.layout = Some(Arc::new(layout));
        self
    }

    pub fn set_expose_method_configs(mut self, methods: Vec<MethodConfig<C>>) -> Self {
        self.methods = methods;
        self
    }

    /// Migration chain applied to whole-widget persisted payloads before
    /// restore distributes them to controls.
    pub fn set_migrations(mut self, migrations: MigrationChain) -> Self {
        self.migrations = migrations;
        self
    }

    pub fn build(self) -> Result<CompDefinition<C, V>, BuildError> {
        validate_composition(&self.children)?;

        let mut seen = std::collections::HashSet::new();
        for method in &self.methods {
            if !seen.insert(method.name().to_string()) {
                return Err(BuildError::DuplicateMethodName {
                    name: method.name().to_string(),
                });
            }
        }

        Ok(CompDefinition {
            meta: self.meta,
            children: self.children,
            render: self.render,
            layout: self.layout,
            methods: self.methods,
            migrations: self.migrations,
        })
    }
}

/// A built widget definition: the reusable template one widget type is
/// instantiated from.
pub struct CompDefinition<C, V> {
    pub(crate) meta: CompMeta,
    pub(crate) children: C,
    pub(crate) render: RenderFn<C, V>,
    pub(crate) layout: Option<LayoutFn<C>>,
    pub(crate) methods: Vec<MethodConfig<C>>,
    pub(crate) migrations: MigrationChain,
}

impl<C, V> std::fmt::Debug for CompDefinition<C, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompDefinition")
            .field("meta", &self.meta)
            .field("methods", &self.methods.len())
            .finish_non_exhaustive()
    }
}

impl<C, V> CompDefinition<C, V> {
    pub fn meta(&self) -> &CompMeta {
        &self.meta
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{BoolStateControl, Control};
    use serde_json::json;

    struct OneChild {
        flag: BoolStateControl,
    }

    impl ChildrenComposition for OneChild {
        fn visit(&self, f: &mut dyn FnMut(&str, &dyn Control)) {
            f("flag", &self.flag);
        }

        fn visit_mut(&mut self, f: &mut dyn FnMut(&str, &mut dyn Control)) {
            f("flag", &mut self.flag);
        }
    }

    fn make_builder() -> CompBuilder<OneChild, bool> {
        CompBuilder::new(
            "probe",
            OneChild {
                flag: BoolStateControl::new(false),
            },
            |c, _dispatch| c.flag.value(),
        )
    }

    #[test]
    fn build_succeeds_with_unique_names() {
        let def = make_builder().label("Probe").category("test").build().unwrap();
        assert_eq!(def.meta().comp_type, "probe");
        assert_eq!(def.meta().label, "Probe");
    }

    #[test]
    fn duplicate_method_names_fail_at_build() {
        let err = make_builder()
            .set_expose_method_configs(vec![
                MethodConfig::new("poke", |_, _| Some(Value::Null)),
                MethodConfig::new("poke", |_, _| Some(Value::Null)),
            ])
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateMethodName { name } if name == "poke"));
    }

    #[test]
    fn dispatch_handle_collects_updates() {
        let handle = DispatchHandle::new();
        handle.update(BTreeMap::from([("flag".to_string(), json!(true))]));
        handle.update(BTreeMap::from([("flag".to_string(), json!(false))]));

        let drained = handle.drain();
        assert_eq!(drained.len(), 2);
        assert!(handle.drain().is_empty());
    }

    #[test]
    fn focus_options_parse_from_array_or_object() {
        let opts = parse_focus_options(&json!([{"preventScroll": true}]));
        assert!(opts.prevent_scroll);
        let opts = parse_focus_options(&json!({"preventScroll": true}));
        assert!(opts.prevent_scroll);
        let opts = parse_focus_options(&json!(null));
        assert!(!opts.prevent_scroll);
    }
}
