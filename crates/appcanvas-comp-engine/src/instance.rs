//! Widget instances: per-placement state over a shared definition.
//!
//! Every mutation path (update, dispatch, method invocation, restore)
//! ends by recomputing the full exposed snapshot and publishing it in one
//! step, so readers of the namespace never observe a partially updated
//! set. The erased [`AnyCompInstance`] surface is what the registry and
//! the editor shell hold.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::builder::DispatchHandle;
use crate::children::{
    control_names, persist_composition, refresh_composition, restore_composition,
    ChildrenComposition,
};
use crate::exposing::ExposedCompDef;
use crate::namespace::{ExposureNamespace, NamespaceWriter};
use crate::property_view::{PropertyViewCtx, Section};

/// Current schema version for persisted widget payloads.
pub const COMP_SCHEMA_VERSION: u16 = 1;

/// Version tag key on persisted payloads. The `$` prefix keeps it out of
/// the control-name space.
pub const SCHEMA_VERSION_KEY: &str = "$schemaVersion";

/// One placed widget: its own children values plus the shared definition.
pub struct WidgetInstance<C, V> {
    def: Arc<ExposedCompDef<C, V>>,
    children: C,
    writer: Option<NamespaceWriter>,
    exposed: BTreeMap<String, Value>,
}

impl<C: ChildrenComposition + Clone, V> WidgetInstance<C, V> {
    pub fn new(def: Arc<ExposedCompDef<C, V>>) -> Self {
        let children = def.def.children.clone();
        let exposed = def.derive_exposed(&children);
        Self {
            def,
            children,
            writer: None,
            exposed,
        }
    }

    pub fn comp_type(&self) -> &str {
        &self.def.meta().comp_type
    }

    pub fn children(&self) -> &C {
        &self.children
    }

    /// Current exposed snapshot (recomputed after every mutation).
    pub fn exposed_values(&self) -> &BTreeMap<String, Value> {
        &self.exposed
    }

    /// Mutate the children, then resynchronize the exposed snapshot in
    /// one step.
    pub fn update(&mut self, f: impl FnOnce(&mut C)) {
        f(&mut self.children);
        self.sync_exposed();
    }

    /// Re-evaluate code controls against the namespace snapshot.
    pub fn refresh(&mut self, ctx: &Value) {
        refresh_composition(&mut self.children, ctx);
        self.sync_exposed();
    }

    /// Pure render projection against an external dispatch handle.
    pub fn render_with(&self, dispatch: &DispatchHandle) -> V {
        (self.def.def.render)(&self.children, dispatch)
    }

    /// Render, then apply any updates the pass dispatched. Updates that
    /// fail structural validation are dropped with a warning; a render
    /// pass must not be able to corrupt state.
    pub fn render(&mut self) -> V {
        let dispatch = DispatchHandle::new();
        let view = (self.def.def.render)(&self.children, &dispatch);
        for partial in dispatch.drain() {
            if let Err(errors) = self.dispatch(partial) {
                tracing::warn!(comp_type = self.comp_type(), ?errors, "dropping invalid dispatch");
            }
        }
        view
    }

    /// Apply a partial-state update keyed by control name. The whole
    /// update is rejected if any key is not in the children key set.
    pub fn dispatch(&mut self, partial: BTreeMap<String, Value>) -> Result<(), Vec<String>> {
        let names: BTreeSet<String> = control_names(&self.children).into_iter().collect();
        let unknown: Vec<String> = partial
            .keys()
            .filter(|k| !names.contains(*k))
            .map(|k| format!("unknown control: {k}"))
            .collect();
        if !unknown.is_empty() {
            return Err(unknown);
        }
        self.children.visit_mut(&mut |name, control| {
            if let Some(value) = partial.get(name) {
                control.restore(value);
            }
        });
        self.sync_exposed();
        Ok(())
    }

    /// Invoke an exposed method. Unknown names and unmounted targets
    /// resolve to `None`, never an error.
    pub fn invoke_method(&mut self, name: &str, args: Value) -> Option<Value> {
        let method = self.def.def.methods.iter().find(|m| m.name() == name)?.clone();
        let result = method.invoke(&mut self.children, args);
        self.sync_exposed();
        result
    }

    pub fn persisted(&self) -> Value {
        let mut persisted = persist_composition(&self.children);
        if let Some(map) = persisted.as_object_mut() {
            map.insert(SCHEMA_VERSION_KEY.into(), Value::from(COMP_SCHEMA_VERSION));
        }
        persisted
    }

    /// Restore from persisted data, running the definition's migration
    /// chain first.
    pub fn restore(&mut self, raw: Value) {
        let migrated = self.def.def.migrations.migrate(raw);
        restore_composition(&mut self.children, &migrated);
        self.sync_exposed();
    }

    /// Property pane for the current editor mode. Falls back to one
    /// section of every control's own row when the definition has no
    /// layout function.
    pub fn property_pane(&self, ctx: &PropertyViewCtx) -> Vec<Section> {
        match &self.def.def.layout {
            Some(layout) => layout(&self.children, ctx),
            None => {
                let mut items = Vec::new();
                self.children.visit(&mut |name, control| {
                    if let Some(item) = control.property_item(ctx, name) {
                        items.push(item);
                    }
                });
                vec![Section::new("properties", items)]
            }
        }
    }

    /// Start publishing into the namespace under `instance_name`.
    pub fn attach_namespace(
        &mut self,
        namespace: &ExposureNamespace,
        instance_name: &str,
    ) -> Result<(), Vec<String>> {
        let writer = namespace.writer(instance_name, self.def.exposed_names());
        writer.publish(self.exposed.clone())?;
        self.writer = Some(writer);
        Ok(())
    }

    /// Stop publishing and drop this instance's namespace entries.
    pub fn detach_namespace(&mut self) {
        if let Some(writer) = self.writer.take() {
            writer.retract();
        }
    }

    fn sync_exposed(&mut self) {
        self.exposed = self.def.derive_exposed(&self.children);
        if let Some(writer) = &self.writer {
            if let Err(errors) = writer.publish(self.exposed.clone()) {
                // Unreachable by construction: the writer was created from
                // the definition's own exposed names.
                tracing::warn!(comp_type = self.comp_type(), ?errors, "exposure publish failed");
            }
        }
    }
}

/// Type-erased instance surface held by the registry and editor shell.
pub trait AnyCompInstance: Send {
    fn comp_type(&self) -> &str;

    fn persisted(&self) -> Value;

    fn restore(&mut self, raw: Value);

    fn exposed_values(&self) -> BTreeMap<String, Value>;

    fn property_pane(&self, ctx: &PropertyViewCtx) -> Vec<Section>;

    fn invoke_method(&mut self, name: &str, args: Value) -> Option<Value>;

    fn dispatch(&mut self, partial: BTreeMap<String, Value>) -> Result<(), Vec<String>>;

    fn refresh(&mut self, ctx: &Value);

    /// Render projection serialized for the rendering collaborator.
    fn render_value(&mut self) -> Value;

    fn attach_namespace(
        &mut self,
        namespace: &ExposureNamespace,
        instance_name: &str,
    ) -> Result<(), Vec<String>>;

    fn detach_namespace(&mut self);
}

impl<C, V> AnyCompInstance for WidgetInstance<C, V>
where
    C: ChildrenComposition + Clone + Sync + 'static,
    V: Serialize + 'static,
{
    fn comp_type(&self) -> &str {
        WidgetInstance::comp_type(self)
    }

    fn persisted(&self) -> Value {
        WidgetInstance::persisted(self)
    }

    fn restore(&mut self, raw: Value) {
        WidgetInstance::restore(self, raw);
    }

    fn exposed_values(&self) -> BTreeMap<String, Value> {
        WidgetInstance::exposed_values(self).clone()
    }

    fn property_pane(&self, ctx: &PropertyViewCtx) -> Vec<Section> {
        WidgetInstance::property_pane(self, ctx)
    }

    fn invoke_method(&mut self, name: &str, args: Value) -> Option<Value> {
        WidgetInstance::invoke_method(self, name, args)
    }

    fn dispatch(&mut self, partial: BTreeMap<String, Value>) -> Result<(), Vec<String>> {
        WidgetInstance::dispatch(self, partial)
    }

    fn refresh(&mut self, ctx: &Value) {
        WidgetInstance::refresh(self, ctx);
    }

    fn render_value(&mut self) -> Value {
        let view = WidgetInstance::render(self);
        serde_json::to_value(view).unwrap_or(Value::Null)
    }

    fn attach_namespace(
        &mut self,
        namespace: &ExposureNamespace,
        instance_name: &str,
    ) -> Result<(), Vec<String>> {
        WidgetInstance::attach_namespace(self, namespace, instance_name)
    }

    fn detach_namespace(&mut self) {
        WidgetInstance::detach_namespace(self);
    }
}
