//! Children composition: the named collection of controls forming one
//! widget's configuration surface.
//!
//! Each widget variant declares a closed record type of controls and
//! implements [`ChildrenComposition`] over it. Names are fixed at
//! definition time; only control values mutate afterwards. Duplicate
//! names are a build-time error caught by [`validate_composition`].

use std::collections::HashSet;

use serde_json::Value;

use crate::controls::Control;
use crate::errors::BuildError;

/// Ordered visitation over a widget's named controls.
///
/// Implementations must visit the same names in the same order on every
/// call — the order is the property-panel and persistence order.
pub trait ChildrenComposition: Send {
    fn visit(&self, f: &mut dyn FnMut(&str, &dyn Control));

    fn visit_mut(&mut self, f: &mut dyn FnMut(&str, &mut dyn Control));
}

/// Control names in declaration order.
pub fn control_names(children: &impl ChildrenComposition) -> Vec<String> {
    let mut names = Vec::new();
    children.visit(&mut |name, _| names.push(name.to_string()));
    names
}

/// Reject duplicate control names. Called once at definition build.
pub fn validate_composition(children: &impl ChildrenComposition) -> Result<(), BuildError> {
    let mut seen = HashSet::new();
    let mut duplicate = None;
    children.visit(&mut |name, _| {
        if duplicate.is_none() && !seen.insert(name.to_string()) {
            duplicate = Some(name.to_string());
        }
    });
    match duplicate {
        Some(name) => Err(BuildError::DuplicateControlName { name }),
        None => Ok(()),
    }
}

/// Persist every control under its name. Null persisted values (e.g. view
/// refs) are skipped.
pub fn persist_composition(children: &impl ChildrenComposition) -> Value {
    let mut map = serde_json::Map::new();
    children.visit(&mut |name, control| {
        let value = control.persisted();
        if !value.is_null() {
            map.insert(name.to_string(), value);
        }
    });
    Value::Object(map)
}

/// Restore controls from a persisted object. Controls absent from the
/// payload keep their defaults; non-object payloads restore nothing.
pub fn restore_composition(children: &mut impl ChildrenComposition, raw: &Value) {
    let Some(map) = raw.as_object() else {
        if !raw.is_null() {
            tracing::warn!("malformed persisted widget data, keeping defaults");
        }
        return;
    };
    children.visit_mut(&mut |name, control| {
        if let Some(value) = map.get(name) {
            control.restore(value);
        }
    });
}

/// Re-evaluate derived control state (code expressions) against the
/// exposure-namespace snapshot.
pub fn refresh_composition(children: &mut impl ChildrenComposition, ctx: &Value) {
    children.visit_mut(&mut |_, control| control.refresh(ctx));
}
