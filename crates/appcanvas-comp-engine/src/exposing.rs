//! Exposure adapter: projects widget state into the shared namespace.
//!
//! Each exposed value is a named derivation over the children. A widget's
//! own set is merged with the common set (`disabled`, `hidden`); a name
//! collision anywhere in the union is a build-time error, which keeps the
//! namespace-uniqueness invariant enforceable before any instance exists.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::Value;

use crate::builder::{CompDefinition, CompMeta};
use crate::controls::BoolCodeControl;
use crate::errors::BuildError;

/// `(name, description, derivation)` — one value visible in the
/// expression namespace.
pub struct ExposedValueConfig<C> {
    name: String,
    description: String,
    derive: Arc<dyn Fn(&C) -> Value + Send + Sync>,
}

impl<C> Clone for ExposedValueConfig<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            derive: self.derive.clone(),
        }
    }
}

impl<C> ExposedValueConfig<C> {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        derive: impl Fn(&C) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            derive: Arc::new(derive),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn derive(&self, children: &C) -> Value {
        (self.derive)(children)
    }
}

/// Access to the common flag controls every exposable widget carries.
pub trait CommonChildren {
    fn disabled(&self) -> &BoolCodeControl;
    fn hidden(&self) -> &BoolCodeControl;
}

/// The exposed set shared by every widget type.
pub fn common_exposed_configs<C: CommonChildren>() -> Vec<ExposedValueConfig<C>> {
    vec![
        ExposedValueConfig::new("disabled", "comp.disabledDesc", |c: &C| {
            Value::Bool(c.disabled().value())
        }),
        ExposedValueConfig::new("hidden", "comp.hiddenDesc", |c: &C| {
            Value::Bool(c.hidden().value())
        }),
    ]
}

/// A widget definition with its exposed-value set attached.
pub struct ExposedCompDef<C, V> {
    pub(crate) def: CompDefinition<C, V>,
    pub(crate) exposed: Vec<ExposedValueConfig<C>>,
}

impl<C, V> std::fmt::Debug for ExposedCompDef<C, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExposedCompDef")
            .field("def", &self.def)
            .field("exposed", &self.exposed.len())
            .finish()
    }
}

/// Attach exposed-value configs to a built definition.
///
/// `configs` is the full union (widget-specific plus common); duplicate
/// names fail here, at build time.
pub fn with_exposing<C, V>(
    def: CompDefinition<C, V>,
    configs: Vec<ExposedValueConfig<C>>,
) -> Result<ExposedCompDef<C, V>, BuildError> {
    let mut seen = BTreeSet::new();
    for config in &configs {
        if !seen.insert(config.name().to_string()) {
            return Err(BuildError::DuplicateExposedName {
                name: config.name().to_string(),
            });
        }
    }
    Ok(ExposedCompDef {
        def,
        exposed: configs,
    })
}

impl<C, V> ExposedCompDef<C, V> {
    pub fn meta(&self) -> &CompMeta {
        self.def.meta()
    }

    pub fn exposed_names(&self) -> BTreeSet<String> {
        self.exposed.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn exposed_configs(&self) -> &[ExposedValueConfig<C>] {
        &self.exposed
    }

    /// Compute the flat name → value snapshot for one set of children.
    pub(crate) fn derive_exposed(&self, children: &C) -> BTreeMap<String, Value> {
        self.exposed
            .iter()
            .map(|config| (config.name().to_string(), config.derive(children)))
            .collect()
    }
}
