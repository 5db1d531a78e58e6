//! Widget registry — the single source of truth for available widget
//! types.
//!
//! Populated once during process initialization and frozen by `build()`;
//! there is no runtime mutation after registration (teardown is process
//! exit). Duplicate widget types are a build-time error.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;

use crate::builder::CompMeta;
use crate::children::ChildrenComposition;
use crate::errors::BuildError;
use crate::exposing::ExposedCompDef;
use crate::instance::{AnyCompInstance, WidgetInstance};

/// A registered widget type: palette metadata plus an instance factory.
pub trait CompFactory: Send + Sync {
    fn meta(&self) -> &CompMeta;

    fn exposed_names(&self) -> BTreeSet<String>;

    fn create(&self) -> Box<dyn AnyCompInstance>;
}

impl<C, V> CompFactory for Arc<ExposedCompDef<C, V>>
where
    C: ChildrenComposition + Clone + Sync + 'static,
    V: Serialize + 'static,
{
    fn meta(&self) -> &CompMeta {
        ExposedCompDef::meta(self)
    }

    fn exposed_names(&self) -> BTreeSet<String> {
        ExposedCompDef::exposed_names(self)
    }

    fn create(&self) -> Box<dyn AnyCompInstance> {
        Box::new(WidgetInstance::new(self.clone()))
    }
}

/// Accumulates factories, rejecting duplicate widget types.
#[derive(Default)]
pub struct WidgetRegistryBuilder {
    factories: BTreeMap<String, Box<dyn CompFactory>>,
}

impl std::fmt::Debug for WidgetRegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetRegistryBuilder")
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl WidgetRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, factory: impl CompFactory + 'static) -> Result<Self, BuildError> {
        let comp_type = factory.meta().comp_type.clone();
        if self.factories.contains_key(&comp_type) {
            return Err(BuildError::DuplicateCompType { comp_type });
        }
        self.factories.insert(comp_type, Box::new(factory));
        Ok(self)
    }

    pub fn build(self) -> WidgetRegistry {
        WidgetRegistry {
            factories: Arc::new(self.factories),
        }
    }
}

/// Frozen registry handle. Cheaply cloneable; clones share state.
#[derive(Clone)]
pub struct WidgetRegistry {
    factories: Arc<BTreeMap<String, Box<dyn CompFactory>>>,
}

impl WidgetRegistry {
    pub fn builder() -> WidgetRegistryBuilder {
        WidgetRegistryBuilder::new()
    }

    pub fn get(&self, comp_type: &str) -> Option<&dyn CompFactory> {
        self.factories.get(comp_type).map(Box::as_ref)
    }

    /// Instantiate a widget of the given type.
    pub fn create_instance(&self, comp_type: &str) -> Option<Box<dyn AnyCompInstance>> {
        Some(self.factories.get(comp_type)?.create())
    }

    /// Palette metadata for every registered type, in type order.
    pub fn metas(&self) -> Vec<&CompMeta> {
        self.factories.values().map(|f| f.meta()).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CompBuilder;
    use crate::controls::{BoolStateControl, Control};
    use crate::exposing::{with_exposing, ExposedValueConfig};
    use serde_json::{json, Value};

    #[derive(Clone)]
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

    fn make_def(comp_type: &str) -> Arc<ExposedCompDef<OneChild, Value>> {
        let def = CompBuilder::new(
            comp_type,
            OneChild {
                flag: BoolStateControl::new(false),
            },
            |c, _| json!(c.flag.value()),
        )
        .build()
        .unwrap();
        Arc::new(
            with_exposing(
                def,
                vec![ExposedValueConfig::new("flag", "", |c: &OneChild| {
                    json!(c.flag.value())
                })],
            )
            .unwrap(),
        )
    }

    #[test]
    fn register_and_instantiate() {
        let registry = WidgetRegistry::builder()
            .register(make_def("switch"))
            .unwrap()
            .register(make_def("probe"))
            .unwrap()
            .build();

        assert_eq!(registry.len(), 2);
        let mut instance = registry.create_instance("switch").unwrap();
        assert_eq!(instance.comp_type(), "switch");
        assert_eq!(instance.render_value(), json!(false));
        assert!(registry.create_instance("ghost").is_none());
    }

    #[test]
    fn duplicate_comp_type_fails_at_build() {
        let err = WidgetRegistry::builder()
            .register(make_def("switch"))
            .unwrap()
            .register(make_def("switch"))
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateCompType { comp_type } if comp_type == "switch"));
    }

    #[test]
    fn metas_in_type_order() {
        let registry = WidgetRegistry::builder()
            .register(make_def("zeta"))
            .unwrap()
            .register(make_def("alpha"))
            .unwrap()
            .build();
        let types: Vec<&str> = registry.metas().iter().map(|m| m.comp_type.as_str()).collect();
        assert_eq!(types, vec!["alpha", "zeta"]);
    }
}
