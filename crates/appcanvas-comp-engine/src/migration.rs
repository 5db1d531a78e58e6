//! Migration of persisted data saved under older schema versions.
//!
//! A chain of predicate + transform entries runs strictly before a
//! control or widget materializes its state. The first matching entry
//! applies; data matching no entry passes through unchanged. Predicates
//! must never match current-shape data, which makes `migrate` idempotent.
//! Transforms are total: any payload in, some payload out, never an
//! error — bricking previously saved widgets is worse than carrying a
//! malformed field to the control's own permissive restore.

use std::sync::Arc;

use serde_json::Value;

use crate::controls::Control;
use crate::property_view::{PropertyItem, PropertyViewCtx};

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// One upgrade step: an optional match predicate and a total transform.
#[derive(Clone)]
pub struct MigrationEntry {
    predicate: Option<Predicate>,
    transform: Transform,
}

impl MigrationEntry {
    /// Apply `transform` only to payloads matching `predicate`.
    pub fn when(
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
        transform: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            predicate: Some(Arc::new(predicate)),
            transform: Arc::new(transform),
        }
    }

    /// Apply `transform` unconditionally. The transform itself must be
    /// a no-op on current-shape data to preserve idempotence.
    pub fn always(transform: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self {
            predicate: None,
            transform: Arc::new(transform),
        }
    }

    fn matches(&self, raw: &Value) -> bool {
        self.predicate.as_ref().map(|p| p(raw)).unwrap_or(true)
    }
}

/// Ordered migration entries applied to raw persisted data.
#[derive(Clone, Default)]
pub struct MigrationChain {
    entries: Vec<MigrationEntry>,
}

impl MigrationChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, entry: MigrationEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Upgrade raw persisted data to the current shape. The first entry
    /// whose predicate matches is applied; otherwise the data passes
    /// through unchanged.
    pub fn migrate(&self, raw: Value) -> Value {
        for entry in &self.entries {
            if entry.matches(&raw) {
                return (entry.transform)(raw);
            }
        }
        raw
    }
}

/// A control wrapped so restore sees migrated, current-shape data.
#[derive(Clone)]
pub struct Migrated<C> {
    chain: MigrationChain,
    inner: C,
}

impl<C> Migrated<C> {
    pub fn new(chain: MigrationChain, inner: C) -> Self {
        Self { chain, inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: Control> Control for Migrated<C> {
    fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    fn persisted(&self) -> Value {
        self.inner.persisted()
    }

    fn restore(&mut self, raw: &Value) {
        let migrated = self.chain.migrate(raw.clone());
        self.inner.restore(&migrated);
    }

    fn refresh(&mut self, ctx: &Value) {
        self.inner.refresh(ctx);
    }

    fn property_item(&self, ctx: &PropertyViewCtx, label: &str) -> Option<PropertyItem> {
        self.inner.property_item(ctx, label)
    }
}
