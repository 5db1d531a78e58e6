//! The shared exposure namespace.
//!
//! Every widget instance publishes its exposed values under its instance
//! name; expressions and script actions read the whole namespace as one
//! JSON snapshot. Writers are restricted to the names their definition
//! declared, so no two instances can race on the same entry, and a
//! publish replaces the instance's map in one step — readers never
//! observe a partially updated set.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

/// Thread-safe namespace handle. Cheaply cloneable; clones share state.
#[derive(Clone, Default)]
pub struct ExposureNamespace {
    inner: Arc<RwLock<BTreeMap<String, BTreeMap<String, Value>>>>,
}

impl ExposureNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer for one instance, restricted to `allowed` names.
    pub fn writer(&self, owner: impl Into<String>, allowed: BTreeSet<String>) -> NamespaceWriter {
        NamespaceWriter {
            namespace: self.clone(),
            owner: owner.into(),
            allowed,
        }
    }

    /// Read one exposed value.
    pub fn read(&self, owner: &str, name: &str) -> Option<Value> {
        self.inner.read().get(owner)?.get(name).cloned()
    }

    /// The full namespace as a JSON object of objects — the evaluation
    /// context for code expressions.
    pub fn snapshot(&self) -> Value {
        let inner = self.inner.read();
        Value::Object(
            inner
                .iter()
                .map(|(owner, values)| {
                    let obj: serde_json::Map<String, Value> =
                        values.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                    (owner.clone(), Value::Object(obj))
                })
                .collect(),
        )
    }

    /// Drop an instance's entries (widget removed from the tree).
    /// Returns `true` if the instance was present.
    pub fn remove(&self, owner: &str) -> bool {
        self.inner.write().remove(owner).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// Write handle scoped to one instance's declared names.
pub struct NamespaceWriter {
    namespace: ExposureNamespace,
    owner: String,
    allowed: BTreeSet<String>,
}

impl NamespaceWriter {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Replace the instance's exposed values in one atomic step.
    /// Undeclared names are rejected and nothing is written.
    pub fn publish(&self, values: BTreeMap<String, Value>) -> Result<(), Vec<String>> {
        let undeclared: Vec<String> = values
            .keys()
            .filter(|k| !self.allowed.contains(*k))
            .map(|k| format!("undeclared exposed name: {k}"))
            .collect();
        if !undeclared.is_empty() {
            return Err(undeclared);
        }
        self.namespace.inner.write().insert(self.owner.clone(), values);
        Ok(())
    }

    /// Remove this instance's entries.
    pub fn retract(&self) {
        self.namespace.remove(&self.owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn allowed(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn publish_and_read() {
        let ns = ExposureNamespace::new();
        let writer = ns.writer("switch1", allowed(&["value", "disabled"]));

        writer
            .publish(BTreeMap::from([
                ("value".to_string(), json!(true)),
                ("disabled".to_string(), json!(false)),
            ]))
            .unwrap();

        assert_eq!(ns.read("switch1", "value"), Some(json!(true)));
        assert_eq!(ns.read("switch1", "missing"), None);
        assert_eq!(ns.read("ghost", "value"), None);
    }

    #[test]
    fn undeclared_name_rejected_and_nothing_written() {
        let ns = ExposureNamespace::new();
        let writer = ns.writer("switch1", allowed(&["value"]));

        let errs = writer
            .publish(BTreeMap::from([
                ("value".to_string(), json!(true)),
                ("rogue".to_string(), json!(1)),
            ]))
            .unwrap_err();
        assert!(errs[0].contains("rogue"));
        assert!(ns.is_empty());
    }

    #[test]
    fn publish_replaces_whole_set() {
        let ns = ExposureNamespace::new();
        let writer = ns.writer("switch1", allowed(&["value", "disabled"]));

        writer
            .publish(BTreeMap::from([
                ("value".to_string(), json!(false)),
                ("disabled".to_string(), json!(true)),
            ]))
            .unwrap();
        writer
            .publish(BTreeMap::from([("value".to_string(), json!(true))]))
            .unwrap();

        // The second publish replaced the map; no stale sibling remains.
        assert_eq!(ns.read("switch1", "disabled"), None);
        assert_eq!(ns.read("switch1", "value"), Some(json!(true)));
    }

    #[test]
    fn snapshot_shape() {
        let ns = ExposureNamespace::new();
        ns.writer("a", allowed(&["x"]))
            .publish(BTreeMap::from([("x".to_string(), json!(1))]))
            .unwrap();
        ns.writer("b", allowed(&["y"]))
            .publish(BTreeMap::from([("y".to_string(), json!("z"))]))
            .unwrap();

        assert_eq!(ns.snapshot(), json!({"a": {"x": 1}, "b": {"y": "z"}}));
    }

    #[test]
    fn retract_removes_owner() {
        let ns = ExposureNamespace::new();
        let writer = ns.writer("a", allowed(&["x"]));
        writer
            .publish(BTreeMap::from([("x".to_string(), json!(1))]))
            .unwrap();
        writer.retract();
        assert!(ns.is_empty());
    }
}
