//! Catalog projection: one invocable action per specification operation.
//!
//! The projection is pure and deterministic — same document, same
//! catalog. Actions are labeled from the operation's summary
//! (capitalized), falling back to its operation id; categories come from
//! the specification's tag grouping and partition the actions without
//! overlap (only the first tag of an operation counts).

use std::sync::Arc;

use serde::Serialize;

use super::spec::{OpenApiDoc, Operation, ParamLocation};

/// Label override hook, mirroring the plugin SDK's `actionLabel` option.
#[derive(Clone, Default)]
pub struct ParseOptions {
    pub action_label: Option<Arc<dyn Fn(&str, &str, &Operation) -> String + Send + Sync>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionCategory {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionParam {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogAction {
    pub id: String,
    pub label: String,
    pub category: String,
    pub method: String,
    pub path: String,
    pub params: Vec<ActionParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionCatalog {
    pub categories: Vec<ActionCategory>,
    pub actions: Vec<CatalogAction>,
}

/// Stable action id: the operation id when present, otherwise derived
/// from method and path.
pub(crate) fn action_id(method: &str, path: &str, operation: &Operation) -> String {
    operation
        .operation_id
        .clone()
        .unwrap_or_else(|| format!("{method}:{path}"))
}

fn default_label(operation: &Operation) -> String {
    let text = operation
        .summary
        .clone()
        .or_else(|| operation.operation_id.clone())
        .unwrap_or_default();
    upper_first(&text)
}

fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Project a specification into the navigable action catalog.
pub fn parse_openapi(doc: &OpenApiDoc, options: &ParseOptions) -> ActionCatalog {
    let mut categories: Vec<ActionCategory> = Vec::new();
    let mut actions = Vec::new();

    for (method, path, operation) in doc.operations() {
        let category = operation
            .tags
            .first()
            .cloned()
            .unwrap_or_else(|| "default".to_string());
        if !categories.iter().any(|c| c.key == category) {
            categories.push(ActionCategory {
                key: category.clone(),
                label: category.clone(),
            });
        }

        let label = match &options.action_label {
            Some(custom) => custom(method, path, operation),
            None => default_label(operation),
        };

        actions.push(CatalogAction {
            id: action_id(method, path, operation),
            label,
            category,
            method: method.to_string(),
            path: path.to_string(),
            params: operation
                .parameters
                .iter()
                .map(|p| ActionParam {
                    name: p.name.clone(),
                    location: p.location,
                    required: p.required,
                })
                .collect(),
        });
    }

    ActionCatalog {
        categories,
        actions,
    }
}
