//! Plugin trait interfaces for appcanvas data sources.
//!
//! A data-source plugin contributes a configuration descriptor (rendered
//! as the connection form), a query configuration (the navigable action
//! catalog), and an executor. Adding a method to the trait requires a
//! default implementation to preserve backward compatibility.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::errors::PluginResult;
use crate::openapi::{ActionCatalog, ActionInvocation};

/// Palette metadata for a data source.
#[derive(Debug, Clone, Serialize)]
pub struct DataSourceMeta {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub category: String,
}

/// One field of the connection form.
#[derive(Debug, Clone, Serialize)]
pub struct ParamDef {
    pub key: String,
    pub label: String,
}

/// The connection form descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct DataSourceConfigDescriptor {
    /// Discriminator consumed by the editor shell, e.g. `"dataSource"`.
    pub config_type: String,
    pub params: Vec<ParamDef>,
}

/// The query editor configuration: labeled action catalog grouped by
/// resource category.
#[derive(Debug, Clone, Serialize)]
pub struct QueryConfig {
    /// Label of the action picker, e.g. `"Action"`.
    pub label: String,
    /// Label of the category group, e.g. `"Resources"`.
    pub category_label: String,
    pub catalog: ActionCatalog,
}

#[async_trait]
pub trait DataSourcePlugin: Send + Sync {
    fn meta(&self) -> DataSourceMeta;

    fn data_source_config(&self) -> DataSourceConfigDescriptor;

    /// Build the action catalog. Pure projection of the plugin's API
    /// specification.
    fn query_config(&self) -> PluginResult<QueryConfig>;

    /// Execute a chosen action. `ds_config` is the saved connection
    /// configuration (dynamic parameters).
    async fn run(&self, invocation: &ActionInvocation, ds_config: &Value) -> PluginResult<Value>;
}
