//! Built-in echo-API plugin.
//!
//! The plugin's whole behavior is derived from its embedded OpenAPI
//! document: the catalog is a pure projection of the spec, and execution
//! goes through the generic runner.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::PluginResult;
use crate::openapi::{
    parse_openapi, run_openapi, ActionInvocation, OpenApiDoc, ParseOptions, RunConfig,
};
use crate::traits::{
    DataSourceConfigDescriptor, DataSourceMeta, DataSourcePlugin, QueryConfig,
};

const ECHO_SPEC: &str = include_str!("echo_spec.json");

pub struct EchoApiPlugin {
    /// Overrides the spec's server URL when non-empty (tests point this
    /// at a mock server).
    server_url: String,
}

impl Default for EchoApiPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl EchoApiPlugin {
    pub fn new() -> Self {
        Self {
            server_url: String::new(),
        }
    }

    pub fn with_server_url(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
        }
    }

    fn spec(&self) -> PluginResult<OpenApiDoc> {
        OpenApiDoc::from_json(ECHO_SPEC)
    }

    /// Dynamic parameters from the saved connection configuration.
    fn dynamic_params(ds_config: &Value) -> std::collections::BTreeMap<String, Value> {
        ds_config
            .as_object()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DataSourcePlugin for EchoApiPlugin {
    fn meta(&self) -> DataSourceMeta {
        DataSourceMeta {
            id: "echoApi".into(),
            name: "Echo API".into(),
            icon: "echoApi.svg".into(),
            category: "api".into(),
        }
    }

    fn data_source_config(&self) -> DataSourceConfigDescriptor {
        DataSourceConfigDescriptor {
            config_type: "dataSource".into(),
            params: vec![],
        }
    }

    fn query_config(&self) -> PluginResult<QueryConfig> {
        let doc = self.spec()?;
        Ok(QueryConfig {
            label: "Action".into(),
            category_label: "Resources".into(),
            catalog: parse_openapi(&doc, &ParseOptions::default()),
        })
    }

    async fn run(&self, invocation: &ActionInvocation, ds_config: &Value) -> PluginResult<Value> {
        let doc = self.spec()?;
        let config = RunConfig {
            server_url: self.server_url.clone(),
            dynamic_params: Self::dynamic_params(ds_config),
        };
        run_openapi(invocation, &config, &doc).await
    }
}
