//! Generic OpenAPI request runner.
//!
//! Executes one catalog action against the target service: path
//! parameters substituted, query and header parameters attached, the
//! `body` parameter sent as the JSON body. The action's configured
//! parameters are merged over the data source's dynamic parameters.
//! Transport failures propagate uninterpreted; any status >= 400 rejects
//! the action without inspecting the body.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::errors::{PluginError, PluginResult};

use super::parse::action_id;
use super::spec::{OpenApiDoc, Operation, ParamLocation};

/// A chosen action plus its configured parameter values.
#[derive(Debug, Clone)]
pub struct ActionInvocation {
    pub action_id: String,
    pub params: BTreeMap<String, Value>,
}

/// Runtime configuration for the runner.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Overrides the document's first server URL when non-empty.
    pub server_url: String,
    /// Data-source-level parameters, overridden by invocation params.
    pub dynamic_params: BTreeMap<String, Value>,
}

/// Execute `invocation` against the service described by `doc`.
pub async fn run_openapi(
    invocation: &ActionInvocation,
    config: &RunConfig,
    doc: &OpenApiDoc,
) -> PluginResult<Value> {
    let (method, path, operation) = find_operation(doc, &invocation.action_id)?;

    let mut params = config.dynamic_params.clone();
    params.extend(invocation.params.clone());

    let base = if config.server_url.is_empty() {
        doc.servers
            .first()
            .map(|s| s.url.clone())
            .ok_or_else(|| PluginError::Spec {
                message: "specification declares no server URL".into(),
            })?
    } else {
        config.server_url.clone()
    };

    let url = format!(
        "{}{}",
        base.trim_end_matches('/'),
        substitute_path(path, operation, &params)?
    );

    let client = reqwest::Client::new();
    let mut request = match method {
        "get" => client.get(&url),
        "post" => client.post(&url),
        "put" => client.put(&url),
        "patch" => client.patch(&url),
        "delete" => client.delete(&url),
        other => {
            return Err(PluginError::Spec {
                message: format!("unsupported method: {other}"),
            })
        }
    };

    for parameter in &operation.parameters {
        let Some(value) = params.get(&parameter.name) else {
            continue;
        };
        match parameter.location {
            ParamLocation::Query => {
                request = request.query(&[(parameter.name.as_str(), value_text(value))]);
            }
            ParamLocation::Header => {
                request = request.header(parameter.name.as_str(), value_text(value));
            }
            ParamLocation::Path | ParamLocation::Cookie => {}
        }
    }

    if operation.request_body.is_some() {
        if let Some(body) = params.get("body") {
            request = request.json(body);
        }
    }

    let response = request.send().await.map_err(|e| PluginError::Transport {
        message: e.to_string(),
    })?;

    let status = response.status().as_u16();
    if status >= 400 {
        return Err(PluginError::Api { status });
    }

    let text = response.text().await.map_err(|e| PluginError::Transport {
        message: e.to_string(),
    })?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

fn find_operation<'a>(
    doc: &'a OpenApiDoc,
    id: &str,
) -> PluginResult<(&'static str, &'a str, &'a Operation)> {
    doc.operations()
        .into_iter()
        .find(|(method, path, operation)| action_id(method, path, operation) == id)
        .ok_or_else(|| PluginError::UnknownAction { id: id.to_string() })
}

/// Replace `{name}` segments with parameter values. Missing path
/// parameters are a hard error — the URL cannot be formed without them.
fn substitute_path(
    path: &str,
    operation: &Operation,
    params: &BTreeMap<String, Value>,
) -> PluginResult<String> {
    let mut out = path.to_string();
    for parameter in &operation.parameters {
        if parameter.location != ParamLocation::Path {
            continue;
        }
        let placeholder = format!("{{{}}}", parameter.name);
        if !out.contains(&placeholder) {
            continue;
        }
        let value = params.get(&parameter.name).ok_or_else(|| {
            PluginError::MissingParam {
                name: parameter.name.clone(),
            }
        })?;
        out = out.replace(&placeholder, &value_text(value));
    }
    Ok(out)
}

/// String form of a parameter value; JSON strings lose their quotes.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
