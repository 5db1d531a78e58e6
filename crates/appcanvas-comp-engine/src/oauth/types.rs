//! Provider configuration schema and discovery document types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identity attributes every provider must map to a source field.
pub const SOURCE_MAPPING_KEYS: [&str; 4] = ["uid", "email", "username", "avatar"];

/// Supported provider protocols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum AuthType {
    Generic,
    Oidc,
}

/// One field of the provider-details form. The required set depends on
/// the selected [`AuthType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormFieldDef {
    pub key: &'static str,
    pub label_key: &'static str,
    pub is_password: bool,
    pub tip_key: Option<&'static str>,
}

/// Details-step form descriptor for a provider type. All fields are
/// required.
pub fn form_fields(auth_type: &AuthType) -> &'static [FormFieldDef] {
    const GENERIC: &[FormFieldDef] = &[
        FormFieldDef {
            key: "source",
            label_key: "idSource.source",
            is_password: false,
            tip_key: Some("idSource.sourceTip"),
        },
        FormFieldDef {
            key: "sourceName",
            label_key: "idSource.sourceName",
            is_password: false,
            tip_key: None,
        },
        FormFieldDef {
            key: "clientId",
            label_key: "idSource.clientId",
            is_password: false,
            tip_key: None,
        },
        FormFieldDef {
            key: "clientSecret",
            label_key: "idSource.clientSecret",
            is_password: true,
            tip_key: None,
        },
    ];
    match auth_type {
        AuthType::Generic | AuthType::Oidc => GENERIC,
    }
}

/// The OpenID Connect discovery document, as served under
/// `/.well-known/openid-configuration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    #[serde(default)]
    pub jwks_uri: Option<String>,
    #[serde(default)]
    pub scopes_supported: Vec<String>,
}

/// The persisted provider configuration, camelCase on the wire.
///
/// Provider-type specific fields (client id, client secret, ...) are
/// carried in `extra_fields` and flattened into the same object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub auth_type: AuthType,
    pub source: String,
    pub source_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_category: Option<String>,
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub user_info_endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,
    /// Comma-joined scope list, as discovered or edited.
    pub scope: String,
    /// Identity attribute name → provider source field.
    pub source_mappings: BTreeMap<String, String>,
    /// New sign-ins may self-register; always set at save.
    pub enable_register: bool,
    #[serde(flatten)]
    pub extra_fields: BTreeMap<String, String>,
}

/// Accumulates the configuration across wizard steps. Merges are
/// monotonic: later steps only add or overwrite their own fields, never
/// erase what an earlier step established.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfigDraft {
    pub auth_type: Option<AuthType>,
    pub source: Option<String>,
    pub source_name: Option<String>,
    pub source_description: Option<String>,
    pub source_icon: Option<String>,
    pub source_category: Option<String>,
    pub issuer: Option<String>,
    pub authorization_endpoint: Option<String>,
    pub token_endpoint: Option<String>,
    pub user_info_endpoint: Option<String>,
    pub jwks_uri: Option<String>,
    pub scope: Option<String>,
    pub source_mappings: BTreeMap<String, String>,
    pub extra_fields: BTreeMap<String, String>,
}

impl ProviderConfigDraft {
    /// Seed endpoints, scope, and the default identity mapping from a
    /// discovery response.
    pub fn merge_discovery(&mut self, auth_type: AuthType, metadata: &OidcProviderMetadata) {
        self.auth_type = Some(auth_type);
        self.source.get_or_insert_with(String::new);
        self.source_name.get_or_insert_with(String::new);
        self.issuer = Some(metadata.issuer.clone());
        self.authorization_endpoint = Some(metadata.authorization_endpoint.clone());
        self.token_endpoint = Some(metadata.token_endpoint.clone());
        self.user_info_endpoint = Some(metadata.userinfo_endpoint.clone());
        self.jwks_uri = metadata.jwks_uri.clone();
        self.scope = Some(metadata.scopes_supported.join(","));
        for key in SOURCE_MAPPING_KEYS {
            self.source_mappings
                .entry(key.to_string())
                .or_insert_with(|| key.to_string());
        }
    }

    /// Merge validated details-step fields. Known config fields are set
    /// directly; everything else lands in `extra_fields`.
    pub fn merge_details(&mut self, fields: &BTreeMap<String, String>) {
        for (key, value) in fields {
            match key.as_str() {
                "source" => self.source = Some(value.clone()),
                "sourceName" => self.source_name = Some(value.clone()),
                "sourceDescription" => self.source_description = Some(value.clone()),
                "sourceIcon" => self.source_icon = Some(value.clone()),
                "sourceCategory" => self.source_category = Some(value.clone()),
                _ => {
                    self.extra_fields.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Replace the identity mapping with the validated mapping-step
    /// entries.
    pub fn merge_mappings(&mut self, mappings: &BTreeMap<String, String>) {
        for (key, value) in mappings {
            self.source_mappings.insert(key.clone(), value.clone());
        }
    }

    /// Assemble the ready-to-persist configuration. Missing required
    /// fields are reported in the validation style.
    pub fn build(&self, enable_register: bool) -> Result<ProviderConfig, Vec<String>> {
        let required = [
            ("source", &self.source),
            ("sourceName", &self.source_name),
            ("issuer", &self.issuer),
            ("authorizationEndpoint", &self.authorization_endpoint),
            ("tokenEndpoint", &self.token_endpoint),
            ("userInfoEndpoint", &self.user_info_endpoint),
        ];
        let mut missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| format!("missing required field: {name}"))
            .collect();
        let Some(auth_type) = self.auth_type.clone() else {
            missing.push("missing required field: authType".to_string());
            return Err(missing);
        };
        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(ProviderConfig {
            auth_type,
            source: self.source.clone().unwrap_or_default(),
            source_name: self.source_name.clone().unwrap_or_default(),
            source_description: self.source_description.clone(),
            source_icon: self.source_icon.clone(),
            source_category: self.source_category.clone(),
            issuer: self.issuer.clone().unwrap_or_default(),
            authorization_endpoint: self.authorization_endpoint.clone().unwrap_or_default(),
            token_endpoint: self.token_endpoint.clone().unwrap_or_default(),
            user_info_endpoint: self.user_info_endpoint.clone().unwrap_or_default(),
            jwks_uri: self.jwks_uri.clone(),
            scope: self.scope.clone().unwrap_or_default(),
            source_mappings: self.source_mappings.clone(),
            enable_register,
            extra_fields: self.extra_fields.clone(),
        })
    }
}
