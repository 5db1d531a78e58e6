//! The provider setup wizard state machine.
//!
//! Steps: discovery (0) → details (1) → mapping (2). Transitions are
//! strictly forward or one step backward; cancel at step 0 aborts and
//! clears everything. Forward transitions merge validated data into the
//! accumulated draft; backward transitions never discard data entered at
//! the step being left. Submission happens only at the terminal step and
//! a failed submission leaves the wizard exactly where it was, free to
//! retry.
//!
//! Discovery runs against a generation counter: a response belonging to a
//! superseded request (the user cancelled, or re-submitted) is dropped as
//! a no-op instead of mutating state it no longer owns.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::TransportError;
use crate::gateway::{HttpGateway, HttpResponse};
use crate::store::{EditorStore, StoreAction};

use super::types::{
    form_fields, AuthType, OidcProviderMetadata, ProviderConfig, ProviderConfigDraft,
    SOURCE_MAPPING_KEYS,
};

/// Persistence collaborator for the finished configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn save_config(&self, config: &ProviderConfig) -> Result<(), TransportError>;
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WizardError {
    /// Missing or invalid required fields. Blocks the forward transition
    /// only; fully recoverable by correction.
    #[error("validation failed: {}", messages.join("; "))]
    Validation { messages: Vec<String> },
    /// Connection-level discovery failure.
    #[error("discovery request failed: {message}")]
    Transport { message: String },
    /// The configuration could not be persisted. Wizard state is intact.
    #[error("saving provider configuration failed: {message}")]
    Submission { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Discovery,
    Details,
    Mapping,
}

impl WizardStep {
    pub fn index(self) -> u8 {
        match self {
            Self::Discovery => 0,
            Self::Details => 1,
            Self::Mapping => 2,
        }
    }
}

/// Outcome of a step submission.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepOutcome {
    Advanced { to: WizardStep },
    /// Discovery answered with an error status; the wizard stays on
    /// step 0 without surfacing a distinct error. Preserved behavior —
    /// see DESIGN notes.
    Stayed { status: u16 },
    /// The response belonged to a superseded request; nothing changed.
    Stale,
    /// Terminal step: the configuration was persisted.
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    SteppedBack { to: WizardStep },
    Aborted,
}

/// An in-flight discovery lookup: the URL to fetch and the generation it
/// belongs to.
#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    pub url: String,
    pub issuer: String,
    generation: u64,
}

pub struct SetupWizard {
    auth_type: AuthType,
    step: WizardStep,
    draft: ProviderConfigDraft,
    details_entries: BTreeMap<String, String>,
    mapping_entries: BTreeMap<String, String>,
    editor_store: Option<Arc<dyn EditorStore>>,
    generation: u64,
}

impl SetupWizard {
    pub fn new(auth_type: AuthType) -> Self {
        Self {
            auth_type,
            step: WizardStep::Discovery,
            draft: ProviderConfigDraft::default(),
            details_entries: BTreeMap::new(),
            mapping_entries: BTreeMap::new(),
            editor_store: None,
            generation: 0,
        }
    }

    /// Dispatch a provider-list refresh into the global store after a
    /// successful save.
    pub fn with_editor_store(mut self, store: Arc<dyn EditorStore>) -> Self {
        self.editor_store = Some(store);
        self
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &ProviderConfigDraft {
        &self.draft
    }

    /// Values entered at the details step, preserved across back
    /// navigation.
    pub fn details_entries(&self) -> &BTreeMap<String, String> {
        &self.details_entries
    }

    pub fn mapping_entries(&self) -> &BTreeMap<String, String> {
        &self.mapping_entries
    }

    /// Validate the issuer field and describe the discovery lookup.
    pub fn discovery_request(&self, issuer: &str) -> Result<DiscoveryRequest, WizardError> {
        let issuer = issuer.trim().trim_end_matches('/');
        if issuer.is_empty() {
            return Err(WizardError::Validation {
                messages: vec!["missing required field: issuer".into()],
            });
        }
        Ok(DiscoveryRequest {
            url: format!("{issuer}/.well-known/openid-configuration"),
            issuer: issuer.to_string(),
            generation: self.generation,
        })
    }

    /// Apply a discovery response. Stale responses (superseded
    /// generation, or the wizard moved on) are dropped without touching
    /// state.
    pub fn apply_discovery(
        &mut self,
        request: &DiscoveryRequest,
        response: HttpResponse,
    ) -> Result<StepOutcome, WizardError> {
        if request.generation != self.generation || self.step != WizardStep::Discovery {
            tracing::debug!(issuer = %request.issuer, "dropping stale discovery response");
            return Ok(StepOutcome::Stale);
        }
        if response.is_error() {
            return Ok(StepOutcome::Stayed {
                status: response.status,
            });
        }
        let metadata: OidcProviderMetadata = serde_json::from_value(response.data)
            .map_err(|e| WizardError::Transport {
                message: format!("malformed discovery document: {e}"),
            })?;

        self.draft.merge_discovery(self.auth_type.clone(), &metadata);
        self.step = WizardStep::Details;
        Ok(StepOutcome::Advanced {
            to: WizardStep::Details,
        })
    }

    /// Validate the issuer, perform the metadata lookup, and apply the
    /// result.
    pub async fn submit_discovery(
        &mut self,
        gateway: &dyn HttpGateway,
        issuer: &str,
    ) -> Result<StepOutcome, WizardError> {
        let request = self.discovery_request(issuer)?;
        let response = gateway
            .get(&request.url)
            .await
            .map_err(|e| WizardError::Transport {
                message: e.to_string(),
            })?;
        self.apply_discovery(&request, response)
    }

    /// Validate the dynamic required-field set for the provider type and
    /// merge the entries into the draft.
    pub fn submit_details(
        &mut self,
        fields: BTreeMap<String, String>,
    ) -> Result<StepOutcome, WizardError> {
        if self.step != WizardStep::Details {
            return Err(WizardError::Validation {
                messages: vec!["details step is not active".into()],
            });
        }
        let missing: Vec<String> = form_fields(&self.auth_type)
            .iter()
            .filter(|field| {
                fields
                    .get(field.key)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|field| format!("missing required field: {}", field.key))
            .collect();
        if !missing.is_empty() {
            return Err(WizardError::Validation { messages: missing });
        }

        self.details_entries.extend(fields);
        self.draft.merge_details(&self.details_entries);
        self.step = WizardStep::Mapping;
        Ok(StepOutcome::Advanced {
            to: WizardStep::Mapping,
        })
    }

    /// Validate mapping completeness, merge, and submit the finished
    /// configuration. A failed save returns [`WizardError::Submission`]
    /// with the wizard still on the mapping step and all entries intact.
    pub async fn submit_mapping(
        &mut self,
        store: &dyn ConfigStore,
        mappings: BTreeMap<String, String>,
    ) -> Result<StepOutcome, WizardError> {
        if self.step != WizardStep::Mapping {
            return Err(WizardError::Validation {
                messages: vec!["mapping step is not active".into()],
            });
        }
        let missing: Vec<String> = SOURCE_MAPPING_KEYS
            .iter()
            .filter(|key| {
                mappings
                    .get(**key)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|key| format!("missing mapping for: {key}"))
            .collect();
        if !missing.is_empty() {
            return Err(WizardError::Validation { messages: missing });
        }

        self.mapping_entries.extend(mappings);
        self.draft.merge_mappings(&self.mapping_entries);
        let config = self
            .draft
            .build(true)
            .map_err(|messages| WizardError::Validation { messages })?;

        store
            .save_config(&config)
            .await
            .map_err(|e| WizardError::Submission {
                message: e.to_string(),
            })?;

        if let Some(editor_store) = &self.editor_store {
            editor_store.dispatch(StoreAction::RefreshAuthConfigs);
        }
        Ok(StepOutcome::Saved)
    }

    /// Cancel: one step back above step 0, abort-and-clear at step 0.
    /// Outstanding discovery requests are invalidated either way.
    pub fn cancel(&mut self) -> CancelOutcome {
        self.generation += 1;
        match self.step {
            WizardStep::Discovery => {
                self.draft = ProviderConfigDraft::default();
                self.details_entries.clear();
                self.mapping_entries.clear();
                CancelOutcome::Aborted
            }
            WizardStep::Details => {
                self.step = WizardStep::Discovery;
                CancelOutcome::SteppedBack {
                    to: WizardStep::Discovery,
                }
            }
            WizardStep::Mapping => {
                self.step = WizardStep::Details;
                CancelOutcome::SteppedBack {
                    to: WizardStep::Details,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ReqwestGateway;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct RecordingConfigStore {
        saved: Mutex<Vec<ProviderConfig>>,
        fail_remaining: AtomicUsize,
    }

    impl RecordingConfigStore {
        fn new() -> Self {
            Self {
                saved: Mutex::new(Vec::new()),
                fail_remaining: AtomicUsize::new(0),
            }
        }

        fn failing(times: usize) -> Self {
            let store = Self::new();
            store.fail_remaining.store(times, Ordering::SeqCst);
            store
        }
    }

    #[async_trait]
    impl ConfigStore for RecordingConfigStore {
        async fn save_config(&self, config: &ProviderConfig) -> Result<(), TransportError> {
            if self.fail_remaining.load(Ordering::SeqCst) > 0 {
                self.fail_remaining.fetch_sub(1, Ordering::SeqCst);
                return Err(TransportError::Request {
                    message: "connection reset".into(),
                });
            }
            self.saved.lock().push(config.clone());
            Ok(())
        }
    }

    fn discovery_body() -> serde_json::Value {
        json!({
            "issuer": "https://idp.example.com",
            "authorization_endpoint": "https://idp.example.com/authorize",
            "token_endpoint": "https://idp.example.com/token",
            "userinfo_endpoint": "https://idp.example.com/userinfo",
            "jwks_uri": "https://idp.example.com/jwks",
            "scopes_supported": ["openid", "email"]
        })
    }

    fn discovery_ok(wizard: &mut SetupWizard) {
        let request = wizard.discovery_request("https://idp.example.com").unwrap();
        let outcome = wizard
            .apply_discovery(
                &request,
                HttpResponse {
                    status: 200,
                    data: discovery_body(),
                },
            )
            .unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Advanced {
                to: WizardStep::Details
            }
        );
    }

    fn details() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("source".to_string(), "keycloak".to_string()),
            ("sourceName".to_string(), "Keycloak".to_string()),
            ("clientId".to_string(), "app".to_string()),
            ("clientSecret".to_string(), "s3cret".to_string()),
        ])
    }

    fn full_mappings() -> BTreeMap<String, String> {
        SOURCE_MAPPING_KEYS
            .iter()
            .map(|k| (k.to_string(), format!("claims.{k}")))
            .collect()
    }

    #[test]
    fn empty_issuer_is_rejected() {
        let wizard = SetupWizard::new(AuthType::Generic);
        let err = wizard.discovery_request("   ").unwrap_err();
        assert!(matches!(err, WizardError::Validation { .. }));
    }

    #[test]
    fn discovery_error_status_stays_on_step_zero() {
        let mut wizard = SetupWizard::new(AuthType::Generic);
        let request = wizard.discovery_request("https://idp.example.com").unwrap();
        let outcome = wizard
            .apply_discovery(
                &request,
                HttpResponse {
                    status: 500,
                    data: json!({}),
                },
            )
            .unwrap();
        assert_eq!(outcome, StepOutcome::Stayed { status: 500 });
        assert_eq!(wizard.step(), WizardStep::Discovery);
        assert_eq!(wizard.draft(), &ProviderConfigDraft::default());
    }

    #[test]
    fn discovery_seeds_details_defaults() {
        let mut wizard = SetupWizard::new(AuthType::Generic);
        discovery_ok(&mut wizard);

        assert_eq!(wizard.step(), WizardStep::Details);
        let draft = wizard.draft();
        assert_eq!(draft.issuer.as_deref(), Some("https://idp.example.com"));
        assert_eq!(draft.scope.as_deref(), Some("openid,email"));
        assert_eq!(draft.source_mappings["email"], "email");
    }

    #[test]
    fn issuer_is_monotonic_across_steps_and_back_navigation() {
        let mut wizard = SetupWizard::new(AuthType::Generic);
        discovery_ok(&mut wizard);
        wizard.submit_details(details()).unwrap();
        assert_eq!(wizard.draft().issuer.as_deref(), Some("https://idp.example.com"));

        // Back to details, back to discovery; entered data survives.
        wizard.cancel();
        wizard.cancel();
        assert_eq!(wizard.step(), WizardStep::Discovery);
        assert_eq!(wizard.draft().issuer.as_deref(), Some("https://idp.example.com"));
        assert_eq!(wizard.details_entries()["clientId"], "app");

        // Forward again without changing the field.
        discovery_ok(&mut wizard);
        wizard.submit_details(details()).unwrap();
        assert_eq!(wizard.step(), WizardStep::Mapping);
        assert_eq!(wizard.draft().issuer.as_deref(), Some("https://idp.example.com"));
    }

    #[test]
    fn details_validation_lists_every_missing_field() {
        let mut wizard = SetupWizard::new(AuthType::Generic);
        discovery_ok(&mut wizard);

        let err = wizard
            .submit_details(BTreeMap::from([(
                "source".to_string(),
                "keycloak".to_string(),
            )]))
            .unwrap_err();
        let WizardError::Validation { messages } = err else {
            panic!("expected validation error");
        };
        assert!(messages.iter().any(|m| m.contains("sourceName")));
        assert!(messages.iter().any(|m| m.contains("clientSecret")));
        assert_eq!(wizard.step(), WizardStep::Details);
    }

    #[tokio::test]
    async fn incomplete_mapping_is_rejected_without_saving() {
        let mut wizard = SetupWizard::new(AuthType::Generic);
        discovery_ok(&mut wizard);
        wizard.submit_details(details()).unwrap();

        let store = RecordingConfigStore::new();
        let mut mappings = full_mappings();
        mappings.insert("avatar".to_string(), "  ".to_string());

        let err = wizard.submit_mapping(&store, mappings).await.unwrap_err();
        assert!(matches!(err, WizardError::Validation { .. }));
        assert!(store.saved.lock().is_empty());
        assert_eq!(wizard.step(), WizardStep::Mapping);
    }

    #[tokio::test]
    async fn failed_submission_is_retryable_in_place() {
        let mut wizard = SetupWizard::new(AuthType::Generic);
        discovery_ok(&mut wizard);
        wizard.submit_details(details()).unwrap();

        let store = RecordingConfigStore::failing(1);
        let err = wizard
            .submit_mapping(&store, full_mappings())
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::Submission { .. }));
        assert_eq!(wizard.step(), WizardStep::Mapping);
        assert_eq!(wizard.mapping_entries()["uid"], "claims.uid");

        // Same call again succeeds without re-entering anything.
        let retained = wizard.mapping_entries().clone();
        let outcome = wizard.submit_mapping(&store, retained).await.unwrap();
        assert_eq!(outcome, StepOutcome::Saved);

        let saved = store.saved.lock();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].issuer, "https://idp.example.com");
        assert_eq!(saved[0].source_mappings["uid"], "claims.uid");
        assert!(saved[0].enable_register);
        assert_eq!(saved[0].extra_fields["clientSecret"], "s3cret");
    }

    #[tokio::test]
    async fn successful_save_dispatches_provider_refresh() {
        use crate::store::CurrentUser;

        #[derive(Default)]
        struct RecordingEditorStore {
            actions: Mutex<Vec<StoreAction>>,
        }

        impl EditorStore for RecordingEditorStore {
            fn current_user(&self) -> CurrentUser {
                CurrentUser {
                    id: "u1".into(),
                    username: "admin".into(),
                    current_org_id: Some("org1".into()),
                }
            }

            fn dispatch(&self, action: StoreAction) {
                self.actions.lock().push(action);
            }
        }

        let editor_store = Arc::new(RecordingEditorStore::default());
        let mut wizard =
            SetupWizard::new(AuthType::Generic).with_editor_store(editor_store.clone());
        discovery_ok(&mut wizard);
        wizard.submit_details(details()).unwrap();

        let store = RecordingConfigStore::new();
        wizard.submit_mapping(&store, full_mappings()).await.unwrap();
        assert_eq!(
            *editor_store.actions.lock(),
            vec![StoreAction::RefreshAuthConfigs]
        );
    }

    #[test]
    fn stale_discovery_response_is_dropped() {
        let mut wizard = SetupWizard::new(AuthType::Generic);
        let request = wizard.discovery_request("https://idp.example.com").unwrap();

        // The user aborts while the lookup is in flight.
        assert_eq!(wizard.cancel(), CancelOutcome::Aborted);

        let outcome = wizard
            .apply_discovery(
                &request,
                HttpResponse {
                    status: 200,
                    data: discovery_body(),
                },
            )
            .unwrap();
        assert_eq!(outcome, StepOutcome::Stale);
        assert_eq!(wizard.step(), WizardStep::Discovery);
        assert_eq!(wizard.draft(), &ProviderConfigDraft::default());
    }

    #[test]
    fn cancel_at_step_zero_clears_everything() {
        let mut wizard = SetupWizard::new(AuthType::Generic);
        discovery_ok(&mut wizard);
        wizard.submit_details(details()).unwrap();
        wizard.cancel();
        wizard.cancel();
        assert_eq!(wizard.cancel(), CancelOutcome::Aborted);
        assert!(wizard.details_entries().is_empty());
        assert_eq!(wizard.draft(), &ProviderConfigDraft::default());
    }

    #[tokio::test]
    async fn end_to_end_against_mock_idp() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/openid-configuration"))
            .respond_with(ResponseTemplate::new(200).set_body_json(discovery_body()))
            .mount(&server)
            .await;

        let gateway = ReqwestGateway::new();
        let mut wizard = SetupWizard::new(AuthType::Generic);
        let outcome = wizard.submit_discovery(&gateway, &server.uri()).await.unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Advanced {
                to: WizardStep::Details
            }
        );
        // The seeded issuer comes from the document, not the typed URL.
        assert_eq!(wizard.draft().issuer.as_deref(), Some("https://idp.example.com"));
    }

    #[tokio::test]
    async fn connection_failure_surfaces_as_transport_error() {
        let gateway = ReqwestGateway::new();
        let mut wizard = SetupWizard::new(AuthType::Generic);
        // Nothing listens on this port.
        let err = wizard
            .submit_discovery(&gateway, "http://127.0.0.1:1")
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::Transport { .. }));
        assert_eq!(wizard.step(), WizardStep::Discovery);
    }
}
