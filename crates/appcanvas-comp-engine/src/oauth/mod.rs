//! OAuth identity-provider setup.
//!
//! A bounded three-step wizard (discovery, provider details, identity
//! mapping) that accumulates a typed provider configuration and submits
//! it once, at the terminal step.

pub mod types;
pub mod wizard;

pub use types::{
    form_fields, AuthType, FormFieldDef, OidcProviderMetadata, ProviderConfig,
    ProviderConfigDraft, SOURCE_MAPPING_KEYS,
};
pub use wizard::{
    CancelOutcome, ConfigStore, DiscoveryRequest, SetupWizard, StepOutcome, WizardError,
    WizardStep,
};
