//! appcanvas component engine — composition, exposure, and migration.
//!
//! This crate provides the core mechanism by which an appcanvas widget is
//! assembled from a tree of independent controls: each control
//! contributes property-panel data, runtime state, and a value exposed
//! into the shared expression namespace consumed by other widgets and by
//! imperative script actions. Persistence is backward compatible across
//! schema versions through migration chains, and configuration defects
//! (duplicate names, exposed-name collisions) fail at definition build,
//! never at render.
//!
//! The engine is designed to be embedded in an editor shell and has zero
//! dependencies on rendering, message catalogs, or the application store —
//! those are consumed through the narrow traits in [`gateway`], [`i18n`],
//! and [`store`].

pub mod builder;
pub mod children;
pub mod comps;
pub mod controls;
pub mod errors;
pub mod exposing;
pub mod gateway;
pub mod i18n;
pub mod instance;
pub mod migration;
pub mod namespace;
pub mod oauth;
pub mod property_view;
pub mod registry;
pub mod store;

// Re-export public types at the crate level.

// builder
pub use builder::{
    ref_methods, CompBuilder, CompDefinition, CompMeta, DispatchHandle, HasViewRef, MethodConfig,
    RefMethod,
};

// children
pub use children::{control_names, validate_composition, ChildrenComposition};

// comps
pub use comps::{switch_definition, toggle, SwitchChildren, SwitchView};

// controls
pub use controls::{
    BoolCodeControl, BoolStateControl, Control, EventDef, EventHandlerControl, FocusOptions,
    LabelControl, LabelView, RefControl, StyleControl, StyleTokenDef, TextStateControl,
    ViewHandle,
};

// errors
pub use errors::{BuildError, TransportError};

// exposing
pub use exposing::{
    common_exposed_configs, with_exposing, CommonChildren, ExposedCompDef, ExposedValueConfig,
};

// gateway
pub use gateway::{HttpGateway, HttpResponse, ReqwestGateway};

// i18n
pub use i18n::{KeyEcho, Translator};

// instance
pub use instance::{
    AnyCompInstance, WidgetInstance, COMP_SCHEMA_VERSION, SCHEMA_VERSION_KEY,
};

// migration
pub use migration::{Migrated, MigrationChain, MigrationEntry};

// namespace
pub use namespace::{ExposureNamespace, NamespaceWriter};

// oauth
pub use oauth::{
    AuthType, CancelOutcome, ConfigStore, OidcProviderMetadata, ProviderConfig, SetupWizard,
    StepOutcome, WizardError, WizardStep,
};

// property_view
pub use property_view::{EditorMode, EditorWidget, PropertyItem, PropertyViewCtx, Section};

// registry
pub use registry::{CompFactory, WidgetRegistry, WidgetRegistryBuilder};

// store
pub use store::{CurrentUser, EditorStore, StoreAction};
