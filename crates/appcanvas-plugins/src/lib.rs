//! appcanvas data-source plugins.
//!
//! A data-source plugin translates a static API specification into a
//! navigable, categorized catalog of invocable actions and executes a
//! chosen action against the target service. The specification is
//! consumed read-only; catalog projection is pure and deterministic.

pub mod echo;
pub mod errors;
pub mod openapi;
pub mod traits;

// Re-export public types at the crate level.

// echo
pub use echo::EchoApiPlugin;

// errors
pub use errors::{PluginError, PluginResult};

// openapi
pub use openapi::{
    parse_openapi, run_openapi, ActionCatalog, ActionCategory, ActionInvocation, ActionParam,
    CatalogAction, OpenApiDoc, ParseOptions, RunConfig,
};

// traits
pub use traits::{
    DataSourceConfigDescriptor, DataSourceMeta, DataSourcePlugin, ParamDef, QueryConfig,
};
