//! OpenAPI support: the read-only document model, the catalog
//! projection, and the generic request runner.

pub mod parse;
pub mod run;
pub mod spec;

pub use parse::{parse_openapi, ActionCatalog, ActionCategory, ActionParam, CatalogAction,
    ParseOptions};
pub use run::{run_openapi, ActionInvocation, RunConfig};
pub use spec::{OpenApiDoc, Operation, ParamLocation, ParameterDef, PathItem};
