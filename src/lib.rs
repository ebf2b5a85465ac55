//! # Finance Action Resolver
//!
//! Routes natural-language customer requests to predefined financial
//! actions by delegating interpretation to a language model, then turning
//! the model's free-form reply into validated, machine-actionable
//! parameters.
//!
//! ## Core Concepts
//!
//! - **Action Catalog**: immutable registry of action codes with typed
//!   per-parameter schemas (free-form or closed alternative sets)
//! - **Extraction**: the JSON payload is located inside the model's prose
//!   with an explicit byte span, so the corrected payload can later be
//!   spliced back without disturbing the surrounding narrative
//! - **Validation**: out-of-set parameter values are downgraded to null,
//!   never rejected; unknown action codes are dropped
//! - **Deterministic dates**: statement date ranges are recomputed from
//!   the user's own wording, never taken from the model's arithmetic
//! - **Graceful degradation**: unparsable replies fall back to a regex
//!   scrape, and a hopeless reply still resolves to a default action
//!
//! ## Example
//!
//! ```rust,ignore
//! use finance_action_resolver::*;
//!
//! let resolver = ActionResolver::new(ActionCatalog::standard(), model, customers);
//! let request = AnalysisRequest::new("son 3 ay hesap özetimi mail at", "c-42");
//! let result = resolver.analyze(&request).await?;
//! assert!(!result.finance_action_types.is_empty());
//! ```

pub mod catalog;
pub mod dates;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod prompt;
pub mod reconcile;
pub mod resolver;
pub mod splice;
pub mod types;
pub mod validate;

#[cfg(feature = "client")]
pub mod client;

pub use catalog::{
    ActionCatalog, ActionTypeDefinition, ParameterTemplate, DEFAULT_ACTION, EMAIL_ACTION,
    STATEMENT_ACTION,
};
pub use dates::{resolve_relative_range, RelativeDateRange, DEFAULT_RELATIVE_DAYS};
pub use error::{ActionResolverError, Result};
pub use extract::{extract_json_block, unescape_over_encoded, JsonBlock};
pub use fallback::recover_action_codes;
pub use prompt::compose_instruction;
pub use reconcile::apply_cross_action_rules;
pub use resolver::{
    resolve_reply, ActionResolver, CustomerDirectory, ModelClient, ResolvedReply, ResolverStage,
};
pub use splice::splice;
pub use types::*;
pub use validate::sanitize_parameters;

#[cfg(feature = "client")]
pub use client::HttpModelClient;
