//! Enforces per-action parameter schemas on model-extracted values.
//!
//! Violations downgrade the value to null instead of rejecting the action,
//! so a partially wrong reply still resolves.

use log::warn;
use serde_json::{Map, Value};

use crate::catalog::{ActionTypeDefinition, ParameterTemplate};

/// Keys that duplicate the outer request and must never reach the
/// structured parameters.
const VOLATILE_KEYS: [&str; 2] = ["content", "extraContent"];

/// Sanitizes one action's parameter map in place against its definition.
///
/// - `content` / `extraContent` are always stripped.
/// - A closed-set parameter whose value is not one of its alternatives is
///   replaced with null. A comma-joined combination of alternatives fails
///   membership as a whole and is nulled the same way.
/// - Free-form parameters pass through unchanged.
/// - Keys absent from the template are left as-is.
pub fn sanitize_parameters(params: &mut Map<String, Value>, definition: &ActionTypeDefinition) {
    for key in VOLATILE_KEYS {
        params.remove(key);
    }

    for (name, template) in &definition.parameters {
        let Some(value) = params.get_mut(name) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        if let ParameterTemplate::OneOf(_) = template {
            let in_set = value.as_str().map(|s| template.allows(s)).unwrap_or(false);
            if !in_set {
                warn!(
                    "Parameter '{}' of {} had out-of-set value {}, nulling it",
                    name, definition.code, value
                );
                *value = Value::Null;
            }
        }
    }
}
