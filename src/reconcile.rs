//! Propagates flags between co-selected actions.

use log::debug;
use serde_json::Value;

use crate::catalog::{EMAIL_ACTION, STATEMENT_ACTION};
use crate::types::ParsedAction;

/// Applies the documented cross-action couplings to the selected set.
///
/// Currently one rule exists: when `SEND_EMAIL` is co-selected with
/// `GENERATE_STATEMENT`, the statement is forced to attach by email.
/// New couplings belong here, next to this one.
pub fn apply_cross_action_rules(actions: &mut [ParsedAction]) {
    let email_selected = actions.iter().any(|a| a.code == EMAIL_ACTION);
    if !email_selected {
        return;
    }

    for action in actions.iter_mut().filter(|a| a.code == STATEMENT_ACTION) {
        debug!("SEND_EMAIL co-selected, forcing emailFlag on {}", action.code);
        action
            .parameters
            .insert("emailFlag".to_string(), Value::Bool(true));
    }
}
