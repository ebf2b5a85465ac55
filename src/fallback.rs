//! Last-resort action recovery when structured parsing fails.
//!
//! Scrapes the raw reply for a `selectedActions` token followed by a
//! bracketed list, resolves each token against the catalog and degrades to
//! the default action when nothing survives. This path never errors; it
//! trades functionality for availability.

use std::sync::OnceLock;

use log::warn;
use regex::Regex;

use crate::catalog::{ActionCatalog, DEFAULT_ACTION};

fn selected_actions_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Tolerates escaped quotes around the key and a missing colon.
        Regex::new(r#"(?is)selectedActions\\?"?\s*:?\s*\[([^\]]*)\]"#)
            .expect("selectedActions pattern is valid")
    })
}

/// Best-effort extraction of action codes from an unparsable reply.
///
/// Unrecognized tokens are dropped with a diagnostic; an empty harvest
/// yields `[LOG_CUSTOMER_INTERACTION]` so the caller always gets at least
/// one action.
pub fn recover_action_codes(reply: &str, catalog: &ActionCatalog) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();

    if let Some(caps) = selected_actions_pattern().captures(reply) {
        for token in caps[1].split(',') {
            let code = token
                .trim()
                .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '\\'))
                .trim();
            if code.is_empty() {
                continue;
            }
            if !catalog.contains(code) {
                warn!("Fallback extractor dropping unrecognized token '{}'", code);
                continue;
            }
            if !codes.iter().any(|c| c == code) {
                codes.push(code.to_string());
            }
        }
    }

    if codes.is_empty() {
        warn!("Fallback extractor found no valid actions, substituting default");
        codes.push(DEFAULT_ACTION.to_string());
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_codes_from_broken_json() {
        let catalog = ActionCatalog::standard();
        // Dangling comma makes the payload unparsable as JSON.
        let reply = r#"I will do that. {"selectedActions": ["BLOCK_CARD",], "parameters": {,}}"#;

        assert_eq!(recover_action_codes(reply, &catalog), vec!["BLOCK_CARD"]);
    }

    #[test]
    fn drops_unrecognized_tokens() {
        let catalog = ActionCatalog::standard();
        let reply = r#"selectedActions: ["BLOCK_CARD", "FLY_TO_MOON", 'CHECK_BALANCE']"#;

        assert_eq!(
            recover_action_codes(reply, &catalog),
            vec!["BLOCK_CARD", "CHECK_BALANCE"]
        );
    }

    #[test]
    fn handles_escaped_quoting() {
        let catalog = ActionCatalog::standard();
        let reply = r#"{\"selectedActions\": [\"TRANSFER_FUNDS\"]}"#;

        assert_eq!(
            recover_action_codes(reply, &catalog),
            vec!["TRANSFER_FUNDS"]
        );
    }

    #[test]
    fn empty_harvest_yields_default_action() {
        let catalog = ActionCatalog::standard();

        assert_eq!(
            recover_action_codes("no actions anywhere", &catalog),
            vec![DEFAULT_ACTION]
        );
        assert_eq!(
            recover_action_codes("selectedActions: []", &catalog),
            vec![DEFAULT_ACTION]
        );
    }

    #[test]
    fn duplicates_collapse() {
        let catalog = ActionCatalog::standard();
        let reply = r#"selectedActions ["BLOCK_CARD", "BLOCK_CARD"]"#;

        assert_eq!(recover_action_codes(reply, &catalog), vec!["BLOCK_CARD"]);
    }
}
