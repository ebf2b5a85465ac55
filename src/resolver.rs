//! Sequences the resolution pipeline per request.
//!
//! Each request traverses the stages Composing → AwaitingModel →
//! Extracting → Validating → Splicing → Done exactly once, branching to
//! Fallback when the payload cannot be parsed and terminating in Failed
//! only when the upstream model call itself errors. The pipeline itself is
//! stateless; the catalog is the only shared (read-only) input, so
//! arbitrarily many requests may run concurrently.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::catalog::{ActionCatalog, DEFAULT_ACTION, STATEMENT_ACTION};
use crate::dates::resolve_relative_range;
use crate::error::{ActionResolverError, Result};
use crate::extract::{extract_json_block, unescape_over_encoded};
use crate::fallback::recover_action_codes;
use crate::prompt::compose_instruction;
use crate::reconcile::apply_cross_action_rules;
use crate::splice::splice;
use crate::types::{
    AnalysisRequest, AnalysisResult, CompletionRequest, CustomerRecord, DateRangeHint,
    ParsedAction, ReplyPayload,
};
use crate::validate::sanitize_parameters;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Stages of the per-request state machine. No stage is revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverStage {
    Composing,
    AwaitingModel,
    Extracting,
    Validating,
    Splicing,
    Fallback,
    Done,
    Failed,
}

fn enter(stage: ResolverStage) {
    debug!("resolver stage: {:?}", stage);
}

/// Collaborator that sends a prompt plus customer content to a model
/// endpoint and returns the raw text reply.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Read-only customer lookup, backed by the persistence layer.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn find_customer(&self, identifier: &str) -> Result<Option<CustomerRecord>>;
}

/// Outcome of the pure reply-resolution core.
#[derive(Debug, Clone)]
pub struct ResolvedReply {
    /// Original narrative with the corrected JSON spliced in. Left
    /// untouched when the fallback path was taken.
    pub text: String,
    /// Never empty.
    pub actions: Vec<ParsedAction>,
    pub date_range: Option<DateRangeHint>,
    pub used_fallback: bool,
}

/// The Free-Text Financial Action Resolver.
pub struct ActionResolver<M, D> {
    catalog: ActionCatalog,
    model: M,
    customers: D,
}

impl<M: ModelClient, D: CustomerDirectory> ActionResolver<M, D> {
    pub fn new(catalog: ActionCatalog, model: M, customers: D) -> Self {
        Self {
            catalog,
            model,
            customers,
        }
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// Runs the full pipeline for one request.
    ///
    /// Only missing required input and upstream failures surface as `Err`;
    /// parsing and schema problems degrade in-band.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        if request.content.trim().is_empty() {
            return Err(ActionResolverError::MissingContent);
        }
        if request.customer_identifier.trim().is_empty() {
            return Err(ActionResolverError::MissingCustomerIdentifier);
        }

        let customer = self
            .customers
            .find_customer(&request.customer_identifier)
            .await?
            .ok_or_else(|| ActionResolverError::CustomerLookup {
                identifier: request.customer_identifier.clone(),
                details: "no such customer".to_string(),
            })?;

        info!(
            "Resolving request for customer {} ({} chars)",
            customer.id,
            request.content.len()
        );

        enter(ResolverStage::Composing);
        let now = Local::now().naive_local();
        // The catalog contract is always sent; a caller-supplied prompt
        // extends it rather than replacing the action schema the rest of
        // the pipeline depends on.
        let mut instruction = compose_instruction(&self.catalog, now);
        if let Some(extra) = request
            .special_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
        {
            instruction.push_str("\n### ADDITIONAL INSTRUCTIONS\n");
            instruction.push_str(extra.trim());
            instruction.push('\n');
        }
        let completion = CompletionRequest {
            content: request.content.clone(),
            special_prompt: instruction,
            model: request.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        };

        enter(ResolverStage::AwaitingModel);
        let reply = match self.model.complete(&completion).await {
            Ok(reply) => reply,
            Err(e) => {
                enter(ResolverStage::Failed);
                return Err(e);
            }
        };

        let resolved = resolve_reply(&self.catalog, &request.content, &reply, now);

        Ok(AnalysisResult {
            content: resolved.text,
            original_content: request.content.clone(),
            finance_action_types: resolved.actions.iter().map(|a| a.code.clone()).collect(),
            customer: customer.summary(),
        })
    }
}

/// Pure core: turns a raw model reply into sanitized actions plus the
/// reconciled narrative. `original_utterance` drives the date math; the
/// model's own arithmetic is ignored.
pub fn resolve_reply(
    catalog: &ActionCatalog,
    original_utterance: &str,
    reply: &str,
    now: NaiveDateTime,
) -> ResolvedReply {
    enter(ResolverStage::Extracting);
    let parsed = extract_json_block(reply)
        .and_then(|block| parse_payload(&block.text).map(|payload| (block, payload)));

    let Some((block, payload)) = parsed else {
        enter(ResolverStage::Fallback);
        let actions = recover_action_codes(reply, catalog)
            .into_iter()
            .map(ParsedAction::bare)
            .collect();
        enter(ResolverStage::Done);
        return ResolvedReply {
            text: reply.to_string(),
            actions,
            date_range: None,
            used_fallback: true,
        };
    };

    enter(ResolverStage::Validating);
    let mut actions = Vec::new();
    for code in payload.selected_actions {
        let Some(definition) = catalog.get(&code) else {
            warn!("Dropping unknown action code '{}'", code);
            continue;
        };
        let mut parameters = payload
            .parameters
            .get(&code)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        sanitize_parameters(&mut parameters, definition);
        actions.push(ParsedAction { code, parameters });
    }
    if actions.is_empty() {
        warn!("No recognizable actions in payload, substituting default");
        actions.push(ParsedAction::bare(DEFAULT_ACTION));
    }

    let mut date_range = payload.date_range;
    for action in actions.iter_mut().filter(|a| a.code == STATEMENT_ACTION) {
        let range = resolve_relative_range(original_utterance, now);
        action
            .parameters
            .insert("startDate".to_string(), Value::String(range.start_stamp()));
        action
            .parameters
            .insert("endDate".to_string(), Value::String(range.end_stamp()));
        date_range = Some(DateRangeHint {
            start_date: Some(range.start_stamp()),
            end_date: Some(range.end_stamp()),
            is_relative: true,
            relative_days: range.days,
        });
    }

    apply_cross_action_rules(&mut actions);

    enter(ResolverStage::Splicing);
    let corrected = ReplyPayload {
        selected_actions: actions.iter().map(|a| a.code.clone()).collect(),
        parameters: actions
            .iter()
            .map(|a| (a.code.clone(), Value::Object(a.parameters.clone())))
            .collect::<Map<String, Value>>(),
        date_range: date_range.clone(),
    };
    let corrected_json =
        serde_json::to_string_pretty(&corrected).unwrap_or_else(|_| block.text.clone());
    let text = splice(reply, block.span, &corrected_json);

    enter(ResolverStage::Done);
    ResolvedReply {
        text,
        actions,
        date_range,
        used_fallback: false,
    }
}

/// Strict parse first; one retry on the over-escape repaired form.
fn parse_payload(candidate: &str) -> Option<ReplyPayload> {
    serde_json::from_str(candidate)
        .ok()
        .or_else(|| serde_json::from_str(&unescape_over_encoded(candidate)).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EMAIL_ACTION;
    use chrono::NaiveDate;
    use serde_json::json;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn statement_dates_come_from_the_user_not_the_model() {
        let catalog = ActionCatalog::standard();
        let reply = r#"Of course!
```json
{"selectedActions": ["GENERATE_STATEMENT"],
 "parameters": {"GENERATE_STATEMENT": {"startDate": "1999-01-01T00:00:00", "endDate": "1999-02-01T00:00:00", "direction": "in"}}}
```
Done."#;

        let resolved = resolve_reply(&catalog, "son 3 ay özetimi istiyorum", reply, fixed_now());

        assert!(!resolved.used_fallback);
        let statement = &resolved.actions[0];
        assert_eq!(statement.parameters["startDate"], json!("2023-12-16T00:00:00"));
        assert_eq!(statement.parameters["endDate"], json!("2024-03-15T23:59:59"));
        assert_eq!(statement.parameters["direction"], json!("in"));

        let hint = resolved.date_range.unwrap();
        assert!(hint.is_relative);
        assert_eq!(hint.relative_days, 90);
    }

    #[test]
    fn unknown_codes_are_dropped_not_propagated() {
        let catalog = ActionCatalog::standard();
        let reply = r#"{"selectedActions": ["CHECK_BALANCE", "LAUNCH_ROCKET"]}"#;

        let resolved = resolve_reply(&catalog, "bakiyem ne kadar", reply, fixed_now());

        let codes: Vec<_> = resolved.actions.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["CHECK_BALANCE"]);
    }

    #[test]
    fn empty_selection_substitutes_default() {
        let catalog = ActionCatalog::standard();
        let reply = r#"{"selectedActions": []}"#;

        let resolved = resolve_reply(&catalog, "teşekkürler", reply, fixed_now());

        assert_eq!(resolved.actions[0].code, DEFAULT_ACTION);
    }

    #[test]
    fn email_and_statement_reconcile() {
        let catalog = ActionCatalog::standard();
        let reply = r#"{"selectedActions": ["GENERATE_STATEMENT", "SEND_EMAIL"],
            "parameters": {"GENERATE_STATEMENT": {"format": "pdf"}}}"#;

        let resolved = resolve_reply(&catalog, "özetimi mail at", reply, fixed_now());

        let statement = resolved
            .actions
            .iter()
            .find(|a| a.code == STATEMENT_ACTION)
            .unwrap();
        assert_eq!(statement.parameters["emailFlag"], json!(true));
        assert!(resolved
            .actions
            .iter()
            .any(|a| a.code == EMAIL_ACTION));
    }

    #[test]
    fn corrected_json_is_spliced_into_the_narrative() {
        let catalog = ActionCatalog::standard();
        let reply = "Before text\n```json\n{\"selectedActions\": [\"CHECK_BALANCE\"]}\n```\nAfter text";

        let resolved = resolve_reply(&catalog, "bakiye", reply, fixed_now());

        assert!(resolved.text.starts_with("Before text\n```json"));
        assert!(resolved.text.ends_with("```\nAfter text"));
        assert!(resolved.text.contains("\"selectedActions\""));
        assert!(resolved.text.contains("CHECK_BALANCE"));
    }

    #[test]
    fn broken_json_routes_to_fallback() {
        let catalog = ActionCatalog::standard();
        let reply = r#"Sure. {"selectedActions": ["BLOCK_CARD",], "parameters": {,}}"#;

        let resolved = resolve_reply(&catalog, "kartımı kaybettim", reply, fixed_now());

        assert!(resolved.used_fallback);
        assert_eq!(resolved.actions[0].code, "BLOCK_CARD");
        assert_eq!(resolved.text, reply);
    }

    #[test]
    fn hopeless_reply_degrades_to_default_action() {
        let catalog = ActionCatalog::standard();

        let resolved = resolve_reply(&catalog, "merhaba", "I cannot help with that.", fixed_now());

        assert!(resolved.used_fallback);
        assert_eq!(resolved.actions[0].code, DEFAULT_ACTION);
    }

    #[test]
    fn absurd_relative_phrase_still_resolves() {
        let catalog = ActionCatalog::standard();
        let reply = r#"{"selectedActions": ["GENERATE_STATEMENT"]}"#;

        let resolved = resolve_reply(&catalog, "son 999999999 yıl özetimi gönder", reply, fixed_now());

        assert!(!resolved.used_fallback);
        let hint = resolved.date_range.unwrap();
        assert_eq!(hint.relative_days, crate::dates::DEFAULT_RELATIVE_DAYS);
        assert_eq!(resolved.actions[0].code, STATEMENT_ACTION);
    }

    #[test]
    fn over_escaped_payload_parses_on_retry() {
        let catalog = ActionCatalog::standard();
        let reply = r#"{\"selectedActions\": [\"CHECK_BALANCE\"]}"#;

        let resolved = resolve_reply(&catalog, "bakiye", reply, fixed_now());

        assert!(!resolved.used_fallback);
        assert_eq!(resolved.actions[0].code, "CHECK_BALANCE");
    }
}
