//! Wire-facing types of the resolver pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One action the model selected, with its (sanitized) parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedAction {
    pub code: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl ParsedAction {
    pub fn bare(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            parameters: Map::new(),
        }
    }
}

/// Inbound request, as handed over by the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Raw user utterance. Required, non-blank.
    pub content: String,
    /// Extra guidance appended to the composed instruction when present.
    #[serde(default)]
    pub special_prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Required customer lookup key.
    pub customer_identifier: String,
}

impl AnalysisRequest {
    pub fn new(content: impl Into<String>, customer_identifier: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            special_prompt: None,
            model: None,
            max_tokens: None,
            temperature: None,
            customer_identifier: customer_identifier.into(),
        }
    }
}

/// Result returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Model narrative with the corrected JSON block spliced in.
    pub content: String,
    pub original_content: String,
    /// Ordered, never empty.
    pub finance_action_types: Vec<String>,
    pub customer: String,
}

/// Top-level date hint mirrored alongside statement parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateRangeHint {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_relative: bool,
    pub relative_days: i64,
}

/// The JSON shape the model is instructed to produce.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplyPayload {
    pub selected_actions: Vec<String>,
    /// Parameter maps keyed by action code.
    pub parameters: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRangeHint>,
}

/// Flat customer record from the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl CustomerRecord {
    /// Summary line carried into the result.
    pub fn summary(&self) -> String {
        format!("{} {} <{}>", self.first_name, self.last_name, self.email)
    }
}

/// Outbound tuple for the model-client collaborator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub content: String,
    pub special_prompt: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_summary_format() {
        let customer = CustomerRecord {
            id: "c-42".into(),
            first_name: "Ayşe".into(),
            last_name: "Demir".into(),
            email: "ayse.demir@example.com".into(),
        };
        assert_eq!(customer.summary(), "Ayşe Demir <ayse.demir@example.com>");
    }

    #[test]
    fn reply_payload_tolerates_missing_fields() {
        let payload: ReplyPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.selected_actions.is_empty());
        assert!(payload.parameters.is_empty());
        assert!(payload.date_range.is_none());
    }

    #[test]
    fn analysis_result_serializes_wire_names() {
        let result = AnalysisResult {
            content: "text".into(),
            original_content: "orig".into(),
            finance_action_types: vec!["CHECK_BALANCE".into()],
            customer: "A B <a@b>".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("originalContent").is_some());
        assert!(json.get("financeActionTypes").is_some());
        assert!(json.get("customer").is_some());
    }
}
