//! Immutable registry of the financial actions the resolver may select.
//!
//! The catalog is built once at process start and shared read-only across
//! requests. Parameter schemas are typed variants rather than embedded
//! template strings so validation and prompt emission work from the same
//! definition.

use serde::{Deserialize, Serialize};

/// Action substituted when nothing recognizable can be resolved.
pub const DEFAULT_ACTION: &str = "LOG_CUSTOMER_INTERACTION";
/// Action whose date range is always recomputed from the user's own words.
pub const STATEMENT_ACTION: &str = "GENERATE_STATEMENT";
/// Action that forces `emailFlag` on a co-selected statement action.
pub const EMAIL_ACTION: &str = "SEND_EMAIL";

/// Schema for a single action parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterTemplate {
    /// Free-form, optional value. Rendered as `?` in the prompt.
    FreeForm,
    /// Exactly one of the listed alternatives, or null. Rendered as
    /// `a|b|c` in the prompt.
    OneOf(Vec<String>),
}

impl ParameterTemplate {
    pub fn one_of(alternatives: &[&str]) -> Self {
        Self::OneOf(alternatives.iter().map(|a| a.to_string()).collect())
    }

    /// True when `value` satisfies this template.
    pub fn allows(&self, value: &str) -> bool {
        match self {
            Self::FreeForm => true,
            Self::OneOf(alternatives) => alternatives.iter().any(|a| a == value),
        }
    }

    /// Renders the template the way it appears in the model instruction.
    pub fn render(&self) -> String {
        match self {
            Self::FreeForm => "?".to_string(),
            Self::OneOf(alternatives) => alternatives.join("|"),
        }
    }
}

/// One entry of the action catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTypeDefinition {
    pub code: String,
    pub description: String,
    pub sample_prompt: String,
    /// Ordered parameter schema. Order is preserved for prompt emission.
    pub parameters: Vec<(String, ParameterTemplate)>,
}

impl ActionTypeDefinition {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        sample_prompt: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            sample_prompt: sample_prompt.into(),
            parameters: Vec::new(),
        }
    }

    /// Adds a free-form parameter.
    pub fn free(mut self, name: impl Into<String>) -> Self {
        self.parameters.push((name.into(), ParameterTemplate::FreeForm));
        self
    }

    /// Adds a closed-set parameter.
    pub fn one_of(mut self, name: impl Into<String>, alternatives: &[&str]) -> Self {
        self.parameters
            .push((name.into(), ParameterTemplate::one_of(alternatives)));
        self
    }

    pub fn template(&self, name: &str) -> Option<&ParameterTemplate> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }
}

/// The full set of resolvable actions, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    actions: Vec<ActionTypeDefinition>,
}

impl ActionCatalog {
    pub fn new(actions: Vec<ActionTypeDefinition>) -> Self {
        Self { actions }
    }

    pub fn get(&self, code: &str) -> Option<&ActionTypeDefinition> {
        self.actions.iter().find(|a| a.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Iterates definitions in insertion order, so composed prompts are
    /// deterministic across requests.
    pub fn iter(&self) -> impl Iterator<Item = &ActionTypeDefinition> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The production catalog of supported financial actions.
    pub fn standard() -> Self {
        let actions = vec![
            ActionTypeDefinition::new(
                STATEMENT_ACTION,
                "Generate an account statement for a date range",
                "Send me my account activity for the last 3 months",
            )
            .free("accountNumber")
            .free("startDate")
            .free("endDate")
            .one_of("direction", &["in", "out"])
            .one_of("format", &["pdf", "csv", "excel"])
            .free("emailFlag"),
            ActionTypeDefinition::new(
                EMAIL_ACTION,
                "Send an email to the customer, optionally with an attachment",
                "Email my statement to me",
            )
            .free("recipient")
            .free("subject")
            .one_of("attachmentType", &["statement", "receipt", "none"]),
            ActionTypeDefinition::new(
                "SEND_PAYMENT_REMINDER",
                "Remind the customer of an upcoming or overdue payment",
                "Remind me about my credit card payment",
            )
            .free("accountNumber")
            .free("dueDate")
            .one_of("channel", &["sms", "email", "push"]),
            ActionTypeDefinition::new(
                "TRANSFER_FUNDS",
                "Transfer money between accounts or to a payee",
                "Transfer 500 to my savings account",
            )
            .free("fromAccount")
            .free("toAccount")
            .free("amount")
            .one_of("currency", &["TRY", "USD", "EUR"])
            .one_of("schedule", &["now", "scheduled"]),
            ActionTypeDefinition::new(
                "BLOCK_CARD",
                "Block a debit or credit card",
                "My card was stolen, block it immediately",
            )
            .free("cardNumber")
            .one_of("reason", &["lost", "stolen", "fraud", "damaged"])
            .free("permanent"),
            ActionTypeDefinition::new(
                "UNBLOCK_CARD",
                "Lift a block from a previously blocked card",
                "I found my card, unblock it",
            )
            .free("cardNumber"),
            ActionTypeDefinition::new(
                "REPLACE_CARD",
                "Issue a replacement card",
                "Send me a new card, mine is broken",
            )
            .free("cardNumber")
            .one_of("delivery", &["branch", "mail"]),
            ActionTypeDefinition::new(
                "INCREASE_CARD_LIMIT",
                "Request a higher card limit",
                "Raise my card limit to 20000",
            )
            .free("cardNumber")
            .free("requestedLimit"),
            ActionTypeDefinition::new(
                "UPDATE_CONTACT_INFO",
                "Update the customer's contact details",
                "Change my phone number",
            )
            .one_of("field", &["phone", "email", "address"])
            .free("newValue"),
            ActionTypeDefinition::new(
                "OPEN_ACCOUNT",
                "Open a new account for the customer",
                "I want to open a savings account in euros",
            )
            .one_of("accountType", &["checking", "savings", "deposit"])
            .one_of("currency", &["TRY", "USD", "EUR"]),
            ActionTypeDefinition::new(
                "CLOSE_ACCOUNT",
                "Close an existing account",
                "Close my old checking account",
            )
            .free("accountNumber")
            .free("reason"),
            ActionTypeDefinition::new(
                "SCHEDULE_PAYMENT",
                "Schedule a one-off or recurring payment",
                "Pay my electricity bill every month",
            )
            .free("payee")
            .free("amount")
            .free("date")
            .one_of("recurrence", &["once", "weekly", "monthly"]),
            ActionTypeDefinition::new(
                "CANCEL_PAYMENT",
                "Cancel a scheduled payment",
                "Cancel tomorrow's rent payment",
            )
            .free("paymentId"),
            ActionTypeDefinition::new(
                "CHECK_BALANCE",
                "Report the current balance of an account",
                "How much money do I have?",
            )
            .free("accountNumber"),
            ActionTypeDefinition::new(
                "LIST_TRANSACTIONS",
                "List recent transactions on an account",
                "Show my last 10 purchases",
            )
            .free("accountNumber")
            .one_of("direction", &["in", "out"])
            .free("count"),
            ActionTypeDefinition::new(
                "SET_TRAVEL_NOTICE",
                "Register a travel notice so card usage abroad is not flagged",
                "I'm travelling to Germany next week",
            )
            .free("country")
            .free("startDate")
            .free("endDate"),
            ActionTypeDefinition::new(
                "ORDER_CHECKBOOK",
                "Order a new checkbook",
                "I need a new checkbook",
            )
            .free("accountNumber")
            .one_of("leaves", &["25", "50", "100"]),
            ActionTypeDefinition::new(
                "DISPUTE_TRANSACTION",
                "Open a dispute for a transaction",
                "I didn't make this purchase, dispute it",
            )
            .free("transactionId")
            .one_of("reason", &["unauthorized", "duplicate", "amount_mismatch"]),
            ActionTypeDefinition::new(
                "CREATE_SUPPORT_TICKET",
                "Open a support ticket for a request no other action covers",
                "I have a problem with the mobile app",
            )
            .free("topic")
            .one_of("priority", &["low", "medium", "high"]),
            ActionTypeDefinition::new(
                DEFAULT_ACTION,
                "Record the interaction when no concrete action applies",
                "Thanks for the help",
            )
            .free("note"),
        ];
        Self::new(actions)
    }
}
