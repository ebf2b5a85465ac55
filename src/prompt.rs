//! Composes the model instruction from the action catalog and the clock.
//!
//! The instruction spells out "now" explicitly because the model cannot be
//! trusted to infer the current date, and repeats every closed parameter
//! set with a single-choice rule so the reply stays machine-checkable.

use chrono::{Datelike, NaiveDateTime};

use crate::catalog::{ActionCatalog, ParameterTemplate};

/// Builds the full instruction string. Pure function of catalog + clock.
pub fn compose_instruction(catalog: &ActionCatalog, now: NaiveDateTime) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str("You are a financial operations assistant for a bank.\n");
    out.push_str(&format!(
        "The current year is {} and today's date is {}. \
         Use these values for any date reasoning; do not infer the current date yourself.\n\n",
        now.year(),
        now.format("%Y-%m-%d")
    ));

    out.push_str(
        "Classify the customer's request into one or more of the actions below. \
         Each action lists its parameters and their allowed values.\n\n\
         ### ACTIONS\n",
    );

    for action in catalog.iter() {
        out.push_str(&format!(
            "- {}: {} (e.g. \"{}\")\n",
            action.code, action.description, action.sample_prompt
        ));
        for (name, template) in &action.parameters {
            out.push_str(&format!("    {}: {}\n", name, template.render()));
        }
        for (name, template) in &action.parameters {
            if let ParameterTemplate::OneOf(alternatives) = template {
                out.push_str(&format!(
                    "    RULE for {}: choose exactly one of [{}], or use null. \
                     Never combine them and never invent other values.\n",
                    name,
                    alternatives.join(", ")
                ));
            }
        }
    }

    out.push_str(
        "\n### OUTPUT FORMAT\n\
         Return a JSON object with:\n\
         - \"selectedActions\": array of action codes from the list above\n\
         - \"parameters\": object keyed by action code, each value an object of that action's parameters\n\
         - \"dateRange\": optional hint object with \"startDate\", \"endDate\", \"isRelative\", \"relativeDays\"\n\
         Parameters marked ? are free-form and may be null or omitted.\n",
    );

    out
}
