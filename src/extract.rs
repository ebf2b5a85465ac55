//! Pulls a JSON payload out of arbitrary model prose.
//!
//! The extractor returns both the candidate text and its byte span in the
//! original reply, so the splicer can later replace exactly that span
//! without repeating the search.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// A candidate JSON payload located inside a larger reply.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBlock {
    /// The candidate JSON text.
    pub text: String,
    /// Byte range of the candidate within the original reply. For fenced
    /// blocks this is the fence interior, so the markers survive splicing.
    pub span: Range<usize>,
}

const FENCE: &str = "```";

/// Matches the opening tag of a json-labelled fence. Models vary the
/// casing and sometimes pad the tag, so ```JSON and ``` json count too.
fn fence_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)```[ \t]*json").expect("fence tag pattern is valid"))
}

/// Locates the JSON-bearing span of a model reply.
///
/// Priority: the interior of a ```json fence, otherwise the span from the
/// first `{` to the last `}`. Returns `None` when no brace pair exists.
/// Never panics, whatever the input looks like.
pub fn extract_json_block(reply: &str) -> Option<JsonBlock> {
    if let Some(block) = fenced_block(reply) {
        return Some(block);
    }
    brace_block(reply)
}

fn fenced_block(reply: &str) -> Option<JsonBlock> {
    let tag = fence_tag_pattern().find(reply)?;
    let interior_start = tag.end();
    let rest = &reply[interior_start..];
    let interior_len = rest.find(FENCE)?;
    let span = interior_start..interior_start + interior_len;
    Some(JsonBlock {
        text: reply[span.clone()].trim().to_string(),
        span,
    })
}

fn brace_block(reply: &str) -> Option<JsonBlock> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    let span = start..end + 1;
    Some(JsonBlock {
        text: reply[span.clone()].to_string(),
        span,
    })
}

/// Repairs payloads the model double-encoded: literal `\"`, `\n` and `\t`
/// sequences where the characters themselves were meant. Applied by the
/// orchestrator only after the raw candidate fails to parse, since a valid
/// payload may legitimately contain escaped newlines inside strings.
pub fn unescape_over_encoded(text: &str) -> String {
    text.replace("\\\"", "\"")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}
