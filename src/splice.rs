//! Rewrites the JSON-bearing span of a model reply in place.

use std::ops::Range;

/// Replaces exactly `span` of `original` with `replacement`.
///
/// Pure textual substitution: every byte outside the span is carried over
/// unchanged, so fence markers and surrounding narrative survive. Callers
/// pass the span produced by the extractor; an out-of-bounds span returns
/// the original untouched rather than panicking.
pub fn splice(original: &str, span: Range<usize>, replacement: &str) -> String {
    if span.end > original.len() || span.start > span.end {
        return original.to_string();
    }
    if !original.is_char_boundary(span.start) || !original.is_char_boundary(span.end) {
        return original.to_string();
    }

    let mut out = String::with_capacity(original.len() - span.len() + replacement.len());
    out.push_str(&original[..span.start]);
    out.push_str(replacement);
    out.push_str(&original[span.end..]);
    out
}
