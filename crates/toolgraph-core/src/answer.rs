//! Answer Extraction
//!
//! Strips the Problem / Thought / Action scaffolding from the final
//! assistant turn. The raw text is always a valid fallback.

use once_cell::sync::Lazy;
use regex::Regex;

static ANSWER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bAnswer\s*[:：]|回答\s*[:：]").expect("Invalid regex"));

static ANSWER_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:Problem|Thought|Action)\s*[:：]|(?:问题|思考|行动)\s*[:：]")
        .expect("Invalid regex")
});

/// Return the text of the answer section, or the whole text if there is none.
///
/// An answer that itself carries an answer label is narrowed again, so the
/// result never contains a non-empty labelled answer span.
pub fn extract_answer(text: &str) -> String {
    let mut current = text;
    // Each pass yields a strictly shorter slice
    while let Some(answer) = answer_span(current) {
        if answer == current {
            break;
        }
        current = answer;
    }
    current.to_string()
}

fn answer_span(text: &str) -> Option<&str> {
    let marker = ANSWER_MARKER.find(text)?;
    let rest = &text[marker.end()..];
    let end = ANSWER_END.find(rest).map_or(rest.len(), |m| m.start());
    let answer = rest[..end].trim();
    (!answer.is_empty()).then_some(answer)
}
