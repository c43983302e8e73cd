use serde_json::Value;

use super::{MAX_FOLLOWUPS, Verdict};

/// Reply prefix for an acceptable answer.
pub const ADEQUATE_MARKER: &str = "ADEQUATE";
/// Reply prefix for an answer that needs clarification.
pub const FOLLOWUP_MARKER: &str = "NEEDS_FOLLOWUP";

/// Interpret a raw model reply.
///
/// Anything that is not clearly a follow-up request counts as adequate.
#[must_use]
pub fn parse_verdict(raw: &str) -> Verdict {
    let text = raw.trim();
    if text.starts_with(ADEQUATE_MARKER) {
        return Verdict::Adequate;
    }
    let Some(rest) = text.strip_prefix(FOLLOWUP_MARKER) else {
        return Verdict::Adequate;
    };

    match parse_question_list(rest) {
        Some(questions) => Verdict::needs_followup(questions),
        None => Verdict::needs_followup(extract_questions(text)),
    }
}

/// Parse the text after the marker as a JSON list.
///
/// `None` means the text is not JSON at all. A JSON value that is not a list
/// yields an empty list.
fn parse_question_list(rest: &str) -> Option<Vec<String>> {
    let body = strip_code_fence(rest.trim().trim_start_matches(':').trim());
    let value: Value = serde_json::from_str(body).ok()?;
    let Value::Array(items) = value else {
        return Some(Vec::new());
    };
    Some(
        items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
    )
}

fn strip_code_fence(body: &str) -> &str {
    let Some(inner) = body.strip_prefix("```") else {
        return body;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Line-based fallback: keep lines after the first that contain a question
/// mark, with list punctuation and quotes stripped.
fn extract_questions(text: &str) -> Vec<String> {
    text.lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| line.contains('?'))
        .map(|line| line.trim_matches(|c: char| matches!(c, '-' | '"' | '[' | ']' | ',' | ' ')))
        .filter(|line| !line.is_empty())
        .take(MAX_FOLLOWUPS)
        .map(str::to_owned)
        .collect()
}
