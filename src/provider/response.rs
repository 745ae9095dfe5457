use crate::checker::reconcile::char_slice;
use crate::{Category, CorrectionError, Span};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed edits response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct EditsResponse {
    #[serde(default)]
    edits: Vec<RemoteEdit>,
}

/// One edit as the remote API reports it. `start`/`end` may be relative to
/// `sentence_start` or already absolute; fields other than the offsets are
/// optional in practice, so everything defaults.
#[derive(Debug, Deserialize)]
struct RemoteEdit {
    #[serde(default)]
    sentence_start: Option<i64>,
    start: i64,
    end: i64,
    #[serde(default)]
    replacement: String,
    #[serde(default)]
    error_type: String,
    #[serde(default)]
    general_error_type: String,
}

/// Parse a raw edits response into correction errors with absolute
/// document offsets. Malformed JSON fails here, at the boundary, so the
/// reconciler's inputs are always well-formed.
pub fn parse_response(body: &str, text: &str) -> Result<Vec<CorrectionError>, ParseError> {
    let response: EditsResponse = serde_json::from_str(body)?;
    Ok(response
        .edits
        .iter()
        .map(|edit| convert_edit(edit, text))
        .collect())
}

fn convert_edit(edit: &RemoteEdit, text: &str) -> CorrectionError {
    // Sentence-relative offsets come with a sentence base offset; without
    // one, start/end are taken as already absolute. Saturating add: a
    // hostile response with extreme offsets degrades into the clamp path
    // instead of overflowing.
    let (start, end) = match edit.sentence_start {
        Some(base) if base >= 0 => (
            base.saturating_add(edit.start),
            base.saturating_add(edit.end),
        ),
        _ => (edit.start, edit.end),
    };
    let span = Span { start, end };

    let category = classify_error_type(&edit.general_error_type, &edit.error_type);
    let rule = if edit.error_type.is_empty() {
        edit.general_error_type.clone()
    } else {
        edit.error_type.clone()
    };

    // Best-effort snapshot of the flagged characters, clipped the same way
    // the reconciler will clip the span.
    let original = char_slice(text, span.clip(text.chars().count()))
        .unwrap_or("")
        .to_string();

    let message = describe(category, &edit.replacement);

    CorrectionError {
        span,
        category,
        rule,
        original,
        suggestion: edit.replacement.clone(),
        message,
    }
}

/// Keyword classification of the provider's free-form type strings. The
/// general type is checked first as it is the more reliable of the two;
/// unknown types fall back to grammar.
fn classify_error_type(general_type: &str, specific_type: &str) -> Category {
    let general = general_type.to_lowercase();

    if general.contains("spelling") {
        return Category::Spelling;
    }
    if general.contains("punctuation") {
        return Category::Punctuation;
    }
    if general.contains("grammar") {
        return Category::Grammar;
    }

    let fallback = if general.is_empty() {
        specific_type.to_lowercase()
    } else {
        general
    };

    const SPELLING_HINTS: &[&str] = &["spell", "misspell", "typo", "word_choice"];
    const PUNCTUATION_HINTS: &[&str] = &[
        "punct",
        "comma",
        "period",
        "apostrophe",
        "quotation",
        "colon",
        "semicolon",
    ];

    if SPELLING_HINTS.iter().any(|hint| fallback.contains(hint)) {
        return Category::Spelling;
    }
    if PUNCTUATION_HINTS.iter().any(|hint| fallback.contains(hint)) {
        return Category::Punctuation;
    }

    Category::Grammar
}

fn describe(category: Category, replacement: &str) -> String {
    if replacement.is_empty() {
        return match category {
            Category::Spelling => "Spelling issue detected".to_string(),
            Category::Grammar => "Grammar issue detected".to_string(),
            Category::Punctuation => "Punctuation issue detected".to_string(),
        };
    }

    match category {
        Category::Spelling => format!("Spelling: \"{}\" may be the correct spelling", replacement),
        Category::Grammar => format!("Grammar: Consider changing to \"{}\"", replacement),
        Category::Punctuation => format!("Punctuation: Consider using \"{}\"", replacement),
    }
}
