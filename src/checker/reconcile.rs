use crate::{Category, CorrectionError, Span, TextSpan};
use std::fmt;
use thiserror::Error;

/// A validated, render-ready entry: its span is in bounds and non-degenerate
/// for the text it was reconciled against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub span: TextSpan,
    pub category: Category,
    pub rule: String,
    pub original: String,
    pub suggestion: String,
    pub message: String,
}

impl From<&Annotation> for CorrectionError {
    fn from(annotation: &Annotation) -> Self {
        CorrectionError {
            span: Span {
                start: annotation.span.start as i64,
                end: annotation.span.end as i64,
            },
            category: annotation.category,
            rule: annotation.rule.clone(),
            original: annotation.original.clone(),
            suggestion: annotation.suggestion.clone(),
            message: annotation.message.clone(),
        }
    }
}

/// Non-fatal validation findings recorded while reconciling. `index` refers
/// to the position of the offending entry in the input list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanWarning {
    /// The raw span fell outside the text and was clipped, but survived
    /// non-degenerate and is still present in the output.
    Clipped {
        index: usize,
        raw: Span,
        clipped: TextSpan,
    },
    /// The span was degenerate after clipping and was dropped.
    Discarded { index: usize, raw: Span },
}

impl fmt::Display for SpanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanWarning::Clipped {
                index,
                raw,
                clipped,
            } => write!(
                f,
                "entry {}: span {} is out of bounds, clipped to {}",
                index, raw, clipped
            ),
            SpanWarning::Discarded { index, raw } => write!(
                f,
                "entry {}: span {} is empty after clipping, discarded",
                index, raw
            ),
        }
    }
}

/// The reconciled view of one check cycle: entries sorted by descending
/// start so that sequential position-shifting operations (highlight marks,
/// fix splices) never invalidate a span that has not been processed yet.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    entries: Vec<Annotation>,
    warnings: Vec<SpanWarning>,
}

impl AnnotationSet {
    pub fn entries(&self) -> &[Annotation] {
        &self.entries
    }

    pub fn warnings(&self) -> &[SpanWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.entries.iter()
    }
}

/// Validate a batch of correction errors against a text snapshot.
///
/// Spans are clipped into `[0, char_len]`; entries that end up degenerate
/// are dropped with a warning, clipped survivors are kept with a warning.
/// Surviving entries are stably sorted by descending start, so ties keep
/// their input order. Malformed input never fails: bad entries degrade by
/// omission.
pub fn reconcile(text: &str, errors: &[CorrectionError]) -> AnnotationSet {
    let char_len = text.chars().count();
    let mut entries = Vec::with_capacity(errors.len());
    let mut warnings = Vec::new();

    for (index, error) in errors.iter().enumerate() {
        let clipped = error.span.clip(char_len);

        if clipped.is_empty() {
            warnings.push(SpanWarning::Discarded {
                index,
                raw: error.span,
            });
            continue;
        }

        if error.span.start != clipped.start as i64 || error.span.end != clipped.end as i64 {
            warnings.push(SpanWarning::Clipped {
                index,
                raw: error.span,
                clipped,
            });
        }

        entries.push(Annotation {
            span: clipped,
            category: error.category,
            rule: error.rule.clone(),
            original: error.original.clone(),
            suggestion: error.suggestion.clone(),
            message: error.message.clone(),
        });
    }

    // Stable sort: entries sharing a start keep their input order.
    entries.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    AnnotationSet { entries, warnings }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixError {
    #[error("span {span} is out of bounds for text of {char_len} characters")]
    OutOfBounds { span: TextSpan, char_len: usize },
    #[error("span {span} is empty and cannot be applied")]
    Degenerate { span: TextSpan },
}

/// Splice `replacement` over `span`, returning the new text.
///
/// Pure: the input text is untouched. The span must be valid for `text`,
/// as produced by `reconcile`; anything else is caller misuse and fails.
/// Offsets at or after `span.start` in other pending annotations are stale
/// after this returns, so callers re-run the check instead of patching.
pub fn apply_fix(text: &str, span: TextSpan, replacement: &str) -> Result<String, FixError> {
    if span.end < span.start {
        return Err(FixError::OutOfBounds {
            span,
            char_len: text.chars().count(),
        });
    }
    if span.is_empty() {
        return Err(FixError::Degenerate { span });
    }

    let (start, end) = match (byte_offset(text, span.start), byte_offset(text, span.end)) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(FixError::OutOfBounds {
                span,
                char_len: text.chars().count(),
            })
        }
    };

    let mut result = String::with_capacity(text.len() - (end - start) + replacement.len());
    result.push_str(&text[..start]);
    result.push_str(replacement);
    result.push_str(&text[end..]);
    Ok(result)
}

/// The text covered by `span`, or `None` if the span is out of bounds.
pub fn char_slice(text: &str, span: TextSpan) -> Option<&str> {
    if span.end < span.start {
        return None;
    }
    let start = byte_offset(text, span.start)?;
    let end = byte_offset(text, span.end)?;
    Some(&text[start..end])
}

/// Byte offset of the `chars`-th character boundary. `chars` equal to the
/// character count maps to `text.len()`.
pub(crate) fn byte_offset(text: &str, chars: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(start: i64, end: i64, original: &str, suggestion: &str) -> CorrectionError {
        CorrectionError {
            span: Span { start, end },
            category: Category::Spelling,
            rule: "SPELL".to_string(),
            original: original.to_string(),
            suggestion: suggestion.to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn in_bounds_entry_passes_through() {
        let text = "This is a tset with speling errors.";
        let set = reconcile(text, &[error(10, 14, "tset", "test")]);

        assert_eq!(set.len(), 1);
        assert!(set.warnings().is_empty());
        let entry = &set.entries()[0];
        assert_eq!(entry.span, TextSpan { start: 10, end: 14 });
        assert_eq!(char_slice(text, entry.span), Some("tset"));
    }

    #[test]
    fn sorts_by_descending_start() {
        let text = "This is a tset with speling errors.";
        let set = reconcile(
            text,
            &[
                error(10, 14, "tset", "test"),
                error(20, 27, "speling", "spelling"),
            ],
        );

        assert_eq!(set.len(), 2);
        assert_eq!(set.entries()[0].span.start, 20);
        assert_eq!(set.entries()[1].span.start, 10);
    }

    #[test]
    fn ties_keep_input_order() {
        let text = "hello world";
        let set = reconcile(
            text,
            &[
                error(0, 5, "hello", "first"),
                error(6, 11, "world", "mid"),
                error(0, 3, "hel", "second"),
            ],
        );

        let suggestions: Vec<_> = set.iter().map(|a| a.suggestion.as_str()).collect();
        assert_eq!(suggestions, vec!["mid", "first", "second"]);
    }

    #[test]
    fn negative_start_is_clipped_and_kept() {
        let set = reconcile("short", &[error(-1, 5, "", "")]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.entries()[0].span, TextSpan { start: 0, end: 5 });
        assert_eq!(
            set.warnings(),
            &[SpanWarning::Clipped {
                index: 0,
                raw: Span { start: -1, end: 5 },
                clipped: TextSpan { start: 0, end: 5 },
            }]
        );
    }

    #[test]
    fn past_end_span_clips_to_degenerate_and_is_discarded() {
        let set = reconcile("short", &[error(5, 100, "", "")]);

        assert!(set.is_empty());
        assert_eq!(
            set.warnings(),
            &[SpanWarning::Discarded {
                index: 0,
                raw: Span { start: 5, end: 100 },
            }]
        );
    }

    #[test]
    fn degenerate_span_is_discarded() {
        let set = reconcile("hello", &[error(2, 2, "", "x")]);
        assert!(set.is_empty());
        assert_eq!(set.warnings().len(), 1);
    }

    #[test]
    fn inverted_span_is_discarded() {
        let set = reconcile("hello", &[error(4, 1, "", "x")]);
        assert!(set.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_set_without_warnings() {
        let set = reconcile("any text at all", &[]);
        assert!(set.is_empty());
        assert!(set.warnings().is_empty());
    }

    #[test]
    fn empty_text_discards_everything() {
        let set = reconcile("", &[error(0, 4, "te", "x"), error(3, 9, "st", "y")]);
        assert!(set.is_empty());
        assert_eq!(set.warnings().len(), 2);
    }

    #[test]
    fn overlapping_spans_pass_through_unmerged() {
        let text = "overlapping text";
        let set = reconcile(text, &[error(0, 11, "", "a"), error(5, 11, "", "b")]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.entries()[0].span.start, 5);
        assert_eq!(set.entries()[1].span.start, 0);
    }

    #[test]
    fn refeeding_output_is_idempotent() {
        let text = "This is a tset with speling errors.";
        let first = reconcile(
            text,
            &[
                error(10, 14, "tset", "test"),
                error(-3, 2, "Th", "th"),
                error(20, 27, "speling", "spelling"),
                error(35, 99, "", ""),
            ],
        );

        let refed: Vec<CorrectionError> = first.iter().map(CorrectionError::from).collect();
        let second = reconcile(text, &refed);

        assert_eq!(second.entries(), first.entries());
        assert!(second.warnings().is_empty());
    }

    #[test]
    fn apply_fix_splices_replacement() {
        let text = "This is a tset with speling errors.";
        let fixed = apply_fix(text, TextSpan { start: 20, end: 27 }, "spelling").unwrap();
        assert_eq!(fixed, "This is a tset with spelling errors.");
        let fixed = apply_fix(&fixed, TextSpan { start: 10, end: 14 }, "test").unwrap();
        assert_eq!(fixed, "This is a test with spelling errors.");
    }

    #[test]
    fn apply_fix_preserves_prefix_and_suffix() {
        let text = "abcdefgh";
        let span = TextSpan { start: 2, end: 5 };
        let fixed = apply_fix(text, span, "XY").unwrap();

        assert_eq!(fixed, "abXYfgh");
        assert_eq!(
            fixed.chars().count(),
            text.chars().count() - span.len() + "XY".chars().count()
        );
        assert_eq!(&fixed[..2], &text[..2]);
        assert_eq!(&fixed[4..], &text[5..]);
    }

    #[test]
    fn apply_fix_supports_deletion() {
        let fixed = apply_fix("one  two", TextSpan { start: 3, end: 4 }, "").unwrap();
        assert_eq!(fixed, "one two");
    }

    #[test]
    fn apply_fix_handles_multibyte_text() {
        // Offsets are character offsets, not byte offsets.
        let text = "héllo wörld";
        let fixed = apply_fix(text, TextSpan { start: 6, end: 11 }, "monde").unwrap();
        assert_eq!(fixed, "héllo monde");
    }

    #[test]
    fn apply_fix_rejects_out_of_bounds_span() {
        let err = apply_fix("short", TextSpan { start: 3, end: 10 }, "x").unwrap_err();
        assert!(matches!(err, FixError::OutOfBounds { .. }));
    }

    #[test]
    fn apply_fix_rejects_degenerate_span() {
        let err = apply_fix("short", TextSpan { start: 2, end: 2 }, "x").unwrap_err();
        assert!(matches!(err, FixError::Degenerate { .. }));
    }

    #[test]
    fn char_slice_matches_char_offsets() {
        assert_eq!(char_slice("héllo", TextSpan { start: 1, end: 3 }), Some("él"));
        assert_eq!(char_slice("héllo", TextSpan { start: 0, end: 5 }), Some("héllo"));
        assert_eq!(char_slice("héllo", TextSpan { start: 0, end: 6 }), None);
    }
}
