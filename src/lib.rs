pub mod checker;
pub mod cli;
pub mod config;
pub mod provider;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use checker::GrammarChecker;
pub use config::Config;

/// Category of a flagged issue. The set is closed: new categories require a
/// code change, so style lookup is total by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Spelling,
    Grammar,
    Punctuation,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Spelling => write!(f, "spelling"),
            Category::Grammar => write!(f, "grammar"),
            Category::Punctuation => write!(f, "punctuation"),
        }
    }
}

/// Half-open character range `[start, end)` as reported by the grammar
/// provider. Signed because upstream responses can carry negative or
/// past-end offsets; `reconcile` clips these against the actual text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: i64,
    pub end: i64,
}

impl Span {
    /// Clamp into `[0, char_len]`. The result may be degenerate; `reconcile`
    /// filters those out.
    pub fn clip(self, char_len: usize) -> TextSpan {
        let len = char_len as i64;
        let start = self.start.clamp(0, len);
        let end = self.end.max(start).min(len);
        TextSpan {
            start: start as usize,
            end: end as usize,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Validated half-open character range over a specific text snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// One flagged issue from the grammar provider. Created fresh on every check
/// cycle, never mutated, superseded wholesale by the next check's results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionError {
    pub span: Span,
    pub category: Category,
    /// Provider rule id, used by the ignore-rule filter.
    pub rule: String,
    /// Text expected at the span; a mismatch indicates stale positions.
    pub original: String,
    /// Replacement text. Empty means the flagged text should be deleted.
    pub suggestion: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub error_count: usize,
    pub fixed_count: usize,
    pub annotations: checker::reconcile::AnnotationSet,
}
