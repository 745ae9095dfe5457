use crate::Category;
use colored::Color;

/// Presentation tokens for one category: a label and terminal colour for
/// CLI output, plus the highlight/border fill pair downstream renderers use
/// for inline marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayStyle {
    pub label: &'static str,
    pub color: Color,
    pub highlight: &'static str,
    pub border: &'static str,
}

/// Map a category to its display style. Total over the closed category set.
pub fn classify(category: Category) -> DisplayStyle {
    match category {
        Category::Spelling => DisplayStyle {
            label: "Spelling",
            color: Color::Red,
            highlight: "#fecaca",
            border: "#ef4444",
        },
        Category::Grammar => DisplayStyle {
            label: "Grammar",
            color: Color::Yellow,
            highlight: "#fef3c7",
            border: "#f59e0b",
        },
        Category::Punctuation => DisplayStyle {
            label: "Punctuation",
            color: Color::Blue,
            highlight: "#dbeafe",
            border: "#3b82f6",
        },
    }
}
