use crate::checker::reconcile::{byte_offset, char_slice, Annotation};
use crate::checker::style::classify;
use crate::{Category, CheckResult, Config, TextSpan};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonAnnotation {
    file: String,
    start: usize,
    end: usize,
    category: Category,
    rule: String,
    original: String,
    suggestion: String,
    message: String,
    highlight: String,
    border: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonOutput {
    files_checked: usize,
    total_errors: usize,
    errors: Vec<JsonAnnotation>,
    warnings: Vec<String>,
}

pub fn print_annotations(
    file_path: &Path,
    text: &str,
    result: &CheckResult,
    colored_output: bool,
    format: &OutputFormat,
    config: &Config,
) {
    match format {
        OutputFormat::Text => {
            print_text_annotations(file_path, text, result, colored_output, config.context_chars)
        }
        OutputFormat::Json => print_json_annotations(file_path, result),
    }
}

fn print_text_annotations(
    file_path: &Path,
    text: &str,
    result: &CheckResult,
    colored_output: bool,
    context_chars: usize,
) {
    for warning in result.annotations.warnings() {
        eprintln!("Warning: {}: {}", file_path.display(), warning);
    }

    if result.annotations.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();

    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for annotation in result.annotations.iter() {
        let style = classify(annotation.category);
        let position = format!("{}..{}", annotation.span.start, annotation.span.end);

        if colored_output {
            println!(
                "  {} {} {}",
                position.blue().bold(),
                style.label.color(style.color).bold(),
                annotation.message
            );
            println!(
                "    {}",
                format_context(text, annotation.span, context_chars, Some(style.color))
            );
            if !annotation.suggestion.is_empty() {
                println!("    {} {}", "→".dimmed(), annotation.suggestion.green());
            } else {
                println!("    {} {}", "→".dimmed(), "(delete)".dimmed());
            }
        } else {
            println!("  {} {} {}", position, style.label, annotation.message);
            println!(
                "    {}",
                format_context(text, annotation.span, context_chars, None)
            );
            if !annotation.suggestion.is_empty() {
                println!("    → {}", annotation.suggestion);
            } else {
                println!("    → (delete)");
            }
        }
    }
}

fn print_json_annotations(file_path: &Path, result: &CheckResult) {
    let json_errors: Vec<JsonAnnotation> = result
        .annotations
        .iter()
        .map(|a| {
            let style = classify(a.category);
            JsonAnnotation {
                file: file_path.display().to_string(),
                start: a.span.start,
                end: a.span.end,
                category: a.category,
                rule: a.rule.clone(),
                original: a.original.clone(),
                suggestion: a.suggestion.clone(),
                message: a.message.clone(),
                highlight: style.highlight.to_string(),
                border: style.border.to_string(),
            }
        })
        .collect();

    let output = JsonOutput {
        files_checked: 1,
        total_errors: result.error_count,
        errors: json_errors,
        warnings: result
            .annotations
            .warnings()
            .iter()
            .map(|w| w.to_string())
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

/// Context line around a span: up to `context_chars` grapheme clusters on
/// each side, with the flagged text emphasized when a colour is given.
fn format_context(
    text: &str,
    span: TextSpan,
    context_chars: usize,
    color: Option<Color>,
) -> String {
    let (start, end) = match (byte_offset(text, span.start), byte_offset(text, span.end)) {
        (Some(start), Some(end)) => (start, end),
        _ => return String::new(),
    };

    let before: Vec<&str> = text[..start].graphemes(true).collect();
    let truncated_front = before.len() > context_chars;
    let prefix: String = before[before.len().saturating_sub(context_chars)..].concat();

    let after: Vec<&str> = text[end..].graphemes(true).collect();
    let truncated_back = after.len() > context_chars;
    let suffix: String = after[..after.len().min(context_chars)].concat();

    let marked = &text[start..end];
    let marked = match color {
        Some(color) => marked.color(color).bold().to_string(),
        None => format!("[{}]", marked),
    };

    format!(
        "\"{}{}{}{}{}\"",
        if truncated_front { "…" } else { "" },
        prefix.replace('\n', " "),
        marked,
        suffix.replace('\n', " "),
        if truncated_back { "…" } else { "" },
    )
}

pub fn print_check_summary(total_errors: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No issues found!".green().bold());
        } else {
            println!("✓ No issues found!");
        }
    } else {
        let issue_word = if total_errors == 1 { "issue" } else { "issues" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                issue_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        } else {
            println!(
                "✗ {} {} found in {} {}",
                total_errors,
                issue_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        }
    }
}

pub fn print_fix_summary(total_fixed: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_fixed == 0 {
        if colored {
            println!("{}", "No corrections needed!".green().bold());
        } else {
            println!("No corrections needed!");
        }
    } else {
        let fix_word = if total_fixed == 1 {
            "correction"
        } else {
            "corrections"
        };
        if colored {
            println!(
                "{} {} {} applied to {} {}",
                "✓".green().bold(),
                total_fixed.to_string().green().bold(),
                fix_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        } else {
            println!(
                "✓ {} {} applied to {} {}",
                total_fixed,
                fix_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        }
    }
}

/// What the user decided for one finding. `Quit` must not discard fixes
/// accepted earlier in the session, so it is returned to the caller
/// instead of terminating here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptChoice {
    Fix(String),
    Skip,
    Quit,
}

/// Prompt for one finding.
pub fn print_interactive_prompt(
    annotation: &Annotation,
    text: &str,
    context_chars: usize,
    colored: bool,
) -> PromptChoice {
    let style = classify(annotation.category);
    let flagged = char_slice(text, annotation.span).unwrap_or("");

    if colored {
        println!(
            "\n{} {}",
            format!("{} issue at", style.label).yellow().bold(),
            format!("{}..{}", annotation.span.start, annotation.span.end).blue()
        );
        println!(
            "  {}",
            format_context(text, annotation.span, context_chars, Some(style.color))
        );
        println!("  {}", annotation.message);
        if annotation.suggestion.is_empty() {
            println!("\n  [f] Delete \"{}\"", flagged);
        } else {
            println!("\n  [f] Replace with {}", annotation.suggestion.green());
        }
    } else {
        println!(
            "\n{} issue at {}..{}",
            style.label, annotation.span.start, annotation.span.end
        );
        println!(
            "  {}",
            format_context(text, annotation.span, context_chars, None)
        );
        println!("  {}", annotation.message);
        if annotation.suggestion.is_empty() {
            println!("\n  [f] Delete \"{}\"", flagged);
        } else {
            println!("\n  [f] Replace with {}", annotation.suggestion);
        }
    }
    println!("  [s] Skip");
    println!("  [q] Quit");

    print!("\nChoice: ");
    use std::io::{self, Write};
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return PromptChoice::Quit;
    }

    match input.trim() {
        "f" | "F" => PromptChoice::Fix(annotation.suggestion.clone()),
        "q" | "Q" => PromptChoice::Quit,
        _ => PromptChoice::Skip,
    }
}
