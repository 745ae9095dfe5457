pub mod reconcile;
pub mod session;
pub mod style;

use crate::cli::output::{print_annotations, print_interactive_prompt, OutputFormat, PromptChoice};
use crate::provider::GrammarProvider;
use crate::{CheckResult, Config, CorrectionError};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reconcile::AnnotationSet;
use regex::Regex;
use std::fs;
use std::path::Path;

pub struct GrammarChecker {
    provider: Box<dyn GrammarProvider>,
    ignore_rules: Vec<Regex>,
}

impl GrammarChecker {
    pub fn new(provider: Box<dyn GrammarProvider>, config: &Config) -> Result<Self> {
        // Compile ignore rules
        let mut ignore_rules = Vec::new();
        for pattern in &config.ignore_rules {
            match Regex::new(pattern) {
                Ok(re) => ignore_rules.push(re),
                Err(e) => eprintln!("Warning: Invalid ignore rule '{}': {}", pattern, e),
            }
        }

        Ok(Self {
            provider,
            ignore_rules,
        })
    }

    pub fn check(
        &self,
        file_path: &Path,
        config: &Config,
        colored: bool,
        format: &OutputFormat,
    ) -> Result<CheckResult> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let annotations = self.annotate(&content, wants_spinner(colored, format))?;

        let result = CheckResult {
            error_count: annotations.len(),
            fixed_count: 0,
            annotations,
        };

        print_annotations(file_path, &content, &result, colored, format, config);

        Ok(result)
    }

    pub fn fix_auto(
        &self,
        file_path: &Path,
        _config: &Config,
        colored: bool,
    ) -> Result<CheckResult> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let annotations = self.annotate(&content, colored)?;
        let (new_content, fixed_count) = apply_all(&content, &annotations)?;

        if fixed_count > 0 {
            fs::write(file_path, new_content)
                .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
        }

        Ok(CheckResult {
            error_count: 0,
            fixed_count,
            annotations: AnnotationSet::default(),
        })
    }

    pub fn fix_interactive(
        &self,
        file_path: &Path,
        config: &Config,
        colored: bool,
    ) -> Result<CheckResult> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let annotations = self.annotate(&content, colored)?;

        let (new_content, fixed_count) = apply_choices(&content, &annotations, |annotation, text| {
            print_interactive_prompt(annotation, text, config.context_chars, colored)
        })?;

        if fixed_count > 0 {
            fs::write(file_path, new_content)
                .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
        }

        Ok(CheckResult {
            error_count: 0,
            fixed_count,
            annotations: AnnotationSet::default(),
        })
    }

    /// Run the provider over the content and reconcile its corrections
    /// into a validated annotation set.
    fn annotate(&self, content: &str, show_spinner: bool) -> Result<AnnotationSet> {
        let pb = if show_spinner {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                pb.set_style(style);
            }
            pb.set_message("Checking...");
            Some(pb)
        } else {
            None
        };

        let corrections = self.provider.check_text(content).map_err(|e| {
            let message = e.user_message();
            anyhow::Error::new(e).context(message)
        });

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        let corrections: Vec<CorrectionError> = corrections?
            .into_iter()
            .filter(|c| !self.should_ignore(&c.rule))
            .collect();

        Ok(reconcile::reconcile(content, &corrections))
    }

    fn should_ignore(&self, rule: &str) -> bool {
        self.ignore_rules.iter().any(|re| re.is_match(rule))
    }
}

/// Spinner frames would corrupt machine-readable output, so only the text
/// format gets one.
fn wants_spinner(colored: bool, format: &OutputFormat) -> bool {
    colored && matches!(format, OutputFormat::Text)
}

/// Walk the set in its descending-start order, asking `prompt` about each
/// entry whose original text still matches. Quitting stops the walk but
/// keeps everything accepted so far; the caller persists the result.
fn apply_choices(
    content: &str,
    annotations: &AnnotationSet,
    mut prompt: impl FnMut(&reconcile::Annotation, &str) -> PromptChoice,
) -> Result<(String, usize)> {
    let mut new_content = content.to_string();
    let mut fixed_count = 0;

    for annotation in annotations.iter() {
        match reconcile::char_slice(&new_content, annotation.span) {
            Some(current) if current == annotation.original => {}
            _ => continue,
        }

        match prompt(annotation, &new_content) {
            PromptChoice::Fix(replacement) => {
                new_content = reconcile::apply_fix(&new_content, annotation.span, &replacement)?;
                fixed_count += 1;
            }
            PromptChoice::Skip => {}
            PromptChoice::Quit => break,
        }
    }

    Ok((new_content, fixed_count))
}

/// Apply every suggestion in the set, skipping entries whose original text
/// no longer matches (overlapping spans degrade to first-applied-wins).
fn apply_all(content: &str, annotations: &AnnotationSet) -> Result<(String, usize)> {
    let mut new_content = content.to_string();
    let mut fixed_count = 0;

    for annotation in annotations.iter() {
        match reconcile::char_slice(&new_content, annotation.span) {
            Some(current) if current == annotation.original => {
                new_content =
                    reconcile::apply_fix(&new_content, annotation.span, &annotation.suggestion)?;
                fixed_count += 1;
            }
            _ => {}
        }
    }

    Ok((new_content, fixed_count))
}
