use redline::checker::GrammarChecker;
use redline::provider::{CheckError, GrammarProvider};
use redline::{Category, Config, CorrectionError, Span};
use std::fs;

/// Provider double returning a canned correction list, no network involved.
struct FakeProvider {
    corrections: Vec<CorrectionError>,
}

impl GrammarProvider for FakeProvider {
    fn check_text(&self, _text: &str) -> Result<Vec<CorrectionError>, CheckError> {
        Ok(self.corrections.clone())
    }
}

fn correction(start: i64, end: i64, original: &str, suggestion: &str, rule: &str) -> CorrectionError {
    CorrectionError {
        span: Span { start, end },
        category: Category::Spelling,
        rule: rule.to_string(),
        original: original.to_string(),
        suggestion: suggestion.to_string(),
        message: String::new(),
    }
}

#[test]
fn fix_auto_corrects_file_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("draft.txt");
    fs::write(&file, "This is a tset with speling errors.").unwrap();

    let provider = FakeProvider {
        corrections: vec![
            correction(10, 14, "tset", "test", "R:SPELL"),
            correction(20, 27, "speling", "spelling", "R:SPELL"),
        ],
    };

    let config = Config::default();
    let checker = GrammarChecker::new(Box::new(provider), &config).unwrap();
    let result = checker.fix_auto(&file, &config, false).unwrap();

    assert_eq!(result.fixed_count, 2);
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "This is a test with spelling errors."
    );
}

#[test]
fn fix_auto_leaves_file_untouched_when_nothing_applies() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("draft.txt");
    fs::write(&file, "All good here.").unwrap();

    let provider = FakeProvider {
        corrections: vec![],
    };

    let config = Config::default();
    let checker = GrammarChecker::new(Box::new(provider), &config).unwrap();
    let result = checker.fix_auto(&file, &config, false).unwrap();

    assert_eq!(result.fixed_count, 0);
    assert_eq!(fs::read_to_string(&file).unwrap(), "All good here.");
}

#[test]
fn ignored_rules_are_filtered_before_fixing() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("draft.txt");
    fs::write(&file, "This is a tset.").unwrap();

    let provider = FakeProvider {
        corrections: vec![correction(10, 14, "tset", "test", "R:STYLE_NIT")],
    };

    let config = Config {
        ignore_rules: vec!["R:STYLE.*".to_string()],
        ..Default::default()
    };
    let checker = GrammarChecker::new(Box::new(provider), &config).unwrap();
    let result = checker.fix_auto(&file, &config, false).unwrap();

    assert_eq!(result.fixed_count, 0);
    assert_eq!(fs::read_to_string(&file).unwrap(), "This is a tset.");
}
