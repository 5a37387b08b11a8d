// src/validate/mod.rs
// =============================================================================
// Structural and content validation.
//
// Levels run in order and all of them always run:
//   0 syntax       encoding, line endings, parseable entries, URL syntax
//   1 structure    title, description, section names, link format, order
//   2 content      descriptions, required fields, duplicates
//   3 anti-pattern registry of known failure modes
//   4 extended     extension fields against their declared types
//
// A level "passes" when it produces no error-severity issue and every level
// below it passed too. Nothing here performs I/O and nothing here fails:
// malformed input only ever turns into more issues.
// =============================================================================

mod anti_patterns;
mod content;
mod extended;
mod structure;
mod syntax;

use tracing::debug;

use crate::config::ValidatorConfig;
use crate::diagnostics::{Severity, ValidationIssue, ValidationLevel};
use crate::model::Document;

pub use anti_patterns::{rules, AntiPatternRule, Finding};

type LevelCheck = fn(&Document, &ValidatorConfig) -> Vec<ValidationIssue>;

const LEVELS: [(ValidationLevel, LevelCheck); 5] = [
    (ValidationLevel::Syntax, syntax::check),
    (ValidationLevel::Structure, structure::check),
    (ValidationLevel::Content, content::check),
    (ValidationLevel::AntiPattern, anti_patterns::check),
    (ValidationLevel::Extended, extended::check),
];

/// Everything the validator found.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    /// Issues in level order, then document order within a level.
    pub issues: Vec<ValidationIssue>,
    /// Highest level (0-4) passed along with all levels below it.
    pub highest_level_passed: Option<u8>,
}

/// Runs every validation level against a document.
pub fn validate(doc: &Document, config: &ValidatorConfig) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    let mut gate_open = true;

    for (level, check) in LEVELS {
        let found = check(doc, config);
        let errors = found
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
            .count();

        debug!(level = ?level, issues = found.len(), errors, "validation level finished");

        if gate_open && errors == 0 {
            outcome.highest_level_passed = level.number();
        } else {
            gate_open = false;
        }
        outcome.issues.extend(found);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;
    use crate::parse::{parse, ParseOptions};

    fn outcome_for(text: &str) -> ValidationOutcome {
        let doc = parse(text.as_bytes(), &ParseOptions::default()).unwrap();
        validate(&doc, &ValidatorConfig::default())
    }

    #[test]
    fn test_malformed_input_collects_issues_from_every_level() {
        let outcome = outcome_for("- [broken](https://x.example\nsome prose\n");
        let levels: Vec<_> = outcome.issues.iter().map(|i| i.level).collect();
        assert!(levels.contains(&ValidationLevel::Syntax));
        assert!(levels.contains(&ValidationLevel::Structure));
        assert!(levels.contains(&ValidationLevel::AntiPattern));
        assert!(levels.contains(&ValidationLevel::Extended));
        assert_eq!(outcome.highest_level_passed, None);
    }

    #[test]
    fn test_issues_are_in_level_order() {
        let outcome = outcome_for("- [broken](https://x.example\n");
        let numbers: Vec<_> = outcome.issues.iter().filter_map(|i| i.level.number()).collect();
        let mut sorted = numbers.clone();
        sorted.sort();
        assert_eq!(numbers, sorted);
    }

    #[test]
    fn test_structure_error_caps_passed_level_at_syntax() {
        let outcome = outcome_for("## Docs\n- [a](https://a.example): A page about a thing\n");
        assert!(outcome.issues.iter().any(|i| i.code == DiagnosticCode::NoH1Title));
        assert_eq!(outcome.highest_level_passed, Some(0));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let text = "# T\n## Docs\n- [a](https://a.example)\n- [a](https://a.example)\n## Docs\n";
        assert_eq!(outcome_for(text).issues, outcome_for(text).issues);
    }
}
