// src/validate/extended.rs
// =============================================================================
// Level 4: extended schema.
//
// Checks the optional extension fields against their declared types:
//   entries   kind (known tag), priority (integer 0-100), no unknown keys
//   concepts  identifiers and relationship targets are slugs, pages are URLs
//   examples  identifiers are slugs, sources are URLs
// and notes when the document carries no concepts or no examples at all.
// =============================================================================

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ValidatorConfig;
use crate::diagnostics::{DiagnosticCode, ValidationIssue, ValidationLevel};
use crate::model::{Document, Entry};

const LEVEL: ValidationLevel = ValidationLevel::Extended;

const ENTRY_KEYS: [&str; 2] = ["kind", "priority"];
const PRIORITY_RANGE: std::ops::RangeInclusive<i64> = 0..=100;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:-]*$").expect("identifier pattern is valid"));

pub(super) fn check(doc: &Document, _config: &ValidatorConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for entry in doc.entries() {
        check_entry(entry, &mut issues);
    }

    let mut concepts = doc.concepts().peekable();
    if concepts.peek().is_none() {
        issues.push(ValidationIssue::from_code(DiagnosticCode::NoConceptDefinitions, LEVEL));
    }
    for concept in concepts {
        let line = concept.line;
        check_identifier("concept id", &concept.id, &concept.id, line, &mut issues);
        for (relation, target) in concept.relationships() {
            check_identifier(relation.as_str(), &concept.id, target, line, &mut issues);
        }
        for page in &concept.pages {
            check_page("pages", &concept.id, page, line, &mut issues);
        }
    }

    let mut examples = doc.examples().peekable();
    if examples.peek().is_none() {
        issues.push(ValidationIssue::from_code(DiagnosticCode::NoFewShotExamples, LEVEL));
    }
    for example in examples {
        let line = example.line;
        check_identifier("example id", &example.id, &example.id, line, &mut issues);
        for concept in &example.relevant_concepts {
            check_identifier("concepts", &example.id, concept, line, &mut issues);
        }
        for page in &example.source_pages {
            check_page("sources", &example.id, page, line, &mut issues);
        }
    }

    issues
}

fn check_entry(entry: &Entry, issues: &mut Vec<ValidationIssue>) {
    let invalid = |field: &str, message: String| {
        ValidationIssue::new(DiagnosticCode::InvalidExtensionField, LEVEL, message)
            .at_line(entry.line)
            .with_source(entry.locator())
            .with_target(field)
    };

    if let Some(kind) = entry.kind.as_ref().filter(|k| !k.is_known()) {
        issues.push(invalid("kind", format!("Unknown entry kind '{kind}'.")));
    }

    match (entry.priority, entry.attributes.get("priority")) {
        (Some(priority), _) if !PRIORITY_RANGE.contains(&priority) => issues.push(invalid(
            "priority",
            format!("Priority {priority} is outside 0-100."),
        )),
        (None, Some(raw)) => issues.push(invalid(
            "priority",
            format!("Priority '{raw}' is not an integer."),
        )),
        _ => {}
    }

    for key in entry.attributes.keys() {
        if !ENTRY_KEYS.contains(&key.as_str()) {
            issues.push(invalid(key.as_str(), format!("Unknown entry field '{key}'.")));
        }
    }
}

fn check_identifier(
    field: &str,
    owner: &str,
    value: &str,
    line: usize,
    issues: &mut Vec<ValidationIssue>,
) {
    // Empty ids are a required-field problem for the content level.
    if value.is_empty() || IDENTIFIER.is_match(value) {
        return;
    }
    issues.push(
        ValidationIssue::new(
            DiagnosticCode::InvalidExtensionField,
            LEVEL,
            format!("'{value}' in {field} is not a valid identifier."),
        )
        .at_line(line)
        .with_source(owner_or_line(owner, line))
        .with_target(value),
    );
}

fn check_page(field: &str, owner: &str, page: &str, line: usize, issues: &mut Vec<ValidationIssue>) {
    if page.starts_with("http://") || page.starts_with("https://") {
        return;
    }
    issues.push(
        ValidationIssue::new(
            DiagnosticCode::InvalidExtensionField,
            LEVEL,
            format!("'{page}' in {field} is not an absolute http(s) URL."),
        )
        .at_line(line)
        .with_source(owner_or_line(owner, line))
        .with_target(page),
    );
}

fn owner_or_line(owner: &str, line: usize) -> String {
    if owner.is_empty() {
        format!("line:{line}")
    } else {
        owner.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConceptDefinition, EntryKind, FewShotExample, Section};
    use std::collections::BTreeMap;

    fn with_concepts_and_examples(entries: Vec<Entry>) -> Document {
        Document {
            sections: vec![
                Section {
                    name: "Docs".into(),
                    entries,
                    ..Default::default()
                },
                Section {
                    name: "Concepts".into(),
                    concepts: vec![ConceptDefinition {
                        id: "ownership".into(),
                        depends_on: vec!["memory model".into()],
                        pages: vec!["/book/ch04".into()],
                        line: 10,
                        ..Default::default()
                    }],
                    examples: vec![FewShotExample {
                        id: "ex-1".into(),
                        source_pages: vec!["https://a.example".into()],
                        relevant_concepts: vec!["ownership".into()],
                        line: 12,
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_concepts_and_examples_are_noted() {
        let codes: Vec<_> = check(&Document::default(), &ValidatorConfig::default())
            .into_iter()
            .map(|i| i.code)
            .collect();
        assert_eq!(
            codes,
            vec![DiagnosticCode::NoConceptDefinitions, DiagnosticCode::NoFewShotExamples]
        );
    }

    #[test]
    fn test_entry_fields() {
        let mut attributes = BTreeMap::new();
        attributes.insert("priority".to_string(), "high".to_string());
        attributes.insert("audience".to_string(), "ops".to_string());
        let entries = vec![
            Entry {
                url: "https://a.example".into(),
                kind: Some(EntryKind::from("podcast")),
                priority: Some(500),
                ..Default::default()
            },
            Entry {
                url: "https://b.example".into(),
                attributes,
                ..Default::default()
            },
        ];
        let issues = check(&with_concepts_and_examples(entries), &ValidatorConfig::default());
        let targets: Vec<_> = issues
            .iter()
            .filter(|i| i.source.as_deref().is_some_and(|s| s.ends_with(".example")))
            .map(|i| (i.source.clone().unwrap(), i.target.clone().unwrap()))
            .collect();
        assert_eq!(
            targets,
            vec![
                ("https://a.example".to_string(), "kind".to_string()),
                ("https://a.example".to_string(), "priority".to_string()),
                ("https://b.example".to_string(), "priority".to_string()),
                ("https://b.example".to_string(), "audience".to_string()),
            ]
        );
    }

    #[test]
    fn test_concept_fields() {
        let issues = check(&with_concepts_and_examples(Vec::new()), &ValidatorConfig::default());
        let targets: Vec<_> = issues.iter().filter_map(|i| i.target.as_deref()).collect();
        assert_eq!(targets, vec!["memory model", "/book/ch04"]);
        assert!(issues.iter().all(|i| i.source.as_deref() == Some("ownership")));
    }

    #[test]
    fn test_identifier_shape() {
        assert!(IDENTIFIER.is_match("ownership"));
        assert!(IDENTIFIER.is_match("ex-1"));
        assert!(IDENTIFIER.is_match("api.v2"));
        assert!(!IDENTIFIER.is_match("-leading"));
        assert!(!IDENTIFIER.is_match("two words"));
    }
}
