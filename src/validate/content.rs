// src/validate/content.rs
// =============================================================================
// Level 2: content quality.
//
// Per-entry descriptions, required fields on concepts and examples,
// duplicate identifiers and URLs, code block languages, relative links.
// =============================================================================

use std::collections::HashMap;

use crate::config::ValidatorConfig;
use crate::diagnostics::{DiagnosticCode, ValidationIssue, ValidationLevel};
use crate::model::Document;

const LEVEL: ValidationLevel = ValidationLevel::Content;

pub(super) fn check(doc: &Document, config: &ValidatorConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_entries(doc, config, &mut issues);
    check_concepts(doc, &mut issues);
    check_examples(doc, &mut issues);

    for block in doc.code_blocks.iter().filter(|b| b.language.is_none()) {
        issues.push(
            ValidationIssue::from_code(DiagnosticCode::CodeNoLanguage, LEVEL)
                .at_line(block.line)
                .with_source(format!("line:{}", block.line)),
        );
    }

    issues
}

fn check_entries(doc: &Document, config: &ValidatorConfig, issues: &mut Vec<ValidationIssue>) {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();

    for entry in doc.entries() {
        let description = entry.description_text();
        if description.is_empty() {
            issues.push(
                ValidationIssue::new(
                    DiagnosticCode::LinkMissingDescription,
                    LEVEL,
                    format!("Entry '{}' has no description.", entry.locator()),
                )
                .at_line(entry.line)
                .with_source(entry.locator()),
            );
        } else if description.chars().count() < config.min_description_length {
            issues.push(
                ValidationIssue::new(
                    DiagnosticCode::DescriptionTooShort,
                    LEVEL,
                    format!(
                        "Description '{}' is shorter than {} characters.",
                        description, config.min_description_length
                    ),
                )
                .at_line(entry.line)
                .with_source(entry.locator()),
            );
        }

        let url = entry.url.trim();
        if url.is_empty() {
            continue;
        }

        if !url.contains("://") {
            issues.push(
                ValidationIssue::new(
                    DiagnosticCode::RelativeUrlsDetected,
                    LEVEL,
                    format!("'{url}' is not an absolute URL."),
                )
                .at_line(entry.line)
                .with_source(url),
            );
        }

        match first_seen.get(url) {
            Some(&first_line) => issues.push(
                ValidationIssue::new(
                    DiagnosticCode::DuplicateUrl,
                    LEVEL,
                    format!("'{url}' is already listed on line {first_line}."),
                )
                .at_line(entry.line)
                .with_source(url),
            ),
            None => {
                first_seen.insert(url, entry.line);
            }
        }
    }
}

fn check_concepts(doc: &Document, issues: &mut Vec<ValidationIssue>) {
    let mut ids: HashMap<&str, usize> = HashMap::new();

    for concept in doc.concepts() {
        let locator = identifier_or_line(&concept.id, concept.line);
        let required = [
            ("id", concept.id.as_str()),
            ("name", concept.name.as_str()),
            ("definition", concept.definition.as_str()),
        ];
        missing_fields("Concept", &locator, concept.line, &required, issues);

        duplicate_id("Concept", &concept.id, concept.line, &mut ids, issues);
    }
}

fn check_examples(doc: &Document, issues: &mut Vec<ValidationIssue>) {
    let mut ids: HashMap<&str, usize> = HashMap::new();

    for example in doc.examples() {
        let locator = identifier_or_line(&example.id, example.line);
        let required = [
            ("id", example.id.as_str()),
            ("prompt", example.prompt.as_str()),
            ("answer", example.answer.as_str()),
        ];
        missing_fields("Example", &locator, example.line, &required, issues);

        duplicate_id("Example", &example.id, example.line, &mut ids, issues);
    }
}

fn missing_fields(
    what: &str,
    locator: &str,
    line: usize,
    fields: &[(&str, &str)],
    issues: &mut Vec<ValidationIssue>,
) {
    for (field, value) in fields {
        if value.trim().is_empty() {
            issues.push(
                ValidationIssue::new(
                    DiagnosticCode::MissingRequiredField,
                    LEVEL,
                    format!("{what} '{locator}' has no {field}."),
                )
                .at_line(line)
                .with_source(locator)
                .with_target(*field),
            );
        }
    }
}

fn duplicate_id<'a>(
    what: &str,
    id: &'a str,
    line: usize,
    ids: &mut HashMap<&'a str, usize>,
    issues: &mut Vec<ValidationIssue>,
) {
    let id = id.trim();
    if id.is_empty() {
        return;
    }
    match ids.get(id) {
        Some(&first_line) => issues.push(
            ValidationIssue::new(
                DiagnosticCode::DuplicateIdentifier,
                LEVEL,
                format!("{what} id '{id}' is already defined on line {first_line}."),
            )
            .at_line(line)
            .with_source(id),
        ),
        None => {
            ids.insert(id, line);
        }
    }
}

fn identifier_or_line(id: &str, line: usize) -> String {
    if id.trim().is_empty() {
        format!("line:{line}")
    } else {
        id.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeBlock, ConceptDefinition, Entry, FewShotExample, Section};

    fn doc_with(section: Section) -> Document {
        Document {
            sections: vec![section],
            ..Default::default()
        }
    }

    fn entry(url: &str, description: Option<&str>, line: usize) -> Entry {
        Entry {
            url: url.into(),
            description: description.map(String::from),
            line,
            ..Default::default()
        }
    }

    #[test]
    fn test_descriptions() {
        let doc = doc_with(Section {
            name: "Docs".into(),
            entries: vec![
                entry("https://a.example", None, 1),
                entry("https://b.example", Some("Short"), 2),
                entry("https://c.example", Some("Long enough description"), 3),
            ],
            ..Default::default()
        });
        let issues = check(&doc, &ValidatorConfig::default());
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].code, DiagnosticCode::LinkMissingDescription);
        assert_eq!(issues[0].source.as_deref(), Some("https://a.example"));
        assert_eq!(issues[1].code, DiagnosticCode::DescriptionTooShort);
        assert_eq!(issues[1].line, Some(2));
    }

    #[test]
    fn test_duplicate_and_relative_urls() {
        let doc = doc_with(Section {
            name: "Docs".into(),
            entries: vec![
                entry("https://a.example", Some("The first description"), 1),
                entry("/docs/intro", Some("A relative link target"), 2),
                entry("https://a.example", Some("The same page again"), 3),
            ],
            ..Default::default()
        });
        let issues = check(&doc, &ValidatorConfig::default());
        let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![DiagnosticCode::RelativeUrlsDetected, DiagnosticCode::DuplicateUrl]
        );
        assert_eq!(issues[1].line, Some(3));
    }

    #[test]
    fn test_concept_required_fields_and_duplicates() {
        let doc = doc_with(Section {
            name: "Concepts".into(),
            concepts: vec![
                ConceptDefinition {
                    id: "ownership".into(),
                    name: "Ownership".into(),
                    definition: String::new(),
                    line: 4,
                    ..Default::default()
                },
                ConceptDefinition {
                    id: "ownership".into(),
                    name: "Ownership".into(),
                    definition: "Again".into(),
                    line: 5,
                    ..Default::default()
                },
            ],
            ..Default::default()
        });
        let issues = check(&doc, &ValidatorConfig::default());
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].code, DiagnosticCode::MissingRequiredField);
        assert_eq!(issues[0].target.as_deref(), Some("definition"));
        assert_eq!(issues[1].code, DiagnosticCode::DuplicateIdentifier);
        assert_eq!(issues[1].line, Some(5));
    }

    #[test]
    fn test_example_without_id_uses_line_locator() {
        let doc = doc_with(Section {
            name: "Few-Shot Examples".into(),
            examples: vec![FewShotExample {
                prompt: "How?".into(),
                answer: "Like this.".into(),
                line: 8,
                ..Default::default()
            }],
            ..Default::default()
        });
        let issues = check(&doc, &ValidatorConfig::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].source.as_deref(), Some("line:8"));
        assert_eq!(issues[0].target.as_deref(), Some("id"));
    }

    #[test]
    fn test_code_block_without_language() {
        let doc = Document {
            code_blocks: vec![
                CodeBlock { language: Some("rust".into()), line: 3 },
                CodeBlock { language: None, line: 10 },
            ],
            ..Default::default()
        };
        let issues = check(&doc, &ValidatorConfig::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, DiagnosticCode::CodeNoLanguage);
        assert_eq!(issues[0].line, Some(10));
    }
}
