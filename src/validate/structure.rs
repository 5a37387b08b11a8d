// src/validate/structure.rs
// =============================================================================
// Level 1: document structure.
//
// Title, description, section naming, entry layout and token marks on
// optional sections. The index-shape
// rules (section size, master index, token budget) only apply to Index
// documents; Full documents get a single informational note instead.
// =============================================================================

use std::collections::HashSet;

use crate::config::ValidatorConfig;
use crate::diagnostics::{DiagnosticCode, ValidationIssue, ValidationLevel};
use crate::model::{CanonicalSection, Document, DocumentKind};

const LEVEL: ValidationLevel = ValidationLevel::Structure;

pub(super) fn check(doc: &Document, config: &ValidatorConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_title(doc, &mut issues);
    check_section_names(doc, &mut issues);
    check_entries(doc, &mut issues);
    check_optional_sections(doc, &mut issues);

    match doc.kind {
        DocumentKind::Index => check_index_shape(doc, config, &mut issues),
        DocumentKind::Full => issues.push(ValidationIssue::new(
            DiagnosticCode::FullDocumentDetected,
            LEVEL,
            format!(
                "Document classified as full ({} bytes); index-shape rules are skipped.",
                doc.size_bytes
            ),
        )),
    }

    issues
}

fn check_title(doc: &Document, issues: &mut Vec<ValidationIssue>) {
    match doc.titles.as_slice() {
        [] => issues.push(ValidationIssue::from_code(DiagnosticCode::NoH1Title, LEVEL)),
        [_] => {}
        [_, second, ..] => issues.push(
            ValidationIssue::new(
                DiagnosticCode::MultipleH1,
                LEVEL,
                format!("Found {} H1 titles; '{}' is not the first.", doc.titles.len(), second.text),
            )
            .at_line(second.line)
            .with_source(second.text.clone()),
        ),
    }

    let has_description = doc
        .description
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    if !has_description {
        let line = doc.titles.first().map(|t| t.line).unwrap_or(0);
        issues.push(ValidationIssue::from_code(DiagnosticCode::MissingBlockquote, LEVEL).at_line(line));
    }
}

fn check_section_names(doc: &Document, issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for section in doc.named_sections() {
        let key = section.name.trim().to_lowercase();
        if !seen.insert(key.clone()) {
            issues.push(
                ValidationIssue::new(
                    DiagnosticCode::DuplicateSectionName,
                    LEVEL,
                    format!("Section '{}' appears more than once.", section.name),
                )
                .at_line(section.line)
                .with_source(key),
            );
        }
    }
}

fn check_entries(doc: &Document, issues: &mut Vec<ValidationIssue>) {
    for section in &doc.sections {
        // Priorities must not decrease within a section; entries without
        // one are ignored.
        let mut previous: Option<(i64, String)> = None;

        for entry in &section.entries {
            if entry.bare {
                issues.push(
                    ValidationIssue::new(
                        DiagnosticCode::BareUrlEntry,
                        LEVEL,
                        format!("'{}' is a bare URL, not a Markdown link.", entry.url),
                    )
                    .at_line(entry.line)
                    .with_source(entry.locator()),
                );
            }

            let Some(priority) = entry.priority else {
                continue;
            };
            if let Some((last, last_locator)) = &previous {
                if priority < *last {
                    issues.push(
                        ValidationIssue::new(
                            DiagnosticCode::PriorityOutOfOrder,
                            LEVEL,
                            format!("Priority {priority} follows priority {last} in the same section."),
                        )
                        .at_line(entry.line)
                        .with_source(entry.locator())
                        .with_target(last_locator.clone()),
                    );
                }
            }
            previous = Some((priority, entry.locator()));
        }
    }
}

fn check_optional_sections(doc: &Document, issues: &mut Vec<ValidationIssue>) {
    for section in doc.named_sections() {
        if section.token_estimate.is_some()
            || CanonicalSection::from_name(&section.name) != Some(CanonicalSection::Optional)
        {
            continue;
        }
        issues.push(
            ValidationIssue::new(
                DiagnosticCode::OptionalSectionsUnmarked,
                LEVEL,
                format!("Section '{}' has no token estimate.", section.name),
            )
            .at_line(section.line)
            .with_source(section.name.clone()),
        );
    }
}

fn check_index_shape(doc: &Document, config: &ValidatorConfig, issues: &mut Vec<ValidationIssue>) {
    for section in doc.named_sections() {
        if section.entries.len() > config.max_entries_per_section {
            issues.push(
                ValidationIssue::new(
                    DiagnosticCode::SectionTooLarge,
                    LEVEL,
                    format!(
                        "Section '{}' has {} entries (limit {}).",
                        section.name,
                        section.entries.len(),
                        config.max_entries_per_section
                    ),
                )
                .at_line(section.line)
                .with_source(section.name.clone()),
            );
        }
    }

    if let Some(first) = doc.named_sections().next() {
        if CanonicalSection::from_name(&first.name) != Some(CanonicalSection::MasterIndex) {
            issues.push(
                ValidationIssue::from_code(DiagnosticCode::NoMasterIndex, LEVEL)
                    .at_line(first.line)
                    .with_source(first.name.clone()),
            );
        }
    }

    let tokens = doc.estimated_tokens();
    if tokens > config.index_token_budget {
        issues.push(ValidationIssue::new(
            DiagnosticCode::TokenBudgetExceeded,
            LEVEL,
            format!(
                "About {tokens} tokens; index documents should stay under {}.",
                config.index_token_budget
            ),
        ));
    }
}
