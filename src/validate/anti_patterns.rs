// src/validate/anti_patterns.rs
// =============================================================================
// Level 3: the anti-pattern rule registry.
//
// Each rule is a plain function over the document plus the metadata needed
// to turn its findings into issues: the catalogue id, a weight from 1 to 10,
// the diagnostic code and a remediation hint. Adding a detector means adding
// a row to RULES.
//
// Only the catalogue entries that can be decided from the document model
// have a rule here. The rest (Copy-Paste Plague, Preference Trap, ...)
// need the page contents or human judgement.
// =============================================================================

use std::collections::HashMap;

use super::syntax::url_syntax_problem;
use crate::config::ValidatorConfig;
use crate::diagnostics::{AntiPatternId, DiagnosticCode, ValidationIssue, ValidationLevel};
use crate::model::{CanonicalSection, Document, DocumentKind, SectionRole};

const LEVEL: ValidationLevel = ValidationLevel::AntiPattern;

/// One detector in the registry.
#[derive(Debug)]
pub struct AntiPatternRule {
    pub id: AntiPatternId,
    /// 1 (cosmetic) to 10 (document unusable).
    pub weight: u8,
    pub code: DiagnosticCode,
    pub remediation: &'static str,
    /// Skip the rule for Full documents.
    pub index_only: bool,
    pub detect: fn(&Document, &ValidatorConfig) -> Vec<Finding>,
}

/// A single match of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub message: String,
    pub line: usize,
    pub source: Option<String>,
}

impl Finding {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: 0,
            source: None,
        }
    }

    fn at(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    fn about(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

static RULES: [AntiPatternRule; 12] = [
    AntiPatternRule {
        id: AntiPatternId::LinkVoid,
        weight: 10,
        code: DiagnosticCode::LinkVoid,
        remediation: "Rewrite the entries as [label](https://...) links with real targets.",
        index_only: false,
        detect: link_void,
    },
    AntiPatternRule {
        id: AntiPatternId::StructureChaos,
        weight: 9,
        code: DiagnosticCode::StructureChaos,
        remediation: "Group the content under ## section headings.",
        index_only: false,
        detect: structure_chaos,
    },
    AntiPatternRule {
        id: AntiPatternId::MonolithMonster,
        weight: 8,
        code: DiagnosticCode::ExceedsSizeLimit,
        remediation: "Split the document into an index plus linked sub-documents.",
        index_only: false,
        detect: monolith_monster,
    },
    AntiPatternRule {
        id: AntiPatternId::SitemapDump,
        weight: 7,
        code: DiagnosticCode::SitemapDump,
        remediation: "Curate the list and spread the links over topical sections.",
        index_only: false,
        detect: sitemap_dump,
    },
    AntiPatternRule {
        id: AntiPatternId::LinkDesert,
        weight: 7,
        code: DiagnosticCode::LinkDesert,
        remediation: "Add a one-line description after each link.",
        index_only: false,
        detect: link_desert,
    },
    AntiPatternRule {
        id: AntiPatternId::OrphanedSections,
        weight: 5,
        code: DiagnosticCode::EmptySections,
        remediation: "Fill the section or remove the heading.",
        index_only: false,
        detect: orphaned_sections,
    },
    AntiPatternRule {
        id: AntiPatternId::FormulaicDescription,
        weight: 5,
        code: DiagnosticCode::FormulaicDescriptions,
        remediation: "Describe what each page covers instead of repeating one template.",
        index_only: false,
        detect: formulaic_description,
    },
    AntiPatternRule {
        id: AntiPatternId::SectionShuffle,
        weight: 4,
        code: DiagnosticCode::SectionOrderNonCanonical,
        remediation: "Order sections from Master Index to FAQ, with Optional last.",
        index_only: true,
        detect: section_shuffle,
    },
    AntiPatternRule {
        id: AntiPatternId::ExampleVoid,
        weight: 4,
        code: DiagnosticCode::NoCodeExamples,
        remediation: "Add at least one fenced code example with a language tag.",
        index_only: false,
        detect: example_void,
    },
    AntiPatternRule {
        id: AntiPatternId::NamingNebula,
        weight: 3,
        code: DiagnosticCode::NonCanonicalSectionName,
        remediation: "Rename the section to one of the canonical names.",
        index_only: false,
        detect: naming_nebula,
    },
    AntiPatternRule {
        id: AntiPatternId::VersionlessDrift,
        weight: 3,
        code: DiagnosticCode::MissingVersionMetadata,
        remediation: "Add a 'Version:' or 'Last updated:' line.",
        index_only: false,
        detect: versionless_drift,
    },
    AntiPatternRule {
        id: AntiPatternId::SilentAgent,
        weight: 2,
        code: DiagnosticCode::NoLlmInstructions,
        remediation: "Add an 'LLM Instructions' section addressed to agents.",
        index_only: false,
        detect: silent_agent,
    },
];

/// The registry, strongest rules first.
pub fn rules() -> &'static [AntiPatternRule] {
    &RULES
}

pub(super) fn check(doc: &Document, config: &ValidatorConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for rule in rules() {
        if rule.index_only && doc.kind == DocumentKind::Full {
            continue;
        }
        for finding in (rule.detect)(doc, config) {
            let mut issue = ValidationIssue::new(rule.code, LEVEL, finding.message)
                .at_line(finding.line)
                .with_anti_pattern(rule.id)
                .with_remediation(rule.remediation);
            if let Some(source) = finding.source {
                issue = issue.with_source(source);
            }
            issues.push(issue);
        }
    }

    issues
}

// ── Detectors ────────────────────────────────────────────────────────

fn link_void(doc: &Document, _config: &ValidatorConfig) -> Vec<Finding> {
    let unusable_entries = doc
        .entries()
        .filter(|e| url_syntax_problem(&e.url).is_some())
        .count();
    let malformed = doc.syntax.malformed_lines.len();

    let total = doc.entry_count() + malformed;
    let unusable = unusable_entries + malformed;

    // "Most" means strictly more than half.
    if total == 0 || unusable * 2 <= total {
        return Vec::new();
    }
    vec![Finding::new(format!("{unusable} of {total} links are empty or malformed."))]
}

fn structure_chaos(doc: &Document, _config: &ValidatorConfig) -> Vec<Finding> {
    let has_content = doc.entry_count() > 0 || doc.prose_lines > 0;
    if doc.syntax.blank || !has_content || doc.named_sections().next().is_some() {
        return Vec::new();
    }
    vec![Finding::new("The document has content but no ## sections.")]
}

fn monolith_monster(doc: &Document, config: &ValidatorConfig) -> Vec<Finding> {
    let tokens = doc.estimated_tokens();
    if tokens <= config.size_limit_tokens {
        return Vec::new();
    }
    vec![Finding::new(format!(
        "About {tokens} tokens, above the limit of {}.",
        config.size_limit_tokens
    ))]
}

fn sitemap_dump(doc: &Document, config: &ValidatorConfig) -> Vec<Finding> {
    let total = doc.entry_count();
    if total < config.sitemap_dump_min_entries {
        return Vec::new();
    }

    doc.sections
        .iter()
        .filter(|s| s.entries.len() as f64 >= config.sitemap_dump_share * total as f64)
        .map(|s| {
            let name = if s.is_preamble() { "(untitled)" } else { s.name.as_str() };
            Finding::new(format!(
                "Section '{name}' holds {} of {total} entries.",
                s.entries.len()
            ))
            .at(s.line)
            .about(name)
        })
        .collect()
}

fn link_desert(doc: &Document, _config: &ValidatorConfig) -> Vec<Finding> {
    let total = doc.entry_count();
    if total == 0 || doc.entries().any(|e| !e.description_text().is_empty()) {
        return Vec::new();
    }
    vec![Finding::new(format!("None of the {total} links has a description."))]
}

fn orphaned_sections(doc: &Document, _config: &ValidatorConfig) -> Vec<Finding> {
    doc.named_sections()
        .filter(|s| s.is_blank())
        .map(|s| {
            Finding::new(format!("Section '{}' is empty.", s.name))
                .at(s.line)
                .about(s.name.clone())
        })
        .collect()
}

fn formulaic_description(doc: &Document, config: &ValidatorConfig) -> Vec<Finding> {
    let descriptions: Vec<String> = doc
        .entries()
        .map(|e| e.description_text().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect();
    if descriptions.len() < 3 {
        return Vec::new();
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for description in &descriptions {
        *counts.entry(description.as_str()).or_default() += 1;
    }

    // Ties resolve to the lexically smallest text so the output is stable.
    let Some((text, repeated)) = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
    else {
        return Vec::new();
    };

    let share = repeated as f64 / descriptions.len() as f64;
    if repeated < 3 || share < config.formulaic_share {
        return Vec::new();
    }
    vec![Finding::new(format!(
        "{repeated} of {} descriptions read '{text}'.",
        descriptions.len()
    ))]
}

fn section_shuffle(doc: &Document, _config: &ValidatorConfig) -> Vec<Finding> {
    // Optional has no position but always belongs last.
    let mut previous: Option<(u8, &str)> = None;

    for section in doc.named_sections() {
        let Some(canonical) = CanonicalSection::from_name(&section.name) else {
            continue;
        };
        let position = canonical.position().unwrap_or(u8::MAX);

        if let Some((last, last_name)) = previous {
            if position < last {
                return vec![Finding::new(format!(
                    "Section '{}' should come before '{last_name}'.",
                    section.name
                ))
                .at(section.line)
                .about(section.name.clone())];
            }
        }
        previous = Some((position, section.name.as_str()));
    }

    Vec::new()
}

fn example_void(doc: &Document, _config: &ValidatorConfig) -> Vec<Finding> {
    if doc.syntax.blank || !doc.code_blocks.is_empty() {
        return Vec::new();
    }
    vec![Finding::new("The document has no fenced code examples.")]
}

fn naming_nebula(doc: &Document, _config: &ValidatorConfig) -> Vec<Finding> {
    doc.named_sections()
        .filter(|s| CanonicalSection::from_name(&s.name).is_none())
        .map(|s| {
            Finding::new(format!("'{}' is not a canonical section name.", s.name))
                .at(s.line)
                .about(s.name.clone())
        })
        .collect()
}

fn versionless_drift(doc: &Document, _config: &ValidatorConfig) -> Vec<Finding> {
    if doc.syntax.blank || doc.version.is_some() {
        return Vec::new();
    }
    vec![Finding::new("No version or last-updated metadata found.")]
}

fn silent_agent(doc: &Document, _config: &ValidatorConfig) -> Vec<Finding> {
    let has_instructions = doc.named_sections().any(|s| {
        s.role == SectionRole::Instructions
            || CanonicalSection::from_name(&s.name) == Some(CanonicalSection::LlmInstructions)
    });
    if doc.syntax.blank || has_instructions {
        return Vec::new();
    }
    vec![Finding::new("No section addresses LLM agents directly.")]
}
