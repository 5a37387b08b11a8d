// src/validate/syntax.rs
// =============================================================================
// Level 0: token-level well-formedness.
// =============================================================================

use url::Url;

use crate::config::ValidatorConfig;
use crate::diagnostics::{DiagnosticCode, ValidationIssue, ValidationLevel};
use crate::model::Document;

const LEVEL: ValidationLevel = ValidationLevel::Syntax;

pub(super) fn check(doc: &Document, _config: &ValidatorConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let facts = &doc.syntax;

    if facts.blank {
        issues.push(ValidationIssue::from_code(DiagnosticCode::EmptyFile, LEVEL));
    }

    if facts.invalid_encoding {
        issues.push(ValidationIssue::from_code(DiagnosticCode::InvalidEncoding, LEVEL));
    }

    if facts.crlf_lines > 0 {
        let issue = ValidationIssue::new(
            DiagnosticCode::InvalidLineEndings,
            LEVEL,
            format!("{} line(s) end with CR or CRLF instead of LF.", facts.crlf_lines),
        );
        issues.push(issue.at_line(facts.first_crlf_line.unwrap_or(0)));
    }

    for malformed in &facts.malformed_lines {
        issues.push(
            ValidationIssue::new(
                DiagnosticCode::InvalidMarkdown,
                LEVEL,
                format!("Cannot parse '{}': {}.", malformed.text, malformed.reason),
            )
            .at_line(malformed.line)
            .with_source(format!("line:{}", malformed.line)),
        );
    }

    for entry in doc.entries() {
        if let Some(problem) = url_syntax_problem(&entry.url) {
            issues.push(
                ValidationIssue::new(
                    DiagnosticCode::MalformedUrl,
                    LEVEL,
                    format!("Entry '{}' has an unusable URL: {}.", entry.label, problem),
                )
                .at_line(entry.line)
                .with_source(entry.locator()),
            );
        }
    }

    issues
}

/// Why a URL is syntactically unusable, if it is.
///
/// Relative URLs are not a syntax problem here; the content level reports
/// them separately.
pub(super) fn url_syntax_problem(url: &str) -> Option<&'static str> {
    if url.trim().is_empty() {
        return Some("the URL is empty");
    }
    if url.chars().any(char::is_whitespace) {
        return Some("the URL contains whitespace");
    }
    if url.contains("://") && Url::parse(url).is_err() {
        return Some("the URL cannot be parsed");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entry, MalformedLine, Section};

    fn codes(doc: &Document) -> Vec<DiagnosticCode> {
        check(doc, &ValidatorConfig::default())
            .into_iter()
            .map(|i| i.code)
            .collect()
    }

    #[test]
    fn test_clean_document_has_no_syntax_issues() {
        let doc = Document {
            sections: vec![Section {
                name: "Docs".into(),
                entries: vec![Entry {
                    url: "https://example.com".into(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(codes(&doc).is_empty());
    }

    #[test]
    fn test_syntax_facts_become_issues() {
        let mut doc = Document::default();
        doc.syntax.blank = true;
        doc.syntax.invalid_encoding = true;
        doc.syntax.crlf_lines = 3;
        doc.syntax.first_crlf_line = Some(2);
        doc.syntax.malformed_lines.push(MalformedLine {
            line: 5,
            text: "[x](".into(),
            reason: "link is not closed".into(),
        });

        let issues = check(&doc, &ValidatorConfig::default());
        let found: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert_eq!(
            found,
            vec![
                DiagnosticCode::EmptyFile,
                DiagnosticCode::InvalidEncoding,
                DiagnosticCode::InvalidLineEndings,
                DiagnosticCode::InvalidMarkdown,
            ]
        );
        assert_eq!(issues[2].line, Some(2));
        assert_eq!(issues[3].source.as_deref(), Some("line:5"));
    }

    #[test]
    fn test_url_syntax_problems() {
        assert!(url_syntax_problem("").is_some());
        assert!(url_syntax_problem("https://exa mple.com").is_some());
        assert!(url_syntax_problem("https://").is_some());
        assert!(url_syntax_problem("https://example.com/a").is_none());
        assert!(url_syntax_problem("/docs/relative").is_none());
    }
}
