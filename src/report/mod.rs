// src/report/mod.rs
// =============================================================================
// The diagnostic report: everything one run found, in one value.
//
// `aggregate` is the single point where validation issues, reference-graph
// issues and link results meet. It
// - turns every non-valid URL result into an issue at the first line that
//   cites the URL
// - drops duplicate issues (same code, source, target and related ids),
//   keeping the first
// - orders issues by severity, then by line (document-wide issues first)
// - computes the summary counts
//
// Field names serialize in snake_case and are part of the output contract.
// =============================================================================

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::checker::{LinkReport, UrlCheckResult, UrlStatus};
use crate::diagnostics::{DiagnosticCode, Severity, ValidationIssue, ValidationLevel};
use crate::model::{Document, DocumentKind};
use crate::validate::ValidationOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub total_urls: usize,
    pub valid: usize,
    pub redirected: usize,
    pub broken: usize,
    pub timeout: usize,
    pub dns_failure: usize,
    pub unknown: usize,
    pub cache_hits: usize,
    /// Some URLs could not be verified; their status is `unknown`.
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub document_kind: DocumentKind,
    /// Highest validation level (0-4) passed together with every level
    /// below it. None when level 0 already has errors.
    pub conformance_level: Option<u8>,
    pub issues: Vec<ValidationIssue>,
    pub urls: BTreeMap<String, UrlCheckResult>,
    pub summary: Summary,
}

impl DiagnosticReport {
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    pub fn issues_with(&self, code: DiagnosticCode) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }
}

/// Merges all findings of a run into a report.
pub fn aggregate(
    doc: &Document,
    validation: ValidationOutcome,
    references: Vec<ValidationIssue>,
    links: LinkReport,
) -> DiagnosticReport {
    let mut all = validation.issues;
    all.extend(references);
    all.extend(link_issues(doc, &links.results));

    let mut seen = HashSet::new();
    let mut issues: Vec<ValidationIssue> = Vec::with_capacity(all.len());
    for issue in all {
        let (code, source, target, related) = issue.dedup_key();
        let key = (
            code,
            source.map(str::to_owned),
            target.map(str::to_owned),
            related.to_vec(),
        );
        if seen.insert(key) {
            issues.push(issue);
        }
    }

    // Stable: equal keys keep their collection order.
    issues.sort_by_key(|i| (i.severity, i.line.unwrap_or(0)));

    let summary = summarize(&issues, &links);
    DiagnosticReport {
        document_kind: doc.kind,
        conformance_level: validation.highest_level_passed,
        issues,
        urls: links.results,
        summary,
    }
}

// One issue per distinct non-valid URL, in the order the document first
// cites them.
fn link_issues(doc: &Document, results: &BTreeMap<String, UrlCheckResult>) -> Vec<ValidationIssue> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();

    for (url, line) in doc.page_references() {
        let url = url.trim();
        if !seen.insert(url) {
            continue;
        }
        let Some(result) = results.get(url) else {
            continue;
        };
        if let Some(issue) = link_issue(result) {
            issues.push(issue.at_line(line));
        }
    }

    issues
}

fn link_issue(result: &UrlCheckResult) -> Option<ValidationIssue> {
    let url = result.url.as_str();
    let cause = result.error.as_deref().unwrap_or("no details");
    let level = ValidationLevel::LinkHealth;

    let issue = match result.status {
        UrlStatus::Valid => return None,
        UrlStatus::Redirected => {
            let last = result.redirect_chain.last().map(String::as_str).unwrap_or(url);
            ValidationIssue::new(
                DiagnosticCode::LinkRedirected,
                level,
                format!("'{url}' redirects to '{last}'."),
            )
            .with_target(last)
            .with_related(result.redirect_chain.clone())
        }
        UrlStatus::Broken => ValidationIssue::new(
            DiagnosticCode::LinkBroken,
            level,
            format!("'{url}' is broken: {cause}."),
        ),
        UrlStatus::DnsFailure => ValidationIssue::new(
            DiagnosticCode::LinkDnsFailure,
            level,
            format!("'{url}' does not resolve: {cause}."),
        ),
        UrlStatus::Timeout => ValidationIssue::new(
            DiagnosticCode::LinkTimeout,
            level,
            format!("'{url}' timed out: {cause}."),
        ),
        UrlStatus::Unknown => ValidationIssue::new(
            DiagnosticCode::LinkUnverified,
            level,
            format!("'{url}' could not be verified: {cause}."),
        ),
    };
    Some(issue.with_source(url))
}

fn summarize(issues: &[ValidationIssue], links: &LinkReport) -> Summary {
    let mut summary = Summary {
        total_urls: links.results.len(),
        cache_hits: links.cache_hits,
        ..Default::default()
    };

    for issue in issues {
        match issue.severity {
            Severity::Error => summary.errors += 1,
            Severity::Warning => summary.warnings += 1,
            Severity::Info => summary.infos += 1,
        }
    }

    for result in links.results.values() {
        match result.status {
            UrlStatus::Valid => summary.valid += 1,
            UrlStatus::Redirected => summary.redirected += 1,
            UrlStatus::Broken => summary.broken += 1,
            UrlStatus::Timeout => summary.timeout += 1,
            UrlStatus::DnsFailure => summary.dns_failure += 1,
            UrlStatus::Unknown => summary.unknown += 1,
        }
    }
    summary.degraded = summary.unknown > 0;

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entry, Section};
    use chrono::Utc;

    fn doc() -> Document {
        Document {
            sections: vec![Section {
                name: "Docs".into(),
                entries: vec![
                    Entry {
                        url: "https://ok.example".into(),
                        line: 4,
                        ..Default::default()
                    },
                    Entry {
                        url: "https://gone.example".into(),
                        line: 5,
                        ..Default::default()
                    },
                    Entry {
                        url: "https://gone.example".into(),
                        line: 9,
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn url_result(url: &str, status: UrlStatus) -> UrlCheckResult {
        UrlCheckResult {
            url: url.into(),
            status,
            http_status: None,
            redirect_chain: Vec::new(),
            error: None,
            checked_at: Utc::now(),
            latency_ms: 0,
            attempts: 1,
        }
    }

    fn links(results: Vec<UrlCheckResult>) -> LinkReport {
        LinkReport {
            results: results.into_iter().map(|r| (r.url.clone(), r)).collect(),
            cache_hits: 1,
        }
    }

    fn issue(code: DiagnosticCode, line: usize, source: &str) -> ValidationIssue {
        ValidationIssue::from_code(code, ValidationLevel::Content)
            .at_line(line)
            .with_source(source)
    }

    #[test]
    fn test_link_issue_points_at_first_citation() {
        let report = aggregate(
            &doc(),
            ValidationOutcome::default(),
            Vec::new(),
            links(vec![
                url_result("https://ok.example", UrlStatus::Valid),
                url_result("https://gone.example", UrlStatus::Broken),
            ]),
        );
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].code, DiagnosticCode::LinkBroken);
        assert_eq!(report.issues[0].line, Some(5));
        assert_eq!(report.summary.valid, 1);
        assert_eq!(report.summary.broken, 1);
        assert_eq!(report.summary.total_urls, 2);
        assert_eq!(report.summary.cache_hits, 1);
        assert!(report.has_errors());
        assert!(!report.summary.degraded);
    }

    #[test]
    fn test_duplicates_are_dropped_and_order_is_severity_then_line() {
        let validation = ValidationOutcome {
            issues: vec![
                issue(DiagnosticCode::LinkMissingDescription, 3, "a"),
                issue(DiagnosticCode::RelativeUrlsDetected, 1, "b"),
                issue(DiagnosticCode::DuplicateUrl, 9, "c"),
                issue(DiagnosticCode::DuplicateUrl, 12, "c"),
                issue(DiagnosticCode::MalformedUrl, 7, "d"),
                ValidationIssue::from_code(DiagnosticCode::MissingBlockquote, ValidationLevel::Structure),
            ],
            highest_level_passed: Some(1),
        };
        let report = aggregate(&Document::default(), validation, Vec::new(), LinkReport::default());

        let order: Vec<_> = report.issues.iter().map(|i| (i.code, i.line)).collect();
        assert_eq!(
            order,
            vec![
                (DiagnosticCode::MalformedUrl, Some(7)),
                (DiagnosticCode::MissingBlockquote, None),
                (DiagnosticCode::LinkMissingDescription, Some(3)),
                (DiagnosticCode::DuplicateUrl, Some(9)),
                (DiagnosticCode::RelativeUrlsDetected, Some(1)),
            ]
        );
        assert_eq!(report.conformance_level, Some(1));
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.warnings, 3);
        assert_eq!(report.summary.infos, 1);
    }

    #[test]
    fn test_unknown_marks_report_degraded() {
        let report = aggregate(
            &doc(),
            ValidationOutcome::default(),
            Vec::new(),
            links(vec![url_result("https://ok.example", UrlStatus::Unknown)]),
        );
        assert!(report.summary.degraded);
        assert_eq!(report.issues[0].code, DiagnosticCode::LinkUnverified);
        assert_eq!(report.issues[0].line, Some(4));
    }

    #[test]
    fn test_redirect_issue_names_final_target() {
        let mut redirected = url_result("https://ok.example", UrlStatus::Redirected);
        redirected.redirect_chain = vec!["https://ok.example/home".into()];
        let report = aggregate(&doc(), ValidationOutcome::default(), Vec::new(), links(vec![redirected]));
        assert_eq!(report.issues[0].code, DiagnosticCode::LinkRedirected);
        assert_eq!(report.issues[0].target.as_deref(), Some("https://ok.example/home"));
        assert!(!report.has_errors());
    }

    #[test]
    fn test_report_field_names() {
        let report = aggregate(&doc(), ValidationOutcome::default(), Vec::new(), LinkReport::default());
        let value = serde_json::to_value(&report).unwrap();
        for field in ["document_kind", "conformance_level", "issues", "urls", "summary"] {
            assert!(value.get(field).is_some(), "{field}");
        }
        assert_eq!(value["document_kind"], "index");
        assert_eq!(value["summary"]["degraded"], false);
    }
}
