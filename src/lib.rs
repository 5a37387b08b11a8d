// src/lib.rs
// =============================================================================
// doc-guardian: validation, cross-reference and link-health engine for
// llms.txt style documentation indexes.
//
// Pipeline:
//   Document (parsed) -> { validate, graph, checker } -> report
//
// - model:       the parsed document (sections, entries, concepts, examples)
// - parse:       turns raw llms.txt text into a Document
// - validate:    synchronous rule levels 0-4 (syntax .. extended schema)
// - graph:       reference graph, dangling references, cycles, orphans
// - checker:     concurrent, rate-limited, retrying URL health checks
// - cache:       persistent URL result cache with max-age lookups
// - report:      merges everything into one DiagnosticReport
// - engine:      wires the pieces together for a single run
// =============================================================================

pub mod cache;
pub mod checker;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod graph;
pub mod model;
pub mod parse;
pub mod report;
pub mod validate;

pub use cache::ResultCache;
pub use checker::{LinkChecker, UrlCheckResult, UrlStatus};
pub use config::EngineConfig;
pub use diagnostics::{DiagnosticCode, Severity, ValidationIssue, ValidationLevel};
pub use engine::Engine;
pub use error::{CacheError, ConfigError, EngineError, ParseError};
pub use model::{Document, DocumentKind};
pub use report::DiagnosticReport;
