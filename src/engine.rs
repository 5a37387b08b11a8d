// src/engine.rs
// =============================================================================
// One engine run: validate, analyze references and check links, then merge.
//
//   Document ──┬── validate (levels 0-4) ──┐
//              ├── graph::analyze ─────────┼── report::aggregate ── persist cache
//              └── LinkChecker::check_all ─┘
//
// The two synchronous analyses and the link checks are joined; the
// aggregator only runs once all of them are done. Document defects always
// end up in the report. `run` fails only when the cache cannot be written,
// and even then the error carries the finished report.
// =============================================================================

use std::sync::Arc;

use tracing::info;

use crate::cache::ResultCache;
use crate::checker::{LinkChecker, LinkReport, Resolver};
use crate::config::EngineConfig;
use crate::error::{EngineError, ParseError};
use crate::graph;
use crate::model::Document;
use crate::parse::{parse, ParseOptions};
use crate::report::{aggregate, DiagnosticReport};
use crate::validate::validate;

pub struct Engine {
    config: EngineConfig,
    cache: Arc<ResultCache>,
    checker: LinkChecker,
}

impl Engine {
    /// Opens the result cache (if configured) and builds the HTTP client.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let cache = Arc::new(match &config.cache.path {
            Some(path) => ResultCache::open(path, config.cache.shards),
            None => ResultCache::in_memory(config.cache.shards),
        });
        let checker = LinkChecker::new(config.checker.clone(), Arc::clone(&cache), config.cache.max_age())?;

        Ok(Self {
            config,
            cache,
            checker,
        })
    }

    /// Replaces the DNS resolution step of the link checker.
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.checker = self.checker.with_resolver(resolver);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Parses raw text with this engine's size threshold.
    pub fn parse(&self, raw: &[u8]) -> Result<Document, ParseError> {
        let options = ParseOptions {
            index_size_threshold: self.config.validator.index_size_threshold,
        };
        parse(raw, &options)
    }

    /// Runs every check against `doc` and returns the merged report.
    pub async fn run(&self, doc: &Document) -> Result<DiagnosticReport, EngineError> {
        let static_checks = async {
            let validation = validate(doc, &self.config.validator);
            let references = graph::analyze(doc);
            (validation, references)
        };

        let link_checks = async {
            if !self.config.check_links {
                return LinkReport::default();
            }
            let urls = doc.page_references().into_iter().map(|(url, _)| url);
            self.checker.check_all(urls).await
        };

        let ((validation, references), links) = tokio::join!(static_checks, link_checks);
        let report = aggregate(doc, validation, references, links);

        info!(
            kind = ?report.document_kind,
            conformance_level = ?report.conformance_level,
            errors = report.summary.errors,
            warnings = report.summary.warnings,
            infos = report.summary.infos,
            urls = report.summary.total_urls,
            "run finished"
        );

        if let Err(source) = self.cache.persist() {
            return Err(EngineError::CacheUnwritable {
                source,
                report: Box::new(report),
            });
        }
        Ok(report)
    }
}
