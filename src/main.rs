// src/main.rs
// =============================================================================
// This is the entry point of the doc-guardian CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so stdout stays clean for --json)
// 3. Build the engine config: config file first, then flag overrides
// 4. Read and parse the document, run the engine, print the report
// 5. Exit with a code CI can act on:
//      0 = no errors (warnings and infos are fine)
//      1 = the document has errors
//      2 = the tool could not do its job (unreadable file, binary input...)
//      3 = the report is complete but the result cache could not be saved
// =============================================================================

mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};
use doc_guardian::model::classify;
use doc_guardian::{DiagnosticReport, Document, Engine, EngineConfig, EngineError, Severity, UrlStatus};

const EXIT_OK: i32 = 0;
const EXIT_DOCUMENT_ERRORS: i32 = 1;
const EXIT_FAILURE: i32 = 2;
const EXIT_CACHE_UNWRITABLE: i32 = 3;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            file,
            json,
            no_links,
            config,
            cache,
            workers,
            rate,
            timeout,
            max_redirects,
            run_timeout,
            verbose,
        } => {
            init_logging(verbose);

            let mut engine_config = match &config {
                Some(path) => EngineConfig::from_json_file(path)?,
                None => EngineConfig::default(),
            };

            // Flags win over the config file
            if no_links {
                engine_config.check_links = false;
            }
            if cache.is_some() {
                engine_config.cache.path = cache;
            }
            if let Some(workers) = workers {
                engine_config.checker.workers = workers;
            }
            if let Some(rate) = rate {
                engine_config.checker.requests_per_second = rate;
            }
            if let Some(timeout) = timeout {
                engine_config.checker.request_timeout_secs = timeout;
            }
            if let Some(max_redirects) = max_redirects {
                engine_config.checker.max_redirects = max_redirects;
            }
            if run_timeout.is_some() {
                engine_config.checker.run_timeout_secs = run_timeout;
            }
            debug!(?engine_config, "effective configuration");

            handle_check(&file, json, engine_config).await
        }
    }
}

// Logs go to stderr. RUST_LOG overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// Handles the 'check' subcommand
async fn handle_check(file: &Path, json: bool, config: EngineConfig) -> Result<i32> {
    let engine = Engine::new(config).context("failed to start the engine")?;

    let raw = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let doc = load_document(&engine, file, &raw)?;

    let report = match engine.run(&doc).await {
        Ok(report) => report,
        Err(EngineError::CacheUnwritable { source, report }) => {
            // The checks themselves finished: still show what they found
            warn!(error = %source, "link results were not saved");
            print_results(&report, json)?;
            return Ok(EXIT_CACHE_UNWRITABLE);
        }
        Err(e) => return Err(e).context("engine run failed"),
    };

    print_results(&report, json)?;

    if report.has_errors() {
        Ok(EXIT_DOCUMENT_ERRORS)
    } else {
        Ok(EXIT_OK)
    }
}

// Markdown goes through the parser. A `.json` file is a serialized document
// model; its kind is recomputed from its size and shape.
fn load_document(engine: &Engine, file: &Path, raw: &[u8]) -> Result<Document> {
    let is_json = file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let mut doc: Document = serde_json::from_slice(raw)
            .with_context(|| format!("{} is not a valid document model", file.display()))?;
        doc.kind = classify(
            doc.size_bytes,
            &doc.shape(),
            engine.config().validator.index_size_threshold,
        );
        return Ok(doc);
    }

    engine
        .parse(raw)
        .with_context(|| format!("failed to parse {}", file.display()))
}

fn print_results(report: &DiagnosticReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints the report as human-readable tables in the terminal
fn print_table(report: &DiagnosticReport) {
    let kind = match report.document_kind {
        doc_guardian::DocumentKind::Index => "index",
        doc_guardian::DocumentKind::Full => "full",
    };
    let level = report
        .conformance_level
        .map(|l| format!("level {}", l))
        .unwrap_or_else(|| "none".to_string());
    println!("Document: {} | Conformance: {}", kind, level);
    println!();

    if !report.issues.is_empty() {
        println!("{:<6} {:<9} {:<6} {:<80}", "LINE", "SEVERITY", "CODE", "MESSAGE");
        println!("{}", "=".repeat(104));
        for issue in &report.issues {
            let line = issue.line.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string());
            println!(
                "{:<6} {:<9} {:<6} {:<80}",
                line,
                format_severity(issue.severity),
                issue.code.as_str(),
                issue.message
            );
        }
        println!();
    }

    if !report.urls.is_empty() {
        println!("{:<60} {:<15} {:<30}", "URL", "STATUS", "MESSAGE");
        println!("{}", "=".repeat(105));
        for result in report.urls.values() {
            let message = match (result.http_status, result.error.as_deref()) {
                (_, Some(error)) => error.to_string(),
                (Some(code), None) => format!("HTTP {}", code),
                (None, None) => String::new(),
            };
            println!(
                "{:<60} {:<15} {:<30}",
                truncate(&result.url, 57),
                format_status(result.status),
                message
            );
        }
        println!();
    }

    let summary = &report.summary;
    println!("Summary:");
    println!("   Errors:   {}", summary.errors);
    println!("   Warnings: {}", summary.warnings);
    println!("   Infos:    {}", summary.infos);
    if summary.total_urls > 0 {
        println!(
            "   Links:    {} checked ({} from cache): {} valid, {} redirected, {} broken, {} timed out, {} unresolved, {} unknown",
            summary.total_urls,
            summary.cache_hits,
            summary.valid,
            summary.redirected,
            summary.broken,
            summary.timeout,
            summary.dns_failure,
            summary.unknown
        );
    }
    if summary.degraded {
        println!("   Some links could not be verified; the result is degraded.");
    }
}

// Cuts on a char boundary so multi-byte URLs never panic
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn format_severity(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "ERROR",
        Severity::Warning => "WARNING",
        Severity::Info => "INFO",
    }
}

fn format_status(status: UrlStatus) -> &'static str {
    match status {
        UrlStatus::Valid => "OK",
        UrlStatus::Redirected => "REDIRECT",
        UrlStatus::Broken => "BROKEN",
        UrlStatus::Timeout => "TIMEOUT",
        UrlStatus::DnsFailure => "DNS FAILURE",
        UrlStatus::Unknown => "UNKNOWN",
    }
}
