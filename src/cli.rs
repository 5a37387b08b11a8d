// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use clap's "derive" API: the CLI structure is described by plain Rust
// structs and enums, and the #[...] attributes tell clap how to turn them
// into flags and positional arguments.
//
// Every flag that maps onto an engine setting is optional. When it is given
// it overrides the value from the config file (or the built-in default).
// =============================================================================

use std::path::PathBuf;

use clap::{Parser, Subcommand};

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "doc-guardian",
    version,
    about = "Validate llms.txt style documentation indexes and check their links",
    long_about = "doc-guardian validates an llms.txt style documentation index: syntax, structure, \
                  content quality, known anti-patterns, cross-references between concepts and \
                  examples, and the health of every linked page. It is built for CI pipelines: \
                  the exit code says whether the document has errors."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a document and check every URL it references
    ///
    /// Example: doc-guardian check llms.txt --workers 8 --rate 5
    Check {
        /// The document to check. A `.json` file is read as a pre-built
        /// document model instead of markdown text.
        file: PathBuf,

        /// Output the report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Skip the network: validate the document only
        #[arg(long)]
        no_links: bool,

        /// JSON config file with engine settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// File that keeps link results between runs
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Number of links checked at the same time
        #[arg(long)]
        workers: Option<usize>,

        /// Requests per second across all workers (0 disables the limit)
        #[arg(long)]
        rate: Option<f64>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Maximum redirects followed before a link counts as broken
        #[arg(long)]
        max_redirects: Option<usize>,

        /// Give up on pending link checks after this many seconds
        #[arg(long)]
        run_timeout: Option<u64>,

        /// Log debug details to stderr
        #[arg(short, long)]
        verbose: bool,
    },
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Option<T> flags
//    - `workers: Option<usize>` means the flag may be absent
//    - clap fills in None when it is not given, so we can tell "not set"
//      apart from "set to the default value"
//
// 2. PathBuf instead of String
//    - PathBuf is the owned type for file system paths
//    - clap parses it directly, no conversion needed
//
// 3. #[arg(short, long)]
//    - `long` creates --verbose from the field name
//    - `short` adds -v from its first letter
// -----------------------------------------------------------------------------
