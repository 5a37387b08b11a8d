// src/model/kind.rs
// =============================================================================
// Document kind classification.
//
// An llms.txt style file comes in two flavours:
// - Index: a compact, curated list of links with descriptions
// - Full:  a large dump of inline documentation
//
// Classification looks at size and shape only. A small file with broken
// structure is still an Index and collects structural issues; it is never
// quietly promoted to Full to escape them.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Files at or above this many bytes are Full documents.
pub const DEFAULT_INDEX_SIZE_THRESHOLD: usize = 256_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Index,
    Full,
}

/// The structural numbers classification needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentShape {
    pub title_count: usize,
    pub entry_count: usize,
    pub prose_lines: usize,
}

/// Classify a document from its byte size and shape.
///
/// Below the threshold a document is an Index unless it looks like several
/// documents concatenated together: more than one H1 and more prose than
/// link entries.
pub fn classify(size_bytes: usize, shape: &DocumentShape, threshold: usize) -> DocumentKind {
    if size_bytes >= threshold {
        return DocumentKind::Full;
    }

    let concatenated_dump = shape.title_count > 1 && shape.prose_lines > shape.entry_count;
    if concatenated_dump {
        DocumentKind::Full
    } else {
        DocumentKind::Index
    }
}
