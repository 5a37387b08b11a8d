// src/diagnostics/anti_patterns.rs
// =============================================================================
// Anti-pattern catalogue: 22 named failure modes in 4 categories.
//
// The catalogue is descriptive. The Level 3 rule registry in
// validate::anti_patterns implements the detectors that can be expressed
// over the document model and tags each finding with its AntiPatternId.
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntiPatternCategory {
    /// Prevents consumption entirely.
    Critical,
    /// Breaks navigation.
    Structural,
    /// Degrades quality.
    Content,
    /// Undermines long-term value.
    Strategic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AntiPatternId {
    #[serde(rename = "AP-CRIT-001")]
    GhostFile,
    #[serde(rename = "AP-CRIT-002")]
    StructureChaos,
    #[serde(rename = "AP-CRIT-003")]
    EncodingDisaster,
    #[serde(rename = "AP-CRIT-004")]
    LinkVoid,
    #[serde(rename = "AP-STRUCT-001")]
    SitemapDump,
    #[serde(rename = "AP-STRUCT-002")]
    OrphanedSections,
    #[serde(rename = "AP-STRUCT-003")]
    DuplicateIdentity,
    #[serde(rename = "AP-STRUCT-004")]
    SectionShuffle,
    #[serde(rename = "AP-STRUCT-005")]
    NamingNebula,
    #[serde(rename = "AP-CONT-001")]
    CopyPastePlague,
    #[serde(rename = "AP-CONT-002")]
    BlankCanvas,
    #[serde(rename = "AP-CONT-003")]
    JargonJungle,
    #[serde(rename = "AP-CONT-004")]
    LinkDesert,
    #[serde(rename = "AP-CONT-005")]
    OutdatedOracle,
    #[serde(rename = "AP-CONT-006")]
    ExampleVoid,
    #[serde(rename = "AP-CONT-007")]
    FormulaicDescription,
    #[serde(rename = "AP-CONT-008")]
    SilentAgent,
    #[serde(rename = "AP-CONT-009")]
    VersionlessDrift,
    #[serde(rename = "AP-STRAT-001")]
    AutomationObsession,
    #[serde(rename = "AP-STRAT-002")]
    MonolithMonster,
    #[serde(rename = "AP-STRAT-003")]
    MetaDocumentationSpiral,
    #[serde(rename = "AP-STRAT-004")]
    PreferenceTrap,
}

pub struct AntiPatternEntry {
    pub id: AntiPatternId,
    pub code: &'static str,
    pub name: &'static str,
    pub category: AntiPatternCategory,
    pub description: &'static str,
}

use AntiPatternCategory::{Content, Critical, Strategic, Structural};

pub const ANTI_PATTERNS: [AntiPatternEntry; 22] = [
    AntiPatternEntry { id: AntiPatternId::GhostFile, code: "AP-CRIT-001", name: "Ghost File", category: Critical, description: "Empty or near-empty file that exists but provides no value" },
    AntiPatternEntry { id: AntiPatternId::StructureChaos, code: "AP-CRIT-002", name: "Structure Chaos", category: Critical, description: "File lacks recognizable Markdown structure (no headers, no sections)" },
    AntiPatternEntry { id: AntiPatternId::EncodingDisaster, code: "AP-CRIT-003", name: "Encoding Disaster", category: Critical, description: "Non-UTF-8 encoding or mixed line endings that break parsers" },
    AntiPatternEntry { id: AntiPatternId::LinkVoid, code: "AP-CRIT-004", name: "Link Void", category: Critical, description: "All or most links are broken, empty, or malformed" },
    AntiPatternEntry { id: AntiPatternId::SitemapDump, code: "AP-STRUCT-001", name: "Sitemap Dump", category: Structural, description: "Entire sitemap dumped as flat link list with no organization" },
    AntiPatternEntry { id: AntiPatternId::OrphanedSections, code: "AP-STRUCT-002", name: "Orphaned Sections", category: Structural, description: "Sections with headers but no links or content" },
    AntiPatternEntry { id: AntiPatternId::DuplicateIdentity, code: "AP-STRUCT-003", name: "Duplicate Identity", category: Structural, description: "Multiple sections with identical or near-identical names" },
    AntiPatternEntry { id: AntiPatternId::SectionShuffle, code: "AP-STRUCT-004", name: "Section Shuffle", category: Structural, description: "Sections in illogical order (e.g., Advanced before Getting Started)" },
    AntiPatternEntry { id: AntiPatternId::NamingNebula, code: "AP-STRUCT-005", name: "Naming Nebula", category: Structural, description: "Section names that are vague, inconsistent, or non-standard" },
    AntiPatternEntry { id: AntiPatternId::CopyPastePlague, code: "AP-CONT-001", name: "Copy-Paste Plague", category: Content, description: "Large blocks of content duplicated from other sources without curation" },
    AntiPatternEntry { id: AntiPatternId::BlankCanvas, code: "AP-CONT-002", name: "Blank Canvas", category: Content, description: "Sections with placeholder text or no meaningful content" },
    AntiPatternEntry { id: AntiPatternId::JargonJungle, code: "AP-CONT-003", name: "Jargon Jungle", category: Content, description: "Heavy use of domain jargon without definitions" },
    AntiPatternEntry { id: AntiPatternId::LinkDesert, code: "AP-CONT-004", name: "Link Desert", category: Content, description: "Links without descriptions (bare URL lists)" },
    AntiPatternEntry { id: AntiPatternId::OutdatedOracle, code: "AP-CONT-005", name: "Outdated Oracle", category: Content, description: "Content references deprecated or outdated information" },
    AntiPatternEntry { id: AntiPatternId::ExampleVoid, code: "AP-CONT-006", name: "Example Void", category: Content, description: "No code examples despite being a technical project" },
    AntiPatternEntry { id: AntiPatternId::FormulaicDescription, code: "AP-CONT-007", name: "Formulaic Description", category: Content, description: "Auto-generated descriptions with identical patterns" },
    AntiPatternEntry { id: AntiPatternId::SilentAgent, code: "AP-CONT-008", name: "Silent Agent", category: Content, description: "No LLM-facing guidance despite being an AI documentation file" },
    AntiPatternEntry { id: AntiPatternId::VersionlessDrift, code: "AP-CONT-009", name: "Versionless Drift", category: Content, description: "No version or date metadata, impossible to assess freshness" },
    AntiPatternEntry { id: AntiPatternId::AutomationObsession, code: "AP-STRAT-001", name: "Automation Obsession", category: Strategic, description: "Fully auto-generated with no human curation or review" },
    AntiPatternEntry { id: AntiPatternId::MonolithMonster, code: "AP-STRAT-002", name: "Monolith Monster", category: Strategic, description: "Single file exceeding 100K tokens with no decomposition" },
    AntiPatternEntry { id: AntiPatternId::MetaDocumentationSpiral, code: "AP-STRAT-003", name: "Meta-Documentation Spiral", category: Strategic, description: "File documents itself or the llms.txt standard rather than the project" },
    AntiPatternEntry { id: AntiPatternId::PreferenceTrap, code: "AP-STRAT-004", name: "Preference Trap", category: Strategic, description: "Content crafted to manipulate LLM behavior" },
];

impl AntiPatternId {
    pub fn entry(self) -> &'static AntiPatternEntry {
        // The catalogue lists every id exactly once, in declaration order.
        &ANTI_PATTERNS[self as usize]
    }

    pub fn category(self) -> AntiPatternCategory {
        self.entry().category
    }
}

impl fmt::Display for AntiPatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entry().code)
    }
}
