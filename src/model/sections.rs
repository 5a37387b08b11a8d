// src/model/sections.rs
// =============================================================================
// Canonical section names.
//
// Eleven section names cover the vast majority of real llms.txt files. Common
// variants ("Quickstart", "API", "Settings", ...) are aliases of one of them.
// Ten of the names have a fixed position in the recommended ordering;
// Optional has none and always goes last.
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalSection {
    MasterIndex,
    LlmInstructions,
    GettingStarted,
    CoreConcepts,
    ApiReference,
    Examples,
    Configuration,
    AdvancedTopics,
    Troubleshooting,
    Faq,
    Optional,
}

const ALIASES: &[(&str, CanonicalSection)] = &[
    ("table of contents", CanonicalSection::MasterIndex),
    ("toc", CanonicalSection::MasterIndex),
    ("index", CanonicalSection::MasterIndex),
    ("docs", CanonicalSection::MasterIndex),
    ("documentation", CanonicalSection::MasterIndex),
    ("instructions", CanonicalSection::LlmInstructions),
    ("agent instructions", CanonicalSection::LlmInstructions),
    ("quickstart", CanonicalSection::GettingStarted),
    ("quick start", CanonicalSection::GettingStarted),
    ("installation", CanonicalSection::GettingStarted),
    ("setup", CanonicalSection::GettingStarted),
    ("concepts", CanonicalSection::CoreConcepts),
    ("key concepts", CanonicalSection::CoreConcepts),
    ("fundamentals", CanonicalSection::CoreConcepts),
    ("api", CanonicalSection::ApiReference),
    ("reference", CanonicalSection::ApiReference),
    ("endpoints", CanonicalSection::ApiReference),
    ("usage", CanonicalSection::Examples),
    ("use cases", CanonicalSection::Examples),
    ("tutorials", CanonicalSection::Examples),
    ("recipes", CanonicalSection::Examples),
    ("few-shot examples", CanonicalSection::Examples),
    ("few shot examples", CanonicalSection::Examples),
    ("q&a", CanonicalSection::Examples),
    ("config", CanonicalSection::Configuration),
    ("settings", CanonicalSection::Configuration),
    ("options", CanonicalSection::Configuration),
    ("advanced", CanonicalSection::AdvancedTopics),
    ("internals", CanonicalSection::AdvancedTopics),
    ("debugging", CanonicalSection::Troubleshooting),
    ("common issues", CanonicalSection::Troubleshooting),
    ("known issues", CanonicalSection::Troubleshooting),
    ("frequently asked questions", CanonicalSection::Faq),
    ("supplementary", CanonicalSection::Optional),
    ("appendix", CanonicalSection::Optional),
    ("extras", CanonicalSection::Optional),
];

impl CanonicalSection {
    pub const ALL: [CanonicalSection; 11] = [
        CanonicalSection::MasterIndex,
        CanonicalSection::LlmInstructions,
        CanonicalSection::GettingStarted,
        CanonicalSection::CoreConcepts,
        CanonicalSection::ApiReference,
        CanonicalSection::Examples,
        CanonicalSection::Configuration,
        CanonicalSection::AdvancedTopics,
        CanonicalSection::Troubleshooting,
        CanonicalSection::Faq,
        CanonicalSection::Optional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalSection::MasterIndex => "Master Index",
            CanonicalSection::LlmInstructions => "LLM Instructions",
            CanonicalSection::GettingStarted => "Getting Started",
            CanonicalSection::CoreConcepts => "Core Concepts",
            CanonicalSection::ApiReference => "API Reference",
            CanonicalSection::Examples => "Examples",
            CanonicalSection::Configuration => "Configuration",
            CanonicalSection::AdvancedTopics => "Advanced Topics",
            CanonicalSection::Troubleshooting => "Troubleshooting",
            CanonicalSection::Faq => "FAQ",
            CanonicalSection::Optional => "Optional",
        }
    }

    /// Position in the recommended ordering. Optional has none.
    pub fn position(self) -> Option<u8> {
        match self {
            CanonicalSection::MasterIndex => Some(1),
            CanonicalSection::LlmInstructions => Some(2),
            CanonicalSection::GettingStarted => Some(3),
            CanonicalSection::CoreConcepts => Some(4),
            CanonicalSection::ApiReference => Some(5),
            CanonicalSection::Examples => Some(6),
            CanonicalSection::Configuration => Some(7),
            CanonicalSection::AdvancedTopics => Some(8),
            CanonicalSection::Troubleshooting => Some(9),
            CanonicalSection::Faq => Some(10),
            CanonicalSection::Optional => None,
        }
    }

    /// Normalize a heading to a canonical section, through the alias table.
    /// A trailing parenthetical such as "(~800 tokens)" is ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = match name.strip_suffix(')').and_then(|n| n.rfind('(').map(|at| &n[..at])) {
            Some(head) if !head.trim().is_empty() => head,
            _ => name,
        };
        let normalized = name.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        Self::ALL
            .into_iter()
            .find(|c| c.as_str().to_lowercase() == normalized)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == normalized)
                    .map(|(_, canonical)| *canonical)
            })
    }
}
