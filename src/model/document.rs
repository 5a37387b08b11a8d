// src/model/document.rs
// =============================================================================
// Document model types.
//
// A Document is produced once (by the parser or deserialized from JSON) and
// is then only read. Every checking component borrows it.
//
// Line numbers are 1-based and refer to the raw text the document was parsed
// from. Documents built by hand may leave them at 0.
// =============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::kind::{DocumentKind, DocumentShape};

/// Root of the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Every H1 heading found, in order. A conforming document has one.
    #[serde(default)]
    pub titles: Vec<Heading>,
    /// The `> blockquote` summary that follows the title.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub size_bytes: usize,
    #[serde(default)]
    pub kind: DocumentKind,
    /// `Version:` or `Last updated:` metadata, if present.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub code_blocks: Vec<CodeBlock>,
    /// Non-blank lines that are neither headings nor list entries.
    #[serde(default)]
    pub prose_lines: usize,
    #[serde(default)]
    pub syntax: SyntaxFacts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub text: String,
    #[serde(default)]
    pub line: usize,
}

/// What a section holds, declared by its heading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionRole {
    #[default]
    Links,
    Concepts,
    Examples,
    Instructions,
}

impl SectionRole {
    /// Derive the role from a section heading.
    pub fn from_heading(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "concepts" | "core concepts" | "key concepts" | "concept definitions" | "glossary" => {
                SectionRole::Concepts
            }
            "few-shot examples" | "few shot examples" | "q&a" | "q&a examples" | "qa examples" => {
                SectionRole::Examples
            }
            "llm instructions" | "instructions" | "agent instructions" => SectionRole::Instructions,
            _ => SectionRole::Links,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text. Empty for the implicit section holding entries that
    /// appear before the first `##` heading.
    pub name: String,
    #[serde(default)]
    pub line: usize,
    #[serde(default)]
    pub role: SectionRole,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub concepts: Vec<ConceptDefinition>,
    #[serde(default)]
    pub examples: Vec<FewShotExample>,
    /// Prose, sub-headings and code lines inside the section.
    #[serde(default)]
    pub body_lines: usize,
    /// Token count announced in the heading or a prose line, e.g.
    /// `## Optional (~2,000 tokens)`.
    #[serde(default)]
    pub token_estimate: Option<usize>,
}

impl Section {
    pub fn is_preamble(&self) -> bool {
        self.name.is_empty()
    }

    /// True when the section carries nothing a reader could use.
    pub fn is_blank(&self) -> bool {
        self.entries.is_empty()
            && self.concepts.is_empty()
            && self.examples.is_empty()
            && self.body_lines == 0
    }
}

/// A single link entry: `- [label](url): description {kind: .., priority: ..}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub url: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub kind: Option<EntryKind>,
    #[serde(default)]
    pub priority: Option<i64>,
    /// Raw `{key: value}` extension fields as written.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Written as a bare URL rather than a Markdown link.
    #[serde(default)]
    pub bare: bool,
    #[serde(default)]
    pub line: usize,
}

impl Entry {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().map(str::trim).unwrap_or("")
    }

    /// A stable identifier for issues about this entry.
    pub fn locator(&self) -> String {
        if self.url.trim().is_empty() {
            format!("line:{}", self.line)
        } else {
            self.url.clone()
        }
    }
}

/// The structured `kind` tag of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryKind {
    Tutorial,
    Guide,
    Reference,
    Concept,
    Api,
    Example,
    Changelog,
    /// Anything else; the extended-schema level reports it.
    Other(String),
}

impl EntryKind {
    pub fn is_known(&self) -> bool {
        !matches!(self, EntryKind::Other(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::Tutorial => "tutorial",
            EntryKind::Guide => "guide",
            EntryKind::Reference => "reference",
            EntryKind::Concept => "concept",
            EntryKind::Api => "api",
            EntryKind::Example => "example",
            EntryKind::Changelog => "changelog",
            EntryKind::Other(raw) => raw,
        }
    }
}

impl From<&str> for EntryKind {
    fn from(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "tutorial" => EntryKind::Tutorial,
            "guide" | "how-to" => EntryKind::Guide,
            "reference" => EntryKind::Reference,
            "concept" => EntryKind::Concept,
            "api" => EntryKind::Api,
            "example" => EntryKind::Example,
            "changelog" => EntryKind::Changelog,
            _ => EntryKind::Other(raw.trim().to_string()),
        }
    }
}

impl From<String> for EntryKind {
    fn from(raw: String) -> Self {
        EntryKind::from(raw.as_str())
    }
}

impl From<EntryKind> for String {
    fn from(kind: EntryKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge labels in the reference graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    DependsOn,
    RelatesTo,
    ConflictsWith,
    Cites,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::DependsOn => "depends_on",
            RelationKind::RelatesTo => "relates_to",
            RelationKind::ConflictsWith => "conflicts_with",
            RelationKind::Cites => "cites",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub relates_to: Vec<String>,
    #[serde(default)]
    pub conflicts_with: Vec<String>,
    /// Page URLs this concept cites.
    #[serde(default)]
    pub pages: Vec<String>,
    #[serde(default)]
    pub line: usize,
}

impl ConceptDefinition {
    /// Concept-to-concept relationships in declaration order.
    pub fn relationships(&self) -> impl Iterator<Item = (RelationKind, &str)> {
        let depends = self
            .depends_on
            .iter()
            .map(|t| (RelationKind::DependsOn, t.as_str()));
        let relates = self
            .relates_to
            .iter()
            .map(|t| (RelationKind::RelatesTo, t.as_str()));
        let conflicts = self
            .conflicts_with
            .iter()
            .map(|t| (RelationKind::ConflictsWith, t.as_str()));
        depends.chain(relates).chain(conflicts)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FewShotExample {
    pub id: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub source_pages: Vec<String>,
    #[serde(default)]
    pub relevant_concepts: Vec<String>,
    #[serde(default)]
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub language: Option<String>,
    #[serde(default)]
    pub line: usize,
}

/// Token-level facts recorded by the parser for the syntax level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxFacts {
    /// The input was empty or whitespace only.
    #[serde(default)]
    pub blank: bool,
    /// The input was not valid UTF-8 (or carried a byte-order mark).
    #[serde(default)]
    pub invalid_encoding: bool,
    #[serde(default)]
    pub crlf_lines: usize,
    #[serde(default)]
    pub first_crlf_line: Option<usize>,
    #[serde(default)]
    pub malformed_lines: Vec<MalformedLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedLine {
    pub line: usize,
    pub text: String,
    pub reason: String,
}

impl Document {
    /// The first H1 title.
    pub fn title(&self) -> Option<&str> {
        self.titles.first().map(|h| h.text.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }

    pub fn concepts(&self) -> impl Iterator<Item = &ConceptDefinition> {
        self.sections.iter().flat_map(|s| s.concepts.iter())
    }

    pub fn examples(&self) -> impl Iterator<Item = &FewShotExample> {
        self.sections.iter().flat_map(|s| s.examples.iter())
    }

    /// Named sections, skipping the implicit preamble.
    pub fn named_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| !s.is_preamble())
    }

    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    /// Rough token estimate: four bytes per token.
    pub fn estimated_tokens(&self) -> usize {
        self.size_bytes / 4
    }

    pub fn shape(&self) -> DocumentShape {
        DocumentShape {
            title_count: self.titles.len(),
            entry_count: self.entry_count(),
            prose_lines: self.prose_lines,
        }
    }

    /// Every page URL referenced anywhere in the document, in document
    /// order, duplicates included. Paired with the line that cites it.
    pub fn page_references(&self) -> Vec<(&str, usize)> {
        let mut refs = Vec::new();
        for section in &self.sections {
            for entry in &section.entries {
                refs.push((entry.url.as_str(), entry.line));
            }
            for concept in &section.concepts {
                refs.extend(concept.pages.iter().map(|p| (p.as_str(), concept.line)));
            }
            for example in &section.examples {
                refs.extend(example.source_pages.iter().map(|p| (p.as_str(), example.line)));
            }
        }
        refs
    }
}
