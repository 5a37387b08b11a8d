// src/diagnostics/codes.rs
// =============================================================================
// The diagnostic code catalog.
//
// Code format: {prefix}{number}
//   E001-E015  errors    structural failures, broken references and links
//   W001-W023  warnings  deviations from best practice
//   I001-I009  info      observations and suggestions
//
// Codes are part of the report's stable output: never renumber one, only add.
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Severity;

// Each line declares: Variant => "CODE", "message", "remediation";
// The macro expands it into the enum plus lookup tables for the strings.
macro_rules! diagnostic_codes {
    ($( $variant:ident => $code:literal, $message:literal, $remediation:literal; )*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum DiagnosticCode {
            $(
                #[serde(rename = $code)]
                $variant,
            )*
        }

        impl DiagnosticCode {
            pub const ALL: &'static [DiagnosticCode] = &[$(DiagnosticCode::$variant,)*];

            /// The stable code string, e.g. `E008`.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(DiagnosticCode::$variant => $code,)*
                }
            }

            /// One-line human message.
            pub fn message(self) -> &'static str {
                match self {
                    $(DiagnosticCode::$variant => $message,)*
                }
            }

            pub fn remediation(self) -> &'static str {
                match self {
                    $(DiagnosticCode::$variant => $remediation,)*
                }
            }
        }
    };
}

diagnostic_codes! {
    // ── Errors ────────────────────────────────────────────────────────────
    NoH1Title => "E001",
        "No H1 title found.",
        "Add a single '# Title' as the first line of the file.";
    MultipleH1 => "E002",
        "Multiple H1 titles found.",
        "Remove all but the first H1 title. Use H2 for section headers.";
    InvalidEncoding => "E003",
        "File is not valid UTF-8 encoding.",
        "Convert the file to UTF-8 encoding. Remove any BOM markers.";
    InvalidLineEndings => "E004",
        "File uses non-LF line endings (CR or CRLF detected).",
        "Convert line endings to LF (Unix-style).";
    InvalidMarkdown => "E005",
        "Entry line contains Markdown that cannot be parsed.",
        "Fix the entry syntax: '- [Title](url): Description'.";
    MalformedUrl => "E006",
        "Link has an empty or malformed URL.",
        "Fix or remove links with empty href values. Ensure all URLs are well-formed.";
    EmptyFile => "E007",
        "File is empty or contains only whitespace.",
        "Add content to the file. At minimum: H1 title, blockquote, one H2 section.";
    ExceedsSizeLimit => "E008",
        "File exceeds the maximum recommended size.",
        "Decompose into a tiered file strategy (index + full + per-section files).";
    DanglingReference => "E009",
        "Reference points to an identifier or URL that is not in the document.",
        "Define the missing target or remove the reference.";
    DuplicateIdentifier => "E010",
        "Identifier is defined more than once.",
        "Give every concept and example a unique identifier.";
    MissingRequiredField => "E011",
        "A required field is empty.",
        "Fill in the identifier, name, definition, prompt or answer.";
    LinkBroken => "E012",
        "Link target is broken.",
        "Update the URL to a live page or remove the entry.";
    LinkDnsFailure => "E013",
        "Link host name does not resolve.",
        "Check the host name for typos or remove the entry.";
    LinkVoid => "E014",
        "Most links in the file are empty or malformed.",
        "Repair the link entries; the file is unusable for navigation.";
    StructureChaos => "E015",
        "File has content but no recognizable section structure.",
        "Organize the content under '## Section' headings.";

    // ── Warnings ──────────────────────────────────────────────────────────
    MissingBlockquote => "W001",
        "No blockquote description found after the H1 title.",
        "Add a '> description' blockquote immediately after the H1 title.";
    NonCanonicalSectionName => "W002",
        "Section name does not match any canonical name.",
        "Use canonical section names where possible.";
    LinkMissingDescription => "W003",
        "Link entry has no description text.",
        "Add a description after the link: '- [Title](url): Description of the page'.";
    NoCodeExamples => "W004",
        "File contains no code examples.",
        "Add fenced code blocks with language specifiers.";
    CodeNoLanguage => "W005",
        "Code block found without a language specifier.",
        "Add a language identifier after the opening triple backticks.";
    FormulaicDescriptions => "W006",
        "Many entries share identical descriptions.",
        "Write unique, specific descriptions for each entry.";
    MissingVersionMetadata => "W007",
        "No version or last-updated metadata found.",
        "Add version metadata (e.g., 'Last updated: 2026-02-06').";
    SectionOrderNonCanonical => "W008",
        "Sections do not follow the canonical ordering.",
        "Reorder sections to match the canonical sequence.";
    NoMasterIndex => "W009",
        "No Master Index found as the first H2 section.",
        "Add a Master Index as the first H2 section with navigation links.";
    TokenBudgetExceeded => "W010",
        "File exceeds the recommended token budget for an index.",
        "Trim content to stay within the token budget.";
    EmptySections => "W011",
        "Section contains no meaningful content.",
        "Add content or remove the empty section.";
    DuplicateSectionName => "W012",
        "Section name is used more than once.",
        "Merge the sections or give them distinct names.";
    BareUrlEntry => "W013",
        "Entry is a bare URL instead of a Markdown link.",
        "Rewrite the entry as '- [Title](url): Description'.";
    PriorityOutOfOrder => "W014",
        "Entry priority is lower than a preceding entry in the same section.",
        "Order entries by non-decreasing priority.";
    DescriptionTooShort => "W015",
        "Entry description is shorter than the minimum length.",
        "Expand the description to say what the page covers.";
    DuplicateUrl => "W016",
        "URL is listed more than once.",
        "Keep a single entry per URL.";
    ReferenceCycle => "W017",
        "Concepts depend on each other in a cycle.",
        "Break the cycle by removing one of the depends_on relationships.";
    LinkTimeout => "W018",
        "Link did not respond in time.",
        "Check whether the host is overloaded or the URL is still valid.";
    LinkUnverified => "W019",
        "Link could not be verified.",
        "Re-run the check; the failure was not attributable to the link itself.";
    SectionTooLarge => "W020",
        "Section has more entries than an index should carry.",
        "Split the section or move the long tail to a full document.";
    SitemapDump => "W021",
        "One section holds nearly all entries.",
        "Group entries into meaningful sections instead of a flat list.";
    InvalidExtensionField => "W022",
        "Extension field has an invalid type or value.",
        "Fix the field value to match its declared type and range.";
    LinkDesert => "W023",
        "No entry in the file has a description.",
        "Describe what each linked page is for.";

    // ── Informational ─────────────────────────────────────────────────────
    NoLlmInstructions => "I001",
        "No LLM Instructions section found.",
        "Add an LLM Instructions section with positive/negative directives.";
    NoConceptDefinitions => "I002",
        "No structured concept definitions found.",
        "Add concept definitions with IDs and relationships.";
    NoFewShotExamples => "I003",
        "No few-shot Q&A examples found.",
        "Add Q&A pairs linked to concepts and source pages.";
    RelativeUrlsDetected => "I004",
        "Relative URL found in a link entry.",
        "Convert relative URLs to absolute URLs.";
    FullDocumentDetected => "I005",
        "File classified as a Full document.",
        "Consider creating an Index companion file.";
    OptionalSectionsUnmarked => "I006",
        "Optional sections are not marked with token estimates.",
        "Mark optional sections so consumers can skip them to save context.";
    JargonWithoutDefinition => "I007",
        "Domain-specific jargon used without inline definition.",
        "Define jargon inline or link to a concept definition.";
    LinkRedirected => "I008",
        "Link redirects to another URL.",
        "Point the entry at the final URL.";
    OrphanEntity => "I009",
        "Entity is never referenced by any other entity.",
        "Reference it from a concept or example, if that was intended.";
}

impl DiagnosticCode {
    /// Severity is derived from the code prefix.
    pub fn severity(self) -> Severity {
        match self.as_str().as_bytes()[0] {
            b'E' => Severity::Error,
            b'W' => Severity::Warning,
            _ => Severity::Info,
        }
    }

    /// Numeric part of the code (E008 -> 8).
    pub fn number(self) -> u16 {
        self.as_str()[1..].parse().unwrap_or(0)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
