// src/parse/mod.rs
// =============================================================================
// This module turns raw llms.txt text into a Document.
//
// The parser is forgiving: anything it cannot understand is recorded in
// Document::syntax and parsing carries on, so the validator always has a
// best-effort model to work with. The only hard failure is input that is
// clearly not text at all.
//
// Recognized lines:
//   # Title                 H1 title (more than one is recorded)
//   > Summary               blockquote description right after the title
//   ## Section              starts a new section
//   - item / * item         list item, see markdown.rs
//   Version: / Last updated: version metadata
//   ``` lang                fenced code block
// =============================================================================

mod markdown;

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::ParseError;
use crate::model::{
    classify, CodeBlock, Document, Heading, MalformedLine, Section, SectionRole,
    DEFAULT_INDEX_SIZE_THRESHOLD,
};

use markdown::{parse_list_item, ListItem};

// "~2,000 tokens", "1.5k tokens", "800 tokens"
static TOKEN_ESTIMATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(k)?\s*tokens\b").expect("token estimate pattern is valid")
});

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Byte size at which a document becomes Full.
    pub index_size_threshold: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            index_size_threshold: DEFAULT_INDEX_SIZE_THRESHOLD,
        }
    }
}

/// Parses a raw document.
///
/// Returns `Err` only for binary input. Every other defect (bad encoding,
/// CRLF line endings, malformed entries) is recorded on the returned
/// document for the syntax level to report.
pub fn parse(raw: &[u8], options: &ParseOptions) -> Result<Document, ParseError> {
    if let Some(offset) = raw.iter().position(|b| *b == 0) {
        return Err(ParseError::Binary { offset });
    }

    let mut doc = Document {
        size_bytes: raw.len(),
        ..Default::default()
    };

    // Decode lossily so a best-effort model still comes out of bad bytes.
    let (text, mut invalid_encoding) = match std::str::from_utf8(raw) {
        Ok(text) => (Cow::Borrowed(text), false),
        Err(_) => (String::from_utf8_lossy(raw), true),
    };
    let text = match text.strip_prefix('\u{feff}') {
        Some(rest) => {
            invalid_encoding = true;
            rest
        }
        None => &text[..],
    };

    doc.syntax.invalid_encoding = invalid_encoding;
    doc.syntax.blank = text.trim().is_empty();

    // Old Mac files break lines with a lone CR. Every break is still a
    // line-ending defect, but the lines themselves are kept.
    let cr_only = !text.contains('\n') && text.contains('\r');
    let separator = if cr_only { '\r' } else { '\n' };

    let mut scanner = Scanner::new(&mut doc);
    let mut lines = text.split(separator).enumerate().peekable();
    while let Some((index, raw_line)) = lines.next() {
        if cr_only && lines.peek().is_some() {
            scanner.note_crlf(index + 1);
        }
        scanner.line(index + 1, raw_line);
    }
    scanner.finish();

    doc.kind = classify(doc.size_bytes, &doc.shape(), options.index_size_threshold);

    debug!(
        sections = doc.sections.len(),
        entries = doc.entry_count(),
        kind = ?doc.kind,
        "parsed document"
    );

    Ok(doc)
}

// Line-by-line state while walking the text
struct Scanner<'a> {
    doc: &'a mut Document,
    // Some(fence marker) while inside a fenced code block
    fence: Option<&'static str>,
    seen_first_section: bool,
}

impl<'a> Scanner<'a> {
    fn new(doc: &'a mut Document) -> Self {
        Self {
            doc,
            fence: None,
            seen_first_section: false,
        }
    }

    fn line(&mut self, line_no: usize, raw_line: &str) {
        let line = match raw_line.strip_suffix('\r') {
            Some(stripped) => {
                self.note_crlf(line_no);
                stripped
            }
            None => raw_line,
        };
        // A lone CR in the middle of a line is an old Mac line break.
        if line.contains('\r') {
            self.note_crlf(line_no);
        }

        let trimmed = line.trim();

        if let Some(marker) = self.fence {
            if trimmed.starts_with(marker) {
                self.fence = None;
            }
            self.body_line();
            return;
        }

        if trimmed.is_empty() {
            return;
        }

        if let Some(marker) = ["```", "~~~"].into_iter().find(|m| trimmed.starts_with(m)) {
            let info = trimmed.trim_start_matches(marker).trim();
            let language = info.split_whitespace().next().map(String::from);
            self.doc.code_blocks.push(CodeBlock {
                language,
                line: line_no,
            });
            self.fence = Some(marker);
            self.body_line();
            return;
        }

        if let Some(text) = heading(trimmed, 1) {
            self.doc.titles.push(Heading {
                text: text.to_string(),
                line: line_no,
            });
            return;
        }

        if let Some(name) = heading(trimmed, 2) {
            self.seen_first_section = true;
            self.doc.sections.push(Section {
                name: name.to_string(),
                line: line_no,
                role: SectionRole::from_heading(name),
                token_estimate: token_estimate(name),
                ..Default::default()
            });
            return;
        }

        if trimmed.starts_with('#') {
            // H3 and deeper headings are content of the current section.
            self.body_line();
            return;
        }

        if let Some(quote) = trimmed.strip_prefix('>') {
            let quote = quote.trim();
            if self.version_line(quote) {
                return;
            }
            let describes_title = !self.doc.titles.is_empty() && !self.seen_first_section;
            if describes_title && self.doc.description.is_none() {
                self.doc.description = Some(quote.to_string());
            } else if describes_title {
                // Continuation of the summary blockquote.
                if let Some(description) = self.doc.description.as_mut() {
                    description.push(' ');
                    description.push_str(quote);
                }
            } else {
                self.body_line();
            }
            return;
        }

        if self.version_line(trimmed) {
            return;
        }

        if let Some(item) = list_item(trimmed) {
            self.list_item(line_no, item);
            return;
        }

        if let Some(section) = self.doc.sections.last_mut() {
            if section.token_estimate.is_none() {
                section.token_estimate = token_estimate(trimmed);
            }
        }
        self.body_line();
    }

    fn list_item(&mut self, line_no: usize, item: &str) {
        let role = self
            .doc
            .sections
            .last()
            .map(|s| s.role)
            .unwrap_or_default();

        match parse_list_item(item, line_no, role) {
            ListItem::Entry(entry) => self.current_section(line_no).entries.push(entry),
            ListItem::Concept(concept) => self.current_section(line_no).concepts.push(concept),
            ListItem::Example(example) => self.current_section(line_no).examples.push(example),
            ListItem::Text => self.body_line(),
            ListItem::Malformed(reason) => {
                self.doc.syntax.malformed_lines.push(MalformedLine {
                    line: line_no,
                    text: item.to_string(),
                    reason,
                });
            }
        }
    }

    // Returns the section new items go to, opening the implicit preamble
    // section when no `##` heading has been seen yet.
    fn current_section(&mut self, line_no: usize) -> &mut Section {
        if self.doc.sections.is_empty() {
            self.doc.sections.push(Section {
                line: line_no,
                ..Default::default()
            });
        }
        let last = self.doc.sections.len() - 1;
        &mut self.doc.sections[last]
    }

    fn body_line(&mut self) {
        self.doc.prose_lines += 1;
        if let Some(section) = self.doc.sections.last_mut() {
            section.body_lines += 1;
        }
    }

    fn version_line(&mut self, text: &str) -> bool {
        let lower = text.to_lowercase();
        let value = ["version:", "last updated:", "last-updated:", "updated:"]
            .into_iter()
            .find_map(|prefix| lower.starts_with(prefix).then(|| text[prefix.len()..].trim()));

        match value {
            Some(value) if !value.is_empty() => {
                self.doc.version.get_or_insert_with(|| value.to_string());
                true
            }
            _ => false,
        }
    }

    fn note_crlf(&mut self, line_no: usize) {
        self.doc.syntax.crlf_lines += 1;
        self.doc.syntax.first_crlf_line.get_or_insert(line_no);
    }

    fn finish(mut self) {
        if self.fence.is_some() {
            if let Some(block) = self.doc.code_blocks.last() {
                let line = block.line;
                self.doc.syntax.malformed_lines.push(MalformedLine {
                    line,
                    text: String::from("```"),
                    reason: String::from("code fence is never closed"),
                });
            }
        }
    }
}

fn token_estimate(text: &str) -> Option<usize> {
    let captures = TOKEN_ESTIMATE.captures(text)?;
    let number: f64 = captures[1].replace(',', "").parse().ok()?;
    let scale = if captures.get(2).is_some() { 1_000.0 } else { 1.0 };
    Some((number * scale).round() as usize)
}

// "## Name" -> Some("Name") for level 2
fn heading(line: &str, level: usize) -> Option<&str> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes != level {
        return None;
    }
    let rest = &line[level..];
    // "#Title" without a space is not a heading in CommonMark.
    if !rest.is_empty() && !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }
    Some(rest.trim().trim_end_matches('#').trim())
}

fn list_item(line: &str) -> Option<&str> {
    ["- ", "* ", "+ "]
        .into_iter()
        .find_map(|bullet| line.strip_prefix(bullet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentKind;

    fn parse_str(text: &str) -> Document {
        parse(text.as_bytes(), &ParseOptions::default()).unwrap()
    }

    const SAMPLE: &str = "# Demo Project
> A small demo used to exercise the parser.

Version: 1.2.0

## Master Index
- [Guide](https://demo.example/guide): How to get going with the demo {kind: guide}
- https://demo.example/bare

## Core Concepts
- **widget** (Widget): The basic unit of the demo. {depends_on: gadget, pages: https://demo.example/guide}
- **gadget** (Gadget): Helper attached to widgets.

## Few-Shot Examples
- **ex-1** Q: What is a widget? A: The basic unit. {sources: https://demo.example/guide, concepts: widget}

## Notes
Plain prose line.

```rust
fn main() {}
```
";

    #[test]
    fn test_parse_sample_document() {
        let doc = parse_str(SAMPLE);
        assert_eq!(doc.title(), Some("Demo Project"));
        assert_eq!(doc.description.as_deref(), Some("A small demo used to exercise the parser."));
        assert_eq!(doc.version.as_deref(), Some("1.2.0"));
        assert_eq!(doc.sections.len(), 4);
        assert_eq!(doc.entry_count(), 2);
        assert!(doc.sections[0].entries[1].bare);
        assert_eq!(doc.concepts().count(), 2);
        assert_eq!(doc.examples().count(), 1);
        assert_eq!(doc.code_blocks.len(), 1);
        assert_eq!(doc.code_blocks[0].language.as_deref(), Some("rust"));
        assert_eq!(doc.sections[3].body_lines, 4);
        assert_eq!(doc.kind, DocumentKind::Index);
        assert!(doc.syntax.malformed_lines.is_empty());
    }

    #[test]
    fn test_line_numbers_are_one_based() {
        let doc = parse_str(SAMPLE);
        assert_eq!(doc.titles[0].line, 1);
        assert_eq!(doc.sections[0].line, 6);
        assert_eq!(doc.sections[0].entries[0].line, 7);
    }

    #[test]
    fn test_blank_input() {
        let doc = parse_str("   \n\n");
        assert!(doc.syntax.blank);
        assert!(doc.sections.is_empty());
    }

    #[test]
    fn test_crlf_is_recorded() {
        let doc = parse_str("# T\r\n\r\n## S\r\n- [a](https://a.example): desc\r\n");
        assert_eq!(doc.syntax.crlf_lines, 4);
        assert_eq!(doc.syntax.first_crlf_line, Some(1));
        assert_eq!(doc.entries().next().unwrap().url, "https://a.example");
    }

    #[test]
    fn test_invalid_utf8_is_best_effort() {
        let mut raw = b"# Title\n## Docs\n- [a](https://a.example): caf".to_vec();
        raw.push(0xE9);
        let doc = parse(&raw, &ParseOptions::default()).unwrap();
        assert!(doc.syntax.invalid_encoding);
        assert_eq!(doc.entry_count(), 1);
    }

    #[test]
    fn test_bom_counts_as_invalid_encoding() {
        let doc = parse_str("\u{feff}# Title\n");
        assert!(doc.syntax.invalid_encoding);
        assert_eq!(doc.title(), Some("Title"));
    }

    #[test]
    fn test_binary_input_is_rejected() {
        let err = parse(b"# T\0\0", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::Binary { offset: 3 }));
    }

    #[test]
    fn test_malformed_entry_keeps_parsing() {
        let doc = parse_str("# T\n## Docs\n- [broken](https://x.example\n- [ok](https://ok.example): fine entry\n");
        assert_eq!(doc.syntax.malformed_lines.len(), 1);
        assert_eq!(doc.syntax.malformed_lines[0].line, 3);
        assert_eq!(doc.entry_count(), 1);
    }

    #[test]
    fn test_entries_before_first_section_go_to_preamble() {
        let doc = parse_str("# T\n- [a](https://a.example): first\n## Docs\n");
        assert!(doc.sections[0].is_preamble());
        assert_eq!(doc.sections[0].entries.len(), 1);
        assert_eq!(doc.sections[1].name, "Docs");
    }

    #[test]
    fn test_unclosed_fence_is_malformed() {
        let doc = parse_str("# T\n## Code\n```bash\necho hi\n");
        assert_eq!(doc.syntax.malformed_lines.len(), 1);
        assert_eq!(doc.syntax.malformed_lines[0].line, 3);
    }

    #[test]
    fn test_heading_requires_space() {
        assert_eq!(heading("## Docs", 2), Some("Docs"));
        assert_eq!(heading("##Docs", 2), None);
        assert_eq!(heading("### Deep", 2), None);
    }

    #[test]
    fn test_cr_only_line_breaks_keep_the_structure() {
        let doc = parse_str("# T\r> Summary\r\r## Docs\r- [a](https://a.example): An example page\r");
        assert_eq!(doc.title(), Some("T"));
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].line, 4);
        assert_eq!(doc.entry_count(), 1);
        assert_eq!(doc.syntax.first_crlf_line, Some(1));
        assert_eq!(doc.syntax.crlf_lines, 5);
    }

    #[test]
    fn test_token_estimates() {
        let doc = parse_str("# T\n## Optional (~2,000 tokens)\n## Appendix\nRoughly 1.5k tokens of extras.\n## Extras\n");
        assert_eq!(doc.sections[0].token_estimate, Some(2_000));
        assert_eq!(doc.sections[1].token_estimate, Some(1_500));
        assert_eq!(doc.sections[2].token_estimate, None);
        assert_eq!(token_estimate("no numbers here"), None);
    }
}
