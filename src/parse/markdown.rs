// src/parse/markdown.rs
// =============================================================================
// This module turns a single list item line into a model value.
//
// We use the `pulldown-cmark` crate to find the link inside an entry:
// - It parses Markdown into events (link start, text, link end, ...)
// - The offset iterator tells us where the link ends, so everything after
//   it is the description
//
// Item shapes, by section role:
//   Links:     - [Label](https://url): Description {kind: guide, priority: 2}
//              - https://bare-url Description
//   Concepts:  - **id** (Name): Definition {depends_on: a|b, pages: url}
//   Examples:  - **id** Q: Prompt? A: Answer {sources: url, concepts: a|b}
// =============================================================================

use std::collections::BTreeMap;

use pulldown_cmark::{Event, Parser, Tag};

use crate::model::{ConceptDefinition, Entry, EntryKind, FewShotExample, SectionRole};

/// What a list item turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ListItem {
    Entry(Entry),
    Concept(ConceptDefinition),
    Example(FewShotExample),
    /// Plain bulleted prose.
    Text,
    /// Looked like an entry but could not be parsed; holds the reason.
    Malformed(String),
}

/// Parses the text of a list item (without the leading `- `).
pub(crate) fn parse_list_item(item: &str, line: usize, role: SectionRole) -> ListItem {
    let (body, attributes) = split_attributes(item.trim());

    if body.starts_with("**") {
        return match role {
            SectionRole::Concepts => parse_concept(body, &attributes, line),
            SectionRole::Examples => parse_example(body, &attributes, line),
            SectionRole::Links | SectionRole::Instructions => ListItem::Text,
        };
    }

    if is_http_link(body) {
        return ListItem::Entry(parse_bare_entry(body, attributes, line));
    }

    if body.starts_with('[') {
        return parse_link_entry(body, attributes, line);
    }

    ListItem::Text
}

// Markdown link entry: [Label](url) followed by an optional description
fn parse_link_entry(body: &str, attributes: BTreeMap<String, String>, line: usize) -> ListItem {
    let mut url: Option<String> = None;
    let mut label = String::new();
    let mut link_end = None;

    // Walk the events with their byte ranges; we only need the first link.
    for (event, range) in Parser::new(body).into_offset_iter() {
        match event {
            Event::Start(Tag::Link(_link_type, dest_url, _title)) if url.is_none() => {
                // The link must open the item; "[x] text [y](url)" is not an entry.
                if range.start != 0 {
                    return ListItem::Malformed("entry does not start with its link".to_string());
                }
                url = Some(dest_url.to_string());
            }
            Event::Text(text) | Event::Code(text) if url.is_some() => {
                label.push_str(&text);
            }
            Event::End(Tag::Link(..)) => {
                link_end = Some(range.end);
                break;
            }
            _ => {}
        }
    }

    let (Some(url), Some(end)) = (url, link_end) else {
        return ListItem::Malformed("link is not closed or has no target".to_string());
    };

    ListItem::Entry(build_entry(url, label, description_after(&body[end..]), attributes, false, line))
}

// Bare URL entry: https://example.com/page optional description
fn parse_bare_entry(body: &str, attributes: BTreeMap<String, String>, line: usize) -> Entry {
    let (url, rest) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
    let url = url.trim_end_matches(':');
    build_entry(url.to_string(), String::new(), description_after(rest), attributes, true, line)
}

fn build_entry(
    url: String,
    label: String,
    description: Option<String>,
    attributes: BTreeMap<String, String>,
    bare: bool,
    line: usize,
) -> Entry {
    let kind = attributes.get("kind").map(|k| EntryKind::from(k.as_str()));
    let priority = attributes.get("priority").and_then(|p| p.trim().parse().ok());

    Entry {
        url: url.trim().to_string(),
        label: label.trim().to_string(),
        description,
        kind,
        priority,
        attributes,
        bare,
        line,
    }
}

// Strips the separator between link and description (": " or " - ").
fn description_after(rest: &str) -> Option<String> {
    let text = rest
        .trim_start()
        .trim_start_matches(|c: char| matches!(c, ':' | '-' | '\u{2013}'))
        .trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_concept(body: &str, attributes: &BTreeMap<String, String>, line: usize) -> ListItem {
    let Some((id, rest)) = split_bold(body) else {
        return ListItem::Malformed("concept identifier is not closed with **".to_string());
    };

    let rest = rest.trim();
    let (name, after_name) = match rest.strip_prefix('(') {
        Some(inner) => match inner.split_once(')') {
            Some((name, after)) => (name.trim(), after),
            None => return ListItem::Malformed("concept name is not closed with )".to_string()),
        },
        None => ("", rest),
    };

    ListItem::Concept(ConceptDefinition {
        id: id.to_string(),
        name: name.to_string(),
        definition: after_name.trim().trim_start_matches(':').trim().to_string(),
        depends_on: attribute_list(attributes, "depends_on"),
        relates_to: attribute_list(attributes, "relates_to"),
        conflicts_with: attribute_list(attributes, "conflicts_with"),
        pages: attribute_list(attributes, "pages"),
        line,
    })
}

fn parse_example(body: &str, attributes: &BTreeMap<String, String>, line: usize) -> ListItem {
    let Some((id, rest)) = split_bold(body) else {
        return ListItem::Malformed("example identifier is not closed with **".to_string());
    };

    // "Q: prompt A: answer" - either half may be missing, the content level
    // reports empty required fields.
    let rest = rest.trim();
    let after_q = rest.strip_prefix("Q:").unwrap_or(rest);
    let (prompt, answer) = match after_q.find("A:") {
        Some(at) => (&after_q[..at], &after_q[at + 2..]),
        None => (after_q, ""),
    };

    ListItem::Example(FewShotExample {
        id: id.to_string(),
        prompt: prompt.trim().to_string(),
        answer: answer.trim().to_string(),
        source_pages: attribute_list(attributes, "sources"),
        relevant_concepts: attribute_list(attributes, "concepts"),
        line,
    })
}

// "**id** rest" -> ("id", " rest")
fn split_bold(body: &str) -> Option<(&str, &str)> {
    let inner = body.strip_prefix("**")?;
    let (id, rest) = inner.split_once("**")?;
    Some((id.trim(), rest))
}

/// Splits a trailing `{key: value, key: a|b}` block off an item.
pub(crate) fn split_attributes(item: &str) -> (&str, BTreeMap<String, String>) {
    let mut attributes = BTreeMap::new();

    let Some(stripped) = item.strip_suffix('}') else {
        return (item, attributes);
    };
    let Some(open) = stripped.rfind('{') else {
        return (item, attributes);
    };

    for pair in stripped[open + 1..].split(',') {
        // Values may contain ':' (URLs), so split on the first one only.
        if let Some((key, value)) = pair.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                attributes.insert(key.to_lowercase(), value.trim().to_string());
            }
        }
    }

    if attributes.is_empty() {
        return (item, attributes);
    }

    (stripped[..open].trim_end(), attributes)
}

fn attribute_list(attributes: &BTreeMap<String, String>, key: &str) -> Vec<String> {
    attributes
        .get(key)
        .map(|value| {
            value
                .split('|')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

// Helper function to check if a string starts with an HTTP/HTTPS URL
fn is_http_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
