// src/graph/mod.rs
// =============================================================================
// Reference graph over concepts, examples and pages.
//
// Nodes live in a flat arena and are addressed by index:
//   [0 .. concepts)   concept definitions, in document order
//   [.. examples)     few-shot examples, in document order
//   [.. pages)        entry URLs, in document order
// Edges are adjacency lists of (target index, relation). Cyclic references
// are ordinary data here; no node owns another.
//
// Three analyses run over the graph:
// - dangling references (target id/URL not in the document) -> E009
// - cycles over depends_on edges                             -> W017
// - orphans (never referenced by another node)               -> I009
// =============================================================================

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::diagnostics::{DiagnosticCode, ValidationIssue, ValidationLevel};
use crate::model::{Document, RelationKind};

const LEVEL: ValidationLevel = ValidationLevel::Reference;

/// Upper bound on reported cycles.
const MAX_CYCLES: usize = 1_000;

/// Upper bound on edges walked while searching for cycles.
const MAX_CYCLE_STEPS: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Concept,
    Example,
    Page,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Concept id, example id or page URL.
    pub key: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    to: usize,
    relation: RelationKind,
}

/// A relationship or citation whose target is not in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub source: usize,
    pub target: String,
    pub relation: RelationKind,
    pub line: usize,
}

#[derive(Debug, Default)]
pub struct ReferenceGraph {
    nodes: Vec<Node>,
    lookup: HashMap<(NodeKind, String), usize>,
    adjacency: Vec<Vec<Edge>>,
    concept_count: usize,
    dangling: Vec<DanglingReference>,
}

impl ReferenceGraph {
    /// Builds the graph in a single pass over the document.
    pub fn build(doc: &Document) -> Self {
        let mut graph = ReferenceGraph::default();

        for concept in doc.concepts() {
            graph.intern(NodeKind::Concept, &concept.id, concept.line);
        }
        graph.concept_count = graph.nodes.len();
        for example in doc.examples() {
            graph.intern(NodeKind::Example, &example.id, example.line);
        }
        for entry in doc.entries() {
            graph.intern(NodeKind::Page, &entry.url, entry.line);
        }

        for concept in doc.concepts() {
            // Duplicate ids resolve to the first definition.
            let Some(source) = graph.find(NodeKind::Concept, &concept.id) else {
                continue;
            };
            for (relation, target) in concept.relationships() {
                graph.link(source, NodeKind::Concept, target, relation, concept.line);
            }
            for page in &concept.pages {
                graph.link(source, NodeKind::Page, page, RelationKind::Cites, concept.line);
            }
        }

        for example in doc.examples() {
            let Some(source) = graph.find(NodeKind::Example, &example.id) else {
                continue;
            };
            for concept in &example.relevant_concepts {
                graph.link(source, NodeKind::Concept, concept, RelationKind::Cites, example.line);
            }
            for page in &example.source_pages {
                graph.link(source, NodeKind::Page, page, RelationKind::Cites, example.line);
            }
        }

        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edge_count(),
            dangling = graph.dangling.len(),
            "reference graph built"
        );

        graph
    }

    fn intern(&mut self, kind: NodeKind, key: &str, line: usize) {
        let key = key.trim();
        if key.is_empty() || self.lookup.contains_key(&(kind, key.to_string())) {
            return;
        }
        self.lookup.insert((kind, key.to_string()), self.nodes.len());
        self.nodes.push(Node {
            kind,
            key: key.to_string(),
            line,
        });
        self.adjacency.push(Vec::new());
    }

    fn find(&self, kind: NodeKind, key: &str) -> Option<usize> {
        self.lookup.get(&(kind, key.trim().to_string())).copied()
    }

    fn link(&mut self, source: usize, kind: NodeKind, target: &str, relation: RelationKind, line: usize) {
        if target.trim().is_empty() {
            return;
        }
        match self.find(kind, target) {
            Some(to) => {
                let edge = Edge { to, relation };
                if !self.adjacency[source].contains(&edge) {
                    self.adjacency[source].push(edge);
                }
            }
            None => self.dangling.push(DanglingReference {
                source,
                target: target.trim().to_string(),
                relation,
                line,
            }),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    pub fn dangling(&self) -> &[DanglingReference] {
        &self.dangling
    }

    /// Every elementary cycle over `depends_on` edges, each reported once.
    ///
    /// A cycle is found from its lowest-indexed member only: the search
    /// started at `start` never steps onto a node below it. Members are
    /// listed in traversal order beginning with that lowest node, so the
    /// result does not depend on where a caller would have started.
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        let mut found = Vec::new();
        let mut on_path = vec![false; self.nodes.len()];
        let mut steps = 0usize;

        'starts: for start in 0..self.concept_count {
            let mut path = vec![start];
            let mut cursor = vec![0usize];
            on_path[start] = true;

            while let Some(&node) = path.last() {
                let depth = path.len() - 1;
                let next = self.adjacency[node]
                    .iter()
                    .enumerate()
                    .skip(cursor[depth])
                    .find(|(_, edge)| edge.relation == RelationKind::DependsOn);

                let Some((position, edge)) = next else {
                    on_path[node] = false;
                    path.pop();
                    cursor.pop();
                    continue;
                };
                cursor[depth] = position + 1;

                steps += 1;
                if steps > MAX_CYCLE_STEPS || found.len() >= MAX_CYCLES {
                    warn!(cycles = found.len(), "cycle search stopped early");
                    for &member in &path {
                        on_path[member] = false;
                    }
                    break 'starts;
                }

                if edge.to == start {
                    found.push(path.clone());
                } else if edge.to > start && !on_path[edge.to] {
                    on_path[edge.to] = true;
                    path.push(edge.to);
                    cursor.push(0);
                }
            }
        }

        found
    }

    /// Concepts and pages that no other node points at.
    pub fn orphans(&self) -> Vec<usize> {
        let mut referenced = vec![false; self.nodes.len()];
        for (source, edges) in self.adjacency.iter().enumerate() {
            for edge in edges {
                if edge.to != source {
                    referenced[edge.to] = true;
                }
            }
        }

        self.nodes
            .iter()
            .enumerate()
            .filter(|(index, node)| node.kind != NodeKind::Example && !referenced[*index])
            .map(|(index, _)| index)
            .collect()
    }
}

/// Runs every reference analysis and returns the issues in a fixed order:
/// dangling references, then cycles, then orphans.
pub fn analyze(doc: &Document) -> Vec<ValidationIssue> {
    let graph = ReferenceGraph::build(doc);
    let mut issues = Vec::new();

    for dangling in graph.dangling() {
        let source = graph.node(dangling.source);
        issues.push(
            ValidationIssue::new(
                DiagnosticCode::DanglingReference,
                LEVEL,
                format!(
                    "'{}' {} '{}', which is not defined in the document.",
                    source.key,
                    dangling.relation.as_str(),
                    dangling.target
                ),
            )
            .at_line(dangling.line)
            .with_source(source.key.clone())
            .with_target(dangling.target.clone()),
        );
    }

    for cycle in graph.cycles() {
        let members: Vec<String> = cycle.iter().map(|&i| graph.node(i).key.clone()).collect();
        let first = graph.node(cycle[0]);
        let mut shown = members.clone();
        shown.push(first.key.clone());

        issues.push(
            ValidationIssue::new(
                DiagnosticCode::ReferenceCycle,
                LEVEL,
                format!("Concepts depend on each other in a cycle: {}.", shown.join(" -> ")),
            )
            .at_line(first.line)
            .with_source(first.key.clone())
            .with_related(members),
        );
    }

    // A plain link index has nothing that could reference its pages.
    if doc.concepts().next().is_some() || doc.examples().next().is_some() {
        for index in graph.orphans() {
            let node = graph.node(index);
            let what = match node.kind {
                NodeKind::Concept => "Concept",
                NodeKind::Page => "Page",
                NodeKind::Example => "Example",
            };
            issues.push(
                ValidationIssue::new(
                    DiagnosticCode::OrphanEntity,
                    LEVEL,
                    format!("{what} '{}' is not referenced by any concept or example.", node.key),
                )
                .at_line(node.line)
                .with_source(node.key.clone()),
            );
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConceptDefinition, Entry, FewShotExample, Section};

    fn concept(id: &str, depends_on: &[&str]) -> ConceptDefinition {
        ConceptDefinition {
            id: id.into(),
            name: id.to_uppercase(),
            definition: format!("{id} definition"),
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn doc(concepts: Vec<ConceptDefinition>) -> Document {
        Document {
            sections: vec![Section {
                name: "Concepts".into(),
                concepts,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn of_code(issues: &[ValidationIssue], code: DiagnosticCode) -> Vec<&ValidationIssue> {
        issues.iter().filter(|i| i.code == code).collect()
    }

    #[test]
    fn test_three_cycle_reported_once_in_any_order() {
        let orders = [["a", "b", "c"], ["b", "c", "a"], ["c", "a", "b"], ["c", "b", "a"]];
        for order in orders {
            let target = |id: &str| match id {
                "a" => "b",
                "b" => "c",
                _ => "a",
            };
            let concepts = order.into_iter().map(|id| concept(id, &[target(id)])).collect();
            let issues = analyze(&doc(concepts));

            let cycles = of_code(&issues, DiagnosticCode::ReferenceCycle);
            assert_eq!(cycles.len(), 1, "order {order:?}");
            let mut members = cycles[0].related.clone();
            members.sort();
            assert_eq!(members, vec!["a", "b", "c"]);
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let issues = analyze(&doc(vec![concept("a", &["a"])]));
        let cycles = of_code(&issues, DiagnosticCode::ReferenceCycle);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].related, vec!["a"]);
    }

    #[test]
    fn test_two_cycles_sharing_a_node() {
        // a <-> b and a <-> c
        let issues = analyze(&doc(vec![
            concept("a", &["b", "c"]),
            concept("b", &["a"]),
            concept("c", &["a"]),
        ]));
        assert_eq!(of_code(&issues, DiagnosticCode::ReferenceCycle).len(), 2);
    }

    #[test]
    fn test_relates_to_does_not_form_cycles() {
        let mut a = concept("a", &[]);
        a.relates_to = vec!["b".into()];
        let mut b = concept("b", &[]);
        b.relates_to = vec!["a".into()];
        let issues = analyze(&doc(vec![a, b]));
        assert!(of_code(&issues, DiagnosticCode::ReferenceCycle).is_empty());
    }

    #[test]
    fn test_single_dangling_reference() {
        let issues = analyze(&doc(vec![concept("x", &["y"])]));
        let dangling = of_code(&issues, DiagnosticCode::DanglingReference);
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].source.as_deref(), Some("x"));
        assert_eq!(dangling[0].target.as_deref(), Some("y"));
    }

    #[test]
    fn test_citations_must_resolve_to_entries() {
        let mut document = doc(vec![concept("x", &[])]);
        document.sections[0].concepts[0].pages = vec!["https://missing.example".into()];
        document.sections.push(Section {
            name: "Few-Shot Examples".into(),
            examples: vec![FewShotExample {
                id: "ex".into(),
                relevant_concepts: vec!["x".into(), "ghost".into()],
                ..Default::default()
            }],
            ..Default::default()
        });

        let issues = analyze(&document);
        let targets: Vec<_> = of_code(&issues, DiagnosticCode::DanglingReference)
            .iter()
            .filter_map(|i| i.target.as_deref())
            .collect();
        assert_eq!(targets, vec!["https://missing.example", "ghost"]);
    }

    #[test]
    fn test_orphans() {
        let mut document = doc(vec![concept("root", &[]), concept("leaf", &[])]);
        document.sections[0].concepts[0].depends_on = vec!["leaf".into()];
        document.sections[0].concepts[0].pages = vec!["https://cited.example".into()];
        document.sections.push(Section {
            name: "Docs".into(),
            entries: vec![
                Entry {
                    url: "https://cited.example".into(),
                    ..Default::default()
                },
                Entry {
                    url: "https://lonely.example".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });

        let issues = analyze(&document);
        let orphans: Vec<_> = of_code(&issues, DiagnosticCode::OrphanEntity)
            .iter()
            .filter_map(|i| i.source.as_deref())
            .collect();
        assert_eq!(orphans, vec!["root", "https://lonely.example"]);
    }

    #[test]
    fn test_plain_link_index_has_no_orphans() {
        let document = Document {
            sections: vec![Section {
                name: "Docs".into(),
                entries: vec![Entry {
                    url: "https://a.example".into(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(analyze(&document).is_empty());
    }

    #[test]
    fn test_duplicate_edges_are_collapsed() {
        let graph = ReferenceGraph::build(&doc(vec![concept("a", &["b", "b"]), concept("b", &[])]));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.nodes().len(), 2);
    }
}
