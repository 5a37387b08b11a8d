// src/model/mod.rs
// =============================================================================
// The in-memory document model every checking component reads.
//
// Submodules:
// - document: Document, Section, Entry, ConceptDefinition, FewShotExample
// - kind:     Index vs Full classification by size and shape
// - sections: canonical section names, aliases and their ordering
// =============================================================================

mod document;
mod kind;
mod sections;

pub use document::{
    CodeBlock, ConceptDefinition, Document, Entry, EntryKind, FewShotExample, Heading,
    MalformedLine, RelationKind, Section, SectionRole, SyntaxFacts,
};
pub use kind::{classify, DocumentKind, DocumentShape, DEFAULT_INDEX_SIZE_THRESHOLD};
pub use sections::CanonicalSection;
