// * Content Structure Layer
// * Pure, synchronous parsing of documents into sections and paragraphs.

pub mod structure;

pub use structure::{parse_structure, parse_structure_with, Paragraph, Section, StructureConfig};
