//! Core import logic for glossimport.
//!
//! Rows flow through `extract` (raw row → candidate), `validate`
//! (candidate → typed concept) and `writer` (concept → YAML records).
//! `parser` streams rows from CSV and `pipeline` ties everything together
//! with repository scaffolding into the end-to-end `import_glossary` run.

pub mod extract;
pub mod parser;
pub mod pipeline;
pub mod scaffold;
pub mod validate;
pub mod writer;
