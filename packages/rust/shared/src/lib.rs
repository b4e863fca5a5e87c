//! Shared types, error model, and configuration for glossimport.
//!
//! This crate is the foundation depended on by the other glossimport crates.
//! It provides:
//! - [`GlossImportError`], the unified error type
//! - The concept model ([`Concept`], [`Designation`], closed vocabularies)
//! - The fixed CSV column layout ([`schema`], [`Row`])
//! - Configuration ([`AppConfig`], [`ImportSettings`], config loading)

pub mod config;
pub mod error;
pub mod schema;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, ImportSettings, RegisterConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{GlossImportError, Result};
pub use schema::{HEADERS, Row, TERM_GROUPS, TermGroup, matches_schema};
pub use types::{
    ABSTRACT_NAMESPACE, AuthoritativeSource, Concept, Designation, DesignationType,
    GrammaticalGender, GrammaticalNumber, LOCALIZED_NAMESPACE, PartOfSpeech, UnknownTerm,
};
