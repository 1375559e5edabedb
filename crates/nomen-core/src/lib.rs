//! Cross-reference resolution for terminology dictionaries.
//!
//! Given a Gold Book style dictionary and a list of requested titles, the crate
//! fetches each matching entry's definition, resolves the `@identifier@`
//! cross-references inside it and produces flat `Title, Status, URL,
//! Definition` rows.
//!
//! # Architecture Overview
//!
//! - **Dictionary store** (`dictionary`): immutable identifier → record map
//! - **Marker extraction** (`markers`): ordered payloads and spans
//! - **Reference resolution** (`resolver`): local, external or auto lookup
//! - **Substitution** (`substitution`): left-to-right splicing
//! - **Record assembly** (`assembler`): per-term pipeline and run report
//! - **Collaborators** (`fetcher`, `export`, `requests`): HTTP, CSV and input glue
//! - **Configuration** (`config`, `factory`): YAML settings and wiring

pub mod assembler;
pub mod config;
pub mod dictionary;
pub mod errors;
pub mod export;
pub mod factory;
pub mod fetcher;
pub mod markers;
pub mod requests;
pub mod resolver;
pub mod substitution;

pub use assembler::{AssemblerOptions, RecordAssembler, RunReport, TermFailure, UnresolvedPolicy};
pub use config::{ConfigLoader, NomenConfig};
pub use dictionary::{TermDictionary, TermRecord, TermStatus};
pub use errors::NomenError;
pub use export::{CsvExporter, OutputRow, TabularExporter};
pub use factory::AssemblerFactory;
pub use fetcher::{DefinitionFetcher, HttpDefinitionFetcher};
pub use markers::{extract_markers, extract_payloads, Delimiters, Marker};
pub use resolver::{ExternalLookup, ReferenceResolver, Resolution, ResolutionMode};
pub use substitution::substitute;
