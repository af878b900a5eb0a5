//! # knowledger-pipeline
//!
//! Orchestration layer for knowledger: the ibit capture pipeline
//! (extract, reconcile, persist, confirm), manual tag editing, and the
//! non-repeating quiz rotation.
//!
//! Storage and inference are injected through the traits in
//! `knowledger-core`, so the pipeline itself is backend-agnostic.

pub mod ingest;
pub mod quiz;

// Re-export core types
pub use knowledger_core::*;

pub use ingest::{confirmation_summary, IngestOutcome, IngestionPipeline};
pub use quiz::QuizGenerator;
