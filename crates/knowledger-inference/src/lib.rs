//! # knowledger-inference
//!
//! External text-understanding backends for knowledger.
//!
//! This crate provides:
//! - OpenAI-compatible generation backend (any chat-completions endpoint)
//! - The metadata-extraction prompt contract and strict response parsing
//! - Quiz-question synthesis and answer-choice shuffling
//! - Whisper-style audio transcription for voice ibits
//! - Deterministic mock backend for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use knowledger_inference::{MetadataExtractor, OpenAIBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = Arc::new(OpenAIBackend::extraction_from_env().unwrap());
//!     let extractor = MetadataExtractor::new(backend);
//!     let metadata = extractor
//!         .extract("Met Alice in Berlin on 2024-03-01, via NYT", &[])
//!         .await;
//! }
//! ```

pub mod extraction;
pub mod mock;
pub mod openai;
pub mod quiz;
pub mod transcription;

// Re-export core types
pub use knowledger_core::*;

pub use extraction::{extraction_prompt, parse_metadata, strip_code_fence, MetadataExtractor};
pub use mock::MockGenerationBackend;
pub use openai::{OpenAIBackend, OpenAIConfig};
pub use quiz::{parse_quiz_response, quiz_prompt, shuffle_choices, QuizProposal};
pub use transcription::{TranscriptionBackend, WhisperBackend};
