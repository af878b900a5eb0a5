//! Centralized default constants for knowledger.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates should reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// INFERENCE
// =============================================================================

/// Default OpenAI-compatible API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default generation model for metadata extraction and quiz synthesis.
pub const GEN_MODEL: &str = "gpt-4o-mini";

/// Default transcription model for voice ibits.
pub const TRANSCRIBE_MODEL: &str = "whisper-1";

/// Timeout for generation requests (seconds). Expiry maps to an
/// extraction/generation failure, never a hang.
pub const GEN_TIMEOUT_SECS: u64 = 60;

/// Timeout for transcription requests (seconds).
pub const TRANSCRIBE_TIMEOUT_SECS: u64 = 300;

/// Sampling temperature for metadata extraction (low: deterministic labels).
pub const EXTRACTION_TEMPERATURE: f32 = 0.3;

/// Sampling temperature for quiz-question synthesis.
pub const QUIZ_TEMPERATURE: f32 = 0.7;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_GEN_MODEL: &str = "KNOWLEDGER_GEN_MODEL";
pub const ENV_GEN_TIMEOUT_SECS: &str = "KNOWLEDGER_GEN_TIMEOUT_SECS";
pub const ENV_TRANSCRIBE_MODEL: &str = "KNOWLEDGER_TRANSCRIBE_MODEL";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

// =============================================================================
// QUIZ
// =============================================================================

/// Maximum number of answer choices a synthesized question carries.
pub const QUIZ_CHOICES: usize = 4;
