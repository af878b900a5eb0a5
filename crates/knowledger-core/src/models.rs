//! Core data models for knowledger.
//!
//! These types are shared across all knowledger crates and represent
//! the core domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// TENANT
// =============================================================================

/// An isolated owner namespace for ibits and vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub display_name: String,
    pub created_at_utc: DateTime<Utc>,
}

// =============================================================================
// IBIT
// =============================================================================

/// A single stored knowledge fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ibit {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub text: String,
    pub source: Option<String>,
    pub created_at_utc: DateTime<Utc>,
}

/// An ibit together with its attached tag values, for listing and detail views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbitFull {
    pub ibit: Ibit,
    pub categories: Vec<String>,
    pub entities: Vec<String>,
    pub dates: Vec<String>,
}

// =============================================================================
// TAGS
// =============================================================================

/// The three tag vocabularies an ibit can be associated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Category,
    Entity,
    Date,
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category => write!(f, "category"),
            Self::Entity => write!(f, "entity"),
            Self::Date => write!(f, "date"),
        }
    }
}

impl TagKind {
    /// Normalize a raw candidate value for lookup and storage.
    ///
    /// Categories are trimmed and lowercased. Entities are trimmed but keep
    /// their case as typed. Dates are trimmed only; the stored value is text
    /// at whatever granularity the extractor emitted (`YYYY-MM-DD`,
    /// `YYYY-MM`, or `YYYY`), with no further validation.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self {
            Self::Category => trimmed.to_lowercase(),
            Self::Entity | Self::Date => trimmed.to_string(),
        }
    }
}

/// A resolved vocabulary row for one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagHandle {
    pub id: Uuid,
    pub value: String,
}

// =============================================================================
// METADATA (extraction result)
// =============================================================================

/// Structured metadata extracted from ibit text by the external model.
///
/// The default value is the empty-metadata fallback used when extraction
/// fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub categories: Vec<String>,
    pub entities: Vec<String>,
    pub dates: Vec<String>,
    pub source: Option<String>,
}

impl Metadata {
    /// True when no field carries any data.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.entities.is_empty()
            && self.dates.is_empty()
            && self.source.is_none()
    }
}

// =============================================================================
// QUIZ
// =============================================================================

/// A synthesized multiple-choice question over one stored ibit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub ibit_id: Uuid,
    pub ibit_text: String,
    pub question_text: String,
    /// Four or fewer answer choices, shuffled.
    pub choices: Vec<String>,
    /// Index into `choices` of the correct answer, recomputed after shuffling.
    pub correct_index: usize,
}
