//! Metadata extraction: prompt contract and strict response parsing.
//!
//! The extractor sends the raw ibit text together with the tenant's current
//! category vocabulary, so the model is biased toward reusing existing
//! categories unless a genuinely new topic appears. The response contract is
//! strict JSON with exactly four keys; a response wrapped in a fenced code
//! block is unwrapped before parsing, and any parse failure (invalid JSON,
//! missing keys) is total extraction failure, never a partial result.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use knowledger_core::{Error, GenerationBackend, Metadata, Result};

/// Build the extraction prompt for one ibit.
///
/// The date-precision policy is part of the contract with the model and must
/// be reproduced if the model is swapped: only the most precise available
/// granularity is emitted for a date mention, never a full date alongside its
/// containing month or year.
pub fn extraction_prompt(text: &str, existing_categories: &[String]) -> String {
    let category_list = if existing_categories.is_empty() {
        "None yet".to_string()
    } else {
        existing_categories.join(", ")
    };

    format!(
        r#"You are a knowledge extraction assistant. Analyze the following information and extract metadata.

Existing categories: {category_list}

Information: {text}

Extract:
1. Categories (1-3 relevant topics):
   - ONLY use an existing category if it's a VERY CLOSE semantic match
   - If no existing category is highly similar, create a NEW category name
   - Use lowercase, 1-3 words each
   - Be specific and avoid overly broad categories
2. Entities (people, places, organizations, concepts - important nouns)
3. Dates (in YYYY-MM-DD, YYYY-MM, or YYYY format if mentioned):
   - ALWAYS use the MOST PRECISE date format available
   - If a full date (YYYY-MM-DD) is mentioned, ONLY include that - do NOT also include the year or month
   - If only month and year (YYYY-MM) are mentioned, ONLY include that - do NOT also include the year
   - Example: For "November 9, 1989" -> ["1989-11-09"] NOT ["1989-11-09", "1989-11", "1989"]
4. Source (if the text mentions where this information came from)

Respond with ONLY valid JSON in this exact format:
{{
  "categories": ["category1", "category2"],
  "entities": ["Entity1", "Entity2"],
  "dates": ["2024-01-01"],
  "source": "source name or url"
}}

If any field has no data, use an empty array [] or null for source."#
    )
}

/// Strip a fenced code block (```json ... ``` or ``` ... ```) wrapping a
/// model response, if present.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();

    let inner = if let Some(rest) = trimmed.split_once("```json").map(|(_, r)| r) {
        rest
    } else if let Some(rest) = trimmed.split_once("```").map(|(_, r)| r) {
        rest
    } else {
        return trimmed;
    };

    match inner.split_once("```") {
        Some((body, _)) => body.trim(),
        None => inner.trim(),
    }
}

/// Raw wire shape of the extraction response. All four keys are required;
/// `source` is nullable but must be present.
#[derive(Debug, Deserialize)]
struct MetadataResponse {
    categories: Vec<String>,
    entities: Vec<String>,
    dates: Vec<String>,
    source: Option<String>,
}

/// Parse a model response into [`Metadata`], strictly.
///
/// Missing keys, non-array values, or invalid JSON are all total failures.
pub fn parse_metadata(content: &str) -> Result<Metadata> {
    let stripped = strip_code_fence(content);
    let parsed: MetadataResponse = serde_json::from_str(stripped)
        .map_err(|e| Error::Extraction(format!("Unparsable metadata response: {}", e)))?;

    Ok(Metadata {
        categories: parsed.categories,
        entities: parsed.entities,
        dates: parsed.dates,
        source: parsed.source.filter(|s| !s.trim().is_empty()),
    })
}

/// Drives a generation backend through the extraction contract.
pub struct MetadataExtractor {
    backend: Arc<dyn GenerationBackend>,
}

impl MetadataExtractor {
    /// Create an extractor over any generation backend.
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Extract metadata from raw text.
    ///
    /// Returns `Error::Extraction` on any call or parse failure; callers
    /// degrade to [`Metadata::default`] rather than aborting ingestion.
    pub async fn extract(&self, text: &str, existing_categories: &[String]) -> Result<Metadata> {
        let prompt = extraction_prompt(text, existing_categories);

        debug!(
            subsystem = "inference",
            component = "extraction",
            op = "extract",
            prompt_len = prompt.len(),
            "Requesting metadata extraction"
        );

        let response = self
            .backend
            .generate(&prompt)
            .await
            .map_err(|e| Error::Extraction(e.to_string()))?;

        let metadata = parse_metadata(&response)?;
        if metadata.is_empty() {
            warn!(
                subsystem = "inference",
                component = "extraction",
                op = "extract",
                "Model returned empty metadata"
            );
        }
        Ok(metadata)
    }
}
