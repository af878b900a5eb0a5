//! Ibit ingestion pipeline: extract, reconcile, persist, confirm.
//!
//! The pipeline calls the extraction model with no database transaction open,
//! then persists the ibit together with all reconciled tag associations in a
//! single transaction inside the repository. Extraction failure is never
//! fatal: the ibit is stored untagged and the confirmation says so.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use knowledger_core::{
    CreateIbitRequest, Error, GenerationBackend, Ibit, IbitFull, IbitRepository, Metadata,
    ReplaceIbitRequest, Result, TagKind, TagStore,
};
use knowledger_inference::{MetadataExtractor, TranscriptionBackend};

/// The outcome of ingesting one ibit: the stored row plus the
/// human-readable confirmation summary.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub ibit: Ibit,
    pub summary: String,
}

/// Orchestrates the capture path and the manual-edit operations.
pub struct IngestionPipeline {
    ibits: Arc<dyn IbitRepository>,
    tags: Arc<dyn TagStore>,
    extractor: MetadataExtractor,
    transcriber: Option<Arc<dyn TranscriptionBackend>>,
}

impl IngestionPipeline {
    pub fn new(
        ibits: Arc<dyn IbitRepository>,
        tags: Arc<dyn TagStore>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            ibits,
            tags,
            extractor: MetadataExtractor::new(backend),
            transcriber: None,
        }
    }

    /// Attach a transcription backend for voice ingestion.
    pub fn with_transcriber(mut self, transcriber: Arc<dyn TranscriptionBackend>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Ingest raw text as a new ibit.
    ///
    /// The tenant's current category vocabulary is sent along with the text so
    /// the model reuses existing categories where they fit. An explicit
    /// `source_override` wins over whatever source the model extracts.
    pub async fn ingest(
        &self,
        tenant_id: Uuid,
        raw_text: &str,
        source_override: Option<String>,
    ) -> Result<IngestOutcome> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("Ibit text cannot be empty".to_string()));
        }

        let vocabulary: Vec<String> = self
            .tags
            .list(tenant_id, TagKind::Category)
            .await?
            .into_iter()
            .map(|h| h.value)
            .collect();

        // Model call happens here, with no transaction open.
        let started = Instant::now();
        let metadata = match self.extractor.extract(text, &vocabulary).await {
            Ok(md) => md,
            Err(e) => {
                warn!(
                    subsystem = "pipeline",
                    component = "ingest",
                    op = "extract",
                    tenant_id = %tenant_id,
                    error = %e,
                    "Extraction failed, storing ibit untagged"
                );
                Metadata::default()
            }
        };
        let extracted = !metadata.is_empty();

        let source = source_override.or_else(|| metadata.source.clone());
        let ibit = self
            .ibits
            .insert(CreateIbitRequest {
                tenant_id,
                text: text.to_string(),
                source: source.clone(),
                categories: metadata.categories.clone(),
                entities: metadata.entities.clone(),
                dates: metadata.dates.clone(),
            })
            .await?;

        info!(
            subsystem = "pipeline",
            component = "ingest",
            op = "ingest",
            tenant_id = %tenant_id,
            ibit_id = %ibit.id,
            duration_ms = started.elapsed().as_millis() as u64,
            extracted,
            "Ibit stored"
        );

        let summary = confirmation_summary(&metadata, source.as_deref());
        Ok(IngestOutcome { ibit, summary })
    }

    /// Transcribe audio and ingest the transcript as a new ibit.
    ///
    /// Transcription failure is fatal (there is no text to store without it);
    /// the confirmation is prefixed with the transcript so the speaker can
    /// check what was heard.
    pub async fn ingest_transcript(
        &self,
        tenant_id: Uuid,
        audio_data: &[u8],
        mime_type: &str,
    ) -> Result<IngestOutcome> {
        let transcriber = self
            .transcriber
            .as_ref()
            .ok_or_else(|| Error::Transcription("No transcription backend configured".to_string()))?;

        let transcript = transcriber.transcribe(audio_data, mime_type).await?;
        let mut outcome = self.ingest(tenant_id, &transcript, None).await?;
        outcome.summary = format!(
            "✅ Transcribed!\n\n{}\n\n{}",
            transcript.trim(),
            outcome.summary
        );
        Ok(outcome)
    }

    /// Replace an ibit's text, keeping its tags.
    pub async fn edit_text(&self, tenant_id: Uuid, ibit_id: Uuid, new_text: &str) -> Result<()> {
        let text = new_text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("Ibit text cannot be empty".to_string()));
        }
        self.ibits.update_text(tenant_id, ibit_id, text).await
    }

    /// Replace an ibit's text, source, and all three tag sets.
    pub async fn replace(
        &self,
        tenant_id: Uuid,
        ibit_id: Uuid,
        req: ReplaceIbitRequest,
    ) -> Result<()> {
        if req.text.trim().is_empty() {
            return Err(Error::InvalidInput("Ibit text cannot be empty".to_string()));
        }
        self.ibits.replace(tenant_id, ibit_id, req).await
    }

    /// Append categories to an existing ibit.
    ///
    /// Returns the normalized names actually added; values already attached
    /// are skipped.
    pub async fn add_categories(
        &self,
        tenant_id: Uuid,
        ibit_id: Uuid,
        names: &[String],
    ) -> Result<Vec<String>> {
        let mut added = Vec::new();
        for name in names {
            let normalized = TagKind::Category.normalize(name);
            if normalized.is_empty() {
                continue;
            }
            if self
                .tags
                .add_to_ibit(tenant_id, ibit_id, TagKind::Category, name)
                .await?
            {
                added.push(normalized);
            }
        }
        Ok(added)
    }

    /// Replace all tags of one kind on an ibit.
    pub async fn set_tags(
        &self,
        tenant_id: Uuid,
        ibit_id: Uuid,
        kind: TagKind,
        values: Vec<String>,
    ) -> Result<()> {
        self.tags.set_for_ibit(tenant_id, ibit_id, kind, values).await
    }

    /// Delete an ibit.
    pub async fn delete(&self, tenant_id: Uuid, ibit_id: Uuid) -> Result<()> {
        self.ibits.delete(tenant_id, ibit_id).await
    }

    /// Fetch one ibit with its tags.
    pub async fn get(&self, tenant_id: Uuid, ibit_id: Uuid) -> Result<IbitFull> {
        self.ibits.fetch(tenant_id, ibit_id).await
    }

    /// List all ibits, newest first.
    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<IbitFull>> {
        self.ibits.list(tenant_id).await
    }

    /// List ibits associated with a canonical entity name.
    pub async fn filter_by_entity(
        &self,
        tenant_id: Uuid,
        entity_name: &str,
    ) -> Result<Vec<IbitFull>> {
        self.ibits.filter_by_entity(tenant_id, entity_name).await
    }
}

/// Build the confirmation summary shown after an ibit is stored.
///
/// Lines for empty fields are omitted entirely. Tag lines show the
/// candidate strings as the model emitted them, before normalization.
pub fn confirmation_summary(metadata: &Metadata, source: Option<&str>) -> String {
    let mut summary = String::from("✅ Ibit stored!");

    if !metadata.categories.is_empty() {
        summary.push_str(&format!(
            "\n📁 Categories: {}",
            metadata.categories.join(", ")
        ));
    }
    if !metadata.entities.is_empty() {
        summary.push_str(&format!("\n🏷️ Entities: {}", metadata.entities.join(", ")));
    }
    if !metadata.dates.is_empty() {
        summary.push_str(&format!("\n📅 Dates: {}", metadata.dates.join(", ")));
    }
    if let Some(source) = source {
        summary.push_str(&format!("\n📖 Source: {}", source));
    }

    summary
}
