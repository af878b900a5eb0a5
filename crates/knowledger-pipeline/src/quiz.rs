//! Quiz generation with non-repeating rotation.
//!
//! Each tenant cycles through every stored ibit exactly once before any
//! repeats; when the pool is exhausted the rotation resets and a new full
//! cycle begins. The shown set is persisted, so rotation survives restarts.
//! Ids of since-deleted ibits may linger in the shown set; they drop out
//! naturally because the pool is recomputed from live ibits every call.

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use knowledger_core::{
    GenerationBackend, IbitRepository, QuizProgressRepository, QuizQuestion, Result,
};
use knowledger_inference::{parse_quiz_response, quiz_prompt, shuffle_choices};

/// Synthesizes quiz questions over a tenant's stored ibits.
pub struct QuizGenerator {
    ibits: Arc<dyn IbitRepository>,
    progress: Arc<dyn QuizProgressRepository>,
    backend: Arc<dyn GenerationBackend>,
}

impl QuizGenerator {
    pub fn new(
        ibits: Arc<dyn IbitRepository>,
        progress: Arc<dyn QuizProgressRepository>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            ibits,
            progress,
            backend,
        }
    }

    /// Synthesize the next quiz question for a tenant.
    ///
    /// Returns `Ok(None)` when the tenant has no ibits, or when the model is
    /// unavailable or returns an unparsable proposal. Storage errors
    /// propagate.
    pub async fn next_question(&self, tenant_id: Uuid) -> Result<Option<QuizQuestion>> {
        let all_ids = self.ibits.list_ids(tenant_id).await?;
        if all_ids.is_empty() {
            return Ok(None);
        }

        let used: HashSet<Uuid> = self.progress.used_ids(tenant_id).await?.into_iter().collect();
        let mut pool: Vec<Uuid> = all_ids
            .iter()
            .copied()
            .filter(|id| !used.contains(id))
            .collect();

        if pool.is_empty() {
            info!(
                subsystem = "pipeline",
                component = "quiz",
                op = "reset",
                tenant_id = %tenant_id,
                candidate_count = all_ids.len(),
                "Rotation exhausted, starting new cycle"
            );
            self.progress.reset(tenant_id).await?;
            pool = all_ids;
        }

        let ibit_id = {
            let mut rng = rand::thread_rng();
            pool[rng.gen_range(0..pool.len())]
        };

        let full = self.ibits.fetch(tenant_id, ibit_id).await?;
        let prompt = quiz_prompt(&full.ibit.text);

        let proposal = match self.backend.generate(&prompt).await {
            Ok(response) => match parse_quiz_response(&response) {
                Ok(p) => p,
                Err(e) => {
                    warn!(
                        subsystem = "pipeline",
                        component = "quiz",
                        op = "next_question",
                        tenant_id = %tenant_id,
                        ibit_id = %ibit_id,
                        error = %e,
                        "Unusable quiz proposal"
                    );
                    return Ok(None);
                }
            },
            Err(e) => {
                warn!(
                    subsystem = "pipeline",
                    component = "quiz",
                    op = "next_question",
                    tenant_id = %tenant_id,
                    ibit_id = %ibit_id,
                    error = %e,
                    "Quiz backend unavailable"
                );
                return Ok(None);
            }
        };

        let (choices, correct_index) = {
            let mut rng = rand::thread_rng();
            shuffle_choices(proposal.options, proposal.correct_index, &mut rng)
        };

        self.progress.record_shown(tenant_id, ibit_id).await?;

        Ok(Some(QuizQuestion {
            ibit_id,
            ibit_text: full.ibit.text,
            question_text: proposal.question,
            choices,
            correct_index,
        }))
    }
}
