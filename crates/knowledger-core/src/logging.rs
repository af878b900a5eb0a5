//! Structured logging schema and field name constants for knowledger.
//!
//! All crates use these constants for consistent structured logging fields
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "db", "inference", "pipeline", "quiz"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "tag_store", "alias_graph", "openai", "pool", "ingest"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "ingest", "resolve_or_create", "merge", "next_question"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Tenant UUID the operation is scoped to.
pub const TENANT_ID: &str = "tenant_id";

/// Ibit UUID being operated on.
pub const IBIT_ID: &str = "ibit_id";

/// Tag kind being resolved ("category", "entity", "date").
pub const TAG_KIND: &str = "tag_kind";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte length of a prompt sent to the model.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Number of tag candidates reconciled during ingestion.
pub const CANDIDATE_COUNT: &str = "candidate_count";

// ─── Subscriber setup ──────────────────────────────────────────────────────

/// Install the global tracing subscriber.
///
/// Front ends (bot transport, web server) call this once at startup. The
/// filter comes from `RUST_LOG`, defaulting to `info` for knowledger crates
/// and `warn` elsewhere. Returns an error if a subscriber is already set.
pub fn init_tracing() -> crate::error::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,knowledger=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| crate::error::Error::Config(format!("Failed to init tracing: {}", e)))
}
