// Nexus Flow Library - lead-to-reconciliation pipeline engine
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod script;
pub mod store;
pub mod telemetry;

// Re-export key types for easy access
pub use crate::config::{config, init_config, NexusFlowConfig};
pub use pipeline::{
    available_intents, reduce, stage_map, Applied, AuditLog, Cascade, Intent, IntentKind,
    LogEntry, PipelineEngine, PipelineError, Snapshot,
};
pub use script::{IntentScript, ScriptError};
pub use store::{DispatchOutcome, SnapshotStore};
pub use telemetry::{create_pipeline_span, generate_correlation_id, init_telemetry, shutdown_telemetry};
