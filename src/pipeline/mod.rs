// Pipeline engine: documents, status machines, cascade rules and the reducer

pub mod audit;
pub mod availability;
pub mod clock;
pub mod error;
mod guard;
pub mod intent;
pub mod machines;
pub mod progress;
pub mod reducer;
pub mod snapshot;
pub mod sync;
pub mod types;

pub use audit::{AuditLog, LogEntry};
pub use availability::{available_intents, is_available};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::PipelineError;
pub use intent::{Intent, IntentKind, DEFAULT_TAG};
pub use machines::{
    InstallationAction, LeadStep, QuoteStep, ReconciliationStep, SalesAction, SalesStep,
    ServiceStep, StatusMachine,
};
pub use progress::{stage_map, Flow, NodeState, Stage, StageMap};
pub use reducer::{reduce, Applied, PipelineEngine};
pub use snapshot::Snapshot;
pub use sync::Cascade;
pub use types::*;
