// Snapshot store - holds the one authoritative snapshot and is its only writer
//
// Readers get an `Arc` to an immutable snapshot; every accepted intent swaps in a
// fresh one, so a reader never observes a half-applied step.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::pipeline::{
    available_intents, Cascade, Clock, Intent, PipelineEngine, PipelineError, Snapshot,
    SystemClock,
};

/// What happened to one dispatched intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied {
        revision: u64,
        cascade: Option<Cascade>,
    },
    /// Not applicable, dropped silently (lenient mode)
    Ignored,
    /// Not applicable, reported (strict mode)
    Rejected(PipelineError),
}

impl DispatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DispatchOutcome::Applied { .. })
    }
}

#[derive(Debug)]
pub struct SnapshotStore<C: Clock = SystemClock> {
    engine: PipelineEngine<C>,
    current: Arc<Snapshot>,
    revision: u64,
    strict: bool,
}

impl SnapshotStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_engine(PipelineEngine::new())
    }

    pub fn from_config(engine: &EngineConfig) -> Self {
        Self::with_engine(PipelineEngine::new().with_customer_name(engine.customer_name.clone()))
            .strict(engine.strict_mode)
    }
}

impl Default for SnapshotStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SnapshotStore<C> {
    pub fn with_engine(engine: PipelineEngine<C>) -> Self {
        Self {
            engine,
            current: Arc::new(Snapshot::empty()),
            revision: 0,
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Current snapshot; cheap to clone and safe to keep across later dispatches
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    /// Number of accepted intents since the store was created
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn dispatch(&mut self, intent: &Intent) -> DispatchOutcome {
        match self.engine.try_reduce(&self.current, intent) {
            Ok(applied) => {
                self.current = Arc::new(applied.snapshot);
                self.revision += 1;
                info!(
                    intent = %intent.kind(),
                    revision = self.revision,
                    cascade = ?applied.cascade,
                    "Intent applied"
                );
                DispatchOutcome::Applied {
                    revision: self.revision,
                    cascade: applied.cascade,
                }
            }
            Err(error) if self.strict => {
                warn!(intent = %intent.kind(), %error, "Intent rejected");
                DispatchOutcome::Rejected(error)
            }
            Err(error) => {
                tracing::debug!(intent = %intent.kind(), %error, "Intent ignored");
                DispatchOutcome::Ignored
            }
        }
    }

    pub fn dispatch_all<'a, I>(&mut self, intents: I) -> Vec<DispatchOutcome>
    where
        I: IntoIterator<Item = &'a Intent>,
    {
        intents.into_iter().map(|intent| self.dispatch(intent)).collect()
    }

    pub fn available_intents(&self) -> Vec<Intent> {
        available_intents(&self.current)
    }
}
