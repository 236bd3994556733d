use anyhow::Result;
use std::path::Path;

use crate::config::EngineConfig;
use crate::pipeline::{Intent, Snapshot};
use crate::script::IntentScript;
use crate::store::{DispatchOutcome, SnapshotStore};

pub mod intents;
pub mod map;
pub mod run;
pub mod simulate;

pub trait Command {
    fn execute(&self) -> Result<()>;
}

/// A store after replaying a script, with the outcome of every intent
pub struct Replay {
    pub store: SnapshotStore,
    pub outcomes: Vec<(Intent, DispatchOutcome)>,
}

impl Replay {
    pub fn rejected(&self) -> impl Iterator<Item = &(Intent, DispatchOutcome)> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_applied())
    }
}

pub fn replay(script: &IntentScript, engine: &EngineConfig, strict: bool) -> Replay {
    let mut store = SnapshotStore::from_config(engine).strict(strict || engine.strict_mode);
    let outcomes = script
        .iter()
        .map(|intent| (intent.clone(), store.dispatch(intent)))
        .collect();
    Replay { store, outcomes }
}

/// Replays `file` when given, otherwise starts from the empty pipeline
pub fn replay_optional(file: Option<&Path>, engine: &EngineConfig) -> Result<Replay> {
    let script = match file {
        Some(path) => IntentScript::load(path)?,
        None => IntentScript::default(),
    };
    Ok(replay(&script, engine, false))
}

pub fn show_how_to_get_started() -> Result<()> {
    println!("🧭 Nexus Flow - lead-to-reconciliation pipeline");
    println!();
    println!("To get started:");
    println!("  🚀 nexus-flow simulate        # Run the full happy path");
    println!("  📜 nexus-flow run <FILE>      # Replay an intent script");
    println!("  🎛️  nexus-flow intents [FILE]  # What can happen next");
    println!("  🗺️  nexus-flow map [FILE]      # Pipeline stage map");
    println!();
    println!("💡 Add --strict to see why an intent was refused.");
    Ok(())
}

pub fn print_documents(snapshot: &Snapshot) {
    println!("📋 DOCUMENTS:");
    if snapshot.is_blank() {
        println!("   (none)");
        return;
    }
    if let Some(lead) = &snapshot.lead {
        let tags = if lead.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", lead.tags.join(", "))
        };
        println!("   👤 Lead {} ({}): {}{}", lead.id, lead.customer_name, lead.status, tags);
    }
    if let Some(quote) = &snapshot.quote {
        println!(
            "   💰 Quote {}: {} (current {}, {} version(s))",
            quote.id,
            quote.current_status,
            quote.current_version_id(),
            quote.versions.len()
        );
    }
    if let Some(measurement) = &snapshot.measurement {
        println!(
            "   📐 Measurement {} for {}: {}",
            measurement.id, measurement.quote_version_id, measurement.status
        );
    }
    if let Some(order) = &snapshot.sales_order {
        let logistics = order.logistics_status.as_deref().unwrap_or("-");
        println!(
            "   🧾 Sales order {} ({}): {}, procurement [{}], logistics {}",
            order.id,
            order.quote_version,
            order.status,
            order.procurement_ids.join(", "),
            logistics
        );
    }
    if let Some(installation) = &snapshot.installation {
        println!("   🔧 Installation {}: {}", installation.id, installation.status);
    }
    if let Some(reconciliation) = &snapshot.reconciliation {
        println!("   📊 Reconciliation {}: {}", reconciliation.id, reconciliation.status);
    }
}

pub fn print_log(snapshot: &Snapshot) {
    println!("🗒️  AUDIT LOG ({} entries, newest first):", snapshot.log.len());
    for entry in &snapshot.log {
        println!(
            "   {} [{}] {}: {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.actor,
            entry.action,
            entry.detail
        );
    }
}

pub fn print_rejections(replay: &Replay) {
    for (intent, outcome) in replay.rejected() {
        match outcome {
            DispatchOutcome::Rejected(error) => println!("   ⚠️  {intent}: {error}"),
            _ => println!("   ⏭️  {intent}: not applicable, skipped"),
        }
    }
}
