use anyhow::Result;
use std::path::PathBuf;

use super::{replay_optional, Command};
use crate::config::EngineConfig;
use crate::pipeline::{stage_map, NodeState, StageMap};

pub struct MapCommand {
    pub file: Option<PathBuf>,
    pub engine: EngineConfig,
}

impl MapCommand {
    pub fn new(file: Option<PathBuf>, engine: EngineConfig) -> Self {
        Self { file, engine }
    }
}

impl Command for MapCommand {
    fn execute(&self) -> Result<()> {
        let replay = replay_optional(self.file.as_deref(), &self.engine)?;
        print_stage_map(&stage_map(&replay.store.snapshot()));
        Ok(())
    }
}

pub fn print_stage_map(map: &StageMap) {
    println!("🗺️  STAGE MAP:");
    for (stage, state) in &map.nodes {
        let marker = match state {
            NodeState::Inactive => "⚪",
            NodeState::Active => "🔵",
            NodeState::Completed => "🟢",
            NodeState::Error => "🔴",
        };
        println!("   {marker} {:<15} {state}", stage.label());
    }
    for (flow, lit) in &map.flows {
        if *lit {
            let (from, to) = flow.endpoints();
            println!("   ➡️  {} → {}", from.label(), to.label());
        }
    }
}
