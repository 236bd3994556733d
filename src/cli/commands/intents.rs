use anyhow::Result;
use std::path::PathBuf;

use super::{replay_optional, Command};
use crate::config::EngineConfig;

pub struct IntentsCommand {
    pub file: Option<PathBuf>,
    pub engine: EngineConfig,
}

impl IntentsCommand {
    pub fn new(file: Option<PathBuf>, engine: EngineConfig) -> Self {
        Self { file, engine }
    }
}

impl Command for IntentsCommand {
    fn execute(&self) -> Result<()> {
        let replay = replay_optional(self.file.as_deref(), &self.engine)?;
        let available = replay.store.available_intents();

        println!("🎛️  AVAILABLE INTENTS ({}):", available.len());
        for intent in &available {
            println!("   ▶ {intent}");
        }
        Ok(())
    }
}
