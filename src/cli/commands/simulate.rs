use anyhow::Result;

use super::{print_documents, print_log, print_rejections, replay, Command};
use crate::config::EngineConfig;
use crate::pipeline::stage_map;
use crate::script::IntentScript;

use super::map::print_stage_map;

pub struct SimulateCommand {
    pub engine: EngineConfig,
    pub strict: bool,
    pub json: bool,
}

impl SimulateCommand {
    pub fn new(engine: EngineConfig) -> Self {
        Self {
            engine,
            strict: false,
            json: false,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

impl Command for SimulateCommand {
    fn execute(&self) -> Result<()> {
        let script = IntentScript::happy_path();
        let replay = replay(&script, &self.engine, self.strict);
        let snapshot = replay.store.snapshot();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&*snapshot)?);
            return Ok(());
        }

        println!(
            "🚀 Simulated {} intents, {} applied",
            script.len(),
            replay.store.revision()
        );
        print_rejections(&replay);
        println!();
        print_documents(&snapshot);
        println!();
        print_stage_map(&stage_map(&snapshot));
        println!();
        print_log(&snapshot);
        Ok(())
    }
}
