use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use super::{print_documents, print_log, print_rejections, replay, Command};
use crate::config::EngineConfig;
use crate::script::IntentScript;
use crate::store::DispatchOutcome;

pub struct RunCommand {
    pub file: PathBuf,
    pub engine: EngineConfig,
    pub strict: bool,
    pub json: bool,
}

impl RunCommand {
    pub fn new(file: PathBuf, engine: EngineConfig) -> Self {
        Self {
            file,
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

impl Command for RunCommand {
    fn execute(&self) -> Result<()> {
        let script = IntentScript::load(&self.file)
            .with_context(|| format!("Cannot run {}", self.file.display()))?;
        let replay = replay(&script, &self.engine, self.strict);
        let snapshot = replay.store.snapshot();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&*snapshot)?);
        } else {
            println!(
                "📜 Replayed {} intents from {}, {} applied",
                script.len(),
                self.file.display(),
                replay.store.revision()
            );
            print_rejections(&replay);
            println!();
            print_documents(&snapshot);
            println!();
            print_log(&snapshot);
        }

        let rejected = replay
            .rejected()
            .filter(|(_, outcome)| matches!(outcome, DispatchOutcome::Rejected(_)))
            .count();
        if rejected > 0 {
            bail!("{rejected} intent(s) rejected in strict mode");
        }
        Ok(())
    }
}
