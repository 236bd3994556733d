use anyhow::Result;
use clap::Parser;

use nexus_flow::cli::commands::{
    intents::IntentsCommand, map::MapCommand, run::RunCommand, show_how_to_get_started,
    simulate::SimulateCommand, Command,
};
use nexus_flow::cli::{Cli, Commands};
use nexus_flow::config::{self, NexusFlowConfig};
use nexus_flow::telemetry::{
    create_pipeline_span, generate_correlation_id, init_telemetry, shutdown_telemetry,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            NexusFlowConfig::load_env_file()?;
            NexusFlowConfig::load_from(path)?
        }
        None => config::config()?.clone(),
    };

    init_telemetry(&config.observability)?;
    let correlation_id = generate_correlation_id();

    let result = match cli.command {
        None => show_how_to_get_started(),
        Some(Commands::Simulate { strict, json }) => {
            let _span = create_pipeline_span("simulate", Some(&correlation_id)).entered();
            SimulateCommand::new(config.engine)
                .with_strict(strict)
                .with_json(json)
                .execute()
        }
        Some(Commands::Run { file, strict, json }) => {
            let _span = create_pipeline_span("run", Some(&correlation_id)).entered();
            RunCommand::new(file, config.engine)
                .with_strict(strict)
                .with_json(json)
                .execute()
        }
        Some(Commands::Intents { file }) => {
            let _span = create_pipeline_span("intents", Some(&correlation_id)).entered();
            IntentsCommand::new(file, config.engine).execute()
        }
        Some(Commands::Map { file }) => {
            let _span = create_pipeline_span("map", Some(&correlation_id)).entered();
            MapCommand::new(file, config.engine).execute()
        }
    };

    shutdown_telemetry();
    result
}
