use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::pipeline::DEFAULT_CUSTOMER_NAME;

/// Main configuration structure for Nexus Flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NexusFlowConfig {
    /// Pipeline engine settings
    pub engine: EngineConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Report rejected intents instead of silently ignoring them
    pub strict_mode: bool,
    /// Customer name recorded on newly created leads
    pub customer_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            customer_name: DEFAULT_CUSTOMER_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level, overridden by RUST_LOG when set
    pub log_level: String,
    /// Emit JSON lines instead of compact text
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

impl NexusFlowConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (nexus-flow.toml)
    /// 3. Environment variables (NEXUS_FLOW_ENGINE__STRICT_MODE, ...)
    pub fn load() -> Result<Self> {
        Self::build(File::with_name("nexus-flow").required(false))
    }

    /// Same precedence as [`load`](Self::load) with an explicit file in place of nexus-flow.toml
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }
        Self::build(File::from(path))
    }

    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("NEXUS_FLOW")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::debug!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<NexusFlowConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = NexusFlowConfig::load_env_file();
        NexusFlowConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static NexusFlowConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let config = config()?;
    tracing::debug!(strict_mode = config.engine.strict_mode, "Configuration loaded");
    Ok(())
}
