use super::{
    backtesting::BacktestingConfig,
    evolution::EvolutionConfig,
    search_space::GenomeBounds,
    traits::ConfigSection,
    walk_forward::WalkForwardConfig,
};
use crate::engines::generation::OptimizerConfig;
use crate::error::LeadLagError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix of environment variables overriding file values,
/// e.g. `LEADLAG__EVOLUTION__POPULATION_SIZE=200`.
pub const ENV_PREFIX: &str = "LEADLAG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search_space: GenomeBounds,
    pub backtesting: BacktestingConfig,
    pub evolution: EvolutionConfig,
    pub walk_forward: WalkForwardConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), LeadLagError> {
        validate_section(&self.search_space)?;
        validate_section(&self.backtesting)?;
        validate_section(&self.evolution)?;
        validate_section(&self.walk_forward)?;
        Ok(())
    }

    pub fn optimizer_config(&self) -> OptimizerConfig {
        OptimizerConfig {
            evolution: self.evolution.clone(),
            backtesting: self.backtesting.clone(),
            search_space: self.search_space.clone(),
        }
    }
}

fn validate_section<S: ConfigSection>(section: &S) -> Result<(), LeadLagError> {
    section.validate().map_err(|e| match e {
        LeadLagError::Configuration(msg) | LeadLagError::InvalidInput(msg) => {
            LeadLagError::Configuration(format!("[{}] {}", S::section_name(), msg))
        }
        other => other,
    })
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a TOML file, apply `LEADLAG__*` environment overrides, validate.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), LeadLagError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LeadLagError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let config = Self::build(Some(path))?;
        log::info!("Loaded configuration from {}", path.display());
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    /// Apply `LEADLAG__*` environment overrides on top of the defaults.
    pub fn load_from_env(&self) -> Result<(), LeadLagError> {
        let config = Self::build(None)?;
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    fn build(path: Option<&Path>) -> Result<AppConfig, LeadLagError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
        }

        let config: AppConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), LeadLagError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| LeadLagError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn update<F>(&self, f: F) -> Result<(), LeadLagError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get();
        f(&mut candidate);
        candidate.validate()?;
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = candidate;
        Ok(())
    }
}
