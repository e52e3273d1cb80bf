use crate::cell::Rates;
use crate::population::Seeding;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Grid geometry.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GridConfig {
    pub size: usize,
}

// Initial-infection configuration. When `coords` is present it wins over
// `initial_infected`, mirroring the reference scenarios.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SeedingConfig {
    pub initial_infected: usize,
    #[serde(default)]
    pub coords: Option<Vec<(usize, usize)>>,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    0
}

// Simulation horizon.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub sim_days: u32,
}

// Output settings for the scenario runner.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_snapshots: bool,
    pub save_counts: bool,
    pub format: Option<String>, // Series format: "json", "bincode", "messagepack"
}

/// Main simulation configuration, loaded from a TOML file.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub grid: GridConfig,
    pub seeding: SeedingConfig,
    pub rates: Rates,
    pub timing: TimingConfig,
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads and validates the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e)
        })?;
        let config: SimulationConfig = toml::from_str(&config_str).map_err(|e| {
            anyhow::anyhow!("Failed to parse TOML from '{}': {}", path_ref.display(), e)
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.grid.size == 0 {
            anyhow::bail!("grid.size must be positive.");
        }
        if self.timing.sim_days == 0 {
            anyhow::bail!("timing.sim_days must be positive.");
        }
        for (name, rate) in [
            ("infection", self.rates.infection),
            ("recovery", self.rates.recovery),
            ("mortality", self.rates.mortality),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                anyhow::bail!("rates.{} must be within [0, 1], got {}.", name, rate);
            }
        }
        Ok(())
    }

    /// The seeding mode this configuration describes. Structural checks
    /// (bounds, oversubscription) are enforced by `Population::new`.
    pub fn seeding(&self) -> Seeding {
        match &self.seeding.coords {
            Some(coords) => Seeding::Coords(coords.clone()),
            None => Seeding::Random(self.seeding.initial_infected),
        }
    }
}
