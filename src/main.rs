use anyhow::Result;
use epidemic_engine::config::{OutputConfig, SimulationConfig};
use epidemic_engine::driver::{ScenarioSeries, SimulationDriver};
use epidemic_engine::population::Population;
use log::{debug, error, info};
use std::fs::File;
use std::time::Instant;

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting epidemic grid simulation...");

    // --- Load Configuration ---
    let config = SimulationConfig::load("config.toml")?;
    debug!("Configuration: {:#?}", config);

    info!("Using {} Rayon threads.", rayon::current_num_threads());

    // --- Build Scenarios ---
    // Scenario A spreads freely; scenario B gets the quarantine partition
    // applied before day 0 is recorded.
    let size = config.grid.size;
    let seed = config.seeding.seed;
    let pop_free = Population::new(size, config.seeding(), seed)?;
    let mut pop_isolated = Population::new(size, config.seeding(), seed)?;
    pop_isolated.isolate_subpopulations();

    info!(
        "Initialized two {}x{} populations ({} initially infected).",
        size,
        size,
        pop_free.count_states().infected
    );

    let mut driver = SimulationDriver::new();
    driver.add_scenario("free", pop_free);
    driver.add_scenario("isolated", pop_isolated);

    // --- Simulation Loop ---
    let start_time = Instant::now();
    let series = driver.run(config.rates, config.timing.sim_days);
    info!(
        "Simulation finished in {:.3} seconds.",
        start_time.elapsed().as_secs_f64()
    );

    // --- Save Recorded Data ---
    if config.output.save_snapshots || config.output.save_counts {
        if let Some(parent) = std::path::Path::new(&config.output.base_filename).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    if config.output.save_snapshots {
        save_series(&series, &config.output);
    } else {
        info!("Skipping saving snapshot series as per config.");
    }

    if config.output.save_counts {
        save_counts_csv(&series, &config.output)?;
    } else {
        info!("Skipping saving count series as per config.");
    }

    info!("Simulation Complete.");
    Ok(())
}

/// Writes one full per-day series file per scenario in the configured format.
fn save_series(series: &[ScenarioSeries], output: &OutputConfig) {
    let format = output.format.as_deref().unwrap_or("json");

    for scenario in series {
        match format {
            "bincode" => {
                // Binary format (much more compact)
                let filename = format!("{}_{}_series.bin", output.base_filename, scenario.label);
                match File::create(&filename) {
                    Ok(file) => match bincode::serialize_into(file, &scenario.records) {
                        Ok(()) => info!("Series '{}' saved to {}", scenario.label, filename),
                        Err(e) => error!("Error serializing series to bincode: {}", e),
                    },
                    Err(e) => error!("Error creating series file '{}': {}", filename, e),
                }
            }
            "messagepack" => {
                // MessagePack format (compact and cross-platform)
                let filename =
                    format!("{}_{}_series.msgpack", output.base_filename, scenario.label);
                match File::create(&filename) {
                    Ok(mut file) => match rmp_serde::encode::write(&mut file, &scenario.records) {
                        Ok(()) => info!("Series '{}' saved to {}", scenario.label, filename),
                        Err(e) => error!("Error serializing series to MessagePack: {}", e),
                    },
                    Err(e) => error!("Error creating series file '{}': {}", filename, e),
                }
            }
            other => {
                if other != "json" {
                    error!("Unknown output format: {}. Using JSON instead.", other);
                }
                let filename = format!("{}_{}_series.json", output.base_filename, scenario.label);
                match File::create(&filename) {
                    Ok(file) => match serde_json::to_writer(file, &scenario.records) {
                        Ok(()) => info!("Series '{}' saved to {}", scenario.label, filename),
                        Err(e) => error!("Error serializing series to JSON: {}", e),
                    },
                    Err(e) => error!("Error creating series file '{}': {}", filename, e),
                }
            }
        }
    }
}

/// Writes the per-day state counts for every scenario into one CSV file.
fn save_counts_csv(series: &[ScenarioSeries], output: &OutputConfig) -> Result<()> {
    let filename = format!("{}_counts.csv", output.base_filename);

    let mut writer = csv::Writer::from_path(&filename)?;
    writer.write_record([
        "scenario",
        "day",
        "susceptible",
        "infected",
        "recovered",
        "deceased",
    ])?;
    for scenario in series {
        for record in &scenario.records {
            writer.write_record([
                scenario.label.clone(),
                record.day.to_string(),
                record.counts.susceptible.to_string(),
                record.counts.infected.to_string(),
                record.counts.recovered.to_string(),
                record.counts.deceased.to_string(),
            ])?;
        }
    }
    writer.flush()?;
    info!("State counts saved to {}", filename);

    Ok(())
}
