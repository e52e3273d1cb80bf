pub mod cell;
pub mod config;
pub mod driver;
pub mod population;
pub mod snapshot;

// Re-export key types for easier use by dependent crates
pub use cell::{Rates, State};
pub use config::SimulationConfig;
pub use driver::{DayRecord, ScenarioSeries, SimulationDriver};
pub use population::{InvalidConfiguration, Population, Seeding};
pub use snapshot::{Snapshot, StateCounts};
