//! Simulated microfinance take-up across a village's household network.
//!
//! Households are ranked by eigenvector centrality once per village; each
//! period then marks the top-ranked households as adopters according to the
//! village's target take-up rate for that period.

pub mod adoption;
pub mod centrality;
pub mod config;
pub mod error;
pub mod render;
pub mod runner;
pub mod schedule;
pub mod session;
pub mod village;

pub use adoption::{simulate_period, AdoptionFlags, ThresholdMode};
pub use centrality::{eigenvector_centrality, CentralityRanking};
pub use config::{CentralityConfig, SimulationConfig};
pub use error::{AdoptionError, Result};
pub use runner::{run_all, run_all_parallel, PeriodSnapshot};
pub use schedule::AdoptionSchedule;
pub use session::VillageSession;
pub use village::VillageNetwork;
