//! Simulation settings shared by the session, runner and CLI.

use crate::adoption::ThresholdMode;

/// Power-iteration settings for eigenvector centrality.
#[derive(Debug, Clone)]
pub struct CentralityConfig {
    pub max_iterations: usize,
    /// Largest tolerated error in a max-scaled score before rounding.
    pub tolerance: f64,
    /// Decimal digits kept after rounding.
    pub precision: u32,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1_000_000,
            tolerance: 1e-8,
            precision: 4,
        }
    }
}

/// Bundles everything a [`VillageSession`](crate::session::VillageSession) needs
/// besides its data.
#[derive(Debug, Clone, Default)]
pub struct SimulationConfig {
    pub centrality: CentralityConfig,
    pub threshold_mode: ThresholdMode,
    /// Simulate periods on the rayon pool instead of in order on one thread.
    pub parallel: bool,
}
