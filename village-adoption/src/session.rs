use crate::adoption::{simulate_period, AdoptionFlags};
use crate::centrality::CentralityRanking;
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::runner::{run_all, run_all_parallel, PeriodSnapshot};
use crate::schedule::AdoptionSchedule;
use crate::village::VillageNetwork;
use tracing::{info, warn};

/// One village's network, centrality ranking and adoption targets, plus the
/// adoption state of the most recently simulated period.
pub struct VillageSession {
    network: VillageNetwork,
    ranking: CentralityRanking,
    schedule: AdoptionSchedule,
    config: SimulationConfig,
    current: Option<(usize, AdoptionFlags)>,
}

impl VillageSession {
    /// Computes centrality once; it is reused for every period.
    pub fn new(
        network: VillageNetwork,
        schedule: AdoptionSchedule,
        config: SimulationConfig,
    ) -> Self {
        let ranking = CentralityRanking::compute(&network, &config.centrality);
        info!(
            village = schedule.village(),
            households = network.household_count(),
            periods = schedule.periods(),
            "Created village session"
        );
        VillageSession {
            network,
            ranking,
            schedule,
            config,
            current: None,
        }
    }

    pub fn network(&self) -> &VillageNetwork {
        &self.network
    }

    pub fn ranking(&self) -> &CentralityRanking {
        &self.ranking
    }

    pub fn schedule(&self) -> &AdoptionSchedule {
        &self.schedule
    }

    /// Replaces the current adoption state with that of `period`.
    ///
    /// On failure the previous state is discarded, so no stale flags remain.
    pub fn simulate(&mut self, period: usize) -> Result<&AdoptionFlags> {
        self.current = None;
        let fraction = self.schedule.target(period).inspect_err(|err| {
            warn!(village = self.schedule.village(), %err, "Cannot simulate period");
        })?;
        let flags = simulate_period(
            self.ranking.scores(),
            fraction,
            self.config.threshold_mode,
        )?;
        let (_, flags) = self.current.insert((period, flags));
        Ok(flags)
    }

    /// Adoption state of the last successfully simulated period.
    pub fn adoption_flags(&self) -> Option<&AdoptionFlags> {
        self.current.as_ref().map(|(_, flags)| flags)
    }

    pub fn current_period(&self) -> Option<usize> {
        self.current.as_ref().map(|(period, _)| *period)
    }

    /// Simulates every period and returns owned snapshots.
    pub fn snapshots(&self) -> Result<Vec<PeriodSnapshot>> {
        let scores = self.ranking.scores();
        let mode = self.config.threshold_mode;
        if self.config.parallel {
            run_all_parallel(scores, &self.schedule, mode)
        } else {
            run_all(scores, &self.schedule, mode)
        }
    }
}
