use crate::adoption::{simulate_period, AdoptionFlags, ThresholdMode};
use crate::error::Result;
use crate::schedule::AdoptionSchedule;
use rayon::prelude::*;
use tracing::debug;

/// Owned result of one period, safe to keep after later periods run.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSnapshot {
    pub period: usize,
    pub target_fraction: f64,
    pub flags: AdoptionFlags,
}

impl PeriodSnapshot {
    pub fn title(&self) -> String {
        format!("time period-{}", self.period)
    }
}

fn snapshot(
    scores: &[f64],
    period: usize,
    fraction: f64,
    mode: ThresholdMode,
) -> Result<PeriodSnapshot> {
    let flags = simulate_period(scores, fraction, mode)?;
    debug!(
        period,
        target_fraction = fraction,
        adopters = flags.adopter_count(),
        "Simulated period"
    );
    Ok(PeriodSnapshot {
        period,
        target_fraction: fraction,
        flags,
    })
}

/// Simulates every period of `schedule` in increasing order.
pub fn run_all(
    scores: &[f64],
    schedule: &AdoptionSchedule,
    mode: ThresholdMode,
) -> Result<Vec<PeriodSnapshot>> {
    schedule
        .fractions()
        .iter()
        .enumerate()
        .map(|(period, &fraction)| snapshot(scores, period, fraction, mode))
        .collect()
}

/// Same output as [`run_all`], with periods simulated on the rayon pool.
///
/// Each period only reads `scores`, and the indexed collect writes every
/// result into its own period slot.
pub fn run_all_parallel(
    scores: &[f64],
    schedule: &AdoptionSchedule,
    mode: ThresholdMode,
) -> Result<Vec<PeriodSnapshot>> {
    schedule
        .fractions()
        .par_iter()
        .enumerate()
        .map(|(period, &fraction)| snapshot(scores, period, fraction, mode))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_snapshot_per_period_in_order() {
        let scores = [0.8, 0.6, 0.4, 0.2, 0.0];
        let schedule = AdoptionSchedule::new(1, vec![0.0, 0.4, 0.2, 1.0]).unwrap();
        let snapshots = run_all(&scores, &schedule, ThresholdMode::Inclusive).unwrap();

        let periods: Vec<_> = snapshots.iter().map(|s| s.period).collect();
        assert_eq!(periods, vec![0, 1, 2, 3]);
        let counts: Vec<_> = snapshots.iter().map(|s| s.flags.adopter_count()).collect();
        // Non-monotone targets are replayed as given.
        assert_eq!(counts, vec![1, 3, 2, 5]);
        assert_eq!(snapshots[1].title(), "time period-1");
    }

    #[test]
    fn parallel_matches_sequential() {
        let scores: Vec<f64> = (0..50).map(|i| ((i * 37) % 11) as f64 / 10.0).collect();
        let fractions: Vec<f64> = (0..25).map(|i| i as f64 / 24.0).collect();
        let schedule = AdoptionSchedule::new(2, fractions).unwrap();
        for mode in [ThresholdMode::Inclusive, ThresholdMode::Exclusive] {
            assert_eq!(
                run_all(&scores, &schedule, mode).unwrap(),
                run_all_parallel(&scores, &schedule, mode).unwrap()
            );
        }
    }

    #[test]
    fn empty_schedule_yields_no_snapshots() {
        let schedule = AdoptionSchedule::new(3, Vec::new()).unwrap();
        assert!(run_all(&[0.5], &schedule, ThresholdMode::Inclusive).unwrap().is_empty());
    }
}
