//! Per-village adoption targets.
//!
//! The panel data set holds one row per village and period with the simulated
//! microfinance take-up rate. Each village's rows, in file order, become that
//! village's [`AdoptionSchedule`]: the sequence of target fractions whose
//! length defines the valid periods.

use crate::error::{AdoptionError, Result};
use csv::{Reader, Writer};
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// File name of the panel data set inside a data directory.
pub const PANEL_FILE_NAME: &str = "panel.csv";

#[derive(Debug, Serialize, Deserialize)]
struct PanelRow {
    village: u32,
    #[serde(rename = "dynamicMF_simulated")]
    take_up: f64,
}

/// Ordered target adoption fractions for one village, one per period.
#[derive(Debug, Clone, PartialEq)]
pub struct AdoptionSchedule {
    village: u32,
    fractions: Vec<f64>,
}

impl AdoptionSchedule {
    /// Every fraction must be finite and within `[0, 1]`.
    pub fn new(village: u32, fractions: Vec<f64>) -> Result<Self> {
        if let Some(&bad) = fractions.iter().find(|f| !is_valid_fraction(**f)) {
            return Err(AdoptionError::InvalidFraction(bad));
        }
        Ok(AdoptionSchedule { village, fractions })
    }

    pub fn village(&self) -> u32 {
        self.village
    }

    /// Number of valid periods.
    pub fn periods(&self) -> usize {
        self.fractions.len()
    }

    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    /// Target fraction for `period`, or [`AdoptionError::PeriodOutOfRange`].
    pub fn target(&self, period: usize) -> Result<f64> {
        self.fractions
            .get(period)
            .copied()
            .ok_or(AdoptionError::PeriodOutOfRange {
                period,
                periods: self.fractions.len(),
            })
    }
}

pub(crate) fn is_valid_fraction(fraction: f64) -> bool {
    (0.0..=1.0).contains(&fraction)
}

/// Loads every village's schedule from a panel CSV with header
/// `village,dynamicMF_simulated`.
pub fn load_panel<P: AsRef<Path>>(path: P) -> Result<BTreeMap<u32, AdoptionSchedule>> {
    let path = path.as_ref();
    let mut by_village: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for row in Reader::from_path(path)?.deserialize() {
        let row: PanelRow = row?;
        by_village.entry(row.village).or_default().push(row.take_up);
    }

    let schedules = by_village
        .into_iter()
        .map(|(village, fractions)| {
            AdoptionSchedule::new(village, fractions).map(|s| (village, s))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    info!(
        path = %path.display(),
        villages = schedules.len(),
        "Loaded adoption panel"
    );
    Ok(schedules)
}

/// Loads the schedule of a single village from the panel CSV.
pub fn load_schedule<P: AsRef<Path>>(path: P, village: u32) -> Result<AdoptionSchedule> {
    let schedule = load_panel(path)?
        .remove(&village)
        .ok_or(AdoptionError::UnknownVillage(village))?;
    debug!(village, periods = schedule.periods(), "Selected village schedule");
    Ok(schedule)
}

/// Writes a panel CSV with `periods` random, non-decreasing take-up rates for
/// each of the villages `1..=villages`.
pub fn generate_panel_csv<P: AsRef<Path>>(villages: u32, periods: usize, path: P) -> Result<()> {
    let mut rng = thread_rng();
    let mut writer = Writer::from_path(path.as_ref())?;
    for village in 1..=villages {
        let mut take_up = 0.0_f64;
        for _ in 0..periods {
            take_up = (take_up + rng.gen_range(0.0..0.1)).min(1.0);
            writer.serialize(PanelRow { village, take_up })?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_out_of_range_is_reported() {
        let schedule = AdoptionSchedule::new(1, vec![0.1, 0.2]).unwrap();
        assert_eq!(schedule.target(1).unwrap(), 0.2);
        let err = schedule.target(2).unwrap_err();
        assert!(matches!(
            err,
            AdoptionError::PeriodOutOfRange { period: 2, periods: 2 }
        ));
    }

    #[test]
    fn rejects_fraction_outside_unit_interval() {
        assert!(matches!(
            AdoptionSchedule::new(1, vec![0.5, 1.5]),
            Err(AdoptionError::InvalidFraction(f)) if f == 1.5
        ));
        assert!(AdoptionSchedule::new(1, vec![f64::NAN]).is_err());
        assert!(AdoptionSchedule::new(1, vec![0.0, 1.0]).is_ok());
    }

    #[test]
    fn panel_groups_rows_by_village_in_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(PANEL_FILE_NAME);
        std::fs::write(
            &path,
            "village,dynamicMF_simulated\n1,0.1\n2,0.05\n1,0.2\n1,0.3\n2,0.15\n",
        )
        .unwrap();

        let panel = load_panel(&path).unwrap();
        assert_eq!(panel.len(), 2);
        assert_eq!(panel[&1].fractions(), &[0.1, 0.2, 0.3]);
        assert_eq!(panel[&2].fractions(), &[0.05, 0.15]);

        let err = load_schedule(&path, 3).unwrap_err();
        assert!(matches!(err, AdoptionError::UnknownVillage(3)));
    }

    #[test]
    fn generated_panel_is_non_decreasing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(PANEL_FILE_NAME);
        generate_panel_csv(3, 6, &path).unwrap();

        let panel = load_panel(&path).unwrap();
        assert_eq!(panel.len(), 3);
        for schedule in panel.values() {
            assert_eq!(schedule.periods(), 6);
            assert!(schedule.fractions().windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
