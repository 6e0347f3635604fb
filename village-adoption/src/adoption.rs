//! Per-period adoption selection.
//!
//! Households are assumed to hear about microfinance in order of their
//! eigenvector centrality. For a target fraction `f` of a village with `n`
//! households, `floor(n * f)` is the nominal adopter count. The top scores
//! (the threshold set) are taken from a descending copy of the scores, and a
//! household adopts when its own score value appears in that set.
//!
//! Membership is by value, so every household tied with a boundary score
//! adopts, and the realized count may exceed the nominal one.

use crate::error::{AdoptionError, Result};
use crate::schedule::is_valid_fraction;
use std::cmp::Ordering;

/// How many sorted scores form the threshold set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThresholdMode {
    /// `floor(n * f) + 1` scores. A zero target still selects the top
    /// household. Matches the original village visualizations.
    #[default]
    Inclusive,
    /// `floor(n * f)` scores. A zero target selects nobody.
    Exclusive,
}

impl ThresholdMode {
    fn set_size(self, adopt_count: usize) -> usize {
        match self {
            ThresholdMode::Inclusive => adopt_count + 1,
            ThresholdMode::Exclusive => adopt_count,
        }
    }
}

/// Adoption state of every household for a single period.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdoptionFlags(Vec<bool>);

impl AdoptionFlags {
    pub fn is_adopter(&self, household: usize) -> bool {
        self.0.get(household).copied().unwrap_or(false)
    }

    /// Realized number of adopters, including tie over-selection.
    pub fn adopter_count(&self) -> usize {
        self.0.iter().filter(|&&adopted| adopted).count()
    }

    /// Indices of adopting households in ascending order.
    pub fn adopters(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &adopted)| adopted.then_some(i))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl From<Vec<bool>> for AdoptionFlags {
    fn from(flags: Vec<bool>) -> Self {
        AdoptionFlags(flags)
    }
}

/// `floor(n * fraction)`.
pub fn adopt_count(households: usize, fraction: f64) -> usize {
    (households as f64 * fraction).floor() as usize
}

fn descending(a: &f64, b: &f64) -> Ordering {
    b.total_cmp(a)
}

/// Folds `-0.0` into `0.0` so that equal scores compare equal.
fn canonical(score: f64) -> f64 {
    if score == 0.0 { 0.0 } else { score }
}

/// Marks the adopters for one period. `scores` is left untouched.
///
/// Fails with [`AdoptionError::InvalidFraction`] if `fraction` is NaN or
/// outside `[0, 1]`, and with [`AdoptionError::InvalidScore`] if a score is
/// negative or not finite.
pub fn simulate_period(
    scores: &[f64],
    fraction: f64,
    mode: ThresholdMode,
) -> Result<AdoptionFlags> {
    if !is_valid_fraction(fraction) {
        return Err(AdoptionError::InvalidFraction(fraction));
    }

    if let Some((household, &score)) = scores
        .iter()
        .enumerate()
        .find(|(_, s)| !s.is_finite() || **s < 0.0)
    {
        return Err(AdoptionError::InvalidScore { household, score });
    }

    let mut sorted: Vec<f64> = scores.iter().copied().map(canonical).collect();
    sorted.sort_by(descending);
    let take = mode
        .set_size(adopt_count(scores.len(), fraction))
        .min(sorted.len());
    let threshold = &sorted[..take];

    let flags = scores
        .iter()
        .map(|&score| {
            let score = canonical(score);
            threshold
                .binary_search_by(|probe| descending(probe, &score))
                .is_ok()
        })
        .collect();
    Ok(AdoptionFlags(flags))
}
