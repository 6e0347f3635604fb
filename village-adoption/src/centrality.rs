use crate::config::CentralityConfig;
use crate::village::VillageNetwork;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Rounded eigenvector centrality of every household, plus the ranking
/// derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct CentralityRanking {
    scores: Vec<f64>,
    order: Vec<usize>,
}

impl CentralityRanking {
    pub fn compute(network: &VillageNetwork, config: &CentralityConfig) -> Self {
        Self::from_scores(eigenvector_centrality(network, config))
    }

    /// Wraps precomputed scores, e.g. ones loaded from elsewhere.
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        // Stable sort: equal scores stay in household order.
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        CentralityRanking { scores, order }
    }

    /// One score per household, indexed by household.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Household indices from most to least central.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Eigenvector centrality scaled so the most central household scores 1,
/// rounded to `config.precision` decimal digits.
///
/// Iterates on `A + I`, which shares its principal eigenvector with `A` but
/// does not oscillate on bipartite graphs. Each iterate is scaled to a
/// maximum of 1, and iteration stops once both the last step and the
/// geometric bound on the remaining steps fall below `config.tolerance`.
/// A network without relationships gives every household a score of 1.
pub fn eigenvector_centrality(network: &VillageNetwork, config: &CentralityConfig) -> Vec<f64> {
    let n = network.household_count();
    if n == 0 {
        return Vec::new();
    }
    if network.relationship_count() == 0 {
        return vec![1.0; n];
    }

    let adjacency: Vec<Vec<usize>> = (0..n).map(|i| network.neighbors(i).collect()).collect();
    let mut x = vec![1.0; n];
    let mut previous_delta: Option<f64> = None;
    let mut converged = false;

    for iteration in 0..config.max_iterations {
        let mut next: Vec<f64> = adjacency
            .par_iter()
            .with_min_len(512)
            .enumerate()
            .map(|(i, neighbors)| x[i] + neighbors.iter().map(|&j| x[j]).sum::<f64>())
            .collect();

        let max = next.iter().copied().fold(0.0_f64, f64::max);
        next.iter_mut().for_each(|v| *v /= max);

        let delta = next
            .iter()
            .zip(&x)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0_f64, f64::max);
        x = next;

        // Error left after this step, assuming the observed contraction rate holds.
        let remaining = match previous_delta {
            Some(previous) if delta < previous => {
                let rate = delta / previous;
                delta * rate / (1.0 - rate)
            }
            _ => f64::INFINITY,
        };
        previous_delta = Some(delta);

        let settled = delta < config.tolerance && remaining < config.tolerance;
        if settled || delta <= 16.0 * f64::EPSILON {
            debug!(
                iterations = iteration + 1,
                delta,
                remaining,
                "Eigenvector centrality converged"
            );
            converged = true;
            break;
        }
    }
    if !converged {
        warn!(
            max_iterations = config.max_iterations,
            "Eigenvector centrality did not converge; using last iterate"
        );
    }

    x.into_iter()
        .map(|v| round_to(v, config.precision))
        .collect()
}

/// Rounds half away from zero to `digits` decimal places.
pub(crate) fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(n: usize, edges: &[(usize, usize)]) -> VillageNetwork {
        let mut rows = vec![vec![0.0; n]; n];
        for &(a, b) in edges {
            rows[a][b] = 1.0;
            rows[b][a] = 1.0;
        }
        VillageNetwork::from_adjacency(&rows).unwrap()
    }

    fn is_rounded(v: f64) -> bool {
        ((v * 1e4).round() - v * 1e4).abs() < 1e-6
    }

    #[test]
    fn star_centre_is_most_central() {
        let star = network(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
        let scores = eigenvector_centrality(&star, &CentralityConfig::default());
        assert_eq!(scores.len(), 5);
        assert_eq!(scores[0], 1.0);
        // Leaves of a star score 1/sqrt(4) relative to the centre.
        for &leaf in &scores[1..] {
            assert_eq!(leaf, 0.5);
        }
    }

    #[test]
    fn path_scores_are_symmetric_and_rounded() {
        let path = network(4, &[(0, 1), (1, 2), (2, 3)]);
        let scores = eigenvector_centrality(&path, &CentralityConfig::default());
        assert_eq!(scores[0], scores[3]);
        assert_eq!(scores[1], scores[2]);
        assert_eq!(scores[1], 1.0);
        // Ratio of end to middle on P4 is 1/golden ratio.
        assert_eq!(scores[0], 0.618);
        assert!(scores.iter().all(|&s| s >= 0.0 && is_rounded(s)));
    }

    #[test]
    fn long_path_matches_closed_form() {
        // Principal eigenvector of an n-node path is sin(k * pi / (n + 1)), k = 1..=n.
        let n = 200;
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        let scores = eigenvector_centrality(&network(n, &edges), &CentralityConfig::default());

        let step = std::f64::consts::PI / (n + 1) as f64;
        let peak = (100.0 * step).sin();
        for (i, &score) in scores.iter().enumerate() {
            let exact = ((i + 1) as f64 * step).sin() / peak;
            assert!(
                (score - exact).abs() <= 0.5e-4 + 1e-6,
                "household {i}: got {score}, expected {exact}"
            );
        }
        assert_eq!(scores[0], round_to(step.sin() / peak, 4));
    }

    #[test]
    fn edgeless_network_scores_all_ones() {
        let scores = eigenvector_centrality(&network(3, &[]), &CentralityConfig::default());
        assert_eq!(scores, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn empty_network_has_no_scores() {
        let scores = eigenvector_centrality(&network(0, &[]), &CentralityConfig::default());
        assert!(scores.is_empty());
    }

    #[test]
    fn isolated_households_score_zero_beside_a_component() {
        let g = network(4, &[(0, 1), (1, 2), (0, 2)]);
        let scores = eigenvector_centrality(&g, &CentralityConfig::default());
        assert_eq!(&scores[..3], &[1.0, 1.0, 1.0]);
        assert_eq!(scores[3], 0.0);
    }

    #[test]
    fn ranking_orders_descending_with_index_tie_break() {
        let ranking = CentralityRanking::from_scores(vec![0.5, 0.9, 0.5, 0.1]);
        assert_eq!(ranking.order(), &[1, 0, 2, 3]);
        assert_eq!(ranking.len(), 4);
    }

    #[test]
    fn round_to_four_digits() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(1.0, 4), 1.0);
    }
}
