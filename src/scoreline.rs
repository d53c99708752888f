use tracing::warn;

use crate::strength::{LeagueAverages, TeamStrength};

// Poisson mass beyond the grid above which the truncation is worth flagging.
const TAIL_WARN: f64 = 1e-3;

/// Expected goals `(home, away)` for a fixture.
pub fn expected_goals(
    home: &TeamStrength,
    away: &TeamStrength,
    averages: &LeagueAverages,
) -> (f64, f64) {
    let lambda_home = home.attack * away.defense * averages.home;
    let lambda_away = away.attack * home.defense * averages.away;
    (lambda_home, lambda_away)
}

pub fn poisson_pmf(lambda: f64, goals: u32) -> f64 {
    if lambda <= 0.0 {
        return if goals == 0 { 1.0 } else { 0.0 };
    }
    let numer = lambda.powi(goals as i32) * (-lambda).exp();
    let denom = (1..=goals).fold(1.0_f64, |acc, k| acc * k as f64);
    numer / denom
}

/// Dixon-Coles low-score correction; 1.0 outside the four lowest cells.
pub fn dc_tau(home_goals: u32, away_goals: u32, lambda_home: f64, lambda_away: f64, rho: f64) -> f64 {
    match (home_goals, away_goals) {
        (0, 0) => 1.0 - lambda_home * lambda_away * rho,
        (0, 1) => 1.0 + lambda_home * rho,
        (1, 0) => 1.0 + lambda_away * rho,
        (1, 1) => 1.0 - rho,
        _ => 1.0,
    }
}

/// Joint probabilities over `[0, max_goals) x [0, max_goals)`.
///
/// Not renormalised: total mass is 1 minus truncation and correction error.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorelineMatrix {
    max_goals: u32,
    lambda_home: f64,
    lambda_away: f64,
    cells: Vec<f64>,
}

impl ScorelineMatrix {
    pub fn build(lambda_home: f64, lambda_away: f64, max_goals: u32, rho: f64) -> Self {
        for (side, lambda) in [("home", lambda_home), ("away", lambda_away)] {
            let tail = truncated_tail(lambda, max_goals);
            if tail > TAIL_WARN {
                warn!(side, lambda, max_goals, tail, "scoreline grid truncates noticeable mass");
            }
        }

        let pmf_h: Vec<f64> = (0..max_goals).map(|k| poisson_pmf(lambda_home, k)).collect();
        let pmf_a: Vec<f64> = (0..max_goals).map(|k| poisson_pmf(lambda_away, k)).collect();

        let k = max_goals as usize;
        let mut cells = Vec::with_capacity(k.saturating_mul(k));
        for (h, p_h) in pmf_h.iter().enumerate() {
            for (a, p_a) in pmf_a.iter().enumerate() {
                let tau = dc_tau(h as u32, a as u32, lambda_home, lambda_away, rho);
                // Extreme lambda * rho can push tau negative.
                cells.push((p_h * p_a * tau).max(0.0));
            }
        }

        Self {
            max_goals,
            lambda_home,
            lambda_away,
            cells,
        }
    }

    pub fn max_goals(&self) -> u32 {
        self.max_goals
    }

    pub fn lambdas(&self) -> (f64, f64) {
        (self.lambda_home, self.lambda_away)
    }

    pub fn get(&self, home_goals: u32, away_goals: u32) -> f64 {
        if home_goals >= self.max_goals || away_goals >= self.max_goals {
            return 0.0;
        }
        self.cells[home_goals as usize * self.max_goals as usize + away_goals as usize]
    }

    /// Every `(home_goals, away_goals, probability)` cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        let k = self.max_goals as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, p)| ((idx / k) as u32, (idx % k) as u32, *p))
    }

    pub fn total_mass(&self) -> f64 {
        self.cells.iter().sum()
    }
}

fn truncated_tail(lambda: f64, max_goals: u32) -> f64 {
    let kept: f64 = (0..max_goals).map(|k| poisson_pmf(lambda, k)).sum();
    (1.0 - kept).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poisson_non_positive_lambda_convention() {
        assert_eq!(poisson_pmf(0.0, 0), 1.0);
        assert_eq!(poisson_pmf(-1.0, 0), 1.0);
        assert_eq!(poisson_pmf(0.0, 1), 0.0);
        assert_eq!(poisson_pmf(-0.5, 3), 0.0);
    }

    #[test]
    fn poisson_mass_approaches_one() {
        let at = |k: u32| (0..k).map(|g| poisson_pmf(1.5, g)).sum::<f64>();
        assert!(at(4) < at(6));
        assert!(at(6) < at(8));
        assert!((at(8) - 0.9996).abs() < 1e-3);
        assert!((at(20) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tau_only_touches_low_cells() {
        assert!((dc_tau(0, 0, 1.5, 1.2, -0.1) - 1.18).abs() < 1e-12);
        assert!((dc_tau(0, 1, 1.5, 1.2, -0.1) - 0.85).abs() < 1e-12);
        assert!((dc_tau(1, 0, 1.5, 1.2, -0.1) - 0.88).abs() < 1e-12);
        assert!((dc_tau(1, 1, 1.5, 1.2, -0.1) - 1.1).abs() < 1e-12);
        assert_eq!(dc_tau(2, 1, 1.5, 1.2, -0.1), 1.0);
        assert_eq!(dc_tau(0, 2, 1.5, 1.2, -0.1), 1.0);
    }

    #[test]
    fn matrix_cells_follow_the_formula() {
        let m = ScorelineMatrix::build(1.4, 1.1, 8, -0.1);
        let expected = poisson_pmf(1.4, 0) * poisson_pmf(1.1, 0) * (1.0 + 1.4 * 1.1 * 0.1);
        assert!((m.get(0, 0) - expected).abs() < 1e-15);
        assert!((m.get(3, 2) - poisson_pmf(1.4, 3) * poisson_pmf(1.1, 2)).abs() < 1e-15);
        assert_eq!(m.get(8, 0), 0.0);
        assert_eq!(m.cells().count(), 64);
    }

    #[test]
    fn matrix_is_not_renormalised() {
        let m = ScorelineMatrix::build(1.4, 1.1, 8, -0.1);
        let mass = m.total_mass();
        assert!(mass < 1.0);
        assert!((mass - 1.0).abs() < 1e-3);
    }

    #[test]
    fn zero_rho_matches_independent_poisson() {
        let m = ScorelineMatrix::build(1.0, 2.0, 8, 0.0);
        for (h, a, p) in m.cells() {
            assert!((p - poisson_pmf(1.0, h) * poisson_pmf(2.0, a)).abs() < 1e-15);
        }
    }

    #[test]
    fn expected_goals_uses_side_averages() {
        let home = TeamStrength {
            attack: 1.2,
            defense: 0.9,
        };
        let away = TeamStrength {
            attack: 0.8,
            defense: 1.1,
        };
        let avg = LeagueAverages {
            home: 1.5,
            away: 1.1,
        };
        let (lh, la) = expected_goals(&home, &away, &avg);
        assert!((lh - 1.2 * 1.1 * 1.5).abs() < 1e-12);
        assert!((la - 0.8 * 0.9 * 1.1).abs() < 1e-12);
    }
}
