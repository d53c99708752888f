use serde::Serialize;

use crate::scoreline::ScorelineMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Market1x2 {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketOverUnder {
    pub over: f64,
}

/// Market prices in percent, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketProbabilities {
    pub market_1x2: Market1x2,
    pub over_under: MarketOverUnder,
    /// λh + λa straight from the model parameters, not the matrix.
    pub expected_goals_total: f64,
}

pub fn aggregate(matrix: &ScorelineMatrix, goal_line: f64) -> MarketProbabilities {
    let mut p_home = 0.0_f64;
    let mut p_draw = 0.0_f64;
    let mut p_away = 0.0_f64;
    let mut p_over = 0.0_f64;

    for (h, a, p) in matrix.cells() {
        if h > a {
            p_home += p;
        } else if h == a {
            p_draw += p;
        } else {
            p_away += p;
        }
        if (h + a) as f64 > goal_line {
            p_over += p;
        }
    }

    let (lambda_home, lambda_away) = matrix.lambdas();
    MarketProbabilities {
        market_1x2: Market1x2 {
            home: to_percent(p_home),
            draw: to_percent(p_draw),
            away: to_percent(p_away),
        },
        over_under: MarketOverUnder {
            over: to_percent(p_over),
        },
        expected_goals_total: round_to(lambda_home + lambda_away, 2),
    }
}

fn to_percent(p: f64) -> f64 {
    round_to(p * 100.0, 1)
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (v * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_x_two_sums_to_about_hundred() {
        let m = ScorelineMatrix::build(1.6, 1.0, 8, -0.1);
        let out = aggregate(&m, 2.5);
        let sum = out.market_1x2.home + out.market_1x2.draw + out.market_1x2.away;
        assert!((sum - 100.0).abs() <= 0.2);
        assert!(out.market_1x2.home > out.market_1x2.away);
    }

    #[test]
    fn percentages_have_one_decimal() {
        let m = ScorelineMatrix::build(1.37, 1.13, 8, -0.1);
        let out = aggregate(&m, 2.5);
        for v in [
            out.market_1x2.home,
            out.market_1x2.draw,
            out.market_1x2.away,
            out.over_under.over,
        ] {
            assert!(((v * 10.0).round() - v * 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn over_line_counts_totals_strictly_above() {
        let m = ScorelineMatrix::build(1.2, 1.2, 8, 0.0);
        let mut manual = 0.0;
        for (h, a, p) in m.cells() {
            if h + a >= 3 {
                manual += p;
            }
        }
        let out = aggregate(&m, 2.5);
        assert_eq!(out.over_under.over, to_percent(manual));

        // A line of 0.5 excludes only 0-0.
        let not_goalless: f64 = m
            .cells()
            .filter(|(h, a, _)| h + a > 0)
            .map(|(_, _, p)| p)
            .sum();
        let low = aggregate(&m, 0.5);
        assert_eq!(low.over_under.over, to_percent(not_goalless));
    }

    #[test]
    fn expected_total_comes_from_lambdas() {
        let m = ScorelineMatrix::build(1.234, 0.987, 8, -0.1);
        let out = aggregate(&m, 2.5);
        assert_eq!(out.expected_goals_total, 2.22);
    }

    #[test]
    fn zero_lambdas_are_a_certain_draw() {
        let m = ScorelineMatrix::build(0.0, 0.0, 8, -0.1);
        let out = aggregate(&m, 2.5);
        assert_eq!(out.market_1x2.draw, 100.0);
        assert_eq!(out.over_under.over, 0.0);
    }
}
