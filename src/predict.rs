use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::MatchCorpus;
use crate::decay::DecayConfig;
use crate::error::PredictError;
use crate::markets::{self, Market1x2, MarketOverUnder};
use crate::scoreline::{self, ScorelineMatrix};
use crate::strength::{self, LeagueAverages};

/// Largest accepted grid bound `K`.
pub const MAX_GOALS_LIMIT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictConfig {
    /// Grid bound `K`; scorelines `0..K` per side.
    pub max_goals: u32,
    /// Dixon-Coles correlation `rho`.
    pub rho: f64,
    pub decay: DecayConfig,
    pub goal_line: f64,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            max_goals: 8,
            rho: -0.10,
            decay: DecayConfig::default(),
            goal_line: 2.5,
        }
    }
}

impl PredictConfig {
    pub fn validate(&self) -> Result<(), PredictError> {
        if !(1..=MAX_GOALS_LIMIT).contains(&self.max_goals) {
            return Err(invalid("max_goals", "must be within 1..=30"));
        }
        if !self.rho.is_finite() {
            return Err(invalid("rho", "must be finite"));
        }
        let k = self.decay.rate_per_day;
        if !k.is_finite() || k < 0.0 {
            return Err(invalid("decay.rate_per_day", "must be finite and >= 0"));
        }
        if !(0.0..=1.0).contains(&self.decay.floor) {
            return Err(invalid("decay.floor", "must be within [0, 1]"));
        }
        if !self.goal_line.is_finite() {
            return Err(invalid("goal_line", "must be finite"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> PredictError {
    PredictError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub expected_goals_total: f64,
    #[serde(rename = "market1x2")]
    pub market_1x2: Market1x2,
    pub market_over_under: MarketOverUnder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub home: String,
    pub away: String,
}

/// Predicts one fixture from a corpus snapshot.
///
/// Pure: reads the corpus, touches no shared state, and may run concurrently.
pub fn predict(
    home_team: &str,
    away_team: &str,
    corpus: &MatchCorpus,
    config: &PredictConfig,
    now: DateTime<Utc>,
) -> Result<Prediction, PredictError> {
    config.validate()?;
    let weights = strength::match_weights(corpus, &config.decay, now);
    let averages = strength::league_averages(corpus, &weights)?;
    Ok(predict_weighted(home_team, away_team, corpus, &weights, &averages, config))
}

/// Predicts a batch of fixtures against one corpus snapshot, in parallel.
///
/// Weights and league averages are computed once and shared by every fixture.
pub fn predict_many(
    fixtures: &[Fixture],
    corpus: &MatchCorpus,
    config: &PredictConfig,
    now: DateTime<Utc>,
) -> Result<Vec<Prediction>, PredictError> {
    config.validate()?;
    let weights = strength::match_weights(corpus, &config.decay, now);
    let averages = strength::league_averages(corpus, &weights)?;
    Ok(fixtures
        .par_iter()
        .map(|f| predict_weighted(&f.home, &f.away, corpus, &weights, &averages, config))
        .collect())
}

fn predict_weighted(
    home_team: &str,
    away_team: &str,
    corpus: &MatchCorpus,
    weights: &[f64],
    averages: &LeagueAverages,
    config: &PredictConfig,
) -> Prediction {
    let home = strength::team_strength(corpus, weights, home_team, averages);
    let away = strength::team_strength(corpus, weights, away_team, averages);
    let (lambda_home, lambda_away) = scoreline::expected_goals(&home, &away, averages);
    debug!(
        home_team,
        away_team,
        lambda_home,
        lambda_away,
        home_attack = home.attack,
        home_defense = home.defense,
        away_attack = away.attack,
        away_defense = away.defense,
        "expected goals"
    );

    let matrix = ScorelineMatrix::build(lambda_home, lambda_away, config.max_goals, config.rho);
    let markets = markets::aggregate(&matrix, config.goal_line);
    Prediction {
        expected_goals_total: markets.expected_goals_total,
        market_1x2: markets.market_1x2,
        market_over_under: markets.over_under,
    }
}
