use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::corpus::MatchCorpus;
use crate::decay::DecayConfig;
use crate::error::PredictError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamStrength {
    pub attack: f64,
    pub defense: f64,
}

impl TeamStrength {
    pub fn neutral() -> Self {
        Self {
            attack: 1.0,
            defense: 1.0,
        }
    }
}

/// Weighted mean goals per match for each side across the whole corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeagueAverages {
    pub home: f64,
    pub away: f64,
}

impl LeagueAverages {
    pub fn per_match(&self) -> f64 {
        self.home + self.away
    }

    /// Average goals one team scores in a match; the strength normaliser.
    pub fn per_team(&self) -> f64 {
        self.per_match() / 2.0
    }
}

/// One decay weight per corpus entry, index-aligned with `corpus.matches()`.
pub fn match_weights(corpus: &MatchCorpus, decay: &DecayConfig, now: DateTime<Utc>) -> Vec<f64> {
    corpus
        .iter()
        .map(|m| decay.weight(m.kickoff.as_deref(), now))
        .collect()
}

pub fn league_averages(
    corpus: &MatchCorpus,
    weights: &[f64],
) -> Result<LeagueAverages, PredictError> {
    if corpus.is_empty() {
        return Err(PredictError::InsufficientData(
            "match corpus is empty".to_string(),
        ));
    }

    let mut weight_sum = 0.0_f64;
    let mut home_sum = 0.0_f64;
    let mut away_sum = 0.0_f64;
    for (m, w) in corpus.iter().zip(weights) {
        weight_sum += w;
        home_sum += w * m.home_goals as f64;
        away_sum += w * m.away_goals as f64;
    }

    if weight_sum <= 0.0 {
        return Err(PredictError::InsufficientData(
            "all matches carry zero weight".to_string(),
        ));
    }
    let averages = LeagueAverages {
        home: home_sum / weight_sum,
        away: away_sum / weight_sum,
    };
    if averages.per_team() <= 0.0 {
        return Err(PredictError::InsufficientData(
            "league average goals is zero".to_string(),
        ));
    }
    Ok(averages)
}

/// Weighted-mean goals scored and conceded by `team`, relative to the league.
///
/// Goal sums and the weight sum use the same per-match weight, so both ratios
/// are genuine weighted means. A team absent from the corpus is neutral.
pub fn team_strength(
    corpus: &MatchCorpus,
    weights: &[f64],
    team: &str,
    averages: &LeagueAverages,
) -> TeamStrength {
    let mut weight_sum = 0.0_f64;
    let mut scored = 0.0_f64;
    let mut conceded = 0.0_f64;

    for (m, w) in corpus.iter().zip(weights) {
        let Some((gf, ga)) = m.goals_for(team) else {
            continue;
        };
        weight_sum += w;
        scored += w * gf as f64;
        conceded += w * ga as f64;
    }

    let norm = averages.per_team();
    if weight_sum <= 0.0 || norm <= 0.0 {
        return TeamStrength::neutral();
    }

    TeamStrength {
        attack: (scored / weight_sum) / norm,
        defense: (conceded / weight_sum) / norm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::MatchRecord;

    fn rec(h: &str, a: &str, gh: u32, ga: u32, kickoff: Option<&str>) -> MatchRecord {
        MatchRecord {
            home_team: h.to_string(),
            away_team: a.to_string(),
            home_goals: gh,
            away_goals: ga,
            kickoff: kickoff.map(str::to_string),
        }
    }

    #[test]
    fn empty_corpus_is_insufficient_data() {
        let corpus = MatchCorpus::default();
        let err = league_averages(&corpus, &[]).unwrap_err();
        assert!(matches!(err, PredictError::InsufficientData(_)));
    }

    #[test]
    fn goalless_league_is_insufficient_data() {
        let corpus = MatchCorpus::new(vec![rec("A", "B", 0, 0, None)]);
        assert!(league_averages(&corpus, &[1.0]).is_err());
    }

    #[test]
    fn absent_team_is_exactly_neutral() {
        let corpus = MatchCorpus::new(vec![rec("A", "B", 2, 1, None)]);
        let weights = vec![1.0];
        let avg = league_averages(&corpus, &weights).unwrap();
        let s = team_strength(&corpus, &weights, "Nobody", &avg);
        assert_eq!(s.attack, 1.0);
        assert_eq!(s.defense, 1.0);
    }

    #[test]
    fn unweighted_strength_matches_plain_ratios() {
        let corpus = MatchCorpus::new(vec![
            rec("A", "B", 2, 0, None),
            rec("B", "A", 1, 1, None),
            rec("C", "B", 0, 2, None),
        ]);
        let weights = vec![1.0; 3];
        let avg = league_averages(&corpus, &weights).unwrap();
        // 6 goals over 3 matches -> 1.0 per team.
        assert!((avg.per_team() - 1.0).abs() < 1e-12);

        let a = team_strength(&corpus, &weights, "A", &avg);
        assert!((a.attack - 1.5).abs() < 1e-12);
        assert!((a.defense - 0.5).abs() < 1e-12);
    }

    #[test]
    fn recent_matches_dominate_the_weighted_mean() {
        let corpus = MatchCorpus::new(vec![
            rec("A", "B", 4, 0, Some("2025-05-31")),
            rec("A", "C", 0, 0, Some("2020-01-01")),
        ]);
        let weights = vec![1.0, 0.25];
        let avg = league_averages(&corpus, &weights).unwrap();
        let a = team_strength(&corpus, &weights, "A", &avg);
        // Weighted mean scored = 4 / 1.25 = 3.2, league per-team = 3.2 / 2.
        assert!((a.attack - 2.0).abs() < 1e-12);
        assert_eq!(a.defense, 0.0);
    }
}
