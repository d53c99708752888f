use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};

use crate::corpus::{MatchCorpus, MatchRecord};
use crate::teams::league_teams;

const BASE_HOME_GOALS: f64 = 1.45;
const BASE_AWAY_GOALS: f64 = 1.15;

/// Offline corpus: a double round-robin of the league teams ending at `now`.
///
/// Each team gets a hidden attack/defense rating so the engine has something
/// to separate. The same seed always yields the same corpus.
pub fn generate(seed: u64, now: DateTime<Utc>) -> Result<MatchCorpus> {
    let mut rng = StdRng::seed_from_u64(seed);
    let teams = league_teams();
    let ratings: Vec<(f64, f64)> = teams
        .iter()
        .map(|_| (rng.gen_range(0.7..1.35), rng.gen_range(0.7..1.35)))
        .collect();

    let mut pairs = Vec::new();
    for (i, _) in teams.iter().enumerate() {
        for (j, _) in teams.iter().enumerate() {
            if i != j {
                pairs.push((i, j));
            }
        }
    }

    let rounds = pairs.len();
    let mut matches = Vec::with_capacity(rounds);
    for (n, (h, a)) in pairs.into_iter().enumerate() {
        let (att_h, def_h) = ratings[h];
        let (att_a, def_a) = ratings[a];
        let home_goals = Poisson::new(BASE_HOME_GOALS * att_h * def_a)
            .context("home goal rate")?
            .sample(&mut rng);
        let away_goals = Poisson::new(BASE_AWAY_GOALS * att_a * def_h)
            .context("away goal rate")?
            .sample(&mut rng);
        // Roughly eight fixtures a week, most recent last.
        let days_ago = ((rounds - n) / 8) as i64 * 7;
        matches.push(MatchRecord {
            home_team: teams[h].to_string(),
            away_team: teams[a].to_string(),
            home_goals: home_goals as u32,
            away_goals: away_goals as u32,
            kickoff: Some((now - Duration::days(days_ago)).to_rfc3339()),
        });
    }
    Ok(MatchCorpus::new(matches))
}
