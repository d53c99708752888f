use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::{info, warn};

use crate::corpus::{MatchCorpus, MatchRecord};
use crate::http_client::api_sports_get;

/// Finished fixtures for one league season.
pub fn fetch_finished_season(api_key: &str, league_id: u32, season: u16) -> Result<Vec<MatchRecord>> {
    let body = api_sports_get(
        "fixtures",
        api_key,
        &[
            ("league", league_id.to_string()),
            ("season", season.to_string()),
            ("status", "FT".to_string()),
        ],
    )?;
    parse_fixtures_json(&body)
}

/// Builds the corpus across seasons; a failing season is logged and skipped.
pub fn fetch_corpus(api_key: &str, league_id: u32, seasons: &[u16]) -> MatchCorpus {
    fetch_corpus_with(seasons, |season| fetch_finished_season(api_key, league_id, season))
}

/// Season loop behind [`fetch_corpus`] with the per-season fetch supplied by the caller.
pub fn fetch_corpus_with(
    seasons: &[u16],
    fetch: impl Fn(u16) -> Result<Vec<MatchRecord>>,
) -> MatchCorpus {
    let mut matches = Vec::new();
    for &season in seasons {
        match fetch(season) {
            Ok(rows) => {
                info!(season, matches = rows.len(), "fixtures loaded");
                matches.extend(rows);
            }
            Err(err) => warn!(season, error = %err, "fixtures fetch failed"),
        }
    }
    MatchCorpus::new(matches)
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<MatchRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let v: Value = serde_json::from_str(trimmed).context("invalid fixtures json")?;

    // The provider reports quota and auth problems in `errors` with a 200 status.
    if let Some(errors) = v.get("errors") {
        let has_errors = match errors {
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            _ => false,
        };
        if has_errors {
            return Err(anyhow!("provider errors: {errors}"));
        }
    }

    let Some(items) = v.get("response").and_then(|x| x.as_array()) else {
        return Ok(Vec::new());
    };
    Ok(items.iter().filter_map(parse_fixture_item).collect())
}

fn parse_fixture_item(item: &Value) -> Option<MatchRecord> {
    let teams = item.get("teams")?;
    let goals = item.get("goals")?;
    let home_team = teams.get("home")?.get("name")?.as_str()?.to_string();
    let away_team = teams.get("away")?.get("name")?.as_str()?.to_string();
    let home_goals = u32::try_from(goals.get("home")?.as_u64()?).ok()?;
    let away_goals = u32::try_from(goals.get("away")?.as_u64()?).ok()?;
    let kickoff = item
        .get("fixture")
        .and_then(|f| f.get("date"))
        .and_then(|d| d.as_str())
        .map(|s| s.to_string());

    Some(MatchRecord {
        home_team,
        away_team,
        home_goals,
        away_goals,
        kickoff,
    })
}
