use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use chrono::Duration;

use crate::decay::DecayConfig;
use crate::predict::{MAX_GOALS_LIMIT, PredictConfig};

pub const DEFAULT_LEAGUE_ID: u32 = 283;
const DEFAULT_SEASONS: &[u16] = &[2024, 2025];
const DEFAULT_TTL_SECS: i64 = 600;

/// Loads `.env.local` then `.env`; values already in the environment win.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSource {
    Api,
    Fake,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub source: CorpusSource,
    pub api_key: Option<String>,
    pub league_id: u32,
    pub seasons: Vec<u16>,
    pub cache_ttl: Duration,
}

pub fn predict_config_from_env() -> PredictConfig {
    predict_config_from(|key| opt_env(key))
}

pub fn source_config_from_env() -> Result<SourceConfig> {
    source_config_from(|key| opt_env(key))
}

pub fn predict_config_from(get: impl Fn(&str) -> Option<String>) -> PredictConfig {
    let d = PredictConfig::default();
    PredictConfig {
        max_goals: parse_or(&get, "PREDICT_MAX_GOALS", d.max_goals).clamp(1, MAX_GOALS_LIMIT),
        rho: parse_or(&get, "PREDICT_RHO", d.rho),
        decay: DecayConfig {
            rate_per_day: parse_or(&get, "PREDICT_DECAY_PER_DAY", d.decay.rate_per_day),
            floor: parse_or(&get, "PREDICT_WEIGHT_FLOOR", d.decay.floor),
        },
        goal_line: parse_or(&get, "PREDICT_GOAL_LINE", d.goal_line),
    }
}

pub fn source_config_from(get: impl Fn(&str) -> Option<String>) -> Result<SourceConfig> {
    let api_key = get("FOOTBALL_API_KEY");
    let source = match get("CORPUS_SOURCE").map(|s| s.to_lowercase()).as_deref() {
        Some("api") => CorpusSource::Api,
        Some("fake") => CorpusSource::Fake,
        Some("file") => {
            let path = get("CORPUS_FILE").ok_or_else(|| anyhow!("CORPUS_SOURCE=file needs CORPUS_FILE"))?;
            CorpusSource::File(PathBuf::from(path))
        }
        Some(other) => return Err(anyhow!("unknown CORPUS_SOURCE '{other}'")),
        None if api_key.is_some() => CorpusSource::Api,
        None => CorpusSource::Fake,
    };
    if source == CorpusSource::Api && api_key.is_none() {
        return Err(anyhow!("CORPUS_SOURCE=api needs FOOTBALL_API_KEY"));
    }

    let seasons = match get("LEAGUE_SEASONS") {
        Some(raw) => parse_seasons(&raw),
        None => DEFAULT_SEASONS.to_vec(),
    };
    if seasons.is_empty() {
        return Err(anyhow!("LEAGUE_SEASONS resolved to no seasons"));
    }

    Ok(SourceConfig {
        source,
        api_key,
        league_id: parse_or(&get, "LEAGUE_ID", DEFAULT_LEAGUE_ID),
        seasons,
        cache_ttl: Duration::seconds(parse_or(&get, "CORPUS_TTL_SECS", DEFAULT_TTL_SECS).max(0)),
    })
}

fn parse_seasons(raw: &str) -> Vec<u16> {
    raw.split([',', ';', ' '])
        .filter_map(|part| part.trim().parse::<u16>().ok())
        .collect()
}

fn parse_or<T: std::str::FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    get(key)
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn predict_config_defaults_and_overrides() {
        let cfg = predict_config_from(lookup(&[]));
        assert_eq!(cfg, PredictConfig::default());

        let cfg = predict_config_from(lookup(&[
            ("PREDICT_MAX_GOALS", "10"),
            ("PREDICT_RHO", "-0.05"),
            ("PREDICT_GOAL_LINE", "bogus"),
        ]));
        assert_eq!(cfg.max_goals, 10);
        assert_eq!(cfg.rho, -0.05);
        assert_eq!(cfg.goal_line, 2.5);
    }

    #[test]
    fn source_defaults_to_fake_without_key() {
        let cfg = source_config_from(lookup(&[])).unwrap();
        assert_eq!(cfg.source, CorpusSource::Fake);
        assert_eq!(cfg.seasons, vec![2024, 2025]);
        assert_eq!(cfg.league_id, DEFAULT_LEAGUE_ID);
    }

    #[test]
    fn source_api_needs_key() {
        assert!(source_config_from(lookup(&[("CORPUS_SOURCE", "api")])).is_err());
        let cfg = source_config_from(lookup(&[("FOOTBALL_API_KEY", "k")])).unwrap();
        assert_eq!(cfg.source, CorpusSource::Api);
    }

    #[test]
    fn seasons_parse_from_list() {
        let cfg = source_config_from(lookup(&[("LEAGUE_SEASONS", "2023; 2024,x")])).unwrap();
        assert_eq!(cfg.seasons, vec![2023, 2024]);
    }
}
