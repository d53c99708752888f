use std::fs;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::{CorpusSource, SourceConfig};
use crate::corpus::MatchCorpus;
use crate::{fake_corpus, fixtures_fetch};

const FAKE_SEED: u64 = 2025;

/// Assembles a corpus snapshot from the configured source.
pub fn load_corpus(cfg: &SourceConfig, now: DateTime<Utc>) -> Result<MatchCorpus> {
    let corpus = match &cfg.source {
        CorpusSource::Api => {
            let key = cfg
                .api_key
                .as_deref()
                .ok_or_else(|| anyhow!("missing FOOTBALL_API_KEY"))?;
            fixtures_fetch::fetch_corpus(key, cfg.league_id, &cfg.seasons)
        }
        CorpusSource::Fake => fake_corpus::generate(FAKE_SEED, now)?,
        CorpusSource::File(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read corpus file {}", path.display()))?;
            serde_json::from_str::<MatchCorpus>(&raw)
                .with_context(|| format!("parse corpus file {}", path.display()))?
        }
    };
    info!(source = ?cfg.source, matches = corpus.len(), "corpus loaded");
    Ok(corpus)
}

/// Real finished fixtures to settle bets against.
///
/// Only the provider or an explicit file qualify; the synthetic corpus is refused.
pub fn load_finished_fixtures(cfg: &SourceConfig, now: DateTime<Utc>) -> Result<MatchCorpus> {
    if cfg.source == CorpusSource::Fake {
        return Err(anyhow!(
            "settling bets needs real results: set FOOTBALL_API_KEY or CORPUS_SOURCE=file"
        ));
    }
    load_corpus(cfg, now)
}
