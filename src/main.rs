use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use tracing::warn;

use liga_predict::config::{self, SourceConfig};
use liga_predict::corpus_cache::CorpusCache;
use liga_predict::predict::{Fixture, PredictConfig, predict, predict_many};
use liga_predict::{logging, source, teams};

const USAGE: &str = "usage:
  liga_predict predict <home team> <away team>
  liga_predict teams
  liga_predict slate <fixtures.json>
  liga_predict repl            (reads `home|away` lines from stdin)";

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        return Err(anyhow!("missing command"));
    };

    match command.as_str() {
        "teams" => {
            let rows: Vec<_> = teams::league_teams()
                .into_iter()
                .map(|team| serde_json::json!({ "team": team }))
                .collect();
            print_json(&serde_json::json!({ "teams": rows }))
        }
        "predict" => {
            let (Some(home), Some(away)) = (args.get(1), args.get(2)) else {
                eprintln!("{USAGE}");
                return Err(anyhow!("predict needs a home and an away team"));
            };
            run_predict(home, away)
        }
        "slate" => {
            let path = args
                .get(1)
                .map(PathBuf::from)
                .ok_or_else(|| anyhow!("slate needs a fixtures file"))?;
            run_slate(path)
        }
        "repl" => run_repl(),
        other => {
            eprintln!("{USAGE}");
            Err(anyhow!("unknown command '{other}'"))
        }
    }
}

fn run_predict(home: &str, away: &str) -> Result<()> {
    let (source_cfg, predict_cfg) = load_configs()?;
    warn_unknown_teams(&[home, away]);
    let now = Utc::now();
    let corpus = source::load_corpus(&source_cfg, now)?;
    let prediction = predict(home, away, &corpus, &predict_cfg, now)?;
    print_json(&prediction)
}

fn run_slate(path: PathBuf) -> Result<()> {
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read fixtures file {}", path.display()))?;
    let fixtures: Vec<Fixture> = serde_json::from_str(&raw).context("parse fixtures file")?;
    let (source_cfg, predict_cfg) = load_configs()?;
    for f in &fixtures {
        warn_unknown_teams(&[f.home.as_str(), f.away.as_str()]);
    }

    let now = Utc::now();
    let corpus = source::load_corpus(&source_cfg, now)?;
    let predictions = predict_many(&fixtures, &corpus, &predict_cfg, now)?;
    let rows: Vec<_> = fixtures
        .iter()
        .zip(&predictions)
        .map(|(f, p)| serde_json::json!({ "home": f.home, "away": f.away, "prediction": p }))
        .collect();
    print_json(&rows)
}

// Long-running mode: the corpus is cached and only refetched once the TTL lapses.
fn run_repl() -> Result<()> {
    let (source_cfg, predict_cfg) = load_configs()?;
    let mut cache = CorpusCache::new(source_cfg.cache_ttl);
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line.context("read stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((home, away)) = line.split_once('|') else {
            eprintln!("expected `home|away`, got '{line}'");
            continue;
        };
        let (home, away) = (home.trim(), away.trim());
        warn_unknown_teams(&[home, away]);

        let now = Utc::now();
        let corpus = match cache.get_or_refresh(now, || source::load_corpus(&source_cfg, now)) {
            Ok(corpus) => corpus,
            Err(err) => {
                print_json(&serde_json::json!({ "error": err.to_string() }))?;
                continue;
            }
        };
        match predict(home, away, corpus, &predict_cfg, now) {
            Ok(p) => print_json(&p)?,
            Err(err) => print_json(&serde_json::json!({ "error": err.to_string() }))?,
        }
    }
    Ok(())
}

fn load_configs() -> Result<(SourceConfig, PredictConfig)> {
    let source_cfg = config::source_config_from_env()?;
    let predict_cfg = config::predict_config_from_env();
    predict_cfg.validate()?;
    Ok((source_cfg, predict_cfg))
}

fn warn_unknown_teams(names: &[&str]) {
    for name in names {
        if !teams::is_league_team(name) {
            warn!(team = %name, "team is not in the league list; it will be rated neutral if absent from the corpus");
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    let mut out = io::stdout().lock();
    writeln!(out, "{json}").context("write stdout")?;
    Ok(())
}
