use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;

use liga_predict::bet_ledger::{self, NewBet, Pick};
use liga_predict::{config, logging, source};

const USAGE: &str = "usage:
  bet_ledger register <\"Home vs Away\"> <1|X|2> <odds> <expected value> [--db <path>]
  bet_ledger audit [--db <path>]
  bet_ledger stats [--db <path>]";

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init();

    let (positional, db_arg) = split_db_arg(std::env::args().skip(1).collect());
    let db_path = db_arg
        .or_else(|| std::env::var("BET_LEDGER_DB").ok().map(PathBuf::from))
        .or_else(bet_ledger::default_db_path)
        .context("unable to resolve sqlite path")?;
    let mut conn = bet_ledger::open_db(&db_path)?;

    match positional.first().map(String::as_str) {
        Some("register") => {
            let [_, fixture, pick, odds, ev] = positional.as_slice() else {
                eprintln!("{USAGE}");
                return Err(anyhow!("register needs fixture, pick, odds and expected value"));
            };
            let bet = NewBet {
                fixture: fixture.clone(),
                pick: pick.parse::<Pick>()?,
                odds: odds.parse::<f64>().context("odds must be a number")?,
                expected_value: ev.parse::<f64>().context("expected value must be a number")?,
            };
            let id = bet_ledger::register_bet(&conn, &bet, Utc::now())?;
            println!("{}", serde_json::json!({ "status": "success", "id": id }));
        }
        Some("audit") => {
            let pending = bet_ledger::load_bets(&conn, Some(bet_ledger::BetStatus::Pending))?;
            if pending.is_empty() {
                println!("{}", serde_json::json!({ "message": "no pending bets to audit" }));
                return Ok(());
            }
            let source_cfg = config::source_config_from_env()?;
            let finished = source::load_finished_fixtures(&source_cfg, Utc::now())?;
            let updated = bet_ledger::settle_pending(&mut conn, finished.matches())?;
            println!(
                "{}",
                serde_json::json!({ "pending": pending.len(), "updated": updated })
            );
        }
        Some("stats") => {
            let stats = bet_ledger::ledger_stats(&conn)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&stats).context("serialize stats")?
            );
        }
        _ => {
            eprintln!("{USAGE}");
            return Err(anyhow!("missing or unknown command"));
        }
    }
    Ok(())
}

fn split_db_arg(args: Vec<String>) -> (Vec<String>, Option<PathBuf>) {
    let mut positional = Vec::new();
    let mut db = None;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if let Some(path) = arg.strip_prefix("--db=") {
            if !path.trim().is_empty() {
                db = Some(PathBuf::from(path.trim()));
            }
        } else if arg == "--db" {
            db = iter.next().filter(|p| !p.trim().is_empty()).map(PathBuf::from);
        } else {
            positional.push(arg);
        }
    }
    (positional, db)
}
