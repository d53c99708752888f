use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::corpus::MatchRecord;
use crate::decay::parse_kickoff;

const APP_DIR: &str = "liga_predict";
const DB_FILE: &str = "accuracy.sqlite";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pick {
    Home,
    Draw,
    Away,
}

impl Pick {
    pub fn code(self) -> &'static str {
        match self {
            Pick::Home => "1",
            Pick::Draw => "X",
            Pick::Away => "2",
        }
    }
}

impl FromStr for Pick {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1" => Ok(Pick::Home),
            "X" => Ok(Pick::Draw),
            "2" => Ok(Pick::Away),
            other => Err(anyhow!("pick must be 1, X or 2, got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
}

impl BetStatus {
    fn as_str(self) -> &'static str {
        match self {
            BetStatus::Pending => "PENDING",
            BetStatus::Won => "WON",
            BetStatus::Lost => "LOST",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDING" => Some(BetStatus::Pending),
            "WON" => Some(BetStatus::Won),
            "LOST" => Some(BetStatus::Lost),
            _ => None,
        }
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct NewBet {
    /// `"<home> vs <away>"`, matched verbatim against finished fixtures.
    pub fixture: String,
    pub pick: Pick,
    pub odds: f64,
    pub expected_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredBet {
    pub id: i64,
    pub placed_at: String,
    pub fixture: String,
    pub pick: String,
    pub odds: f64,
    pub expected_value: f64,
    pub actual_result: Option<String>,
    pub status: BetStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LedgerStats {
    pub won: u32,
    pub settled: u32,
    pub accuracy_pct: f64,
    pub profit_units: f64,
}

pub fn default_db_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR).join(DB_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR).join(DB_FILE))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS bets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            placed_at TEXT NOT NULL,
            fixture TEXT NOT NULL,
            pick TEXT NOT NULL,
            odds REAL NOT NULL,
            expected_value REAL NOT NULL,
            actual_result TEXT NULL,
            status TEXT NOT NULL DEFAULT 'PENDING'
        );
        CREATE INDEX IF NOT EXISTS idx_bets_status ON bets(status);
        "#,
    )
    .context("init bets schema")?;
    Ok(())
}

pub fn register_bet(conn: &Connection, bet: &NewBet, placed_at: DateTime<Utc>) -> Result<i64> {
    if bet.fixture.trim().is_empty() {
        return Err(anyhow!("fixture must not be empty"));
    }
    if !bet.odds.is_finite() || bet.odds <= 1.0 {
        return Err(anyhow!("odds must be greater than 1.0, got {}", bet.odds));
    }
    conn.execute(
        "INSERT INTO bets(placed_at, fixture, pick, odds, expected_value, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            placed_at.to_rfc3339(),
            bet.fixture.trim(),
            bet.pick.code(),
            bet.odds,
            bet.expected_value,
            BetStatus::Pending.as_str(),
        ],
    )
    .context("insert bet")?;
    let id = conn.last_insert_rowid();
    info!(id, fixture = %bet.fixture, pick = bet.pick.code(), odds = bet.odds, "bet registered");
    Ok(id)
}

pub fn load_bets(conn: &Connection, status: Option<BetStatus>) -> Result<Vec<StoredBet>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, placed_at, fixture, pick, odds, expected_value, actual_result, status
             FROM bets
             WHERE ?1 IS NULL OR status = ?1
             ORDER BY id ASC",
        )
        .context("prepare load bets query")?;

    let rows = stmt
        .query_map(params![status.map(BetStatus::as_str)], |row| {
            let raw_status: String = row.get(7)?;
            let status = BetStatus::parse(&raw_status).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    7,
                    Type::Text,
                    format!("unknown bet status '{raw_status}'").into(),
                )
            })?;
            Ok(StoredBet {
                id: row.get(0)?,
                placed_at: row.get(1)?,
                fixture: row.get(2)?,
                pick: row.get(3)?,
                odds: row.get(4)?,
                expected_value: row.get(5)?,
                actual_result: row.get(6)?,
                status,
            })
        })
        .context("query load bets")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode bet row")?);
    }
    Ok(out)
}

/// Settles pending bets whose fixture appears among `finished`. Returns the update count.
///
/// A finished record only settles a bet when it kicked off at or after the bet was
/// placed, so last season's meeting of the same clubs is ignored. Records without a
/// readable kickoff never settle anything. When several records qualify the earliest
/// one wins.
pub fn settle_pending(conn: &mut Connection, finished: &[MatchRecord]) -> Result<usize> {
    let mut by_label: HashMap<String, Vec<(DateTime<Utc>, &MatchRecord)>> = HashMap::new();
    for m in finished {
        let Some(kickoff) = m.kickoff.as_deref().and_then(parse_kickoff) else {
            debug!(fixture = %m.fixture_label(), "finished record without kickoff skipped");
            continue;
        };
        by_label.entry(m.fixture_label()).or_default().push((kickoff, m));
    }
    let pending = load_bets(conn, Some(BetStatus::Pending))?;

    let tx = conn.transaction().context("begin settle transaction")?;
    let mut updated = 0usize;
    for bet in &pending {
        let Some(candidates) = by_label.get(&bet.fixture) else {
            continue;
        };
        let Some(placed_at) = parse_kickoff(&bet.placed_at) else {
            warn!(id = bet.id, placed_at = %bet.placed_at, "bet has unreadable placed_at");
            continue;
        };
        let Some((_, m)) = candidates
            .iter()
            .filter(|(kickoff, _)| *kickoff >= placed_at)
            .min_by_key(|(kickoff, _)| *kickoff)
        else {
            continue;
        };
        let result = m.result_code();
        let status = settle_status(&bet.pick, result);
        tx.execute(
            "UPDATE bets SET actual_result = ?1, status = ?2 WHERE id = ?3",
            params![result, status.as_str(), bet.id],
        )
        .context("update settled bet")?;
        updated += 1;
    }
    tx.commit().context("commit settle transaction")?;

    info!(pending = pending.len(), updated, "ledger audit finished");
    Ok(updated)
}

pub fn ledger_stats(conn: &Connection) -> Result<LedgerStats> {
    let (won, settled, won_odds): (i64, i64, f64) = conn
        .query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN status = 'WON' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status != 'PENDING' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'WON' THEN odds ELSE 0.0 END), 0.0)
             FROM bets",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .context("query ledger stats")?;

    let won = u32::try_from(won).context("won count out of range")?;
    let settled = u32::try_from(settled).context("settled count out of range")?;
    let accuracy = if settled > 0 {
        f64::from(won) / f64::from(settled) * 100.0
    } else {
        0.0
    };
    Ok(LedgerStats {
        won,
        settled,
        accuracy_pct: round2(accuracy),
        profit_units: round2(won_odds - f64::from(settled)),
    })
}

fn settle_status(pick: &str, result: &str) -> BetStatus {
    if pick == result {
        BetStatus::Won
    } else {
        BetStatus::Lost
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
