use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const SECS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayConfig {
    /// Exponential decay rate `k`, per day of match age.
    pub rate_per_day: f64,
    /// Lower clamp `w_min`; old matches never weigh less than this.
    pub floor: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            rate_per_day: 0.005,
            floor: 0.25,
        }
    }
}

impl DecayConfig {
    /// Recency weight for a match, in `[floor, 1]`.
    ///
    /// A missing or unparsable kickoff counts as fully relevant (1.0).
    pub fn weight(&self, kickoff: Option<&str>, now: DateTime<Utc>) -> f64 {
        let Some(ts) = kickoff.and_then(parse_kickoff) else {
            return 1.0;
        };
        let age_days = ((now - ts).num_seconds() as f64 / SECS_PER_DAY).max(0.0);
        self.weight_for_age(age_days)
    }

    pub fn weight_for_age(&self, age_days: f64) -> f64 {
        let decayed = (-self.rate_per_day * age_days.max(0.0)).exp();
        decayed.max(self.floor).min(1.0)
    }
}

/// Accepts RFC 3339 (provider format), `YYYY-MM-DD HH:MM[:SS]` and bare dates, all as UTC.
pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
