use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
    // Raw provider timestamp; may be missing or malformed.
    #[serde(default)]
    pub kickoff: Option<String>,
}

impl MatchRecord {
    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// Goals (scored, conceded) from `team`'s point of view, if it played.
    pub fn goals_for(&self, team: &str) -> Option<(u32, u32)> {
        if self.home_team == team {
            Some((self.home_goals, self.away_goals))
        } else if self.away_team == team {
            Some((self.away_goals, self.home_goals))
        } else {
            None
        }
    }

    pub fn fixture_label(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    /// 1X2 result code: `1` home win, `X` draw, `2` away win.
    pub fn result_code(&self) -> &'static str {
        if self.home_goals > self.away_goals {
            "1"
        } else if self.home_goals < self.away_goals {
            "2"
        } else {
            "X"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchCorpus {
    matches: Vec<MatchRecord>,
}

impl MatchCorpus {
    pub fn new(matches: Vec<MatchRecord>) -> Self {
        Self { matches }
    }

    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchRecord> {
        self.matches.iter()
    }
}

impl From<Vec<MatchRecord>> for MatchCorpus {
    fn from(matches: Vec<MatchRecord>) -> Self {
        Self::new(matches)
    }
}

impl<'a> IntoIterator for &'a MatchCorpus {
    type Item = &'a MatchRecord;
    type IntoIter = std::slice::Iter<'a, MatchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}
