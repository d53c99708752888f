use chrono::{DateTime, TimeZone, Utc};

use liga_predict::decay::DecayConfig;
use liga_predict::markets::aggregate;
use liga_predict::scoreline::{ScorelineMatrix, expected_goals};
use liga_predict::strength::{LeagueAverages, TeamStrength, league_averages, match_weights, team_strength};
use liga_predict::{MatchCorpus, MatchRecord, PredictConfig, PredictError, fake_corpus, predict};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

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
fn worked_example_produces_consistent_markets() {
    // 2.6 goals per match split evenly between the sides.
    let averages = LeagueAverages {
        home: 1.3,
        away: 1.3,
    };
    let home = TeamStrength {
        attack: 1.2,
        defense: 0.9,
    };
    let away = TeamStrength {
        attack: 0.8,
        defense: 1.1,
    };
    let (lh, la) = expected_goals(&home, &away, &averages);
    assert!((lh - 1.716).abs() < 1e-9);
    assert!((la - 0.936).abs() < 1e-9);

    let matrix = ScorelineMatrix::build(lh, la, 8, -0.10);
    let raw_1x2: f64 = matrix.cells().map(|(_, _, p)| p).sum();
    assert!((raw_1x2 - 1.0).abs() < 1e-3);

    let markets = aggregate(&matrix, 2.5);
    let m = markets.market_1x2;
    for v in [m.home, m.draw, m.away, markets.over_under.over] {
        assert!((0.0..=100.0).contains(&v));
    }
    assert!((m.home + m.draw + m.away - 100.0).abs() <= 0.2);
    assert!(m.home > m.away);
    assert_eq!(markets.expected_goals_total, 2.65);
}

#[test]
fn decay_shifts_strength_toward_recent_form() {
    let corpus = MatchCorpus::new(vec![
        rec("FCSB", "UTA Arad", 0, 3, Some("2023-01-10")),
        rec("FCSB", "UTA Arad", 0, 3, Some("2023-02-10")),
        rec("FCSB", "UTA Arad", 3, 0, Some("2025-05-25")),
    ]);
    let flat = DecayConfig {
        rate_per_day: 0.0,
        floor: 0.25,
    };
    let steep = DecayConfig::default();

    let flat_w = match_weights(&corpus, &flat, now());
    let steep_w = match_weights(&corpus, &steep, now());
    let flat_avg = league_averages(&corpus, &flat_w).unwrap();
    let steep_avg = league_averages(&corpus, &steep_w).unwrap();

    let flat_s = team_strength(&corpus, &flat_w, "FCSB", &flat_avg);
    let steep_s = team_strength(&corpus, &steep_w, "FCSB", &steep_avg);
    assert!(steep_s.attack > flat_s.attack);
    assert!(steep_s.defense < flat_s.defense);
}

#[test]
fn unknown_teams_get_league_average_expectations() {
    let corpus = MatchCorpus::new(vec![
        rec("A", "B", 2, 1, None),
        rec("B", "A", 1, 0, None),
    ]);
    let cfg = PredictConfig::default();
    let p = predict("X", "Y", &corpus, &cfg, now()).unwrap();
    // Neutral strengths reproduce the league side averages: 1.5 + 0.5.
    assert_eq!(p.expected_goals_total, 2.0);
}

#[test]
fn empty_corpus_reports_insufficient_data() {
    let err = predict("A", "B", &MatchCorpus::default(), &PredictConfig::default(), now())
        .unwrap_err();
    assert!(matches!(err, PredictError::InsufficientData(_)));
    assert!(err.to_string().starts_with("insufficient data"));
}

#[test]
fn synthetic_corpus_predicts_every_pairing() {
    let corpus = fake_corpus::generate(11, now()).unwrap();
    let cfg = PredictConfig::default();
    let p = predict("FCSB", "CFR Cluj", &corpus, &cfg, now()).unwrap();
    let sum = p.market_1x2.home + p.market_1x2.draw + p.market_1x2.away;
    assert!((sum - 100.0).abs() <= 2.0);
    assert!(p.expected_goals_total > 0.0);
}
