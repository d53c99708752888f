/// The sixteen clubs of the 2025/26 league season.
const LEAGUE_TEAMS: [&str; 16] = [
    "CFR Cluj",
    "FCSB",
    "Universitatea Craiova",
    "Farul Constanta",
    "Rapid Bucuresti",
    "Sepsi OSK",
    "Otelul Galati",
    "UTA Arad",
    "FC Hermannstadt",
    "Universitatea Cluj",
    "Petrolul 52",
    "Dinamo Bucuresti",
    "Politehnica Iasi",
    "FC Botosani",
    "Unirea Slobozia",
    "Gloria Buzau",
];

pub fn league_teams() -> Vec<&'static str> {
    let mut teams = LEAGUE_TEAMS.to_vec();
    teams.sort_unstable();
    teams
}

pub fn is_league_team(name: &str) -> bool {
    LEAGUE_TEAMS.iter().any(|team| *team == name)
}
