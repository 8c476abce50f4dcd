//! Placeholder payloads served whenever live data can not be produced.
use crate::api::{ContestResponse, ContestView, ProblemView, ScoreboardResponse, TeamRow};
use chrono::{Duration, SecondsFormat, Utc};
use once_cell::sync::Lazy;

pub const SAMPLE_CONTEST_ID: &str = "2";
pub const SAMPLE_CONTEST_NAME: &str = "KMITL Programming Contest";

static SAMPLE_TEAMS: Lazy<Vec<TeamRow>> = Lazy::new(|| {
    [
        "KMITL Algorithm Masters",
        "KMITL Code Warriors",
        "KMITL Debug Heroes",
        "KMITL Binary Ninjas",
        "KMITL Recursive Rebels",
        "KMITL Data Structures",
        "KMITL Graph Theorists",
    ]
    .iter()
    .enumerate()
    .map(|(index, name)| {
        let rank = index as i64 + 1;
        let solved = 9 - rank;
        TeamRow {
            rank,
            team_id: format!("sample-{}", rank),
            name: String::from(*name),
            display_name: String::from(*name),
            affiliation: Some(String::from("KMITL")),
            organization_id: None,
            logo_url: None,
            score: solved,
            solved,
            total_time: 0,
            problems: Vec::new(),
        }
    })
    .collect()
});

static SAMPLE_PROBLEMS: Lazy<Vec<ProblemView>> = Lazy::new(|| {
    [
        ("15", "A", "#e74c3c"),
        ("14", "B", "#f39c12"),
        ("8", "C", "#f1c40f"),
        ("5", "D", "#2ecc71"),
        ("9", "E", "#3498db"),
        ("11", "F", "#9b59b6"),
        ("13", "G", "#1abc9c"),
        ("10", "H", "#34495e"),
    ]
    .iter()
    .enumerate()
    .map(|(index, (id, label, color))| ProblemView {
        id: String::from(*id),
        label: String::from(*label),
        name: format!("Problem {}", label),
        color: String::from(*color),
        ordinal: index as i64 + 1,
    })
    .collect()
});

pub fn sample_teams() -> Vec<TeamRow> {
    SAMPLE_TEAMS.clone()
}

pub fn sample_scoreboard() -> ScoreboardResponse {
    ScoreboardResponse {
        teams: sample_teams(),
    }
}

/// A five hour contest starting now, with problems A to H.
pub fn sample_contest() -> ContestResponse {
    let now = Utc::now();
    let format = |time: chrono::DateTime<Utc>| time.to_rfc3339_opts(SecondsFormat::Millis, true);

    ContestResponse {
        contest: ContestView {
            id: String::from(SAMPLE_CONTEST_ID),
            name: String::from(SAMPLE_CONTEST_NAME),
            start_time: Some(format(now)),
            end_time: Some(format(now + Duration::hours(5))),
            freeze_time: None,
            unfreeze_time: None,
            penalty_time: 20,
        },
        problems: SAMPLE_PROBLEMS.clone(),
    }
}
