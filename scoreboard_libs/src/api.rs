use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ContestView {
    pub id: String,
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub freeze_time: Option<String>,
    pub unfreeze_time: Option<String>,
    pub penalty_time: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProblemView {
    pub id: String,
    pub label: String,
    pub name: String,
    pub color: String,
    pub ordinal: i64,
}

/// One team's standing in the scoreboard.
///
/// `score` always equals `solved`; both are kept because front-ends read either of them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TeamRow {
    pub rank: i64,
    pub team_id: String,
    pub name: String,
    pub display_name: String,
    pub affiliation: Option<String>,
    pub organization_id: Option<String>,
    pub logo_url: Option<String>,
    pub score: i64,
    pub solved: i64,
    pub total_time: i64,
    pub problems: Vec<ProblemAttempt>,
}

/// Result of one team on one problem. `attempts` mirrors `num_judged`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProblemAttempt {
    pub label: String,
    pub problem_id: String,
    pub solved: bool,
    pub num_judged: i64,
    pub num_pending: i64,
    pub time: i64,
    pub first_to_solve: bool,
    pub attempts: i64,
}

/// Response body of `GET /contest`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ContestResponse {
    pub contest: ContestView,
    pub problems: Vec<ProblemView>,
}

/// Response body of `GET /scoreboard`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScoreboardResponse {
    pub teams: Vec<TeamRow>,
}
