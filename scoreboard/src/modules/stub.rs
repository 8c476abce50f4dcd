use async_trait::async_trait;
use axum::http::StatusCode;
use scoreboard_libs::domjudge::{ContestApi, FetchError};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use url::Url;

pub const STUB_BASE_URL: &str = "http://judge.example.com/api/v4";

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Timeout,
}

/// In-memory contest API answering every endpoint with a canned reply.
#[derive(Debug, Clone)]
pub struct StubApi {
    pub base_url: Url,
    pub contests: Reply,
    pub problems: Reply,
    pub teams: Reply,
    pub organizations: Reply,
    pub scoreboard: Reply,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl StubApi {
    /// Every endpoint times out.
    pub fn unreachable() -> Self {
        Self {
            base_url: Url::parse(STUB_BASE_URL).unwrap(),
            contests: Reply::Timeout,
            problems: Reply::Timeout,
            teams: Reply::Timeout,
            organizations: Reply::Timeout,
            scoreboard: Reply::Timeout,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A small but complete contest with three teams from two organizations.
    pub fn populated() -> Self {
        Self {
            contests: Reply::Json(json!([
                {"id": "2", "name": "Test Cup", "start_time": "2024-03-01T09:00:00+07:00", "penalty_time": 20},
                {"id": "3", "name": "Other Cup"}
            ])),
            problems: Reply::Json(json!([
                {"id": "5", "label": "A", "name": "P1", "ordinal": 0},
                {"id": "6", "label": "B", "name": "P2", "rgb": "#ff0000", "ordinal": 1}
            ])),
            teams: Reply::Json(json!([
                {"id": "10", "name": "bit-wizards", "display_name": "Bit Wizards", "affiliation": "KMITL", "organization_id": "1"},
                {"id": "11", "name": "null-pointers", "organization_id": "2"},
                {"id": "12", "name": "off-by-one"}
            ])),
            organizations: Reply::Json(json!([
                {"id": "1", "name": "KMITL", "logo": [{"href": "contests/2/organizations/1/logo"}]},
                {"id": "2", "name": "CU"}
            ])),
            scoreboard: Reply::Json(json!({
                "event_id": "42",
                "rows": [
                    {"rank": 2, "team_id": "11", "score": {"num_solved": 1, "total_time": 50}, "problems": []},
                    {"rank": 1, "team_id": "10", "score": {"num_solved": 2, "total_time": 80}, "problems": [
                        {"label": "A", "problem_id": "5", "num_judged": 1, "num_pending": 0, "solved": true, "time": 30, "first_to_solve": true}
                    ]},
                    {"rank": 3, "team_id": "12", "score": {"num_solved": 0, "total_time": 0}}
                ]
            })),
            ..Self::unreachable()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn answer(&self, call: String, reply: &Reply) -> Result<Value, FetchError> {
        self.log.lock().unwrap().push(call.clone());
        let url = self.base_url.join(&call).unwrap();

        match reply {
            Reply::Json(value) => Ok(value.clone()),
            Reply::Status(status) => Err(FetchError::Status {
                status: StatusCode::from_u16(*status).unwrap(),
                url,
            }),
            Reply::Timeout => Err(FetchError::Timeout { url }),
        }
    }
}

#[async_trait]
impl ContestApi for StubApi {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn contests(&self) -> Result<Value, FetchError> {
        self.answer(String::from("contests"), &self.contests)
    }

    async fn problems(&self, contest_id: &str) -> Result<Value, FetchError> {
        self.answer(format!("contests/{}/problems", contest_id), &self.problems)
    }

    async fn teams(&self, contest_id: &str) -> Result<Value, FetchError> {
        self.answer(format!("contests/{}/teams", contest_id), &self.teams)
    }

    async fn organizations(&self, contest_id: &str) -> Result<Value, FetchError> {
        self.answer(
            format!("contests/{}/organizations", contest_id),
            &self.organizations,
        )
    }

    async fn scoreboard(&self, contest_id: &str) -> Result<Value, FetchError> {
        self.answer(format!("contests/{}/scoreboard", contest_id), &self.scoreboard)
    }
}
