use scoreboard_libs::{
    api::{ContestResponse, ScoreboardResponse, TeamRow},
    domjudge::{
        model::{parse_list, parse_scoreboard, RawContest, RawOrganization, RawProblem, RawTeam},
        ContestApi, FetchError,
    },
    normalize::{build_directories, normalize_contest, normalize_problems, normalize_scoreboard},
    sample::{sample_contest, sample_scoreboard},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Progress of one scoreboard aggregation. Logged when the aggregation falls back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ContestsFetched,
    TeamsAndOrgsFetched,
    ScoreboardFetched,
    Normalized,
    Done,
    Fallback,
}

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("contest API request failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("unexpected payload shape: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("no contests available")]
    NoContestsAvailable,
    #[error("scoreboard has no rows")]
    EmptyScoreboard,
}

type Result<T> = std::result::Result<T, AggregateError>;

/// Builds the contest and scoreboard responses from the contest API.
///
/// Both public operations always succeed: any failure is logged and replaced by sample data.
/// Lookup directories are rebuilt on every call.
pub struct ScoreboardAggregator<A> {
    api: A,
}

impl<A: ContestApi> ScoreboardAggregator<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub async fn scoreboard(&self) -> ScoreboardResponse {
        self.aggregate().await.0
    }

    /// Run one aggregation and report the stage it ended in, `Done` or `Fallback`.
    async fn aggregate(&self) -> (ScoreboardResponse, Stage) {
        let mut stage = Stage::Idle;
        let result = self.try_scoreboard(&mut stage).await;

        match result {
            Ok(teams) => {
                tracing::info!("{} teams aggregated", teams.len());
                (ScoreboardResponse { teams }, stage)
            }
            Err(e) => {
                tracing::warn!(
                    "scoreboard aggregation failed after stage {:?}, using sample data: {}",
                    stage,
                    e
                );
                (sample_scoreboard(), Stage::Fallback)
            }
        }
    }

    pub async fn contest(&self) -> ContestResponse {
        let contest = match self.select_contest().await {
            Ok(contest) => contest,
            Err(e) => {
                tracing::warn!("failed to fetch contest, using sample data: {}", e);
                return sample_contest();
            }
        };

        let problems: Vec<RawProblem> = match contest.id.as_deref() {
            Some(id) => lenient_list("problems", self.api.problems(id).await),
            None => Vec::new(),
        };

        ContestResponse {
            contest: normalize_contest(&contest),
            problems: normalize_problems(&problems),
        }
    }

    /// The first contest of the upstream list.
    async fn select_contest(&self) -> Result<RawContest> {
        let contests: Vec<RawContest> = parse_list(self.api.contests().await?)?;
        tracing::info!("Found {} contests", contests.len());

        contests
            .into_iter()
            .next()
            .ok_or(AggregateError::NoContestsAvailable)
    }

    async fn try_scoreboard(&self, stage: &mut Stage) -> Result<Vec<TeamRow>> {
        let contest_id = self
            .select_contest()
            .await?
            .id
            .filter(|id| !id.is_empty())
            .ok_or(AggregateError::NoContestsAvailable)?;
        *stage = Stage::ContestsFetched;
        tracing::info!("Using contest ID: {}", contest_id);

        let (teams, orgs) = tokio::join!(
            self.api.teams(&contest_id),
            self.api.organizations(&contest_id)
        );
        let teams: Vec<RawTeam> = lenient_list("teams", teams);
        let orgs: Vec<RawOrganization> = lenient_list("organizations", orgs);
        let (orgs, teams) = build_directories(&orgs, &teams);
        *stage = Stage::TeamsAndOrgsFetched;

        let raw = parse_scoreboard(self.api.scoreboard(&contest_id).await?)?;
        *stage = Stage::ScoreboardFetched;

        let rows = normalize_scoreboard(&raw, &teams, &orgs, self.api.base_url().as_str());
        *stage = Stage::Normalized;

        if rows.is_empty() {
            return Err(AggregateError::EmptyScoreboard);
        }
        *stage = Stage::Done;

        Ok(rows)
    }
}

// Directory and problem lists only enrich the response, so losing one is not fatal.
fn lenient_list<T>(kind: &str, payload: std::result::Result<Value, FetchError>) -> Vec<T>
where
    T: DeserializeOwned,
{
    let items = payload
        .map_err(AggregateError::from)
        .and_then(|value| parse_list(value).map_err(AggregateError::from));

    match items {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("failed to fetch {}, continuing without them: {}", kind, e);
            Vec::new()
        }
    }
}
