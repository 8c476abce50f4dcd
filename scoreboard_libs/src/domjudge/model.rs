//! Partial models of the payloads returned by the contest API.
//!
//! Every field is optional. A field that is missing or carries an unexpected JSON type
//! deserializes to `None` (or an empty list) instead of failing the enclosing object, so the
//! normalizer always receives something it can degrade from.
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnError, DeserializeAs, VecSkipError};

/// Accepts an identifier given either as a JSON string or as a JSON number.
pub struct LenientId;

impl<'de> DeserializeAs<'de, String> for LenientId {
    fn deserialize_as<D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(id),
            Value::Number(id) => Ok(id.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number for id, got {}",
                other
            ))),
        }
    }
}

/// Model of an element of `GET /contests`.
#[serde_as]
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct RawContest {
    #[serde_as(deserialize_as = "DefaultOnError<Option<LenientId>>")]
    #[serde(default)]
    pub id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub formal_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub freeze_time: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub unfreeze_time: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub penalty_time: Option<i64>,
}

/// Model of an element of `GET /contests/{id}/problems`.
#[serde_as]
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct RawProblem {
    #[serde_as(deserialize_as = "DefaultOnError<Option<LenientId>>")]
    #[serde(default)]
    pub id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub label: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub color: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub rgb: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub ordinal: Option<i64>,
}

/// Model of an element of `GET /contests/{id}/teams`.
#[serde_as]
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct RawTeam {
    #[serde_as(deserialize_as = "DefaultOnError<Option<LenientId>>")]
    #[serde(default)]
    pub id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub affiliation: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError<Option<LenientId>>")]
    #[serde(default)]
    pub organization_id: Option<String>,
}

/// Model of a file reference such as an organization logo.
#[serde_as]
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct RawFileRef {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub href: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub mime: Option<String>,
}

/// Model of an element of `GET /contests/{id}/organizations`.
#[serde_as]
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct RawOrganization {
    #[serde_as(deserialize_as = "DefaultOnError<Option<LenientId>>")]
    #[serde(default)]
    pub id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub formal_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    pub logo: Vec<RawFileRef>,
}

/// Model of the `score` object of a scoreboard row.
#[serde_as]
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct RawScore {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub num_solved: Option<i64>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub total_time: Option<i64>,
}

/// Model of an element of the `problems` list of a scoreboard row.
#[serde_as]
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct RawProblemScore {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub label: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError<Option<LenientId>>")]
    #[serde(default)]
    pub problem_id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub solved: Option<bool>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub num_judged: Option<i64>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub num_pending: Option<i64>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub time: Option<i64>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub first_to_solve: Option<bool>,
}

/// Model of a row of `GET /contests/{id}/scoreboard`.
///
/// `name`, `display_name`, `affiliation` and `organization_id` are not part of the standard
/// row, but some deployments embed them and they are used when the team directory misses.
#[serde_as]
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct RawScoreboardRow {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub rank: Option<i64>,
    #[serde_as(deserialize_as = "DefaultOnError<Option<LenientId>>")]
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub score: Option<RawScore>,
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    pub problems: Vec<RawProblemScore>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub affiliation: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError<Option<LenientId>>")]
    #[serde(default)]
    pub organization_id: Option<String>,
}

/// Model of the whole scoreboard payload.
#[serde_as]
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct RawScoreboard {
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    pub rows: Vec<RawScoreboardRow>,
}

/// Parse a JSON array into a list of partial models.
///
/// The payload itself must be an array. Elements that are not objects are skipped with a
/// warning so one broken entry never discards its siblings.
pub fn parse_list<T>(value: Value) -> Result<Vec<T>, serde_json::Error>
where
    T: DeserializeOwned,
{
    let items: Vec<Value> = serde_json::from_value(value)?;
    let parsed = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("skip malformed list element at {}: {}", index, e);
                None
            }
        })
        .collect();

    Ok(parsed)
}

/// Parse a scoreboard payload. Fails only when the payload is not a JSON object.
pub fn parse_scoreboard(value: Value) -> Result<RawScoreboard, serde_json::Error> {
    serde_json::from_value(value)
}
