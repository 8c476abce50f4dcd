//! Conversion of partial contest API payloads into the views served to the front-end.
//!
//! Nothing in here fails. Every missing or malformed value degrades to the default named by
//! the constants below, and one broken row never affects its neighbours.
use crate::{
    api::{ContestView, ProblemAttempt, ProblemView, TeamRow},
    domjudge::model::{
        RawContest, RawOrganization, RawProblem, RawProblemScore, RawScoreboard,
        RawScoreboardRow, RawTeam,
    },
};
use std::collections::HashMap;

pub const DEFAULT_PENALTY_TIME: i64 = 20;
pub const DEFAULT_PROBLEM_COLOR: &str = "#3498db";
pub const UNKNOWN_AFFILIATION: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamEntry {
    pub name: String,
    pub display_name: String,
    pub affiliation: Option<String>,
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgEntry {
    /// `href` of the first logo listed for the organization.
    pub logo_href: Option<String>,
}

pub type TeamDirectory = HashMap<String, TeamEntry>;
pub type OrgDirectory = HashMap<String, OrgEntry>;

// Upstream sends empty strings as often as it omits fields; both mean "absent".
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .filter(|value| !value.trim().is_empty())
        .cloned()
}

/// Join a relative reference from a payload onto the API base url with exactly one `/`.
/// Absolute references are returned unchanged.
pub fn resolve_href(api_base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return String::from(href);
    }

    format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        href.trim_start_matches('/')
    )
}

pub fn normalize_contest(raw: &RawContest) -> ContestView {
    let id = raw.id.clone().unwrap_or_default();
    let name = non_empty(&raw.name)
        .or_else(|| non_empty(&raw.formal_name))
        .unwrap_or_else(|| format!("Contest {}", id));

    ContestView {
        id,
        name,
        start_time: raw.start_time.clone(),
        end_time: raw.end_time.clone(),
        freeze_time: raw.freeze_time.clone(),
        unfreeze_time: raw.unfreeze_time.clone(),
        penalty_time: raw.penalty_time.unwrap_or(DEFAULT_PENALTY_TIME),
    }
}

pub fn normalize_problem(raw: &RawProblem) -> ProblemView {
    let label = raw.label.clone().unwrap_or_default();
    let name = non_empty(&raw.name).unwrap_or_else(|| label.clone());
    let color = non_empty(&raw.color)
        .or_else(|| non_empty(&raw.rgb))
        .unwrap_or_else(|| String::from(DEFAULT_PROBLEM_COLOR));

    ProblemView {
        id: raw.id.clone().unwrap_or_default(),
        label,
        name,
        color,
        ordinal: raw.ordinal.unwrap_or(0),
    }
}

/// Map problems one to one, keeping the upstream order and ordinals.
pub fn normalize_problems(raw: &[RawProblem]) -> Vec<ProblemView> {
    raw.iter().map(normalize_problem).collect()
}

/// Build the per-request lookup tables keyed by organization id and team id.
///
/// Entries without an id can not be looked up and are dropped. When an id appears twice the
/// first entry is kept.
pub fn build_directories(
    raw_orgs: &[RawOrganization],
    raw_teams: &[RawTeam],
) -> (OrgDirectory, TeamDirectory) {
    let mut orgs = OrgDirectory::with_capacity(raw_orgs.len());
    for org in raw_orgs.iter() {
        let Some(id) = non_empty(&org.id) else {
            tracing::debug!("skip organization without id: {:?}", org);
            continue;
        };
        let entry = OrgEntry {
            logo_href: org.logo.first().and_then(|logo| non_empty(&logo.href)),
        };
        orgs.entry(id).or_insert(entry);
    }

    let mut teams = TeamDirectory::with_capacity(raw_teams.len());
    for team in raw_teams.iter() {
        let Some(id) = non_empty(&team.id) else {
            tracing::debug!("skip team without id: {:?}", team);
            continue;
        };
        let name = non_empty(&team.name).unwrap_or_else(|| format!("Team {}", id));
        let display_name = non_empty(&team.display_name).unwrap_or_else(|| name.clone());
        let entry = TeamEntry {
            name,
            display_name,
            affiliation: non_empty(&team.affiliation),
            organization_id: non_empty(&team.organization_id),
        };
        teams.entry(id).or_insert(entry);
    }

    (orgs, teams)
}

fn normalize_problem_score(raw: &RawProblemScore) -> ProblemAttempt {
    let num_judged = raw.num_judged.unwrap_or(0);

    ProblemAttempt {
        label: raw.label.clone().unwrap_or_default(),
        problem_id: raw.problem_id.clone().unwrap_or_default(),
        solved: raw.solved.unwrap_or(false),
        num_judged,
        num_pending: raw.num_pending.unwrap_or(0),
        time: raw.time.unwrap_or(0),
        first_to_solve: raw.first_to_solve.unwrap_or(false),
        attempts: num_judged,
    }
}

/// Convert one scoreboard row.
///
/// Team fields are resolved through the team directory first, then through the fields
/// embedded in the row, and are synthesized last. A row without rank gets rank 0; use
/// [`normalize_scoreboard`] to rank such rows by position.
pub fn normalize_scoreboard_row(
    raw: &RawScoreboardRow,
    teams: &TeamDirectory,
    orgs: &OrgDirectory,
    api_base: &str,
) -> TeamRow {
    let team_id = raw.team_id.clone().unwrap_or_default();
    let entry = teams.get(&team_id);

    let organization_id = entry
        .and_then(|entry| entry.organization_id.clone())
        .or_else(|| non_empty(&raw.organization_id));
    let org = organization_id.as_ref().and_then(|id| orgs.get(id));

    let name = entry
        .map(|entry| entry.name.clone())
        .or_else(|| non_empty(&raw.name))
        .or_else(|| non_empty(&raw.display_name))
        .unwrap_or_else(|| format!("Team {}", team_id));
    let display_name = entry
        .map(|entry| entry.display_name.clone())
        .or_else(|| non_empty(&raw.display_name))
        .or_else(|| non_empty(&raw.name))
        .unwrap_or_else(|| format!("Team {}", team_id));
    let affiliation = entry
        .and_then(|entry| entry.affiliation.clone())
        .or_else(|| non_empty(&raw.affiliation))
        .unwrap_or_else(|| String::from(UNKNOWN_AFFILIATION));

    let logo_url = org
        .and_then(|org| org.logo_href.as_ref())
        .map(|href| resolve_href(api_base, href));

    let solved = raw
        .score
        .as_ref()
        .and_then(|score| score.num_solved)
        .unwrap_or(0);
    let total_time = raw
        .score
        .as_ref()
        .and_then(|score| score.total_time)
        .unwrap_or(0);

    TeamRow {
        rank: raw.rank.unwrap_or(0),
        team_id,
        name,
        display_name,
        affiliation: Some(affiliation),
        organization_id,
        logo_url,
        score: solved,
        solved,
        total_time,
        problems: raw.problems.iter().map(normalize_problem_score).collect(),
    }
}

/// Convert every row of a scoreboard and order them by rank.
///
/// Rows without a rank are ranked by their 1-based position in the payload. The sort is
/// stable, so rows sharing a rank keep their upstream order.
pub fn normalize_scoreboard(
    raw: &RawScoreboard,
    teams: &TeamDirectory,
    orgs: &OrgDirectory,
    api_base: &str,
) -> Vec<TeamRow> {
    let mut rows: Vec<TeamRow> = raw
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut team = normalize_scoreboard_row(row, teams, orgs, api_base);
            if row.rank.is_none() {
                team.rank = index as i64 + 1;
            }
            team
        })
        .collect();

    rows.sort_by_key(|row| row.rank);
    rows
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::domjudge::model::{parse_list, parse_scoreboard};
    use serde_json::json;

    const API_BASE: &str = "http://judge.example.com/api/v4";

    fn directories() -> (OrgDirectory, TeamDirectory) {
        let orgs: Vec<RawOrganization> = parse_list(json!([
            {
                "id": "1",
                "name": "KMITL",
                "formal_name": "King Mongkut's Institute of Technology Ladkrabang",
                "logo": [
                    {"href": "contests/2/organizations/1/logo", "mime": "image/png"},
                    {"href": "contests/2/organizations/1/logo-large", "mime": "image/png"}
                ]
            },
            {"id": "2", "name": "No Logo U", "logo": []}
        ]))
        .unwrap();
        let teams: Vec<RawTeam> = parse_list(json!([
            {"id": "10", "name": "bit-wizards", "display_name": "Bit Wizards", "organization_id": "1"},
            {"id": "11", "name": "null-pointers", "organization_id": "2", "affiliation": "CS Club"},
            {"id": "12"}
        ]))
        .unwrap();

        build_directories(&orgs, &teams)
    }

    #[test]
    fn contest_name_prefers_name() {
        let raw: RawContest = serde_json::from_value(json!({
            "id": "2",
            "name": "Test Cup",
            "formal_name": "The Test Cup 2024",
            "start_time": "2024-03-01T09:00:00+07:00",
            "freeze_time": null,
            "penalty_time": 30
        }))
        .unwrap();

        let contest = normalize_contest(&raw);

        assert_eq!(
            contest,
            ContestView {
                id: String::from("2"),
                name: String::from("Test Cup"),
                start_time: Some(String::from("2024-03-01T09:00:00+07:00")),
                end_time: None,
                freeze_time: None,
                unfreeze_time: None,
                penalty_time: 30,
            }
        );
    }

    #[test]
    fn contest_name_falls_back() {
        let raw: RawContest =
            serde_json::from_value(json!({"id": "3", "formal_name": "Formal"})).unwrap();
        assert_eq!(normalize_contest(&raw).name, "Formal");

        let raw: RawContest = serde_json::from_value(json!({"id": "3", "name": ""})).unwrap();
        let contest = normalize_contest(&raw);
        assert_eq!(contest.name, "Contest 3");
        assert_eq!(contest.penalty_time, DEFAULT_PENALTY_TIME);
    }

    #[test]
    fn problem_without_color_gets_default() {
        let raw: Vec<RawProblem> =
            parse_list(json!([{"id": "5", "label": "A", "name": "P1", "ordinal": 0}])).unwrap();

        assert_eq!(
            normalize_problems(&raw),
            vec![ProblemView {
                id: String::from("5"),
                label: String::from("A"),
                name: String::from("P1"),
                color: String::from("#3498db"),
                ordinal: 0,
            }]
        );
    }

    #[test]
    fn problem_color_prefers_color_over_rgb() {
        let raw: Vec<RawProblem> = parse_list(json!([
            {"id": "1", "label": "A", "name": "P1", "color": "red", "rgb": "#ff0000", "ordinal": 3},
            {"id": "2", "label": "B", "name": "P2", "rgb": "#00ff00", "ordinal": 1},
            {"id": "3", "label": "C", "ordinal": 2}
        ]))
        .unwrap();

        let problems = normalize_problems(&raw);

        assert_eq!(problems[0].color, "red");
        assert_eq!(problems[1].color, "#00ff00");
        assert_eq!(problems[2].color, DEFAULT_PROBLEM_COLOR);
        assert_eq!(problems[2].name, "C");
        // upstream order and ordinals are kept as is
        let ordinals: Vec<i64> = problems.iter().map(|p| p.ordinal).collect();
        assert_eq!(ordinals, vec![3, 1, 2]);
    }

    #[test]
    fn directories_take_first_logo_and_default_names() {
        let (orgs, teams) = directories();

        assert_eq!(
            orgs["1"].logo_href,
            Some(String::from("contests/2/organizations/1/logo"))
        );
        assert_eq!(orgs["2"].logo_href, None);

        assert_eq!(teams["10"].display_name, "Bit Wizards");
        assert_eq!(teams["11"].display_name, "null-pointers");
        assert_eq!(teams["12"].name, "Team 12");
        assert_eq!(teams["12"].display_name, "Team 12");
    }

    #[test]
    fn directories_keep_first_duplicate() {
        let teams: Vec<RawTeam> = parse_list(json!([
            {"id": "1", "name": "first"},
            {"id": "1", "name": "second"},
            {"name": "no id"}
        ]))
        .unwrap();

        let (_, teams) = build_directories(&[], &teams);

        assert_eq!(teams.len(), 1);
        assert_eq!(teams["1"].name, "first");
    }

    #[test]
    fn fully_populated_row_is_reflected() {
        let (orgs, teams) = directories();
        let row: RawScoreboardRow = serde_json::from_value(json!({
            "rank": 1,
            "team_id": "10",
            "score": {"num_solved": 4, "total_time": 321},
            "problems": [
                {"label": "A", "problem_id": "5", "num_judged": 2, "num_pending": 0, "solved": true, "time": 40, "first_to_solve": true},
                {"label": "B", "problem_id": "6", "num_judged": 3, "num_pending": 1, "solved": false}
            ]
        }))
        .unwrap();

        let team = normalize_scoreboard_row(&row, &teams, &orgs, API_BASE);

        assert_eq!(
            team,
            TeamRow {
                rank: 1,
                team_id: String::from("10"),
                name: String::from("bit-wizards"),
                display_name: String::from("Bit Wizards"),
                affiliation: Some(String::from(UNKNOWN_AFFILIATION)),
                organization_id: Some(String::from("1")),
                logo_url: Some(String::from(
                    "http://judge.example.com/api/v4/contests/2/organizations/1/logo"
                )),
                score: 4,
                solved: 4,
                total_time: 321,
                problems: vec![
                    ProblemAttempt {
                        label: String::from("A"),
                        problem_id: String::from("5"),
                        solved: true,
                        num_judged: 2,
                        num_pending: 0,
                        time: 40,
                        first_to_solve: true,
                        attempts: 2,
                    },
                    ProblemAttempt {
                        label: String::from("B"),
                        problem_id: String::from("6"),
                        solved: false,
                        num_judged: 3,
                        num_pending: 1,
                        time: 0,
                        first_to_solve: false,
                        attempts: 3,
                    },
                ],
            }
        );
    }

    #[test]
    fn affiliation_comes_from_team_directory() {
        let (orgs, teams) = directories();
        let row: RawScoreboardRow =
            serde_json::from_value(json!({"rank": 2, "team_id": "11"})).unwrap();

        let team = normalize_scoreboard_row(&row, &teams, &orgs, API_BASE);

        assert_eq!(team.affiliation, Some(String::from("CS Club")));
        assert_eq!(team.organization_id, Some(String::from("2")));
        assert_eq!(team.logo_url, None);
    }

    #[test]
    fn organization_name_is_not_an_affiliation() {
        let (orgs, teams) = directories();
        let row: RawScoreboardRow =
            serde_json::from_value(json!({"rank": 1, "team_id": "10"})).unwrap();

        let team = normalize_scoreboard_row(&row, &teams, &orgs, API_BASE);

        assert_eq!(team.organization_id, Some(String::from("1")));
        assert_eq!(team.affiliation, Some(String::from(UNKNOWN_AFFILIATION)));
    }

    #[test]
    fn embedded_affiliation_backs_up_directory_entry() {
        let (orgs, teams) = directories();
        let row: RawScoreboardRow = serde_json::from_value(json!({
            "rank": 1,
            "team_id": "10",
            "affiliation": "Row University"
        }))
        .unwrap();

        let team = normalize_scoreboard_row(&row, &teams, &orgs, API_BASE);

        assert_eq!(team.affiliation, Some(String::from("Row University")));
    }

    #[test]
    fn unknown_team_without_embedded_fields() {
        let (orgs, teams) = directories();
        let row: RawScoreboardRow =
            serde_json::from_value(json!({"rank": 7, "team_id": "999"})).unwrap();

        let team = normalize_scoreboard_row(&row, &teams, &orgs, API_BASE);

        assert_eq!(team.display_name, "Team 999");
        assert_eq!(team.name, "Team 999");
        assert_eq!(team.affiliation, Some(String::from("Unknown")));
        assert_eq!(team.logo_url, None);
        assert_eq!(team.organization_id, None);
        assert_eq!(team.solved, 0);
        assert_eq!(team.total_time, 0);
        assert!(team.problems.is_empty());
    }

    #[test]
    fn unknown_team_uses_embedded_fields() {
        let (orgs, teams) = directories();
        let row: RawScoreboardRow = serde_json::from_value(json!({
            "rank": 3,
            "team_id": "404",
            "display_name": "Embedded Name",
            "affiliation": "Embedded University",
            "organization_id": "1"
        }))
        .unwrap();

        let team = normalize_scoreboard_row(&row, &teams, &orgs, API_BASE);

        assert_eq!(team.display_name, "Embedded Name");
        assert_eq!(team.name, "Embedded Name");
        assert_eq!(team.organization_id, Some(String::from("1")));
        assert_eq!(team.affiliation, Some(String::from("Embedded University")));
        assert!(team.logo_url.is_some());
    }

    #[test]
    fn empty_row_never_panics() {
        let row = RawScoreboardRow::default();
        let team = normalize_scoreboard_row(&row, &TeamDirectory::new(), &OrgDirectory::new(), "");

        assert_eq!(team.rank, 0);
        assert_eq!(team.team_id, "");
        assert_eq!(team.display_name, "Team ");
        assert_eq!(team.affiliation, Some(String::from(UNKNOWN_AFFILIATION)));
    }

    #[test]
    fn scoreboard_is_sorted_by_rank_and_stable() {
        let (orgs, teams) = directories();
        let raw = parse_scoreboard(json!({
            "rows": [
                {"rank": 3, "team_id": "12"},
                {"rank": 1, "team_id": "10"},
                {"rank": 2, "team_id": "a"},
                "broken",
                {"rank": 2, "team_id": "b"},
                {"rank": 2, "team_id": "c"}
            ]
        }))
        .unwrap();

        let rows = normalize_scoreboard(&raw, &teams, &orgs, API_BASE);

        let order: Vec<(i64, &str)> = rows
            .iter()
            .map(|row| (row.rank, row.team_id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(1, "10"), (2, "a"), (2, "b"), (2, "c"), (3, "12")]
        );
    }

    #[test]
    fn rows_without_rank_are_ranked_by_position() {
        let raw = parse_scoreboard(json!({
            "rows": [
                {"team_id": "x"},
                {"team_id": "y", "rank": "first"}
            ]
        }))
        .unwrap();

        let rows = normalize_scoreboard(&raw, &TeamDirectory::new(), &OrgDirectory::new(), API_BASE);

        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn href_is_joined_with_single_slash() {
        assert_eq!(
            resolve_href("http://judge.example.com/api/v4/", "/logo.png"),
            "http://judge.example.com/api/v4/logo.png"
        );
        assert_eq!(
            resolve_href("http://judge.example.com/api/v4", "logo.png"),
            "http://judge.example.com/api/v4/logo.png"
        );
        assert_eq!(
            resolve_href("http://judge.example.com/api/v4", "https://cdn.example.com/logo.png"),
            "https://cdn.example.com/logo.png"
        );
    }
}
