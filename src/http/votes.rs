use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::models::voting::{
    DailyResultView, MessageResponse, RankedChoiceVoteRequest, SingleChoiceVoteRequest,
    StandingView, StandingsResponse, StatusBody,
};
use crate::state::AppState;
use crate::voting::{
    self, Ballot, EMPLOYEE_NOT_VALID, MENU_NOT_FOUND, RankedChoiceBallot, Receipt,
    SingleChoiceBallot, ensure_distinct_choices,
};

use super::{ApiJson, HttpError, parse_date};

/// Request header selecting the voting protocol.
pub const BUILD_VERSION_HEADER: &str = "build-version";
const SINGLE_CHOICE_VERSION: &str = "old";
const RANKED_CHOICE_VERSION: &str = "new";

const VOTE_RECORDED: &str = "Vote recorded successfully";
const VOTES_CREATED: &str = "Votes created successfully";
const NO_VOTES_TODAY: &str = "No votes found for today.";
const TALLY_FAILED: &str = "An error occurred while retrieving vote results.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/votes", post(submit_vote))
        .route("/votes/today", get(get_today_result))
        .route("/votes/results", get(get_standings))
}

async fn submit_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<Value>,
) -> Result<Response, HttpError> {
    let today = state.today();
    let ballot = resolve_ballot(&headers, payload, today)?;

    let receipt = voting::cast(&state.database, &ballot, today).await?;

    let (status, message) = match &receipt {
        Receipt::Recorded(vote) => {
            info!(
                "Vote recorded: employee {} for menu {} on {}",
                vote.employee_id, vote.menu_id, vote.voted_date
            );
            (StatusCode::OK, VOTE_RECORDED)
        }
        Receipt::Created(votes) => {
            let menus = votes.iter().map(|vote| vote.menu_id).collect::<Vec<_>>();
            let day = receipt.voted_date().unwrap_or(today);
            info!("Ranked ballot recorded for menus {:?} on {day}", menus);
            (StatusCode::CREATED, VOTES_CREATED)
        }
    };
    let response = (status, Json(MessageResponse { message })).into_response();

    Ok(response)
}

/// Picks the protocol from the `Build-Version` header and parses the body
/// into the matching ballot.
fn resolve_ballot(
    headers: &HeaderMap,
    payload: Value,
    today: NaiveDate,
) -> Result<Ballot, HttpError> {
    let version = headers
        .get(BUILD_VERSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim);

    match version {
        Some(SINGLE_CHOICE_VERSION) => {
            let request: SingleChoiceVoteRequest = serde_json::from_value(payload)
                .map_err(|err| HttpError::bad_request(format!("Invalid vote payload: {err}")))?;
            single_choice_ballot(request).map(Ballot::SingleChoice)
        }
        Some(RANKED_CHOICE_VERSION) => {
            let request: RankedChoiceVoteRequest = serde_json::from_value(payload)
                .map_err(|err| HttpError::bad_request(format!("Invalid vote payload: {err}")))?;
            ranked_choice_ballot(request, today).map(Ballot::RankedChoice)
        }
        _ => Err(HttpError::bad_request("Invalid API version")),
    }
}

fn single_choice_ballot(request: SingleChoiceVoteRequest) -> Result<SingleChoiceBallot, HttpError> {
    let menu_id = request
        .menu_id
        .ok_or_else(|| HttpError::bad_request(MENU_NOT_FOUND))?;
    Ok(SingleChoiceBallot {
        menu_id,
        employee_id: request.employee_id,
    })
}

fn ranked_choice_ballot(
    request: RankedChoiceVoteRequest,
    today: NaiveDate,
) -> Result<RankedChoiceBallot, HttpError> {
    let mut choices = [0; 3];
    let fields = [
        ("menu_1", request.menu_1),
        ("menu_2", request.menu_2),
        ("menu_3", request.menu_3),
    ];
    for (slot, (field, value)) in choices.iter_mut().zip(fields) {
        *slot = value.ok_or_else(|| HttpError::bad_request(format!("{field} is required")))?;
    }

    let voted_date = match request.voted_date.as_deref() {
        Some(raw) => parse_date(raw).ok_or_else(|| {
            HttpError::bad_request("voted_date must be formatted as YYYY-MM-DD")
        })?,
        None => today,
    };

    ensure_distinct_choices(&choices)?;
    let employee_id = request
        .employee_id
        .ok_or_else(|| HttpError::bad_request(EMPLOYEE_NOT_VALID))?;

    Ok(RankedChoiceBallot {
        employee_id,
        voted_date,
        choices,
    })
}

async fn get_today_result(State(state): State<AppState>) -> Result<Response, HttpError> {
    let today = state.today();

    let winner = voting::daily_winner(&state.database, today)
        .await
        .map_err(|err| HttpError::internal(TALLY_FAILED, err))?;

    let response = match winner {
        Some(winner) => {
            let view = DailyResultView {
                menu: winner.menu.into(),
                total_votes: winner.total_points,
            };
            (StatusCode::OK, Json(view)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(StatusBody {
                msg: NO_VOTES_TODAY.to_string(),
                success: false,
            }),
        )
            .into_response(),
    };
    Ok(response)
}

#[derive(Debug, Deserialize, Default)]
struct StandingsQuery {
    date: Option<String>,
}

async fn get_standings(
    Query(query): Query<StandingsQuery>,
    State(state): State<AppState>,
) -> Result<Json<StandingsResponse>, HttpError> {
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)
            .ok_or_else(|| HttpError::bad_request("date must be formatted as YYYY-MM-DD"))?,
        None => state.today(),
    };

    let standings = voting::daily_standings(&state.database, date)
        .await
        .map_err(|err| HttpError::internal(TALLY_FAILED, err))?
        .into_iter()
        .map(|standing| StandingView {
            menu_id: standing.menu_id,
            total_votes: standing.total_points,
        })
        .collect();

    Ok(Json(StandingsResponse { date, standings }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::test_client::{app_state, send};
    use crate::test_support::{date, seed_employee, seed_menu, seed_restaurant, setup_database};

    const OLD: &[(&str, &str)] = &[("Build-Version", "old")];
    const NEW: &[(&str, &str)] = &[("Build-Version", "new")];

    async fn seeded() -> (AppState, i32, Vec<i32>) {
        let today = date(2024, 5, 6);
        let db = setup_database().await;
        let employee = seed_employee(&db, "EMP-100").await.id;
        let mut menus = Vec::new();
        for name in ["Green Bowl", "Burger Barn", "Sushi Go"] {
            let restaurant = seed_restaurant(&db, name).await;
            menus.push(seed_menu(&db, restaurant.id, today).await.id);
        }
        (app_state(db, today), employee, menus)
    }

    #[tokio::test]
    async fn rejects_missing_or_unknown_version() {
        let (state, employee, menus) = seeded().await;
        let body = json!({"menu_id": menus[0], "employee_id": employee});

        let (status, json) = send(&state, "POST", "/votes", &[], Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid API version");

        let headers = &[("Build-Version", "v3")];
        let (status, _) = send(&state, "POST", "/votes", headers, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn single_choice_vote_then_duplicate() {
        let (state, employee, menus) = seeded().await;
        let body = json!({"menu_id": menus[0], "employee_id": employee});

        let (status, json) = send(&state, "POST", "/votes", OLD, Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], VOTE_RECORDED);

        let (status, json) = send(&state, "POST", "/votes", OLD, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "You have already voted for this menu today");
    }

    #[tokio::test]
    async fn single_choice_reports_missing_menu_and_employee() {
        let (state, employee, menus) = seeded().await;

        let body = json!({"menu_id": 999, "employee_id": employee});
        let (status, json) = send(&state, "POST", "/votes", OLD, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], MENU_NOT_FOUND);

        let body = json!({"menu_id": menus[0], "employee_id": 999});
        let (status, json) = send(&state, "POST", "/votes", OLD, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], EMPLOYEE_NOT_VALID);

        let body = json!({"menu_id": menus[0]});
        let (_, json) = send(&state, "POST", "/votes", OLD, Some(body)).await;
        assert_eq!(json["error"], EMPLOYEE_NOT_VALID);

        let body = json!({"menu_id": 999});
        let (status, json) = send(&state, "POST", "/votes", OLD, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], MENU_NOT_FOUND);
    }

    #[tokio::test]
    async fn ranked_ballot_created_once_per_day() {
        let (state, employee, menus) = seeded().await;
        let body = json!({
            "employee_id": employee,
            "voted_date": "2024-05-06",
            "menu_1": menus[0],
            "menu_2": menus[1],
            "menu_3": menus[2],
        });

        let (status, json) = send(&state, "POST", "/votes", NEW, Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["message"], VOTES_CREATED);

        let (status, json) = send(&state, "POST", "/votes", NEW, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "You have already voted today");
    }

    #[tokio::test]
    async fn ranked_ballot_validates_choices() {
        let (state, employee, menus) = seeded().await;

        let repeated = json!({
            "employee_id": employee,
            "menu_1": menus[0],
            "menu_2": menus[0],
            "menu_3": menus[2],
        });
        let (status, json) = send(&state, "POST", "/votes", NEW, Some(repeated)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], voting::CHOICES_NOT_DISTINCT);

        let incomplete = json!({"employee_id": employee, "menu_1": menus[0], "menu_2": menus[1]});
        let (status, json) = send(&state, "POST", "/votes", NEW, Some(incomplete)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "menu_3 is required");

        let bad_date = json!({
            "employee_id": employee,
            "voted_date": "06/05/2024",
            "menu_1": menus[0],
            "menu_2": menus[1],
            "menu_3": menus[2],
        });
        let (status, _) = send(&state, "POST", "/votes", NEW, Some(bad_date)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn today_result_is_not_found_without_votes() {
        let (state, _, _) = seeded().await;

        let (status, json) = send(&state, "GET", "/votes/today", &[], None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({"msg": NO_VOTES_TODAY, "success": false}));
    }

    #[tokio::test]
    async fn today_result_reflects_votes_cast_after_an_empty_read() {
        let (state, employee, menus) = seeded().await;

        let (status, _) = send(&state, "GET", "/votes/today", &[], None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let ballot = json!({
            "employee_id": employee,
            "menu_1": menus[1],
            "menu_2": menus[2],
            "menu_3": menus[0],
        });
        let (status, _) = send(&state, "POST", "/votes", NEW, Some(ballot)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, json) = send(&state, "GET", "/votes/today", &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["menu"]["id"], menus[1]);
        assert_eq!(json["total_votes"], 3);

        let (_, again) = send(&state, "GET", "/votes/today", &[], None).await;
        assert_eq!(json, again);
    }

    #[tokio::test]
    async fn today_result_is_shared_across_app_instances() {
        let (first, employee, menus) = seeded().await;
        let second = app_state(first.database.clone(), first.today());

        let (status, _) = send(&second, "GET", "/votes/today", &[], None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let ballot = json!({
            "employee_id": employee,
            "menu_1": menus[2],
            "menu_2": menus[0],
            "menu_3": menus[1],
        });
        let (status, _) = send(&first, "POST", "/votes", NEW, Some(ballot)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, json) = send(&second, "GET", "/votes/today", &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["menu"]["id"], menus[2]);
        assert_eq!(json["total_votes"], 3);
    }

    #[tokio::test]
    async fn vote_without_json_content_type_is_bad_request() {
        let (state, employee, menus) = seeded().await;
        let body = json!({"menu_id": menus[0], "employee_id": employee}).to_string();

        let (status, json) = crate::http::test_client::send_raw(
            &state,
            "POST",
            "/votes",
            Some("text/plain"),
            &body,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn standings_list_every_menu_for_a_date() {
        let (state, employee, menus) = seeded().await;
        let ballot = json!({
            "employee_id": employee,
            "menu_1": menus[2],
            "menu_2": menus[0],
            "menu_3": menus[1],
        });
        send(&state, "POST", "/votes", NEW, Some(ballot)).await;

        let (status, json) = send(&state, "GET", "/votes/results?date=2024-05-06", &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["date"], "2024-05-06");
        let totals = json["standings"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| (row["menu_id"].as_i64().unwrap(), row["total_votes"].as_i64().unwrap()))
            .collect::<Vec<_>>();
        assert_eq!(
            totals,
            vec![
                (i64::from(menus[2]), 3),
                (i64::from(menus[0]), 2),
                (i64::from(menus[1]), 1),
            ]
        );

        let (status, _) = send(&state, "GET", "/votes/results?date=yesterday", &[], None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
