use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::catalog::MenuView;

/// Body of a `Build-Version: old` vote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SingleChoiceVoteRequest {
    pub menu_id: Option<i32>,
    pub employee_id: Option<i32>,
}

/// Body of a `Build-Version: new` vote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RankedChoiceVoteRequest {
    pub employee_id: Option<i32>,
    pub voted_date: Option<String>, // defaults to today
    pub menu_1: Option<i32>,
    pub menu_2: Option<i32>,
    pub menu_3: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyResultView {
    pub menu: MenuView,
    pub total_votes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingView {
    pub menu_id: i32,
    pub total_votes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingsResponse {
    pub date: NaiveDate,
    pub standings: Vec<StandingView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBody {
    pub msg: String,
    pub success: bool,
}
