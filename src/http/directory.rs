use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, TransactionTrait,
};
use tracing::{debug, info};
use validator::Validate;

use crate::entities::prelude::{AppUser, Employee};
use crate::entities::{app_user, employee, is_unique_violation};
use crate::models::directory::{
    EmployeeCreateRequest, EmployeeCreatedResponse, EmployeeView, UserPayload,
};
use crate::models::voting::StatusBody;
use crate::state::AppState;

use super::{ApiJson, HttpError, parse_date, single_error};

const FAILURE: &str = "An error occurred during employee creation.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/employees", post(create_employee))
        .route("/employees/{id}", get(get_employee))
}

async fn create_employee(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EmployeeCreateRequest>,
) -> Result<Response, HttpError> {
    let draft = EmployeeDraft::try_from(request)?;

    let existing = Employee::find()
        .filter(employee::Column::EmployeeId.eq(draft.code.as_str()))
        .count(&state.database)
        .await
        .map_err(|err| HttpError::internal(FAILURE, err))?;
    if existing > 0 {
        return Ok(duplicate_code(&draft.code));
    }

    let txn = state
        .database
        .begin()
        .await
        .map_err(|err| HttpError::internal(FAILURE, err))?;

    let user = match find_or_create_user(&txn, &draft.user).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Err(single_error("user", USERNAME_TAKEN));
        }
        Err(err) => return Err(HttpError::internal(FAILURE, err)),
    };

    let inserted = employee::ActiveModel {
        id: NotSet,
        employee_id: Set(draft.code.clone()),
        user_id: Set(user.id),
        job_title: Set(draft.job_title),
        department: Set(draft.department),
        date_of_joining: Set(draft.date_of_joining),
    }
    .insert(&txn)
    .await;

    let created = match inserted {
        Ok(model) => model,
        Err(err) if is_unique_violation(&err) => return Ok(duplicate_code(&draft.code)),
        Err(err) => return Err(HttpError::internal(FAILURE, err)),
    };

    txn.commit()
        .await
        .map_err(|err| HttpError::internal(FAILURE, err))?;

    info!(
        "Employee {} created with code {} for user {}",
        created.id, created.employee_id, user.username
    );
    let body = EmployeeCreatedResponse {
        msg: "Employee successfully created.",
        data: EmployeeView::new(created, user),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

async fn get_employee(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<EmployeeView>, HttpError> {
    let found = Employee::find_by_id(id)
        .find_also_related(AppUser)
        .one(&state.database)
        .await
        .map_err(|err| HttpError::internal("Failed to load employee.", err))?;

    match found {
        Some((employee, Some(user))) => Ok(Json(EmployeeView::new(employee, user))),
        _ => Err(HttpError::new(
            StatusCode::NOT_FOUND,
            format!("Employee {id} not found"),
        )),
    }
}

struct EmployeeDraft {
    code: String,
    user: UserPayload,
    job_title: String,
    department: String,
    date_of_joining: chrono::NaiveDate,
}

impl TryFrom<EmployeeCreateRequest> for EmployeeDraft {
    type Error = HttpError;

    fn try_from(request: EmployeeCreateRequest) -> Result<Self, Self::Error> {
        request.validate()?;

        let date_of_joining = request.date_of_joining.as_deref().and_then(parse_date);
        let (Some(user), Some(date_of_joining)) = (request.user, date_of_joining) else {
            return Err(HttpError::bad_request(
                "Employee requires a user and a date of joining.",
            ));
        };

        Ok(Self {
            code: request.employee_id.trim().to_string(),
            user: UserPayload {
                username: user.username.trim().to_string(),
                email: user.email,
            },
            job_title: request.job_title.trim().to_string(),
            department: request.department.trim().to_string(),
            date_of_joining,
        })
    }
}

/// Returns `None` when the username is already bound to a different email.
async fn find_or_create_user(
    txn: &DatabaseTransaction,
    payload: &UserPayload,
) -> Result<Option<app_user::Model>, DbErr> {
    let existing = AppUser::find()
        .filter(app_user::Column::Username.eq(payload.username.as_str()))
        .one(txn)
        .await?;

    if let Some(user) = existing {
        if user.email.eq_ignore_ascii_case(&payload.email) {
            debug!("Reusing user {} for new employee", user.id);
            return Ok(Some(user));
        }
        return Ok(None);
    }

    let user = app_user::ActiveModel {
        id: NotSet,
        username: Set(payload.username.clone()),
        email: Set(payload.email.clone()),
    }
    .insert(txn)
    .await?;
    debug!("Created user {} ({})", user.id, user.username);
    Ok(Some(user))
}

fn duplicate_code(code: &str) -> Response {
    let body = StatusBody {
        msg: format!("Employee with ID {code} already exists"),
        success: false,
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}
