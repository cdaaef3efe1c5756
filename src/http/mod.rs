use std::collections::BTreeMap;
use std::fmt::Display;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request, State};
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::{ACCEPT, CONTENT_TYPE, HeaderName};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use chrono::NaiveDate;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

pub(crate) use crate::models::parse_date;
use crate::state::AppState;
use crate::voting::VoteError;

mod catalog;
mod directory;
mod votes;

/// Field name to validation messages, mirroring what clients render per input.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(votes::BUILD_VERSION_HEADER),
        ])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_live))
        .route("/health/ready", get(health_ready))
        .merge(catalog::router())
        .merge(votes::router())
        .merge(directory::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_live(State(state): State<AppState>) -> Result<Json<HealthResponse>, HttpError> {
    let response = HealthResponse {
        status: "live",
        uptime_seconds: state.start_time.elapsed().as_secs(),
    };
    Ok(Json(response))
}

async fn health_ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, HttpError> {
    state
        .database
        .ping()
        .await
        .map_err(|err| HttpError::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string()))?;

    let response = ReadyResponse {
        status: "ready",
        today: state.today(),
    };
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    status: &'static str,
    today: NaiveDate,
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    errors: Option<FieldErrors>,
    detail: Option<String>,
}

impl HttpError {
    pub fn new(status: StatusCode, message: String) -> Self {
        assert!(status != StatusCode::OK, "Error status cannot be 200");
        assert!(!message.is_empty(), "Error message cannot be empty");
        Self {
            status,
            message,
            errors: None,
            detail: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn validation(errors: FieldErrors) -> Self {
        assert!(!errors.is_empty(), "Validation error without fields");
        Self {
            errors: Some(errors),
            ..Self::bad_request("Validation failed.")
        }
    }

    /// 500 with a generic message; the underlying error is echoed in `detail`.
    pub fn internal(context: &str, err: impl Display) -> Self {
        Self {
            detail: Some(err.to_string()),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<VoteError> for HttpError {
    fn from(err: VoteError) -> Self {
        match err {
            VoteError::Validation(message)
            | VoteError::NotFound(message)
            | VoteError::InvalidInput(message)
            | VoteError::Conflict(message) => Self::bad_request(message),
            VoteError::Database(db_err) => {
                Self::internal("An error occurred while recording the vote.", db_err)
            }
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<ValidationErrors> for HttpError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(field_errors(&errors))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                "HTTP error: {} ({})",
                self.message,
                self.detail.as_deref().unwrap_or("no detail")
            );
        } else {
            info!("HTTP error: {}", self.message);
        }
        let body = Json(ErrorBody {
            error: self.message,
            errors: self.errors,
            detail: self.detail,
        });
        (self.status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

pub(crate) fn push_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.into());
}

/// Field errors from the request's derived rules; empty when it passes.
pub(crate) fn collect_validation<T: Validate>(request: &T) -> FieldErrors {
    match request.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => field_errors(&errors),
    }
}

pub(crate) fn single_error(field: &str, message: &str) -> HttpError {
    HttpError::validation(FieldErrors::from([(field.to_string(), vec![message.to_string()])]))
}

/// Flattens derive-validator output into `field -> messages`, naming nested
/// struct fields `parent.child`.
pub(crate) fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();
    collect_field_errors(&mut fields, None, errors);
    fields
}

fn collect_field_errors(fields: &mut FieldErrors, prefix: Option<&str>, errors: &ValidationErrors) {
    for (field, kind) in errors.errors() {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let message = match &error.message {
                        Some(message) => message.to_string(),
                        None => format!("Invalid value ({}).", error.code),
                    };
                    push_error(fields, &name, message);
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_field_errors(fields, Some(&name), nested);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(fields, Some(&format!("{name}[{index}]")), nested);
                }
            }
        }
    }
}

/// `Json` whose rejections render as a 400 `HttpError` body.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, setup_database};

    #[tokio::test]
    async fn health_endpoints_report_status() {
        let state = test_client::app_state(setup_database().await, date(2024, 5, 6));

        let (status, body) = test_client::send(&state, "GET", "/health", &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "live");

        let (status, body) = test_client::send(&state, "GET", "/health/ready", &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["today"], "2024-05-06");
    }

    #[test]
    fn vote_errors_map_to_bad_request_or_internal() {
        let conflict: HttpError = VoteError::Conflict("dup".to_string()).into();
        assert_eq!(conflict.status(), StatusCode::BAD_REQUEST);

        let missing: HttpError = VoteError::NotFound("gone".to_string()).into();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let db: HttpError =
            VoteError::Database(sea_orm::DbErr::Custom("boom".to_string())).into();
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(db.detail.as_deref().is_some_and(|detail| detail.contains("boom")));
    }

    #[test]
    fn nested_validation_errors_use_dotted_names() {
        use crate::models::directory::{EmployeeCreateRequest, UserPayload};

        let request = EmployeeCreateRequest {
            employee_id: " ".to_string(),
            user: Some(UserPayload {
                username: "jdoe".to_string(),
                email: "not-an-email".to_string(),
            }),
            job_title: "Analyst".to_string(),
            department: "Finance".to_string(),
            date_of_joining: Some("2023-09-01".to_string()),
        };
        let errors = request.validate().unwrap_err();
        let fields = field_errors(&errors);
        assert_eq!(fields["employee_id"], vec!["This field may not be blank."]);
        assert_eq!(fields["user.email"], vec!["Enter a valid email address."]);
        assert_eq!(fields.len(), 2);

        let http: HttpError = errors.into();
        assert_eq!(http.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_bodies_are_bad_requests() {
        let state = test_client::app_state(setup_database().await, date(2024, 5, 6));

        let body = serde_json::json!({"name": 5, "address": "x"});
        let (status, json) =
            test_client::send(&state, "POST", "/restaurants", &[], Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));

        let (status, json) =
            test_client::send_raw(&state, "POST", "/employees", None, "{\"employee_id\"").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());

        let (status, _) =
            test_client::send_raw(&state, "POST", "/menus", Some("text/plain"), "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
