use crate::backend::ShiftBackend;
use crate::configuration::Configuration;
use crate::error::ShiftError;
use crate::schedule::{available_shifts, my_shifts, AvailableShifts, DayGroup};
use crate::types::Shift;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::middleware::{self, Next};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Response;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, FixedOffset, Utc};
use futures::{Stream, StreamExt};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref AREA_NAME: Regex = Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N} .'-]*$").unwrap();
}

#[derive(Clone)]
pub struct AppState<T: ShiftBackend, C: Configuration> {
    pub shift_manager: T,
    pub configuration: C,
}

impl<T: ShiftBackend, C: Configuration> AppState<T, C> {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.configuration.utc_offset())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageResponse {
    message: String,
}

impl MessageResponse {
    fn json(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct AddShiftRequest {
    #[validate(length(min = 1, max = 64), regex(path = *AREA_NAME))]
    area: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    start_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AvailableQuery {
    area: Option<String>,
}

/// `Path`, `Query` and `Json` whose rejections answer with a message body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ShiftError))]
struct ApiPath<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ShiftError))]
struct ApiQuery<T>(T);

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ShiftError))]
struct ApiJson<T>(T);

impl From<PathRejection> for ShiftError {
    fn from(rejection: PathRejection) -> Self {
        ShiftError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ShiftError {
    fn from(rejection: QueryRejection) -> Self {
        ShiftError::InvalidRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ShiftError {
    fn from(rejection: JsonRejection) -> Self {
        ShiftError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ShiftError {
    fn into_response(self) -> Response {
        let status = match self {
            ShiftError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, MessageResponse::json(self.to_string())).into_response()
    }
}

pub fn create_app<T: ShiftBackend, C: Configuration>(backend: T, configuration: C) -> Router {
    let state = AppState {
        shift_manager: backend,
        configuration,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/shifts", get(get_shifts::<T, C>))
        .route("/shifts/booked", get(get_booked_shifts::<T, C>))
        .route("/shifts/available", get(get_available_shifts::<T, C>))
        .route("/shifts/events", get(shift_events::<T, C>))
        .route(
            "/shifts/:id",
            get(get_shift::<T, C>).delete(remove_shift::<T, C>),
        )
        .route("/shifts/:id/book", post(book_shift::<T, C>))
        .route("/shifts/:id/cancel", post(cancel_shift::<T, C>));

    let admin = Router::new()
        .route(
            "/admin/shifts",
            post(add_shift::<T, C>).delete(remove_all_shifts::<T, C>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth::<T, C>,
        ));

    Router::new()
        .merge(public)
        .merge(admin)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn admin_auth<T: ShiftBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<MessageResponse>)> {
    let Some(admin_password) = state.configuration.admin_password() else {
        warn!("Admin request rejected, no admin password configured");
        return Err((
            StatusCode::UNAUTHORIZED,
            MessageResponse::json("Admin access is disabled"),
        ));
    };

    match request.headers().get("x-admin-password") {
        Some(header) if passwords_match(header.as_bytes(), admin_password.as_bytes()) => {
            Ok(next.run(request).await)
        }
        Some(_) => {
            warn!("Admin request rejected, wrong password");
            Err((StatusCode::UNAUTHORIZED, MessageResponse::json("Unauthorized")))
        }
        None => Err((
            StatusCode::UNAUTHORIZED,
            MessageResponse::json("Missing credentials"),
        )),
    }
}

/// Compares every byte regardless of where the first mismatch is.
fn passwords_match(given: &[u8], expected: &[u8]) -> bool {
    given.len() == expected.len()
        && given
            .iter()
            .zip(expected)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

async fn get_shifts<T: ShiftBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> Json<Vec<Shift>> {
    debug!("Received request for shifts");
    Json(state.shift_manager.shifts())
}

async fn get_shift<T: ShiftBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Shift>, ShiftError> {
    state.shift_manager.shift(id).map(Json)
}

async fn get_booked_shifts<T: ShiftBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> Json<Vec<DayGroup<Shift>>> {
    let shifts = state.shift_manager.shifts();
    Json(my_shifts(&shifts, &state.now()))
}

async fn get_available_shifts<T: ShiftBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    ApiQuery(query): ApiQuery<AvailableQuery>,
) -> Json<AvailableShifts> {
    let shifts = state.shift_manager.shifts();
    Json(available_shifts(
        &shifts,
        query.area.as_deref(),
        &state.now(),
    ))
}

async fn shift_events<T: ShiftBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = state
        .shift_manager
        .shift_stream()
        .map(|shifts| Event::default().event("shifts").json_data(shifts));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn book_shift<T: ShiftBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Shift>, ShiftError> {
    debug!(%id, "Received request for booking shift");
    state.shift_manager.book_shift(id).map(Json)
}

async fn cancel_shift<T: ShiftBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Shift>, ShiftError> {
    debug!(%id, "Received request for cancelling shift");
    state.shift_manager.cancel_shift(id).map(Json)
}

async fn remove_shift<T: ShiftBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ShiftError> {
    state.shift_manager.remove_shift(id)?;
    Ok(MessageResponse::json("Shift deleted successfully"))
}

async fn add_shift<T: ShiftBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    ApiJson(request): ApiJson<AddShiftRequest>,
) -> Result<(StatusCode, Json<Shift>), ShiftError> {
    request
        .validate()
        .map_err(|err| ShiftError::InvalidRequest(err.to_string()))?;

    let shift = state
        .shift_manager
        .add_shift(request.start_time, request.end_time, request.area)?;
    Ok((StatusCode::CREATED, Json(shift)))
}

async fn remove_all_shifts<T: ShiftBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> Json<MessageResponse> {
    state.shift_manager.remove_all_shifts();
    MessageResponse::json("All shifts removed successfully")
}
