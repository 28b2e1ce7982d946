//! JSON handlers for the hub endpoints.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Map, Value};

use casahub_app::discovery::PassReport;
use casahub_domain::catalog::Catalog;
use casahub_domain::command::CommandKind;
use casahub_domain::error::{HubError, NotFoundError};
use casahub_domain::id::DeviceId;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /refresh` — run one synchronous discovery pass.
pub async fn refresh(State(state): State<AppState>) -> Json<PassReport> {
    Json(state.hub.refresh().await)
}

/// `GET /catalog` — the current per-family catalog.
pub async fn catalog(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.hub.catalog())
}

/// `GET /status/{device_id}` — live status snapshot for one device.
pub async fn status(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_device_id(&device_id)?;
    Ok(Json(state.hub.status(id).await?))
}

/// `POST /control/{command_kind}/{device_id}` — validate and execute a
/// command; the JSON body carries the command parameters.
pub async fn control(
    State(state): State<AppState>,
    Path((command_kind, device_id)): Path<(String, String)>,
    Json(params): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let kind: CommandKind = command_kind
        .parse()
        .map_err(|_| ApiError::UnknownCommandKind(command_kind))?;
    let id = parse_device_id(&device_id)?;
    Ok(Json(state.hub.control(id, kind, &params).await?))
}

/// An unparseable id cannot name a registered device, so it gets the same
/// 404 as an unknown one.
fn parse_device_id(text: &str) -> Result<DeviceId, ApiError> {
    text.parse().map_err(|_| {
        ApiError::from(HubError::from(NotFoundError {
            entity: "Device",
            id: text.to_string(),
        }))
    })
}
