//! REST handlers for the remote-control surface

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use pmpbluetooth::LinkState;
use pmpsession::{Command, MenuEntry, SessionStatus, SharedSession, View};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Router `/api` combining every control endpoint
pub fn control_api_router(session: SharedSession) -> Router {
    Router::new()
        .route("/api/playback/play", post(play))
        .route("/api/playback/pause", post(pause))
        .route("/api/playback/next", post(next_track))
        .route("/api/playback/previous", post(previous_track))
        .route("/api/sources", get(list_sources))
        .route("/api/sources/select", post(select_source))
        .route("/api/playlist", get(list_playlist))
        .route("/api/playlist/{index}/play", post(play_item))
        .route("/api/bt/scan", post(scan_bluetooth))
        .route("/api/bt/devices", get(list_devices))
        .route("/api/bt/connect/{index}", post(connect_device))
        .route("/api/status", get(status))
        .route("/api/openapi.json", get(openapi_json))
        .with_state(session)
}

/// Acknowledgement of a transport command
#[derive(Debug, Serialize, ToSchema)]
pub struct AckResponse {
    pub status: String,
}

impl AckResponse {
    fn new(status: &str) -> Json<Self> {
        Json(Self {
            status: status.to_string(),
        })
    }
}

/// One entry of the source menu
#[derive(Debug, Serialize, ToSchema)]
pub struct SourceEntryResponse {
    /// Stable identifier used by `POST /api/sources/select`
    #[schema(value_type = String)]
    pub id: MenuEntry,
    /// Label shown on the device screen
    pub label: String,
}

/// Request selecting one source menu entry
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectSourceRequest {
    #[schema(value_type = String, example = "local_files")]
    pub source: MenuEntry,
}

/// Session digest returned by `GET /api/status`
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(value_type = String, example = "PLAYING")]
    pub view_state: View,
    pub current_track: Option<String>,
    pub playlist_length: usize,
    pub paused: bool,
    #[schema(value_type = String, example = "routed")]
    pub link_state: LinkState,
}

impl From<SessionStatus> for StatusResponse {
    fn from(status: SessionStatus) -> Self {
        Self {
            view_state: status.view_state,
            current_track: status.current_track,
            playlist_length: status.playlist_length,
            paused: status.paused,
            link_state: status.link_state,
        }
    }
}

/// Generic REST error body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

fn not_found(message: impl Into<String>) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not_found".to_string(),
            message: message.into(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/playback/play",
    tag = "playback",
    responses((status = 200, description = "Playback resumed", body = AckResponse))
)]
pub async fn play(State(session): State<SharedSession>) -> Json<AckResponse> {
    session.lock().await.handle(Command::Play).await;
    AckResponse::new("playing")
}

#[utoipa::path(
    post,
    path = "/api/playback/pause",
    tag = "playback",
    responses((status = 200, description = "Playback paused, bookmark flushed", body = AckResponse))
)]
pub async fn pause(State(session): State<SharedSession>) -> Json<AckResponse> {
    session.lock().await.handle(Command::Pause).await;
    AckResponse::new("paused")
}

#[utoipa::path(
    post,
    path = "/api/playback/next",
    tag = "playback",
    responses((status = 200, description = "Advanced to the next track", body = AckResponse))
)]
pub async fn next_track(State(session): State<SharedSession>) -> Json<AckResponse> {
    session.lock().await.handle(Command::Next).await;
    AckResponse::new("next")
}

#[utoipa::path(
    post,
    path = "/api/playback/previous",
    tag = "playback",
    responses((status = 200, description = "Retreated to the previous track", body = AckResponse))
)]
pub async fn previous_track(State(session): State<SharedSession>) -> Json<AckResponse> {
    session.lock().await.handle(Command::Previous).await;
    AckResponse::new("previous")
}

#[utoipa::path(
    get,
    path = "/api/sources",
    tag = "sources",
    responses((status = 200, description = "The source menu", body = [SourceEntryResponse]))
)]
pub async fn list_sources(State(session): State<SharedSession>) -> Json<Vec<SourceEntryResponse>> {
    let entries = session
        .lock()
        .await
        .menu()
        .iter()
        .map(|entry| SourceEntryResponse {
            id: *entry,
            label: entry.label().to_string(),
        })
        .collect();
    Json(entries)
}

#[utoipa::path(
    post,
    path = "/api/sources/select",
    tag = "sources",
    request_body = SelectSourceRequest,
    responses((status = 200, description = "Entry activated", body = AckResponse))
)]
pub async fn select_source(
    State(session): State<SharedSession>,
    Json(request): Json<SelectSourceRequest>,
) -> Json<AckResponse> {
    session
        .lock()
        .await
        .handle(Command::SelectMenuEntry(request.source))
        .await;
    AckResponse::new("source_selected")
}

#[utoipa::path(
    get,
    path = "/api/playlist",
    tag = "playlist",
    responses((status = 200, description = "Current playlist names", body = [String]))
)]
pub async fn list_playlist(State(session): State<SharedSession>) -> Json<Vec<String>> {
    Json(session.lock().await.playlist_names())
}

#[utoipa::path(
    post,
    path = "/api/playlist/{index}/play",
    tag = "playlist",
    params(("index" = usize, Path, description = "Playlist index")),
    responses(
        (status = 200, description = "Item playing", body = AckResponse),
        (status = 404, description = "Index out of range", body = ErrorResponse),
    )
)]
pub async fn play_item(
    State(session): State<SharedSession>,
    Path(index): Path<usize>,
) -> Response {
    let mut session = session.lock().await;
    if index >= session.playlist_names().len() {
        return not_found(format!("no playlist item at index {index}"));
    }
    session.handle(Command::PlayItem(index)).await;
    AckResponse::new("playing_item").into_response()
}

#[utoipa::path(
    post,
    path = "/api/bt/scan",
    tag = "bluetooth",
    responses((status = 200, description = "Devices discovered during the scan window", body = [String]))
)]
pub async fn scan_bluetooth(State(session): State<SharedSession>) -> Json<Vec<String>> {
    // Discovery blocks this request for the scan window; the shared mutex
    // keeps the session consistent meanwhile.
    let mut session = session.lock().await;
    session.handle(Command::ScanBluetooth).await;
    Json(session.device_names())
}

#[utoipa::path(
    get,
    path = "/api/bt/devices",
    tag = "bluetooth",
    responses((status = 200, description = "Devices found by the last scan", body = [String]))
)]
pub async fn list_devices(State(session): State<SharedSession>) -> Json<Vec<String>> {
    Json(session.lock().await.device_names())
}

#[utoipa::path(
    post,
    path = "/api/bt/connect/{index}",
    tag = "bluetooth",
    params(("index" = usize, Path, description = "Index into the last scan's device list")),
    responses(
        (status = 200, description = "Connect attempted", body = AckResponse),
        (status = 404, description = "Index out of range", body = ErrorResponse),
    )
)]
pub async fn connect_device(
    State(session): State<SharedSession>,
    Path(index): Path<usize>,
) -> Response {
    let mut session = session.lock().await;
    if index >= session.device_names().len() {
        return not_found(format!("no discovered device at index {index}"));
    }
    session.handle(Command::ConnectDevice(index)).await;
    AckResponse::new("connecting").into_response()
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "status",
    responses((status = 200, description = "Session digest", body = StatusResponse))
)]
pub async fn status(State(session): State<SharedSession>) -> Json<StatusResponse> {
    Json(session.lock().await.status().into())
}

/// Serves the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(crate::openapi::ApiDoc::document())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_entry_wire_ids() {
        // The ids the select endpoint accepts
        assert_eq!(
            serde_json::to_string(&MenuEntry::LocalShuffle).unwrap(),
            "\"local_shuffle\""
        );
        let parsed: SelectSourceRequest =
            serde_json::from_str(r#"{"source": "jellyfin_shuffle"}"#).unwrap();
        assert_eq!(parsed.source, MenuEntry::JellyfinShuffle);
    }

    #[test]
    fn test_status_response_shape() {
        let response = StatusResponse {
            view_state: View::Playing,
            current_track: Some("Track".into()),
            playlist_length: 3,
            paused: false,
            link_state: LinkState::Routed,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["view_state"], "PLAYING");
        assert_eq!(json["link_state"], "routed");
        assert_eq!(json["playlist_length"], 3);
    }
}
