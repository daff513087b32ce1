//! OpenAPI documentation aggregator for the control surface

use crate::api;
use utoipa::OpenApi;

/// OpenAPI document covering every control endpoint
#[derive(OpenApi)]
#[openapi(
    paths(
        api::play,
        api::pause,
        api::next_track,
        api::previous_track,
        api::list_sources,
        api::select_source,
        api::list_playlist,
        api::play_item,
        api::scan_bluetooth,
        api::list_devices,
        api::connect_device,
        api::status,
    ),
    components(schemas(
        api::AckResponse,
        api::SourceEntryResponse,
        api::SelectSourceRequest,
        api::StatusResponse,
        api::ErrorResponse,
    )),
    tags(
        (name = "playback", description = "Transport control"),
        (name = "sources", description = "Source menu"),
        (name = "playlist", description = "Current playlist"),
        (name = "bluetooth", description = "Output-device acquisition"),
        (name = "status", description = "Session digest"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// The assembled document
    pub fn document() -> utoipa::openapi::OpenApi {
        Self::openapi()
    }
}
