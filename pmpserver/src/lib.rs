//! # PMPServer
//!
//! The remote-control REST surface of PMPlayer. Every endpoint maps 1:1 to
//! a session-controller operation and funnels through the same shared
//! session handle as the hardware buttons, so remote and local commands
//! are serialized against each other.
//!
//! ## Routes
//!
//! - `POST /api/playback/play|pause|next|previous` - transport control
//! - `GET  /api/sources` - the source menu
//! - `POST /api/sources/select` - activate a menu entry
//! - `GET  /api/playlist` - current playlist names
//! - `POST /api/playlist/{index}/play` - play an item by index
//! - `POST /api/bt/scan` - run a discovery scan (blocks for the window)
//! - `GET  /api/bt/devices` - devices found by the last scan
//! - `POST /api/bt/connect/{index}` - connect a discovered device
//! - `GET  /api/status` - session digest
//! - `GET  /api/openapi.json` - OpenAPI document

pub mod api;
pub mod openapi;

pub use api::control_api_router;
pub use openapi::ApiDoc;

use pmpsession::SharedSession;
use std::net::SocketAddr;
use tracing::info;

/// Binds the control surface and serves it until the process exits
///
/// Runs on its own task in the real player; the polling loop never waits
/// on it.
pub async fn serve(session: SharedSession, port: u16) -> anyhow::Result<()> {
    let app = control_api_router(session);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Remote control surface listening");
    axum::serve(listener, app).await?;
    Ok(())
}
