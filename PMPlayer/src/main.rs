mod hardware;

use hardware::{LogSurface, NoInput, SilentEngine};
use pmpbluetooth::{AudioRouter, BluetoothConfigExt, ShellRunner};
use pmpcatalog::{
    BookshelfAdapter, CatalogConfigExt, JellyfinAdapter, LocalAdapter, SourceRegistry,
};
use pmpconfig::get_config;
use pmpsession::{ButtonPoller, MenuEntry, SessionConfigExt, SessionController, SharedSession};
use pmpstore::{BookmarkStore, DeviceMemory, StoreConfigExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Pace of the cooperative polling loop
const LOOP_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // ========== PHASE 1 : Configuration and adapters ==========

    let config = get_config();
    let menu = config.get_menu_entries()?;
    info!(entries = menu.len(), "Building source menu");

    let mut registry = SourceRegistry::new();
    if menu.iter().any(|e| matches!(e, MenuEntry::Jellyfin | MenuEntry::JellyfinShuffle)) {
        match JellyfinAdapter::new(
            config.get_jellyfin_url()?,
            config.get_jellyfin_api_key()?,
            config.get_jellyfin_limit()?,
        ) {
            Ok(adapter) => registry.register(Box::new(adapter)),
            Err(e) => warn!(error = %e, "Jellyfin adapter unavailable"),
        }
    }
    if menu.contains(&MenuEntry::Audiobookshelf) {
        match BookshelfAdapter::new(
            config.get_bookshelf_url()?,
            config.get_bookshelf_api_key()?,
            config.get_bookshelf_library_id()?,
            config.get_bookshelf_cache_dir()?,
        ) {
            Ok(adapter) => registry.register(Box::new(adapter)),
            Err(e) => warn!(error = %e, "Audiobookshelf adapter unavailable"),
        }
    }
    if menu.iter().any(|e| matches!(e, MenuEntry::LocalFiles | MenuEntry::LocalShuffle)) {
        registry.register(Box::new(LocalAdapter::new(
            config.get_local_directory()?,
            &config.get_local_extensions()?,
        )));
    }

    let router = AudioRouter::new(
        Box::new(ShellRunner),
        DeviceMemory::new(config.get_device_file()),
        config.get_router_settings()?,
    );

    // ========== PHASE 2 : Session ==========

    info!("Starting playback session");
    let session = SessionController::new(
        registry,
        router,
        Box::new(SilentEngine::new()),
        BookmarkStore::new(config.get_bookmarks_file()),
        menu,
        config.get_session_settings()?,
    )
    .await;
    let session: SharedSession = Arc::new(Mutex::new(session));

    // Remote control surface, sharing the serialized session handle.
    let port = config.get_http_port();
    let server_session = session.clone();
    tokio::spawn(async move {
        if let Err(e) = pmpserver::serve(server_session, port).await {
            warn!(error = %e, "Remote control surface stopped");
        }
    });

    // ========== PHASE 3 : Polling loop ==========

    let input = NoInput;
    let mut poller = ButtonPoller::new();
    let mut surface = LogSurface::new();
    let mut ticker = tokio::time::interval(LOOP_INTERVAL);

    info!("PMPlayer is ready");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                let mut session = session.lock().await;
                let view = session.view();
                for command in poller.poll(&input, view) {
                    session.handle(command).await;
                }
                session.tick().await;
                surface.render(&session.snapshot());
            }
        }
    }

    // Final flush before the process releases its resources.
    session.lock().await.shutdown();
    Ok(())
}
