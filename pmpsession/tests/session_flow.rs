//! End-to-end tests of the session state machine against fake collaborators
//!
//! The engine, the catalog sources and the process executor are all
//! in-memory fakes, so every transition and tick is fully observable and
//! instant.

use async_trait::async_trait;
use pmpbluetooth::{AudioRouter, CommandOutput, CommandRunner, RouterSettings};
use pmpcatalog::{
    CatalogSource, Item, LocatorHint, Source, SourceError, SourceRegistry, StreamLocator,
};
use pmpsession::{
    Command, EndOfPlaylist, EngineError, MenuEntry, NoticeLevel, PlaybackEngine,
    SessionController, SessionSettings, View,
};
use pmpstore::{BookmarkStore, DeviceMemory};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct EngineState {
    loaded: Vec<String>,
    playing: bool,
    position: u64,
    duration: u64,
    seeks: Vec<u64>,
    fail_load: bool,
}

/// Engine fake with a shared handle so tests keep inspecting it after the
/// controller takes ownership of its `Box`.
#[derive(Clone, Default)]
struct FakeEngine(Arc<Mutex<EngineState>>);

impl FakeEngine {
    fn set_position(&self, position: u64) {
        self.0.lock().unwrap().position = position;
    }

    fn set_duration(&self, duration: u64) {
        self.0.lock().unwrap().duration = duration;
    }

    fn stop(&self) {
        self.0.lock().unwrap().playing = false;
    }

    fn fail_next_load(&self) {
        self.0.lock().unwrap().fail_load = true;
    }

    fn loaded(&self) -> Vec<String> {
        self.0.lock().unwrap().loaded.clone()
    }

    fn seeks(&self) -> Vec<u64> {
        self.0.lock().unwrap().seeks.clone()
    }

    fn playing(&self) -> bool {
        self.0.lock().unwrap().playing
    }

    fn position(&self) -> u64 {
        self.0.lock().unwrap().position
    }
}

impl PlaybackEngine for FakeEngine {
    fn load(&mut self, locator: &StreamLocator) -> Result<(), EngineError> {
        let mut state = self.0.lock().unwrap();
        if state.fail_load {
            state.fail_load = false;
            return Err(EngineError("decoder refused".into()));
        }
        state.loaded.push(locator.to_string());
        state.playing = true;
        state.position = 0;
        Ok(())
    }

    fn play(&mut self) {
        self.0.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.0.lock().unwrap().playing = false;
    }

    fn position_ms(&self) -> u64 {
        self.0.lock().unwrap().position
    }

    fn set_position_ms(&mut self, position: u64) {
        let mut state = self.0.lock().unwrap();
        state.position = position;
        state.seeks.push(position);
    }

    fn duration_ms(&self) -> u64 {
        self.0.lock().unwrap().duration
    }

    fn is_playing(&self) -> bool {
        self.0.lock().unwrap().playing
    }
}

struct FakeCatalog {
    kind: Source,
    names: Vec<String>,
    fail: bool,
}

impl FakeCatalog {
    fn with_names(kind: Source, names: &[&str]) -> Self {
        Self {
            kind,
            names: names.iter().map(|n| n.to_string()).collect(),
            fail: false,
        }
    }

    fn failing(kind: Source) -> Self {
        Self {
            kind,
            names: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    fn kind(&self) -> Source {
        self.kind
    }

    async fn fetch(&self) -> Result<Vec<Item>, SourceError> {
        if self.fail {
            return Err(SourceError::Api("backend unreachable".into()));
        }
        Ok(self
            .names
            .iter()
            .map(|name| Item {
                name: name.clone(),
                id: name.clone(),
                source: self.kind,
                locator_hint: LocatorHint::default(),
                duration_ms: None,
            })
            .collect())
    }

    async fn resolve(&self, item: &Item) -> Result<StreamLocator, SourceError> {
        Ok(StreamLocator::Url(format!("test://{}", item.id)))
    }
}

/// Process executor whose replies are scripted by command prefix
struct ScriptRunner {
    replies: Vec<(&'static str, bool, &'static str)>,
}

#[async_trait]
impl CommandRunner for ScriptRunner {
    async fn run(&self, command: &str, _timeout: Duration) -> CommandOutput {
        for (prefix, success, output) in &self.replies {
            if command.starts_with(prefix) {
                return CommandOutput {
                    success: *success,
                    output: output.to_string(),
                };
            }
        }
        CommandOutput {
            success: true,
            output: String::new(),
        }
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    session: SessionController,
    engine: FakeEngine,
    store: BookmarkStore,
    _dir: TempDir,
}

fn fast_settings() -> SessionSettings {
    SessionSettings {
        settle_delay: Duration::ZERO,
        autosave_interval: Duration::from_secs(1000),
        notice_ttl: Duration::from_secs(60),
        ..SessionSettings::default()
    }
}

async fn harness_seeded(
    adapters: Vec<Box<dyn CatalogSource>>,
    replies: Vec<(&'static str, bool, &'static str)>,
    settings: SessionSettings,
    seed_bookmarks: &[(&str, u64)],
) -> Harness {
    let dir = TempDir::new().unwrap();
    let mut registry = SourceRegistry::new();
    for adapter in adapters {
        registry.register(adapter);
    }

    let router = AudioRouter::new(
        Box::new(ScriptRunner { replies }),
        DeviceMemory::new(dir.path().join("bt_device.json")),
        RouterSettings {
            sink_poll_delay: Duration::from_millis(1),
            ..RouterSettings::default()
        },
    );

    let engine = FakeEngine::default();
    let store = BookmarkStore::new(dir.path().join("bookmarks.json"));
    let mut map = store.load();
    for (name, position) in seed_bookmarks {
        store.save(&mut map, name, *position).unwrap();
    }
    let menu = vec![
        MenuEntry::LocalFiles,
        MenuEntry::LocalShuffle,
        MenuEntry::BluetoothPair,
    ];

    let session = SessionController::new(
        registry,
        router,
        Box::new(engine.clone()),
        store.clone(),
        menu,
        settings,
    )
    .await;

    Harness {
        session,
        engine,
        store,
        _dir: dir,
    }
}

async fn harness_with(
    adapters: Vec<Box<dyn CatalogSource>>,
    replies: Vec<(&'static str, bool, &'static str)>,
    settings: SessionSettings,
) -> Harness {
    harness_seeded(adapters, replies, settings, &[]).await
}

async fn harness(names: &[&str]) -> Harness {
    harness_with(
        vec![Box::new(FakeCatalog::with_names(Source::Local, names))],
        Vec::new(),
        fast_settings(),
    )
    .await
}

impl Harness {
    /// Loads the local playlist and starts the item at `index`
    async fn start_playing(&mut self, index: usize) {
        self.session.handle(Command::SelectMenuEntry(MenuEntry::LocalFiles)).await;
        assert_eq!(self.session.view(), View::Browser);
        self.session.handle(Command::PlayItem(index)).await;
        assert_eq!(self.session.view(), View::Playing);
    }
}

// ============================================================================
// Menu navigation
// ============================================================================

#[tokio::test]
async fn test_menu_scroll_is_clamped() {
    let mut h = harness(&[]).await;

    // Three entries: two downs reach the end, the third is swallowed.
    h.session.handle(Command::ScrollDown).await;
    h.session.handle(Command::ScrollDown).await;
    assert_eq!(h.session.scroll_index(), 2);
    h.session.handle(Command::ScrollDown).await;
    assert_eq!(h.session.scroll_index(), 2);

    h.session.handle(Command::ScrollUp).await;
    h.session.handle(Command::ScrollUp).await;
    h.session.handle(Command::ScrollUp).await;
    assert_eq!(h.session.scroll_index(), 0);
}

#[tokio::test]
async fn test_select_browses_the_local_source() {
    let mut h = harness(&["a.mp3", "b.mp3"]).await;

    h.session.handle(Command::Select).await;
    assert_eq!(h.session.view(), View::Browser);
    assert_eq!(h.session.playlist_names(), vec!["a.mp3", "b.mp3"]);
    assert_eq!(h.session.scroll_index(), 0);
}

#[tokio::test]
async fn test_fetch_failure_renders_error_and_stays_in_menu() {
    let mut h = harness_with(
        vec![Box::new(FakeCatalog::failing(Source::Local))],
        Vec::new(),
        fast_settings(),
    )
    .await;

    h.session.handle(Command::Select).await;
    assert_eq!(h.session.view(), View::Menu);
    assert!(h.session.playlist_names().is_empty());

    let snapshot = h.session.snapshot();
    let notice = snapshot.notice.expect("error banner expected");
    assert_eq!(notice.level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_shuffle_entry_starts_playback_directly() {
    let mut h = harness(&["only.mp3"]).await;

    h.session.handle(Command::SelectMenuEntry(MenuEntry::LocalShuffle)).await;
    assert_eq!(h.session.view(), View::Playing);
    assert_eq!(h.engine.loaded(), vec!["test://only.mp3"]);
}

// ============================================================================
// Browser navigation
// ============================================================================

#[tokio::test]
async fn test_jump_letter_forward_and_back() {
    let mut h = harness(&["alpha", "anchor", "beta", "bravo", "charlie"]).await;
    h.session.handle(Command::Select).await;

    // Forward: next distinct letter, idempotent at the boundary.
    h.session.handle(Command::JumpLetterForward).await;
    assert_eq!(h.session.scroll_index(), 2);
    h.session.handle(Command::JumpLetterForward).await;
    assert_eq!(h.session.scroll_index(), 4);
    h.session.handle(Command::JumpLetterForward).await;
    assert_eq!(h.session.scroll_index(), 4);

    // Backward: previous distinct letter, landing at the start of its run.
    h.session.handle(Command::JumpLetterBack).await;
    assert_eq!(h.session.scroll_index(), 2);
    h.session.handle(Command::JumpLetterBack).await;
    assert_eq!(h.session.scroll_index(), 0);
    h.session.handle(Command::JumpLetterBack).await;
    assert_eq!(h.session.scroll_index(), 0);
}

#[tokio::test]
async fn test_browser_back_discards_view() {
    let mut h = harness(&["a.mp3"]).await;
    h.session.handle(Command::Select).await;
    assert_eq!(h.session.view(), View::Browser);

    h.session.handle(Command::Back).await;
    assert_eq!(h.session.view(), View::Menu);
    assert_eq!(h.session.scroll_index(), 0);
}

// ============================================================================
// Playback lifecycle
// ============================================================================

#[tokio::test]
async fn test_play_selection_restores_bookmark() {
    // A previous session left a resume point behind.
    let mut h = harness_seeded(
        vec![Box::new(FakeCatalog::with_names(Source::Local, &["resumable.mp3"]))],
        Vec::new(),
        fast_settings(),
        &[("resumable.mp3", 5000)],
    )
    .await;

    h.start_playing(0).await;
    assert_eq!(h.engine.loaded(), vec!["test://resumable.mp3"]);
    assert_eq!(h.engine.seeks(), vec![5000]);
}

#[tokio::test]
async fn test_track_switch_flushes_bookmark_iff_position_positive() {
    let mut h = harness(&["first", "second", "third"]).await;
    h.start_playing(0).await;

    // Progressed: switching away must persist the position.
    h.engine.set_position(1234);
    h.session.handle(Command::Next).await;
    assert_eq!(h.session.current_index(), 1);
    let map = h.store.load();
    assert_eq!(map.get("first"), Some(&1234));

    // No progress: switching away must not create an entry.
    h.session.handle(Command::Next).await;
    let map = h.store.load();
    assert_eq!(map.get("second"), None);
}

#[tokio::test]
async fn test_next_previous_wrap_around() {
    let mut h = harness(&["first", "second", "third"]).await;
    h.start_playing(0).await;

    h.session.handle(Command::Previous).await;
    assert_eq!(h.session.current_index(), 2);
    h.session.handle(Command::Next).await;
    assert_eq!(h.session.current_index(), 0);
}

#[tokio::test]
async fn test_pause_toggle_flushes_and_blocks_autoplay() {
    let mut h = harness(&["first", "second"]).await;
    h.start_playing(0).await;

    h.engine.set_position(700);
    h.session.handle(Command::Select).await;
    assert!(!h.engine.playing());
    assert_eq!(h.store.load().get("first"), Some(&700));

    // A paused engine is not "stopped on its own": no advance.
    h.session.tick().await;
    assert_eq!(h.session.current_index(), 0);
    assert_eq!(h.engine.loaded().len(), 1);

    // Second press resumes.
    h.session.handle(Command::Select).await;
    assert!(h.engine.playing());
}

#[tokio::test]
async fn test_seek_is_floored_and_capped() {
    let mut h = harness(&["long.mp3"]).await;
    h.start_playing(0).await;
    h.engine.set_duration(60_000);

    // Near the start, a back seek floors at zero.
    h.engine.set_position(10_000);
    h.session.handle(Command::SeekBack).await;
    assert_eq!(h.engine.position(), 0);

    // Near the end, a forward seek stops just short of the duration.
    h.engine.set_position(59_000);
    h.session.handle(Command::SeekForward).await;
    assert_eq!(h.engine.position(), 59_900);
}

#[tokio::test]
async fn test_autoplay_advances_and_loops_to_start() {
    let mut h = harness(&["first", "second", "third"]).await;
    h.start_playing(2).await;

    // The last track ends on its own: playback wraps to the first track.
    h.engine.stop();
    h.session.tick().await;
    assert_eq!(h.session.current_index(), 0);
    assert_eq!(h.engine.loaded().last().unwrap(), "test://first");
    assert!(h.engine.playing());
}

#[tokio::test]
async fn test_autoplay_stop_policy_parks_the_session() {
    let mut h = harness_with(
        vec![Box::new(FakeCatalog::with_names(Source::Local, &["first", "second"]))],
        Vec::new(),
        SessionSettings {
            end_of_playlist: EndOfPlaylist::Stop,
            ..fast_settings()
        },
    )
    .await;
    h.start_playing(1).await;

    h.engine.stop();
    h.session.tick().await;
    assert_eq!(h.session.current_index(), 1);
    assert_eq!(h.engine.loaded().len(), 1);
    assert!(h.session.status().paused);

    // Further ticks stay parked.
    h.session.tick().await;
    assert_eq!(h.engine.loaded().len(), 1);
}

#[tokio::test]
async fn test_autosave_flushes_on_tick() {
    let mut h = harness_with(
        vec![Box::new(FakeCatalog::with_names(Source::Local, &["slow-burn"]))],
        Vec::new(),
        SessionSettings {
            autosave_interval: Duration::ZERO,
            ..fast_settings()
        },
    )
    .await;
    h.start_playing(0).await;

    h.engine.set_position(4200);
    h.session.tick().await;
    assert_eq!(h.store.load().get("slow-burn"), Some(&4200));
}

#[tokio::test]
async fn test_playing_back_flushes_and_returns_to_menu() {
    let mut h = harness(&["track"]).await;
    h.start_playing(0).await;

    h.engine.set_position(400);
    h.session.handle(Command::Back).await;
    assert_eq!(h.session.view(), View::Menu);
    assert_eq!(h.store.load().get("track"), Some(&400));
}

#[tokio::test]
async fn test_engine_load_failure_falls_back_to_browser() {
    let mut h = harness(&["bad", "good"]).await;
    h.session.handle(Command::SelectMenuEntry(MenuEntry::LocalFiles)).await;

    h.engine.fail_next_load();
    h.session.handle(Command::PlayItem(0)).await;

    assert_eq!(h.session.view(), View::Browser);
    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.notice.unwrap().level, NoticeLevel::Error);

    // The playlist is intact and the next attempt works.
    h.session.handle(Command::PlayItem(1)).await;
    assert_eq!(h.session.view(), View::Playing);
}

#[tokio::test]
async fn test_play_item_out_of_range_is_ignored() {
    let mut h = harness(&["only"]).await;
    h.session.handle(Command::PlayItem(7)).await;
    assert_eq!(h.session.view(), View::Menu);
}

#[tokio::test]
async fn test_shutdown_flushes_current_bookmark() {
    let mut h = harness(&["track"]).await;
    h.start_playing(0).await;
    h.engine.set_position(9000);

    h.session.shutdown();
    assert_eq!(h.store.load().get("track"), Some(&9000));
}

// ============================================================================
// Bluetooth flow
// ============================================================================

#[tokio::test]
async fn test_scan_with_no_devices_reports_and_stays_in_menu() {
    let mut h = harness(&[]).await;
    h.session.handle(Command::ScanBluetooth).await;

    assert_eq!(h.session.view(), View::Menu);
    assert_eq!(h.session.snapshot().notice.unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_scan_select_connect_always_returns_to_menu() {
    // Discovery finds a device but the link fails: the session must still
    // land back in the menu.
    let mut h = harness_with(
        vec![Box::new(FakeCatalog::with_names(Source::Local, &[]))],
        vec![
            ("bluetoothctl devices", true, "Device AA:BB:CC:DD:EE:FF Speaker"),
            ("bluetoothctl connect", false, "Failed to connect"),
        ],
        fast_settings(),
    )
    .await;

    h.session.handle(Command::ScanBluetooth).await;
    assert_eq!(h.session.view(), View::BtScan);
    assert_eq!(h.session.device_names(), vec!["Speaker"]);

    h.session.handle(Command::Select).await;
    assert_eq!(h.session.view(), View::Menu);
    assert_eq!(h.session.scroll_index(), 0);
}

// ============================================================================
// Read surface
// ============================================================================

#[tokio::test]
async fn test_snapshot_windows_around_the_cursor() {
    let names: Vec<String> = (0..10).map(|i| format!("track-{i:02}")).collect();
    let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    let mut h = harness(&refs).await;
    h.session.handle(Command::Select).await;

    for _ in 0..5 {
        h.session.handle(Command::ScrollDown).await;
    }
    assert_eq!(h.session.scroll_index(), 5);

    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.rows.len(), 5);
    assert_eq!(snapshot.rows[0].text, "track-03");
    assert!(snapshot.rows[2].selected);
    assert_eq!(snapshot.rows[2].text, "track-05");
}

#[tokio::test]
async fn test_status_digest_while_playing() {
    let mut h = harness(&["first", "second"]).await;
    h.start_playing(1).await;

    let status = h.session.status();
    assert_eq!(status.view_state, View::Playing);
    assert_eq!(status.current_track.as_deref(), Some("second"));
    assert_eq!(status.playlist_length, 2);
    assert!(!status.paused);
}

#[tokio::test]
async fn test_status_hides_track_outside_playing() {
    let mut h = harness(&["first"]).await;
    h.session.handle(Command::Select).await;
    let status = h.session.status();
    assert_eq!(status.view_state, View::Browser);
    assert_eq!(status.current_track, None);
}
