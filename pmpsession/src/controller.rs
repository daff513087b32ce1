//! The session controller state machine

use crate::command::{Command, MenuEntry};
use crate::engine::PlaybackEngine;
use crate::view::{
    Notice, NoticeLevel, NowPlaying, Row, SessionStatus, View, ViewSnapshot, VISIBLE_ROWS,
};
use pmpbluetooth::AudioRouter;
use pmpcatalog::{FetchOptions, Item, Source, SourceError, SourceRegistry};
use pmpstore::{BookmarkStore, Bookmarks, BtDevice};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Shared handle serializing button and remote commands
///
/// Every mutation goes through this mutex, so a `play_selection` issued by
/// a button can never interleave with one issued over HTTP.
pub type SharedSession = Arc<Mutex<SessionController>>;

/// What happens when the last track finishes on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndOfPlaylist {
    /// Wrap to the first track and keep going
    #[default]
    Loop,
    /// Park the session until the user acts
    Stop,
}

/// Timing and policy knobs, usually read from the configuration
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Maximum progress lost on an unclean shutdown
    pub autosave_interval: Duration,
    /// Wait between loading a stream and seeking it; the engine's seek is
    /// unreliable immediately after a load
    pub settle_delay: Duration,
    /// Backward nudge of the seek command
    pub seek_back: Duration,
    /// Forward nudge of the seek command
    pub seek_forward: Duration,
    /// End-of-playlist policy for the autoplay advance
    pub end_of_playlist: EndOfPlaylist,
    /// How long a transient banner stays up
    pub notice_ttl: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_secs(15),
            settle_delay: Duration::from_millis(600),
            seek_back: Duration::from_secs(15),
            seek_forward: Duration::from_secs(30),
            end_of_playlist: EndOfPlaylist::Loop,
            notice_ttl: Duration::from_secs(2),
        }
    }
}

/// The playback session controller
///
/// Owns the playlist, the cursor state, the bookmark map and the Bluetooth
/// router, and consumes the playback engine through its trait. All
/// transitions run to completion before the next command is dispatched
/// (see [`SharedSession`]).
pub struct SessionController {
    registry: SourceRegistry,
    router: AudioRouter,
    engine: Box<dyn PlaybackEngine>,
    store: BookmarkStore,
    bookmarks: Bookmarks,
    settings: SessionSettings,

    menu: Vec<MenuEntry>,
    playlist: Vec<Item>,
    bt_devices: Vec<BtDevice>,

    view: View,
    scroll_index: usize,
    current_index: usize,
    paused: bool,
    last_flush: Instant,
    notice: Option<Notice>,
}

impl SessionController {
    /// Builds the controller and attempts one best-effort reconnect to the
    /// last Bluetooth device; its failure is silent.
    pub async fn new(
        registry: SourceRegistry,
        mut router: AudioRouter,
        engine: Box<dyn PlaybackEngine>,
        store: BookmarkStore,
        menu: Vec<MenuEntry>,
        settings: SessionSettings,
    ) -> Self {
        let bookmarks = store.load();
        info!(bookmarks = bookmarks.len(), menu = menu.len(), "Session starting");

        let connected = router.auto_connect_last().await;

        let mut controller = Self {
            registry,
            router,
            engine,
            store,
            bookmarks,
            settings,
            menu,
            playlist: Vec::new(),
            bt_devices: Vec::new(),
            view: View::Menu,
            scroll_index: 0,
            current_index: 0,
            paused: false,
            last_flush: Instant::now(),
            notice: None,
        };
        if connected {
            controller.set_notice(NoticeLevel::Info, "BLUETOOTH", "Connected!");
        }
        controller
    }

    // ========================================================================
    // Command dispatch
    // ========================================================================

    /// Dispatches one command into the state machine
    ///
    /// Commands that make no sense in the current view are ignored rather
    /// than rejected: buttons are polled blindly and the remote surface
    /// may race a view change.
    pub async fn handle(&mut self, command: Command) {
        debug!(?command, view = ?self.view, "Dispatching command");
        match command {
            Command::ScrollUp => self.scroll(-1),
            Command::ScrollDown => self.scroll(1),
            Command::JumpLetterForward => self.jump_letter(1),
            Command::JumpLetterBack => self.jump_letter(-1),
            Command::Select => self.select().await,
            Command::Back => self.back(),
            Command::SeekBack => self.seek_relative(-(self.settings.seek_back.as_millis() as i64)),
            Command::SeekForward => self.seek_relative(self.settings.seek_forward.as_millis() as i64),
            Command::Next => self.step(1).await,
            Command::Previous => self.step(-1).await,
            Command::Play => self.resume(),
            Command::Pause => self.pause(),
            Command::SelectMenuEntry(entry) => self.activate_menu_entry(entry).await,
            Command::PlayItem(index) => {
                if index < self.playlist.len() {
                    self.play_selection(index).await;
                }
            }
            Command::ScanBluetooth => self.scan_bluetooth().await,
            Command::ConnectDevice(index) => self.connect_device(index).await,
        }
    }

    /// Reconciles autoplay and autosave; the loop calls this every pass
    ///
    /// Driven externally so tests can step it manually.
    pub async fn tick(&mut self) {
        if self.notice.as_ref().is_some_and(|n| n.expired()) {
            self.notice = None;
        }

        if self.view != View::Playing {
            return;
        }

        // Periodic autosave, independent of user action.
        if self.last_flush.elapsed() >= self.settings.autosave_interval {
            self.flush_bookmark();
            self.last_flush = Instant::now();
        }

        // Autoplay: the engine stopped on its own, not through pause.
        if !self.paused && !self.engine.is_playing() && !self.playlist.is_empty() {
            let next = self.current_index + 1;
            if next < self.playlist.len() {
                self.play_selection(next).await;
            } else {
                match self.settings.end_of_playlist {
                    EndOfPlaylist::Loop => self.play_selection(0).await,
                    EndOfPlaylist::Stop => {
                        info!("Playlist finished");
                        self.flush_bookmark();
                        self.paused = true;
                    }
                }
            }
        }
    }

    /// Final flush before the process releases its resources
    pub fn shutdown(&mut self) {
        info!("Session shutting down");
        self.flush_bookmark();
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    fn visible_len(&self) -> usize {
        match self.view {
            View::Menu => self.menu.len(),
            View::Browser => self.playlist.len(),
            View::BtScan => self.bt_devices.len(),
            View::Playing => 0,
        }
    }

    fn scroll(&mut self, delta: i32) {
        let len = self.visible_len();
        if len == 0 {
            self.scroll_index = 0;
            return;
        }
        let target = self.scroll_index as i64 + delta as i64;
        self.scroll_index = target.clamp(0, len as i64 - 1) as usize;
    }

    /// Moves the cursor to the next/previous distinct leading letter
    ///
    /// Forward stops at the first item comparing greater than the current
    /// letter; backward finds the previous smaller letter and rewinds to
    /// the start of its run. At a boundary the cursor stays put.
    fn jump_letter(&mut self, direction: i32) {
        if self.view != View::Browser || self.playlist.is_empty() {
            return;
        }
        let Some(current) = leading_letter(&self.playlist[self.scroll_index].name) else {
            return;
        };

        if direction > 0 {
            for i in self.scroll_index + 1..self.playlist.len() {
                if leading_letter(&self.playlist[i].name).is_some_and(|l| l > current) {
                    self.scroll_index = i;
                    return;
                }
            }
        } else {
            for i in (0..self.scroll_index).rev() {
                let Some(letter) = leading_letter(&self.playlist[i].name) else {
                    continue;
                };
                if letter < current {
                    let mut start = i;
                    while start > 0
                        && leading_letter(&self.playlist[start - 1].name) == Some(letter)
                    {
                        start -= 1;
                    }
                    self.scroll_index = start;
                    return;
                }
            }
        }
    }

    async fn select(&mut self) {
        match self.view {
            View::Menu => {
                if let Some(entry) = self.menu.get(self.scroll_index).copied() {
                    self.activate_menu_entry(entry).await;
                }
            }
            View::Browser => self.play_selection(self.scroll_index).await,
            View::BtScan => self.connect_device(self.scroll_index).await,
            View::Playing => self.toggle_pause(),
        }
    }

    fn back(&mut self) {
        self.flush_bookmark();
        self.view = View::Menu;
        self.scroll_index = 0;
    }

    // ========================================================================
    // Content loading
    // ========================================================================

    async fn activate_menu_entry(&mut self, entry: MenuEntry) {
        match entry.source() {
            Some(source) => {
                let options = if entry.autoplay() {
                    FetchOptions::shuffled()
                } else {
                    FetchOptions::default()
                };
                self.load_source(source, options, entry.autoplay()).await;
            }
            None => self.scan_bluetooth().await,
        }
    }

    /// Replaces the playlist from one source
    ///
    /// Failure never leaves a partial playlist behind: the session stays in
    /// the menu with an error banner and an empty list.
    async fn load_source(&mut self, source: Source, options: FetchOptions, autoplay: bool) {
        info!(%source, autoplay, "Loading playlist");
        match self.registry.fetch(source, options).await {
            Ok(items) => {
                self.playlist = items;
                if self.playlist.is_empty() {
                    self.set_notice(NoticeLevel::Error, "ERROR", "No items");
                    self.view = View::Menu;
                    self.scroll_index = 0;
                } else if autoplay {
                    self.play_selection(0).await;
                } else {
                    self.view = View::Browser;
                    self.scroll_index = 0;
                }
            }
            Err(SourceError::NoFiles) => {
                self.playlist.clear();
                self.set_notice(NoticeLevel::Error, "ERROR", "No Local Files");
                self.view = View::Menu;
                self.scroll_index = 0;
            }
            Err(e) => {
                warn!(%source, error = %e, "Playlist load failed");
                self.playlist.clear();
                self.set_notice(NoticeLevel::Error, "ERROR", format!("{source} Fail: {e}"));
                self.view = View::Menu;
                self.scroll_index = 0;
            }
        }
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Loads and starts the item at `index`, restoring its bookmark
    ///
    /// The bookmark of the item being left is flushed first, so switching
    /// tracks never loses progress.
    async fn play_selection(&mut self, index: usize) {
        let Some(item) = self.playlist.get(index).cloned() else {
            return;
        };
        self.flush_bookmark();
        self.current_index = index;

        let locator = match self.registry.resolve(&item).await {
            Ok(locator) => locator,
            Err(e) => {
                warn!(name = %item.name, error = %e, "Locator resolution failed");
                self.fail_playback(format!("Resolve: {e}"));
                return;
            }
        };

        info!(name = %item.name, locator = %locator, "Starting playback");
        if let Err(e) = self.engine.load(&locator) {
            warn!(name = %item.name, error = %e, "Engine load failed");
            self.fail_playback(format!("Load: {e}"));
            return;
        }
        self.paused = false;

        // Let the stream open before touching the position.
        tokio::time::sleep(self.settings.settle_delay).await;

        if let Some(position) = BookmarkStore::get(&self.bookmarks, &item.name) {
            debug!(name = %item.name, position, "Restoring bookmark");
            self.engine.set_position_ms(position);
        }

        self.view = View::Playing;
        self.last_flush = Instant::now();
    }

    /// Playback failed: show the error and fall back to a browsable view
    fn fail_playback(&mut self, message: String) {
        self.set_notice(NoticeLevel::Error, "ERROR", message);
        if self.playlist.is_empty() {
            self.view = View::Menu;
            self.scroll_index = 0;
        } else {
            self.view = View::Browser;
            self.scroll_index = self.current_index.min(self.playlist.len() - 1);
        }
    }

    async fn step(&mut self, delta: i64) {
        if self.view != View::Playing || self.playlist.is_empty() {
            return;
        }
        let len = self.playlist.len() as i64;
        let next = (self.current_index as i64 + delta).rem_euclid(len) as usize;
        self.play_selection(next).await;
    }

    fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    fn pause(&mut self) {
        if self.view != View::Playing || self.paused {
            return;
        }
        self.engine.pause();
        self.paused = true;
        self.flush_bookmark();
    }

    fn resume(&mut self) {
        if self.view != View::Playing || !self.paused {
            return;
        }
        self.engine.play();
        self.paused = false;
    }

    fn seek_relative(&mut self, delta_ms: i64) {
        if self.view != View::Playing {
            return;
        }
        let position = self.engine.position_ms() as i64;
        let mut target = (position + delta_ms).max(0) as u64;

        if delta_ms > 0 {
            // Stop just short of the end so the engine does not treat the
            // seek as a completed stream.
            let duration = self.engine.duration_ms();
            if duration > 100 {
                target = target.min(duration - 100);
            }
        }
        self.engine.set_position_ms(target);
    }

    // ========================================================================
    // Bookmarks
    // ========================================================================

    /// Persists the current position of the playing item
    ///
    /// A position of zero is not written, so an item that never actually
    /// advanced keeps its previous resume point.
    fn flush_bookmark(&mut self) {
        if self.view != View::Playing {
            return;
        }
        let Some(item) = self.playlist.get(self.current_index) else {
            return;
        };
        let position = self.engine.position_ms();
        if let Err(e) = self.store.save(&mut self.bookmarks, &item.name, position) {
            warn!(name = %item.name, error = %e, "Bookmark flush failed");
        }
    }

    // ========================================================================
    // Bluetooth
    // ========================================================================

    async fn scan_bluetooth(&mut self) {
        info!("Scanning for Bluetooth devices");
        self.bt_devices = self.router.scan().await;
        if self.bt_devices.is_empty() {
            self.set_notice(NoticeLevel::Error, "ERROR", "No BT Devices");
            self.view = View::Menu;
        } else {
            self.view = View::BtScan;
        }
        self.scroll_index = 0;
    }

    /// Connects a discovered device; the session returns to the menu
    /// whatever the outcome.
    async fn connect_device(&mut self, index: usize) {
        if let Some(device) = self.bt_devices.get(index).cloned() {
            if self.router.connect(&device).await {
                self.set_notice(NoticeLevel::Info, "SUCCESS", "Audio Routed!");
            } else {
                self.set_notice(NoticeLevel::Error, "ERROR", format!("BT Error: {}", device.name));
            }
        }
        self.view = View::Menu;
        self.scroll_index = 0;
    }

    // ========================================================================
    // Read surface
    // ========================================================================

    fn set_notice(&mut self, level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            title: title.into(),
            message: message.into(),
            expires_at: Instant::now() + self.settings.notice_ttl,
        });
    }

    fn window_rows<T>(&self, list: &[T], text: impl Fn(&T) -> String, bookmarked: impl Fn(&T) -> bool) -> Vec<Row> {
        let start = self.scroll_index.saturating_sub(2);
        list.iter()
            .enumerate()
            .skip(start)
            .take(VISIBLE_ROWS)
            .map(|(i, entry)| Row {
                text: text(entry),
                selected: i == self.scroll_index,
                bookmarked: bookmarked(entry),
            })
            .collect()
    }

    /// Pure read of the current state for a renderer
    pub fn snapshot(&self) -> ViewSnapshot {
        let rows = match self.view {
            View::Menu => self.window_rows(&self.menu, |e| e.label().to_string(), |_| false),
            View::Browser => self.window_rows(
                &self.playlist,
                |item| item.name.clone(),
                |item| self.bookmarks.contains_key(&item.name),
            ),
            View::BtScan => self.window_rows(&self.bt_devices, |d| d.name.clone(), |_| false),
            View::Playing => Vec::new(),
        };

        let now_playing = if self.view == View::Playing {
            self.playlist.get(self.current_index).map(|item| {
                let position_ms = self.engine.position_ms();
                // Prefer the catalog's duration; the engine may not know
                // one until well into the stream.
                let duration_ms = item.duration_ms.unwrap_or_else(|| self.engine.duration_ms());
                let progress = if duration_ms > 0 {
                    (position_ms as f32 / duration_ms as f32).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                NowPlaying {
                    name: item.name.clone(),
                    position_ms,
                    duration_ms,
                    progress,
                    paused: self.paused,
                }
            })
        } else {
            None
        };

        ViewSnapshot {
            view: self.view,
            rows,
            now_playing,
            notice: self.notice.clone().filter(|n| !n.expired()),
            link_state: self.router.state(),
        }
    }

    /// Serializable digest for the remote-control surface
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            view_state: self.view,
            current_track: (self.view == View::Playing)
                .then(|| self.playlist.get(self.current_index).map(|i| i.name.clone()))
                .flatten(),
            playlist_length: self.playlist.len(),
            paused: self.paused,
            link_state: self.router.state(),
        }
    }

    /// The menu as shown to the user
    pub fn menu(&self) -> &[MenuEntry] {
        &self.menu
    }

    /// Names of the current playlist, in order
    pub fn playlist_names(&self) -> Vec<String> {
        self.playlist.iter().map(|i| i.name.clone()).collect()
    }

    /// Names of the devices found by the last scan
    pub fn device_names(&self) -> Vec<String> {
        self.bt_devices.iter().map(|d| d.name.clone()).collect()
    }

    /// Current top-level view
    pub fn view(&self) -> View {
        self.view
    }

    /// Cursor position within the visible list
    pub fn scroll_index(&self) -> usize {
        self.scroll_index
    }

    /// Index of the loaded item; meaningful only while playing
    pub fn current_index(&self) -> usize {
        self.current_index
    }
}

/// Case-folded first character of a name, the unit letter jumps work in
fn leading_letter(name: &str) -> Option<char> {
    let first = name.chars().next()?;
    first.to_uppercase().next()
}
