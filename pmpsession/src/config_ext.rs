//! Extension adding session timings and menu toggles to `pmpconfig::Config`

use crate::command::MenuEntry;
use crate::controller::{EndOfPlaylist, SessionSettings};
use anyhow::Result;
use pmpconfig::{Config, impl_bool_config, impl_u64_config};
use std::time::Duration;

/// Extension trait for the `player:` section of the configuration
pub trait SessionConfigExt {
    /// Seconds between periodic bookmark flushes while playing
    fn get_autosave_interval_secs(&self) -> Result<u64>;
    fn set_autosave_interval_secs(&self, value: u64) -> Result<()>;

    /// Milliseconds to let a stream open before seeking it
    fn get_settle_delay_ms(&self) -> Result<u64>;
    fn set_settle_delay_ms(&self, value: u64) -> Result<()>;

    /// Backward seek delta in milliseconds
    fn get_seek_back_ms(&self) -> Result<u64>;
    fn set_seek_back_ms(&self, value: u64) -> Result<()>;

    /// Forward seek delta in milliseconds
    fn get_seek_forward_ms(&self) -> Result<u64>;
    fn set_seek_forward_ms(&self, value: u64) -> Result<()>;

    /// End-of-playlist policy: `loop` or `stop`
    fn get_end_of_playlist(&self) -> Result<EndOfPlaylist>;

    /// Menu feature toggles, one per entry
    fn get_menu_jellyfin(&self) -> Result<bool>;
    fn set_menu_jellyfin(&self, value: bool) -> Result<()>;
    fn get_menu_jellyfin_shuffle(&self) -> Result<bool>;
    fn set_menu_jellyfin_shuffle(&self, value: bool) -> Result<()>;
    fn get_menu_audiobookshelf(&self) -> Result<bool>;
    fn set_menu_audiobookshelf(&self, value: bool) -> Result<()>;
    fn get_menu_local_files(&self) -> Result<bool>;
    fn set_menu_local_files(&self, value: bool) -> Result<()>;
    fn get_menu_local_shuffle(&self) -> Result<bool>;
    fn set_menu_local_shuffle(&self, value: bool) -> Result<()>;
    fn get_menu_bluetooth_pair(&self) -> Result<bool>;
    fn set_menu_bluetooth_pair(&self, value: bool) -> Result<()>;

    /// The menu in display order, honoring the toggles
    fn get_menu_entries(&self) -> Result<Vec<MenuEntry>>;

    /// Assembles the session settings in one call
    fn get_session_settings(&self) -> Result<SessionSettings>;
}

impl SessionConfigExt for Config {
    impl_u64_config!(
        get_autosave_interval_secs,
        set_autosave_interval_secs,
        &["player", "autosave_interval_secs"],
        15
    );

    impl_u64_config!(
        get_settle_delay_ms,
        set_settle_delay_ms,
        &["player", "settle_delay_ms"],
        600
    );

    impl_u64_config!(get_seek_back_ms, set_seek_back_ms, &["player", "seek_back_ms"], 15_000);

    impl_u64_config!(
        get_seek_forward_ms,
        set_seek_forward_ms,
        &["player", "seek_forward_ms"],
        30_000
    );

    impl_bool_config!(get_menu_jellyfin, set_menu_jellyfin, &["player", "menu", "jellyfin"], true);
    impl_bool_config!(
        get_menu_jellyfin_shuffle,
        set_menu_jellyfin_shuffle,
        &["player", "menu", "jellyfin_shuffle"],
        true
    );
    impl_bool_config!(
        get_menu_audiobookshelf,
        set_menu_audiobookshelf,
        &["player", "menu", "audiobookshelf"],
        true
    );
    impl_bool_config!(
        get_menu_local_files,
        set_menu_local_files,
        &["player", "menu", "local_files"],
        true
    );
    impl_bool_config!(
        get_menu_local_shuffle,
        set_menu_local_shuffle,
        &["player", "menu", "local_shuffle"],
        true
    );
    impl_bool_config!(
        get_menu_bluetooth_pair,
        set_menu_bluetooth_pair,
        &["player", "menu", "bluetooth_pair"],
        true
    );

    fn get_end_of_playlist(&self) -> Result<EndOfPlaylist> {
        let raw = match self.get_value(&["player", "end_of_playlist"]) {
            Ok(serde_yaml::Value::String(s)) => s,
            _ => "loop".to_string(),
        };
        Ok(match raw.to_lowercase().as_str() {
            "stop" => EndOfPlaylist::Stop,
            _ => EndOfPlaylist::Loop,
        })
    }

    fn get_menu_entries(&self) -> Result<Vec<MenuEntry>> {
        let mut entries = Vec::new();
        if self.get_menu_jellyfin()? {
            entries.push(MenuEntry::Jellyfin);
        }
        if self.get_menu_jellyfin_shuffle()? {
            entries.push(MenuEntry::JellyfinShuffle);
        }
        if self.get_menu_audiobookshelf()? {
            entries.push(MenuEntry::Audiobookshelf);
        }
        if self.get_menu_local_files()? {
            entries.push(MenuEntry::LocalFiles);
        }
        if self.get_menu_local_shuffle()? {
            entries.push(MenuEntry::LocalShuffle);
        }
        if self.get_menu_bluetooth_pair()? {
            entries.push(MenuEntry::BluetoothPair);
        }
        Ok(entries)
    }

    fn get_session_settings(&self) -> Result<SessionSettings> {
        Ok(SessionSettings {
            autosave_interval: Duration::from_secs(self.get_autosave_interval_secs()?),
            settle_delay: Duration::from_millis(self.get_settle_delay_ms()?),
            seek_back: Duration::from_millis(self.get_seek_back_ms()?),
            seek_forward: Duration::from_millis(self.get_seek_forward_ms()?),
            end_of_playlist: self.get_end_of_playlist()?,
            ..SessionSettings::default()
        })
    }
}

