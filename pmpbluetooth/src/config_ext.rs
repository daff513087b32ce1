//! Extension adding Bluetooth tuning to `pmpconfig::Config`

use crate::router::RouterSettings;
use anyhow::Result;
use pmpconfig::{Config, impl_string_config, impl_u64_config};
use std::time::Duration;

/// Extension trait for the `bluetooth:` section of the configuration
///
/// Defaults match the target hardware: a Pi-class CPU where the audio
/// subsystem takes a few seconds to register a freshly connected sink.
pub trait BluetoothConfigExt {
    /// Discovery window in seconds
    fn get_bt_scan_window_secs(&self) -> Result<u64>;
    fn set_bt_scan_window_secs(&self, value: u64) -> Result<()>;

    /// Hard timeout applied to every external command, in seconds
    fn get_bt_command_timeout_secs(&self) -> Result<u64>;
    fn set_bt_command_timeout_secs(&self, value: u64) -> Result<()>;

    /// Sink-poll attempt budget after a connect
    fn get_bt_sink_poll_attempts(&self) -> Result<u64>;
    fn set_bt_sink_poll_attempts(&self, value: u64) -> Result<()>;

    /// Delay between two sink polls, in seconds
    fn get_bt_sink_poll_delay_secs(&self) -> Result<u64>;
    fn set_bt_sink_poll_delay_secs(&self, value: u64) -> Result<()>;

    /// Volume applied to a freshly routed sink
    fn get_bt_sink_volume(&self) -> Result<String>;
    fn set_bt_sink_volume(&self, value: String) -> Result<()>;

    /// Assembles the router settings in one call
    fn get_router_settings(&self) -> Result<RouterSettings>;
}

impl BluetoothConfigExt for Config {
    impl_u64_config!(
        get_bt_scan_window_secs,
        set_bt_scan_window_secs,
        &["bluetooth", "scan_window_secs"],
        5
    );

    impl_u64_config!(
        get_bt_command_timeout_secs,
        set_bt_command_timeout_secs,
        &["bluetooth", "command_timeout_secs"],
        15
    );

    impl_u64_config!(
        get_bt_sink_poll_attempts,
        set_bt_sink_poll_attempts,
        &["bluetooth", "sink_poll_attempts"],
        5
    );

    impl_u64_config!(
        get_bt_sink_poll_delay_secs,
        set_bt_sink_poll_delay_secs,
        &["bluetooth", "sink_poll_delay_secs"],
        2
    );

    impl_string_config!(
        get_bt_sink_volume,
        set_bt_sink_volume,
        &["bluetooth", "sink_volume"],
        "80%"
    );

    fn get_router_settings(&self) -> Result<RouterSettings> {
        Ok(RouterSettings {
            scan_window: Duration::from_secs(self.get_bt_scan_window_secs()?),
            command_timeout: Duration::from_secs(self.get_bt_command_timeout_secs()?),
            sink_poll_attempts: self.get_bt_sink_poll_attempts()? as u32,
            sink_poll_delay: Duration::from_secs(self.get_bt_sink_poll_delay_secs()?),
            sink_volume: self.get_bt_sink_volume()?,
        })
    }
}
