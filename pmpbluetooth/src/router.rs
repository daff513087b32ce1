//! Bluetooth discovery, pairing and audio-sink routing
//!
//! The connect pipeline walks `Idle → Powering → Pairing → Connecting →
//! Routing → Routed`, with `Failed` reachable from any non-idle state.
//! Trust and pair are best-effort steps: several stacks auto-trust on
//! connect, so their failure does not abort the sequence. The connect step
//! is authoritative.
//!
//! After a successful link the sink list is polled on a fixed interval with
//! a fixed attempt budget. The wait window is known (the audio subsystem
//! needs a few seconds of real wall-clock time on a slow CPU), so plain
//! fixed delays are used, not exponential backoff.

use crate::runner::{CommandOutput, CommandRunner};
use pmpstore::{BtDevice, DeviceMemory};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connect-pipeline state, observable for status displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Idle,
    Powering,
    Pairing,
    Connecting,
    Routing,
    Routed,
    Failed,
}

/// Tuning knobs of the router, usually read from the configuration
#[derive(Debug, Clone)]
pub struct RouterSettings {
    /// Discovery window passed to `bluetoothctl scan`
    pub scan_window: Duration,
    /// Hard timeout applied to every external command
    pub command_timeout: Duration,
    /// How many times the sink list is polled after a connect
    pub sink_poll_attempts: u32,
    /// Delay between two sink polls
    pub sink_poll_delay: Duration,
    /// Volume applied to a freshly routed sink (PipeWire defaults low)
    pub sink_volume: String,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            scan_window: Duration::from_secs(5),
            command_timeout: Duration::from_secs(15),
            sink_poll_attempts: 5,
            sink_poll_delay: Duration::from_secs(2),
            sink_volume: "80%".to_string(),
        }
    }
}

/// Bluetooth output-device acquisition state machine
///
/// Owns the process-executor capability and the last-device memory; the
/// session calls it on Bluetooth-related transitions and at startup for the
/// best-effort reconnect.
pub struct AudioRouter {
    runner: Box<dyn CommandRunner>,
    memory: DeviceMemory,
    settings: RouterSettings,
    state: LinkState,
}

impl AudioRouter {
    /// Creates a router over the given executor and device memory
    pub fn new(runner: Box<dyn CommandRunner>, memory: DeviceMemory, settings: RouterSettings) -> Self {
        Self {
            runner,
            memory,
            settings,
            state: LinkState::Idle,
        }
    }

    /// Current pipeline state
    pub fn state(&self) -> LinkState {
        self.state
    }

    async fn run(&self, command: &str) -> CommandOutput {
        self.runner.run(command, self.settings.command_timeout).await
    }

    /// Makes sure the controller is powered
    ///
    /// `rfkill` needs root on the target image; the session user has a
    /// matching sudoers entry.
    async fn ensure_power(&self) {
        self.run("sudo rfkill unblock bluetooth").await;
        self.run("bluetoothctl power on").await;
    }

    /// Runs discovery for the configured window and returns what was found
    ///
    /// An empty result is a normal outcome, not an error.
    pub async fn scan(&self) -> Vec<BtDevice> {
        self.ensure_power().await;

        let window = self.settings.scan_window.as_secs();
        let scan = format!("bluetoothctl --timeout {window} scan on");
        // The scan command itself blocks for the whole window, so it gets
        // the window on top of the usual budget.
        self.runner
            .run(&scan, self.settings.scan_window + self.settings.command_timeout)
            .await;

        let listing = self.run("bluetoothctl devices").await;
        let devices = parse_devices(&listing.output);
        info!(count = devices.len(), "Bluetooth scan finished");
        devices
    }

    /// Connects to a device and routes audio to its sink
    ///
    /// Returns `true` only when the full pipeline succeeded through
    /// routing. The `{mac, name}` record is persisted as soon as the link
    /// itself is up: even when the sink never materializes, reconnection is
    /// still desirable on next boot, so routing failure does not roll the
    /// record back.
    ///
    /// Calling this for an already-connected device is safe and simply
    /// re-runs routing.
    pub async fn connect(&mut self, device: &BtDevice) -> bool {
        info!(mac = %device.mac, name = %device.name, "Connecting Bluetooth device");

        self.state = LinkState::Powering;
        self.ensure_power().await;

        // Trust and pair are best-effort: some stacks auto-trust on
        // connect, and re-pairing an already-paired device fails benignly.
        self.state = LinkState::Pairing;
        self.run(&format!("bluetoothctl trust {}", device.mac)).await;
        self.run(&format!("bluetoothctl pair {}", device.mac)).await;

        self.state = LinkState::Connecting;
        let connect = self.run(&format!("bluetoothctl connect {}", device.mac)).await;
        if !connect.success {
            warn!(mac = %device.mac, output = %connect.output, "Bluetooth link failed");
            self.state = LinkState::Failed;
            return false;
        }

        info!("Bluetooth link established, waiting for audio sink");
        if let Err(e) = self.memory.save(device) {
            warn!(error = %e, "Could not persist last Bluetooth device");
        }

        self.state = LinkState::Routing;
        let routed = self.route_sink().await;
        self.state = if routed { LinkState::Routed } else { LinkState::Failed };
        routed
    }

    /// Replays the connect sequence against the remembered device
    ///
    /// Runs at startup; absence of a record or any failure returns `false`
    /// without raising, and every step stays timeout-bounded.
    pub async fn auto_connect_last(&mut self) -> bool {
        match self.memory.load() {
            Some(device) => {
                info!(name = %device.name, "Auto-connecting last Bluetooth device");
                self.connect(&device).await
            }
            None => {
                debug!("No remembered Bluetooth device, skipping auto-connect");
                false
            }
        }
    }

    /// Polls for the Bluetooth sink and makes it the default output
    ///
    /// Sink negotiation is slower than the Bluetooth link, so the poll is
    /// required, not optional.
    async fn route_sink(&self) -> bool {
        for attempt in 1..=self.settings.sink_poll_attempts {
            let listing = self
                .run("pactl list short sinks | grep bluez_output | cut -f2")
                .await;
            let sink = listing.output.lines().next().unwrap_or("").trim().to_string();

            if !sink.is_empty() {
                info!(sink = %sink, attempt, "Bluetooth sink found, routing audio");
                self.run(&format!("pactl set-default-sink {sink}")).await;
                self.run(&format!(
                    "pactl set-sink-volume {sink} {}",
                    self.settings.sink_volume
                ))
                .await;
                // Migrate any stream that is already playing to the speaker.
                self.run(&format!(
                    "pactl list short sink-inputs | cut -f1 | xargs -I{{}} pactl move-sink-input {{}} {sink}"
                ))
                .await;
                return true;
            }

            debug!(attempt, max = self.settings.sink_poll_attempts, "Sink not present yet");
            if attempt < self.settings.sink_poll_attempts {
                tokio::time::sleep(self.settings.sink_poll_delay).await;
            }
        }

        warn!("Bluetooth sink never appeared within the retry budget");
        false
    }
}

/// Parses `bluetoothctl devices` output
///
/// Expected line shape: `Device AA:BB:CC:DD:EE:FF Some Name`.
fn parse_devices(output: &str) -> Vec<BtDevice> {
    output
        .lines()
        .filter(|line| line.starts_with("Device"))
        .filter_map(|line| {
            let mut parts = line.splitn(3, ' ');
            parts.next(); // "Device"
            let mac = parts.next()?;
            let name = parts.next()?;
            Some(BtDevice {
                mac: mac.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}
