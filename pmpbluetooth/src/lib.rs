//! # PMPBluetooth
//!
//! Bluetooth output-device acquisition for PMPlayer, built on the BlueZ and
//! PipeWire command-line tools (`bluetoothctl`, `pactl`, `rfkill`).
//!
//! The interesting part is not the pairing handshake but what follows it:
//! on the target hardware the audio subsystem registers a new sink several
//! seconds *after* the Bluetooth link is up, so [`AudioRouter::connect`]
//! polls the sink list with a bounded, fixed-interval retry budget before
//! routing audio to it.
//!
//! All external commands go through the [`CommandRunner`] capability so the
//! whole state machine is testable without hardware; every invocation is
//! individually timeout-bounded and can therefore never wedge the session.

pub mod config_ext;
pub mod router;
pub mod runner;

pub use config_ext::BluetoothConfigExt;
pub use router::{AudioRouter, LinkState, RouterSettings};
pub use runner::{CommandOutput, CommandRunner, ShellRunner};
