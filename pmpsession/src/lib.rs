//! # PMPSession
//!
//! The playback session controller: the finite-state UI/playback engine at
//! the heart of PMPlayer.
//!
//! ## Responsibilities
//!
//! - **View state machine**: `Menu → Browser/BtScan/Playing` transitions
//!   driven by a closed [`Command`] enum
//! - **Playlist ownership**: the current item list, replaced wholesale on
//!   every load, never mutated in place
//! - **Navigation**: clamped linear scrolling and alphabetic letter jumps
//! - **Playback lifecycle**: load/resume/advance with a continuous loop (or
//!   configurable stop) at the end of the playlist
//! - **Durable resume**: bookmark flushing on every track switch plus a
//!   periodic autosave so an unclean shutdown loses bounded progress
//! - **Bluetooth coordination**: scan/connect through `pmpbluetooth`
//!
//! ## Command sources
//!
//! Hardware buttons ([`InputSource`] polled through [`ButtonPoller`]) and
//! the REST surface both funnel into [`SessionController::handle`]. The
//! controller is owned behind `Arc<tokio::sync::Mutex<…>>`, which serializes
//! the two paths: a transition is always complete before the next command,
//! the next tick or a render observes the state.
//!
//! ## Driving
//!
//! The real loop calls [`SessionController::tick`] on a short fixed
//! interval; tests drive the same function manually, so autoplay and
//! autosave behavior is fully observable without timers.

pub mod command;
pub mod config_ext;
pub mod controller;
pub mod engine;
pub mod input;
pub mod view;

pub use command::{Command, MenuEntry};
pub use config_ext::SessionConfigExt;
pub use controller::{EndOfPlaylist, SessionController, SessionSettings, SharedSession};
pub use engine::{EngineError, PlaybackEngine};
pub use input::{Button, ButtonPoller, InputSource};
pub use view::{Notice, NoticeLevel, NowPlaying, Row, SessionStatus, View, ViewSnapshot};
