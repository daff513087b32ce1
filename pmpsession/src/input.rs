//! Button input contract and command mapping
//!
//! The hardware exposes momentary buttons read by level, so the poller
//! keeps a per-button debounce deadline instead of sleeping inside the
//! loop the way a blocking reader would. Left/right are contextual: letter
//! jumps while browsing, seeks while playing.

use crate::command::Command;
use crate::view::View;
use std::time::{Duration, Instant};

/// The fixed button set of the device
///
/// Additional hardware keys exist but are reserved; the core only consumes
/// these six.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Press,
    Back,
}

impl Button {
    const ALL: [Button; 6] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::Press,
        Button::Back,
    ];

    /// Hold-off applied after a registered press
    ///
    /// Navigation repeats fast, selection and back are deliberately slower
    /// so one physical press does not fire twice.
    fn debounce(&self) -> Duration {
        match self {
            Button::Up | Button::Down => Duration::from_millis(150),
            Button::Left | Button::Right => Duration::from_millis(200),
            Button::Press | Button::Back => Duration::from_millis(300),
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// A source of momentary-button state
pub trait InputSource: Send {
    /// Whether the button is currently held down
    fn is_pressed(&self, button: Button) -> bool;
}

/// Maps pressed buttons to session commands with debouncing
pub struct ButtonPoller {
    ready_at: [Instant; 6],
}

impl Default for ButtonPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonPoller {
    pub fn new() -> Self {
        Self {
            ready_at: [Instant::now(); 6],
        }
    }

    /// Reads the input source once and returns the commands to dispatch
    ///
    /// The current view decides what left/right mean; a button inside its
    /// debounce window is ignored.
    pub fn poll(&mut self, input: &dyn InputSource, view: View) -> Vec<Command> {
        let now = Instant::now();
        let mut commands = Vec::new();

        for button in Button::ALL {
            if now < self.ready_at[button.index()] || !input.is_pressed(button) {
                continue;
            }
            if let Some(command) = Self::map(button, view) {
                commands.push(command);
                self.ready_at[button.index()] = now + button.debounce();
            }
        }
        commands
    }

    fn map(button: Button, view: View) -> Option<Command> {
        match button {
            Button::Up => Some(Command::ScrollUp),
            Button::Down => Some(Command::ScrollDown),
            Button::Press => Some(Command::Select),
            Button::Back => Some(Command::Back),
            Button::Left => match view {
                View::Browser => Some(Command::JumpLetterBack),
                View::Playing => Some(Command::SeekBack),
                _ => None,
            },
            Button::Right => match view {
                View::Browser => Some(Command::JumpLetterForward),
                View::Playing => Some(Command::SeekForward),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct HeldButtons(Mutex<HashSet<usize>>);

    impl HeldButtons {
        fn holding(buttons: &[Button]) -> Self {
            Self(Mutex::new(buttons.iter().map(|b| b.index()).collect()))
        }
    }

    impl InputSource for HeldButtons {
        fn is_pressed(&self, button: Button) -> bool {
            self.0.lock().unwrap().contains(&button.index())
        }
    }

    #[test]
    fn test_left_right_are_contextual() {
        let mut poller = ButtonPoller::new();
        let input = HeldButtons::holding(&[Button::Left]);

        assert_eq!(poller.poll(&input, View::Browser), vec![Command::JumpLetterBack]);

        let mut poller = ButtonPoller::new();
        assert_eq!(poller.poll(&input, View::Playing), vec![Command::SeekBack]);

        let mut poller = ButtonPoller::new();
        assert!(poller.poll(&input, View::Menu).is_empty());
    }

    #[test]
    fn test_debounce_suppresses_repeat_within_window() {
        let mut poller = ButtonPoller::new();
        let input = HeldButtons::holding(&[Button::Press]);

        assert_eq!(poller.poll(&input, View::Menu), vec![Command::Select]);
        // Still held on the immediately following poll: nothing fires.
        assert!(poller.poll(&input, View::Menu).is_empty());
    }

    #[test]
    fn test_unheld_buttons_produce_nothing() {
        let mut poller = ButtonPoller::new();
        let input = HeldButtons::holding(&[]);
        assert!(poller.poll(&input, View::Browser).is_empty());
    }
}
