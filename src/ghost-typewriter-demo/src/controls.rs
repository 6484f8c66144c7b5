//! Playback controls and which of them are available.

use crossterm::event::KeyCode;

/// A playback control bound to one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    Stop,
    Reset,
    Restart,
    Complete,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::Start,
        Control::Stop,
        Control::Reset,
        Control::Restart,
        Control::Complete,
    ];

    pub fn key(self) -> char {
        match self {
            Control::Start => 's',
            Control::Stop => 'p',
            Control::Reset => 'r',
            Control::Restart => 't',
            Control::Complete => 'c',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Control::Start => "start",
            Control::Stop => "pause",
            Control::Reset => "reset",
            Control::Restart => "restart",
            Control::Complete => "complete",
        }
    }

    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Char(c) => Self::ALL.into_iter().find(|control| control.key() == c),
            _ => None,
        }
    }
}

/// Enabled flags for each control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub start: bool,
    pub stop: bool,
    pub reset: bool,
    pub restart: bool,
    pub complete: bool,
}

impl ControlState {
    /// Before anything has run, which is the same as right after a reset.
    pub fn initial() -> Self {
        Self::after(Control::Reset)
    }

    /// Availability once `control` has been applied.
    pub fn after(control: Control) -> Self {
        match control {
            Control::Start | Control::Restart => Self {
                start: false,
                stop: true,
                reset: true,
                restart: true,
                complete: true,
            },
            Control::Stop => Self {
                start: true,
                stop: false,
                reset: true,
                restart: true,
                complete: true,
            },
            Control::Reset => Self {
                start: true,
                stop: false,
                reset: false,
                restart: false,
                complete: true,
            },
            Control::Complete => Self {
                start: false,
                stop: false,
                reset: true,
                restart: true,
                complete: false,
            },
        }
    }

    pub fn is_enabled(&self, control: Control) -> bool {
        match control {
            Control::Start => self.start,
            Control::Stop => self.stop,
            Control::Reset => self.reset,
            Control::Restart => self.restart,
            Control::Complete => self.complete,
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::initial()
    }
}
