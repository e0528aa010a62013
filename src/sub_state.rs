//! Shared subscriber connection state
//!
//! Written by the background socket task, read by the UI.

/// Subscriber connection state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubState {
    Connecting,
    Connected,
    Disconnected,
    /// Ctrl-C was received; consumers should shut down
    Interrupted,
    Error(String),
}

impl SubState {
    pub fn is_connected(&self) -> bool {
        matches!(self, SubState::Connected)
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, SubState::Interrupted)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubState::Connecting => "Connecting...",
            SubState::Connected => "Connected",
            SubState::Disconnected => "Disconnected",
            SubState::Interrupted => "Interrupted",
            SubState::Error(_) => "Error",
        }
    }
}
