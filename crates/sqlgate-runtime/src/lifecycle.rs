//! Session states.
//!
//! ```text
//! Uninitialized ──▶ Starting ──▶ Ready ──▶ ShuttingDown ──▶ Stopped
//!                      │
//!                      └──▶ Failed
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Uninitialized,
    /// Tunnel, database check and translator are being brought up.
    Starting,
    /// Serving tool calls.
    Ready,
    ShuttingDown,
    Stopped,
    /// Startup failed; the tunnel has already been torn down.
    Failed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Starting => "starting",
            SessionState::Ready => "ready",
            SessionState::ShuttingDown => "shutting down",
            SessionState::Stopped => "stopped",
            SessionState::Failed => "failed",
        }
    }

    /// No further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Stopped | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
