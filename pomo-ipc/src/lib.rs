//! Shared session vocabulary and inter-process communication between
//! pomo and pomoctl.
//!
//! We use Unix domain sockets for local IPC - they're fast, secure,
//! and perfect for this use case.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of session the countdown is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    /// Duration assigned when a session of this kind begins.
    pub const fn duration_secs(&self) -> u32 {
        match self {
            Self::Work => 25 * 60,
            Self::ShortBreak => 5 * 60,
            Self::LongBreak => 15 * 60,
        }
    }

    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    pub const fn is_break(&self) -> bool {
        matches!(self, Self::ShortBreak | Self::LongBreak)
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One finished focus activity, in completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedActivity {
    pub name: String,
    pub completed_at: DateTime<Local>,
}

/// Read-only view of the session controller, shared with every
/// presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub kind: SessionKind,
    pub remaining_seconds: u32,
    pub is_running: bool,
    pub completed_work_sessions: u32,
    pub current_activity: String,
    pub completed_activities: Vec<CompletedActivity>,
}

/// Commands that pomoctl can send to pomo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    Start,
    Pause,
    Reset,
    SetActivity { name: String },
    Status,
    History,
}

/// Responses from pomo back to pomoctl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    Ok,
    Status(SessionSnapshot),
    History(Vec<CompletedActivity>),
    Error(String),
}

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection refused - is pomo running?")]
    ConnectionRefused,
}

pub const SOCKET_PATH: &str = "/tmp/pomo.sock";
