use crate::error::ClientError;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a client. Operations are only accepted while `Running`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Created,
    Running,
    Stopped,
}

impl ClientState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ClientState::Created,
            1 => ClientState::Running,
            _ => ClientState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ClientState::Created => 0,
            ClientState::Running => 1,
            ClientState::Stopped => 2,
        }
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientState::Created => f.write_str("created"),
            ClientState::Running => f.write_str("running"),
            ClientState::Stopped => f.write_str("stopped"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(ClientState::Created.as_u8()),
        }
    }

    pub(crate) fn state(&self) -> ClientState {
        ClientState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Created -> Running. A stopped client stays stopped
    pub(crate) fn start(&self) -> ClientState {
        let _ = self.state.compare_exchange(
            ClientState::Created.as_u8(),
            ClientState::Running.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.state()
    }

    /// returns the state held before stopping
    pub(crate) fn stop(&self) -> ClientState {
        ClientState::from_u8(
            self.state
                .swap(ClientState::Stopped.as_u8(), Ordering::AcqRel),
        )
    }

    /// Entry guard shared by every public operation
    pub(crate) fn ensure_running(&self, operation: &'static str) -> Result<(), ClientError> {
        match self.state() {
            ClientState::Running => Ok(()),
            state => {
                log::debug!("Rejected {operation} on {state} client");
                Err(ClientError::NotRunning { operation, state })
            }
        }
    }
}
