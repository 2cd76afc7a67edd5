//! Connection state machine
//!
//! ```text
//! NotInitialized --open--> Connecting --connected--> Open
//! Connecting | Open --close--> Closing
//! Connecting | Open | Closing --disconnected--> Closed
//! ```
//!
//! Any state may be reset to `Connecting` by a fresh `open`. Errors never
//! change the state.

use oscroute_core::TransportState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateMachine {
    state: TransportState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    /// A new connection attempt starts
    pub fn open_requested(&mut self) {
        self.state = TransportState::Connecting;
    }

    /// Returns `false` when there is nothing to close
    pub fn close_requested(&mut self) -> bool {
        match self.state {
            TransportState::Connecting | TransportState::Open => {
                self.state = TransportState::Closing;
                true
            }
            _ => false,
        }
    }

    /// Underlying connection came up
    pub fn connected(&mut self) -> bool {
        self.transition(TransportState::Connecting, TransportState::Open)
    }

    /// Underlying connection went away, solicited or not
    pub fn disconnected(&mut self) -> bool {
        match self.state {
            TransportState::Connecting | TransportState::Open | TransportState::Closing => {
                self.state = TransportState::Closed;
                true
            }
            _ => false,
        }
    }

    fn transition(&mut self, from: TransportState, to: TransportState) -> bool {
        if self.state == from {
            self.state = to;
            true
        } else {
            false
        }
    }
}
