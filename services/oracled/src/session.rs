//! Tracks the lifecycle of the one coordinator connection.
//!
//! The state is a plain tagged value reassigned atomically: the coordinator
//! is authoritative for phase changes, so there is no guarded transition
//! table to reject them. Only `ShuttingDown` is terminal.

use augur_core::protocol::SessionPhase;
use tracing::debug;
use uuid::Uuid;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Registering,
    Registered(SessionPhase),
    ShuttingDown,
}

/// One client-to-coordinator connection.
///
/// Exactly one session is active per process. It is mutated only by the
/// connection loop and the dispatcher, never concurrently.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    state: SessionState,
    pending_response: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Disconnected,
            pending_response: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// A connect attempt has started.
    pub fn connect_started(&mut self) {
        if self.state == SessionState::ShuttingDown {
            return;
        }
        self.state = SessionState::Connecting;
    }

    /// The transport is established; registration is about to begin.
    pub fn transport_ready(&mut self) {
        if self.state == SessionState::ShuttingDown {
            return;
        }
        self.state = SessionState::Registering;
    }

    /// The coordinator acknowledged registration. A fresh registration
    /// always lands in the asleep phase until the coordinator says otherwise.
    pub fn registered(&mut self) {
        if self.state == SessionState::ShuttingDown {
            return;
        }
        self.state = SessionState::Registered(SessionPhase::Asleep);
    }

    /// Records a coordinator-declared phase, replacing whatever phase was
    /// current. Ignored unless the session is registered.
    pub fn apply_phase(&mut self, phase: SessionPhase) {
        match self.state {
            SessionState::Registered(_) => self.state = SessionState::Registered(phase),
            _ => debug!(?phase, state = ?self.state, "ignoring phase change outside registration"),
        }
    }

    /// The transport dropped. Any in-flight response intent is discarded,
    /// never replayed with stale context; returns whether one was dropped.
    pub fn disconnected(&mut self) -> bool {
        let dropped = self.pending_response;
        self.pending_response = false;
        if self.state != SessionState::ShuttingDown {
            self.state = SessionState::Disconnected;
        }
        dropped
    }

    /// A local shutdown was requested. Terminal.
    pub fn shutting_down(&mut self) {
        self.pending_response = false;
        self.state = SessionState::ShuttingDown;
    }

    pub fn is_registered(&self) -> bool {
        matches!(self.state, SessionState::Registered(_))
    }

    /// Only the interactive phase may produce an audible/physical response.
    pub fn can_respond(&self) -> bool {
        self.state == SessionState::Registered(SessionPhase::Interactive)
    }

    /// Marks a response as built but not yet written to the wire.
    pub fn begin_response(&mut self) {
        self.pending_response = true;
    }

    /// The response reached the transport.
    pub fn response_sent(&mut self) {
        self.pending_response = false;
    }

    pub fn has_pending_response(&self) -> bool {
        self.pending_response
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
