//! Per-user bot sessions
//!
//! Ephemeral interaction state for the Telegram front end: whether a user's
//! next message is the new value, or whether a clear is pending
//! confirmation. Lives only in process memory.

use std::collections::HashMap;

/// Upper bound on tracked users; idle entries are evicted past this
const SESSION_CAP: usize = 1024;

/// Interaction state for one bot user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// Next text message is submitted as the new slot value
    AwaitingData,
    /// A clear was requested and needs confirm/deny
    AwaitingClearConfirm,
}

/// Events a session reacts to. Out-of-state events are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    UpdateRequested,
    TextReceived,
    Cancel,
    ClearRequested,
    ClearConfirmed,
    ClearDenied,
}

impl SessionState {
    /// Apply an event, returning the next state. Invalid transitions leave
    /// the state unchanged.
    pub fn apply(self, event: SessionEvent) -> SessionState {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (Idle, UpdateRequested) => AwaitingData,
            (AwaitingData, TextReceived) => Idle,
            (AwaitingData, Cancel) => Idle,
            (Idle, ClearRequested) => AwaitingClearConfirm,
            (AwaitingClearConfirm, ClearConfirmed) => Idle,
            (AwaitingClearConfirm, ClearDenied) => Idle,
            (AwaitingClearConfirm, Cancel) => Idle,
            (state, _) => state,
        }
    }
}

/// Session states keyed by Telegram user id.
///
/// Bounded: when full, idle entries are dropped to make room; a stateful
/// transition for a brand-new user is refused only if every tracked user is
/// mid-interaction.
#[derive(Debug, Default)]
pub struct SessionMap {
    sessions: HashMap<u64, SessionState>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: u64) -> SessionState {
        self.sessions.get(&user_id).copied().unwrap_or_default()
    }

    /// Apply an event to a user's session and return the new state.
    pub fn apply(&mut self, user_id: u64, event: SessionEvent) -> SessionState {
        let current = self.get(user_id);
        let next = current.apply(event);

        if next == SessionState::Idle {
            // Idle is the default; no need to keep an entry around
            self.sessions.remove(&user_id);
            return next;
        }

        if !self.sessions.contains_key(&user_id) && self.sessions.len() >= SESSION_CAP {
            self.evict_idle();
            if self.sessions.len() >= SESSION_CAP {
                return current;
            }
        }

        self.sessions.insert(user_id, next);
        next
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn evict_idle(&mut self) {
        self.sessions.retain(|_, state| *state != SessionState::Idle);
    }
}
