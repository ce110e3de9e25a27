use crate::call::CallState;
use serde::{Deserialize, Serialize};

/// SessionEvent represents different types of events that can occur during a call session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Call connection state changed
    #[serde(rename = "call_state")]
    CallState(u64, CallState), // timestamp, state

    /// DTMF digits were handed to the call layer
    #[serde(rename = "dtmf")]
    Dtmf(u64, String), // timestamp, digits

    /// The displayed menu sibling group changed
    #[serde(rename = "menu_changed")]
    MenuChanged(u64, usize), // timestamp, option count

    /// The backend confirmed a verified outgoing caller id
    #[serde(rename = "caller_verified")]
    CallerVerified(u64, String), // timestamp, caller sid

    /// Error event
    #[serde(rename = "error")]
    Error(u64, String), // timestamp, error message
}

impl SessionEvent {
    pub fn timestamp(&self) -> u64 {
        match self {
            SessionEvent::CallState(timestamp, _) => *timestamp,
            SessionEvent::Dtmf(timestamp, _) => *timestamp,
            SessionEvent::MenuChanged(timestamp, _) => *timestamp,
            SessionEvent::CallerVerified(timestamp, _) => *timestamp,
            SessionEvent::Error(timestamp, _) => *timestamp,
        }
    }
}

/// Type alias for the event sender
pub type EventSender = tokio::sync::broadcast::Sender<SessionEvent>;

/// Type alias for the event receiver
pub type EventReceiver = tokio::sync::broadcast::Receiver<SessionEvent>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_carry_full_wall_clock_timestamps() {
        let now = crate::get_timestamp();
        // epoch milliseconds exceed u32 range; they must survive untouched
        assert!(now > u32::MAX as u64);
        let event = SessionEvent::Dtmf(now, "1".to_string());
        assert_eq!(event.timestamp(), now);

        let event = SessionEvent::CallerVerified(now, "PN123".to_string());
        assert_eq!(event.timestamp(), now);
    }
}
