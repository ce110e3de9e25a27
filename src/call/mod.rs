use serde::{Deserialize, Serialize};
use std::collections::HashMap;

mod driver;
mod manager;
#[cfg(test)]
mod tests;
pub use driver::CallDriver;
pub use driver::HttpCallDriver;
pub use manager::CallManager;

/// Connection state of the outbound call, as reported by the call layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    /// No call in progress, ready to dial
    Ready,
    Connected,
    Disconnected,
    Failed(String), // reason
}

/// Dialing parameters handed to the call driver.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CallOption {
    /// Number the call is placed to
    pub callee: String,
    /// Verified outgoing caller id, when one has been confirmed
    pub caller: Option<String>,
    /// Extra parameters forwarded to the backend untouched
    pub extra: Option<HashMap<String, String>>,
}

/// Seam through which menu navigation hands DTMF digits to the call layer.
///
/// Transmission is fire-and-forget: implementations must not block and no
/// failure is reported back, so the navigator's display state advances
/// independently of call-layer outcomes.
pub trait DigitSink: Send + Sync {
    fn send_digit(&self, digits: &str);
}
