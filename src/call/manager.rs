use super::{CallDriver, CallOption, CallState, DigitSink};
use crate::auth::TokenManager;
use crate::event::{EventSender, SessionEvent};
use anyhow::Result;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Owns the lifecycle of the outbound call.
///
/// Obtains a valid access token before dialing, tracks the connection
/// state, and broadcasts every state change on the session event bus. Digit
/// transmission is fire-and-forget so the menu navigator is never coupled
/// to call-layer outcomes.
pub struct CallManager {
    option: CallOption,
    driver: Arc<dyn CallDriver>,
    token_manager: Arc<TokenManager>,
    event_sender: EventSender,
    state: RwLock<CallState>,
}

impl CallManager {
    pub fn new(
        option: CallOption,
        driver: Arc<dyn CallDriver>,
        token_manager: Arc<TokenManager>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            option,
            driver,
            token_manager,
            event_sender,
            state: RwLock::new(CallState::Ready),
        }
    }

    pub fn call_state(&self) -> CallState {
        self.state.read().unwrap().clone()
    }

    fn set_state(&self, state: CallState) {
        *self.state.write().unwrap() = state.clone();
        let _ = self
            .event_sender
            .send(SessionEvent::CallState(crate::get_timestamp(), state));
    }

    /// Place the outbound call, refreshing the access token first if the
    /// cached one has expired.
    pub async fn make_call(&self) -> Result<()> {
        let access_token = self.token_manager.get_valid_token().await?;
        info!(callee = self.option.callee, "placing outbound call");
        match self.driver.connect(&access_token, &self.option).await {
            Ok(()) => {
                self.set_state(CallState::Connected);
                Ok(())
            }
            Err(e) => {
                self.set_state(CallState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn end_call(&self) -> Result<()> {
        self.driver.disconnect().await?;
        self.set_state(CallState::Disconnected);
        Ok(())
    }
}

impl DigitSink for CallManager {
    fn send_digit(&self, digits: &str) {
        let driver = self.driver.clone();
        let event_sender = self.event_sender.clone();
        let digits = digits.to_string();
        let _ = event_sender.send(SessionEvent::Dtmf(
            crate::get_timestamp(),
            digits.clone(),
        ));
        tokio::spawn(async move {
            if let Err(e) = driver.send_digits(&digits).await {
                warn!(digits, "failed to transmit digits: {}", e);
            }
        });
    }
}
