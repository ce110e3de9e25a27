use crate::event::{EventSender, SessionEvent};
use anyhow::{bail, Result};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::sync::RwLock;
use std::time::Duration;
use tokio::select;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Message pushed by the backend once a caller id verification call has
/// been answered and the validation code confirmed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerificationMessage {
    verification: String,
    outgoing_caller_sid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerificationStartResponse {
    validation_code: String,
}

/// Realtime channel to the backend verification service.
///
/// Listens for confirmation messages over a websocket, keeps the last
/// confirmed outgoing caller sid in memory, and broadcasts a
/// `CallerVerified` event whenever a new one arrives. The connection is
/// retried with a fixed delay until the session's cancellation token fires.
pub struct VerificationChannel {
    server_url: String,
    socket_url: String,
    client: reqwest::Client,
    caller_sid: RwLock<Option<String>>,
    event_sender: EventSender,
    cancel_token: CancellationToken,
}

impl VerificationChannel {
    pub fn new(
        server_url: String,
        socket_url: String,
        event_sender: EventSender,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            socket_url,
            client: reqwest::Client::new(),
            caller_sid: RwLock::new(None),
            event_sender,
            cancel_token,
        }
    }

    /// The confirmed outgoing caller id, if the backend has verified one
    /// during this session.
    pub fn outgoing_caller_id(&self) -> Option<String> {
        self.caller_sid.read().unwrap().clone()
    }

    /// Ask the backend to start a verification call to `phone_number`.
    /// Returns the validation code the user must read out when the
    /// verification call is answered; the confirmation itself arrives
    /// later over the realtime channel.
    pub async fn request_verification(
        &self,
        access_token: &str,
        phone_number: &str,
    ) -> Result<String> {
        let url = format!("{}/verify", self.server_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&json!({ "phoneNumber": phone_number }))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("verification returned {} for {}", response.status(), url);
        }
        let started: VerificationStartResponse = response.json().await?;
        info!(phone_number, "verification call requested");
        Ok(started.validation_code)
    }

    /// Run the channel until cancelled, reconnecting on any disconnect.
    pub async fn serve(&self) -> Result<()> {
        loop {
            select! {
                _ = self.cancel_token.cancelled() => {
                    debug!("verification channel shutting down");
                    return Ok(());
                }
                result = self.run_once() => {
                    match result {
                        Ok(()) => debug!("verification channel closed by remote"),
                        Err(e) => warn!("verification channel error: {}", e),
                    }
                }
            }
            select! {
                _ = self.cancel_token.cancelled() => return Ok(()),
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
            }
        }
    }

    async fn run_once(&self) -> Result<()> {
        let (ws_stream, _) = connect_async(self.socket_url.as_str()).await?;
        info!(url = self.socket_url, "verification channel connected");
        let (_, mut receiver) = ws_stream.split();
        while let Some(message) = receiver.next().await {
            match message? {
                Message::Text(text) => {
                    if let Err(e) = self.handle_message(&text) {
                        warn!("ignoring malformed verification message: {}", e);
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_message(&self, text: &str) -> Result<Option<String>> {
        let message: VerificationMessage = serde_json::from_str(text)?;
        if message.verification != "success" {
            debug!(verification = message.verification, "verification not confirmed");
            return Ok(None);
        }
        let sid = message.outgoing_caller_sid;
        info!(caller_sid = sid, "outgoing caller id verified");
        *self.caller_sid.write().unwrap() = Some(sid.clone());
        let _ = self.event_sender.send(SessionEvent::CallerVerified(
            crate::get_timestamp(),
            sid.clone(),
        ));
        Ok(Some(sid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;

    fn channel() -> (VerificationChannel, broadcast::Receiver<SessionEvent>) {
        let (event_sender, events) = broadcast::channel(16);
        (
            VerificationChannel::new(
                "http://localhost:4000".to_string(),
                "ws://localhost:4000".to_string(),
                event_sender,
                CancellationToken::new(),
            ),
            events,
        )
    }

    #[test]
    fn a_success_message_stores_the_sid_and_broadcasts() {
        let (channel, mut events) = channel();
        assert_eq!(channel.outgoing_caller_id(), None);

        let stored = channel
            .handle_message(r#"{"verification":"success","outgoingCallerSid":"PN123"}"#)
            .unwrap();

        assert_eq!(stored.as_deref(), Some("PN123"));
        assert_eq!(channel.outgoing_caller_id().as_deref(), Some("PN123"));
        match events.try_recv().unwrap() {
            SessionEvent::CallerVerified(_, sid) => assert_eq!(sid, "PN123"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn a_failed_verification_is_ignored() {
        let (channel, mut events) = channel();

        let stored = channel
            .handle_message(r#"{"verification":"failed","outgoingCallerSid":"PN999"}"#)
            .unwrap();

        assert_eq!(stored, None);
        assert_eq!(channel.outgoing_caller_id(), None);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn malformed_messages_error_without_touching_state() {
        let (channel, _events) = channel();

        assert!(channel.handle_message("not json").is_err());
        assert!(channel.handle_message(r#"{"verification":"success"}"#).is_err());
        assert_eq!(channel.outgoing_caller_id(), None);
    }

    #[test]
    fn a_new_confirmation_replaces_the_previous_sid() {
        let (channel, _events) = channel();
        channel
            .handle_message(r#"{"verification":"success","outgoingCallerSid":"PN1"}"#)
            .unwrap();
        channel
            .handle_message(r#"{"verification":"success","outgoingCallerSid":"PN2"}"#)
            .unwrap();
        assert_eq!(channel.outgoing_caller_id().as_deref(), Some("PN2"));
    }
}
