use super::CallOption;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::RwLock;
use std::time::Instant;
use tracing::info;

/// The opaque telephony capability the client drives.
///
/// Connect/disconnect/digit transmission against whatever actually carries
/// the voice call; the rest of the crate never sees past this trait.
#[async_trait]
pub trait CallDriver: Send + Sync {
    async fn connect(&self, access_token: &str, option: &CallOption) -> Result<()>;
    async fn disconnect(&self) -> Result<()>;
    async fn send_digits(&self, digits: &str) -> Result<()>;
}

/// Call driver backed by the backend call-control endpoints.
///
/// The backend owns the actual telephony leg; this driver only triggers it
/// and relays DTMF, keyed by the call sid returned on connect.
pub struct HttpCallDriver {
    base_url: String,
    client: Client,
    call_sid: RwLock<Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectResponse {
    call_sid: Option<String>,
}

impl HttpCallDriver {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            call_sid: RwLock::new(None),
        }
    }

    fn current_call_sid(&self) -> Result<String> {
        self.call_sid
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("no active call"))
    }
}

#[async_trait]
impl CallDriver for HttpCallDriver {
    async fn connect(&self, access_token: &str, option: &CallOption) -> Result<()> {
        let url = format!("{}/makeCall", self.base_url);
        let mut payload = json!({ "to": option.callee });
        if let Some(caller) = &option.caller {
            payload["from"] = json!(caller);
        }
        if let Some(extra) = &option.extra {
            for (key, value) in extra {
                payload[key] = json!(value);
            }
        }

        let start_time = Instant::now();
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("call control returned {} for {}", response.status(), url);
        }
        let connect: ConnectResponse = response.json().await?;
        info!(
            url,
            callee = option.callee,
            call_sid = ?connect.call_sid,
            elapsed = start_time.elapsed().as_millis(),
            "outbound call placed"
        );
        *self.call_sid.write().unwrap() = connect.call_sid;
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let call_sid = self.current_call_sid()?;
        let url = format!("{}/endCall", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "callSid": call_sid }))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("call control returned {} for {}", response.status(), url);
        }
        *self.call_sid.write().unwrap() = None;
        info!(call_sid, "call ended");
        Ok(())
    }

    async fn send_digits(&self, digits: &str) -> Result<()> {
        let call_sid = self.current_call_sid()?;
        let url = format!("{}/sendDigits", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "callSid": call_sid, "digits": digits }))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("call control returned {} for {}", response.status(), url);
        }
        Ok(())
    }
}
