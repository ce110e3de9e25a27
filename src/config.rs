use crate::call::CallOption;
use anyhow::Error;
use clap::Parser;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    #[clap(long, default_value = "callem.toml")]
    pub conf: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the backend (token endpoint, call control, verification)
    pub server_url: String,
    /// Realtime channel endpoint; derived from server_url when unset
    pub socket_url: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    pub call: Option<CallOption>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:4000".to_string(),
            socket_url: None,
            log_level: Some("info".to_string()),
            log_file: None,
            call: Some(CallOption {
                callee: "+18887643771".to_string(),
                caller: None,
                extra: None,
            }),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Error> {
        let config = toml::from_str(
            &std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("{}: {}", e, path))?,
        )?;
        Ok(config)
    }

    pub fn token_url(&self) -> String {
        format!("{}/accessToken", self.server_url.trim_end_matches('/'))
    }

    pub fn socket_url(&self) -> String {
        match &self.socket_url {
            Some(url) => url.clone(),
            None => self
                .server_url
                .replace("https://", "wss://")
                .replace("http://", "ws://"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_local_backend() {
        let config = Config::default();
        assert_eq!(config.token_url(), "http://localhost:4000/accessToken");
        assert_eq!(config.socket_url(), "ws://localhost:4000");
        assert_eq!(config.call.unwrap().callee, "+18887643771");
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let missing = Config::load("/nonexistent/callem.toml");
        assert!(missing.unwrap_err().to_string().contains("callem.toml"));

        let path = std::env::temp_dir().join("callem-malformed.toml");
        std::fs::write(&path, "server_url = [not toml").unwrap();
        assert!(Config::load(path.to_str().unwrap()).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn config_parses_from_toml() {
        let config: Config = toml::from_str(
            r#"
            server_url = "https://calls.example.com"
            log_level = "debug"

            [call]
            callee = "+15550100"
            caller = "+15550199"
            "#,
        )
        .unwrap();
        assert_eq!(config.socket_url(), "wss://calls.example.com");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        let call = config.call.unwrap();
        assert_eq!(call.callee, "+15550100");
        assert_eq!(call.caller.as_deref(), Some("+15550199"));
    }
}
