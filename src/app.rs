use crate::auth::TokenManager;
use crate::call::{CallDriver, CallManager, CallOption, DigitSink, HttpCallDriver};
use crate::config::Config;
use crate::event::{EventSender, SessionEvent};
use crate::menu::{tree::SUPPORT_MENU, MenuNavigator};
use crate::verify::VerificationChannel;
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct AppStateInner {
    pub config: Arc<Config>,
    pub token: CancellationToken,
    pub token_manager: Arc<TokenManager>,
    pub verification: Arc<VerificationChannel>,
    pub call_manager: Arc<CallManager>,
    pub event_sender: EventSender,
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateBuilder {
    pub config: Option<Config>,
    pub driver: Option<Arc<dyn CallDriver>>,
    pub token: Option<CancellationToken>,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            driver: None,
            token: None,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn driver(mut self, driver: Arc<dyn CallDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn build(self) -> Result<AppState> {
        let config = Arc::new(self.config.unwrap_or_default());
        let token = self.token.unwrap_or_default();
        let (event_sender, _) = broadcast::channel(32);

        let token_manager = Arc::new(TokenManager::new(config.token_url()));
        let driver = self
            .driver
            .unwrap_or_else(|| Arc::new(HttpCallDriver::new(config.server_url.clone())));
        let call_option = config.call.clone().unwrap_or_else(|| CallOption {
            callee: String::new(),
            caller: None,
            extra: None,
        });
        let call_manager = Arc::new(CallManager::new(
            call_option,
            driver,
            token_manager.clone(),
            event_sender.clone(),
        ));
        let verification = Arc::new(VerificationChannel::new(
            config.server_url.clone(),
            config.socket_url(),
            event_sender.clone(),
            token.child_token(),
        ));

        Ok(Arc::new(AppStateInner {
            config,
            token,
            token_manager,
            verification,
            call_manager,
            event_sender,
        }))
    }
}

impl AppStateInner {
    /// Run the interactive session: keep the verification channel alive in
    /// the background and drive the menu navigator from terminal input.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let verification = self.verification.clone();
        tokio::spawn(async move {
            if let Err(e) = verification.serve().await {
                warn!("verification channel terminated: {}", e);
            }
        });

        let mut status_events = self.event_sender.subscribe();
        tokio::spawn(async move {
            while let Ok(event) = status_events.recv().await {
                match event {
                    SessionEvent::CallState(_, state) => println!("[call] {:?}", state),
                    SessionEvent::CallerVerified(_, sid) => println!("[verified] {}", sid),
                    SessionEvent::Error(_, message) => println!("[error] {}", message),
                    _ => {}
                }
            }
        });

        let sink: Arc<dyn DigitSink> = self.call_manager.clone();
        let mut navigator = MenuNavigator::new(&SUPPORT_MENU, sink, self.event_sender.clone());
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            println!();
            for (index, option) in navigator.current_options().iter().enumerate() {
                println!("  {}. {}", index + 1, option.title);
            }
            println!(
                "[1-{}] select  (b)ack{}  (f)orward{}  (c)all  (e)nd  d <digits>  v <number>  (q)uit",
                navigator.current_options().len(),
                if navigator.can_go_back() { "" } else { " -" },
                if navigator.can_go_forward() { "" } else { " -" },
            );

            let line = match lines.next_line().await? {
                Some(line) => line,
                None => break,
            };
            let input = line.trim();
            match input {
                "" => {}
                "q" => break,
                "b" => navigator.go_back(),
                "f" => navigator.go_forward(),
                "c" => {
                    if let Err(e) = self.call_manager.make_call().await {
                        warn!("make call failed: {}", e);
                    }
                }
                "e" => {
                    if let Err(e) = self.call_manager.end_call().await {
                        warn!("end call failed: {}", e);
                    }
                }
                _ => {
                    if let Some(digits) = input.strip_prefix("d ") {
                        self.call_manager.send_digit(digits.trim());
                    } else if let Some(number) = input.strip_prefix("v ") {
                        match self.verify_number(number.trim()).await {
                            Ok(code) => {
                                println!("read this code during the verification call: {}", code)
                            }
                            Err(e) => warn!("verification request failed: {}", e),
                        }
                    } else if let Ok(choice) = input.parse::<usize>() {
                        match choice
                            .checked_sub(1)
                            .and_then(|index| navigator.option_at(index))
                        {
                            Some(option) => {
                                if let Err(e) = navigator.select_option(&option) {
                                    warn!("selection rejected: {}", e);
                                }
                            }
                            None => println!("no such option: {}", choice),
                        }
                    } else {
                        println!("unrecognized input: {}", input);
                    }
                }
            }
        }

        info!("session finished");
        self.token.cancel();
        Ok(())
    }

    async fn verify_number(&self, phone_number: &str) -> Result<String> {
        let access_token = self.token_manager.get_valid_token().await?;
        self.verification
            .request_verification(&access_token, phone_number)
            .await
    }
}
