use crate::auth::TokenManager;
use crate::call::{CallDriver, CallManager, CallOption, CallState, DigitSink};
use crate::event::SessionEvent;
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

#[derive(Default)]
struct MockDriver {
    fail_connect: bool,
    connected: AtomicBool,
    digits: Mutex<Vec<String>>,
    tokens: Mutex<Vec<String>>,
}

impl MockDriver {
    fn failing() -> Self {
        Self {
            fail_connect: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl CallDriver for MockDriver {
    async fn connect(&self, access_token: &str, _option: &CallOption) -> Result<()> {
        self.tokens.lock().unwrap().push(access_token.to_string());
        if self.fail_connect {
            bail!("carrier rejected the call");
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn send_digits(&self, digits: &str) -> Result<()> {
        self.digits.lock().unwrap().push(digits.to_string());
        Ok(())
    }
}

fn seeded_token_manager() -> Arc<TokenManager> {
    let token = crate::auth::make_token(Utc::now().timestamp() + 3600);
    Arc::new(TokenManager::with_token(
        "http://127.0.0.1:1/accessToken".to_string(),
        token,
    ))
}

fn manager_with(driver: Arc<MockDriver>) -> (CallManager, broadcast::Receiver<SessionEvent>) {
    let (event_sender, events) = broadcast::channel(16);
    let option = CallOption {
        callee: "+18887643771".to_string(),
        caller: None,
        extra: None,
    };
    (
        CallManager::new(option, driver, seeded_token_manager(), event_sender),
        events,
    )
}

#[tokio::test]
async fn make_call_connects_and_broadcasts_the_state_change() {
    let driver = Arc::new(MockDriver::default());
    let (manager, mut events) = manager_with(driver.clone());

    assert_eq!(manager.call_state(), CallState::Ready);
    manager.make_call().await.unwrap();

    assert!(driver.connected.load(Ordering::SeqCst));
    assert_eq!(manager.call_state(), CallState::Connected);
    match events.recv().await.unwrap() {
        SessionEvent::CallState(_, state) => assert_eq!(state, CallState::Connected),
        other => panic!("unexpected event {:?}", other),
    }
    // the driver was handed the cached token
    assert_eq!(driver.tokens.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn a_rejected_call_reports_failed_with_the_reason() {
    let driver = Arc::new(MockDriver::failing());
    let (manager, mut events) = manager_with(driver);

    assert!(manager.make_call().await.is_err());

    match manager.call_state() {
        CallState::Failed(reason) => assert!(reason.contains("carrier rejected")),
        other => panic!("unexpected state {:?}", other),
    }
    match events.recv().await.unwrap() {
        SessionEvent::CallState(_, CallState::Failed(_)) => {}
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn end_call_disconnects() {
    let driver = Arc::new(MockDriver::default());
    let (manager, _events) = manager_with(driver.clone());
    manager.make_call().await.unwrap();

    manager.end_call().await.unwrap();

    assert!(!driver.connected.load(Ordering::SeqCst));
    assert_eq!(manager.call_state(), CallState::Disconnected);
}

#[tokio::test]
async fn send_digit_is_fire_and_forget() {
    let driver = Arc::new(MockDriver::default());
    let (manager, mut events) = manager_with(driver.clone());
    manager.make_call().await.unwrap();
    let _ = events.recv().await.unwrap(); // connected

    manager.send_digit("1#");

    // the Dtmf event is broadcast before the async transmission completes
    match events.recv().await.unwrap() {
        SessionEvent::Dtmf(_, digits) => assert_eq!(digits, "1#"),
        other => panic!("unexpected event {:?}", other),
    }
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            if *driver.digits.lock().unwrap() == ["1#"] {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("digits never reached the driver");
}
