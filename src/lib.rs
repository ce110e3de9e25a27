pub mod app;
pub mod auth;
pub mod call;
pub mod config;
pub mod event;
pub mod menu;
pub mod verify;
pub mod version;

// get timestamp in milliseconds
pub fn get_timestamp() -> u64 {
    let now = std::time::SystemTime::now();
    now.duration_since(std::time::UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
