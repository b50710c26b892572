use crate::core::message::{Message, Role};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, MutexGuard, OnceLock};

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Serializes tests that touch process environment variables and restores
/// the previous values on drop.
pub struct TestEnvVarGuard {
    saved: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl TestEnvVarGuard {
    pub fn new() -> Self {
        let lock = env_lock().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Self {
            saved: Vec::new(),
            _lock: lock,
        }
    }

    pub fn set_var(&mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) {
        self.remember(key.as_ref());
        std::env::set_var(key, value);
    }

    pub fn remove_var(&mut self, key: impl AsRef<OsStr>) {
        self.remember(key.as_ref());
        std::env::remove_var(key);
    }

    fn remember(&mut self, key: &OsStr) {
        if self.saved.iter().all(|(saved, _)| saved != key) {
            self.saved.push((key.to_os_string(), std::env::var_os(key)));
        }
    }
}

impl Drop for TestEnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..).rev() {
            match value {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
}

pub fn create_test_message(role: Role, content: &str) -> Message {
    Message::new(role, content).with_timestamp(base_time())
}

pub fn create_test_messages() -> Vec<Message> {
    let start = base_time();
    vec![
        Message::user("Hello").with_timestamp(start),
        Message::assistant("Hi there!")
            .with_model("gpt-4o")
            .with_timestamp(start + Duration::seconds(5)),
        Message::user("How are you?").with_timestamp(start + Duration::seconds(30)),
        Message::assistant("I'm doing well, thank you for asking!")
            .with_model("gpt-4o")
            .with_timestamp(start + Duration::seconds(35)),
    ]
}
