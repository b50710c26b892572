//! Linear chat history: the simple, non-branching save path.

use crate::core::error::ChatError;
use crate::core::message::Message;
use crate::storage::paths::{self, CHATS_DIR};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistory {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub buddy_name: String,
    #[serde(default)]
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatHistory {
    pub fn new(messages: Vec<Message>, buddy_name: impl Into<String>, model: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            messages,
            buddy_name: buddy_name.into(),
            model: model.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Render as a markdown transcript.
    pub fn to_markdown(&self, exported_at: DateTime<Local>) -> String {
        let mut markdown = String::new();
        let _ = writeln!(markdown, "# Chat with {}\n", self.buddy_name);
        let _ = writeln!(
            markdown,
            "**Date:** {}",
            exported_at.format("%B %-d, %Y %H:%M:%S")
        );
        let _ = writeln!(markdown, "**Model:** {}\n", self.model);
        markdown.push_str("---\n\n");

        for msg in &self.messages {
            let time = msg.timestamp.with_timezone(&Local).format("%H:%M");
            if msg.is_user() {
                let _ = writeln!(markdown, "**You** ({time}):");
            } else {
                let _ = writeln!(markdown, "**{}** ({time}):", self.buddy_name);
            }
            let _ = writeln!(markdown, "{}\n", msg.content);
        }
        markdown
    }
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// The per-user store, `~/.lil_guy_chats`.
    pub fn open_default() -> Result<Self, ChatError> {
        Self::open(paths::data_root()?.join(CHATS_DIR))
    }

    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ChatError> {
        let dir = dir.into();
        paths::ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save under an unused `chat_<timestamp>.json` name and return it.
    pub fn save(&self, history: &mut ChatHistory) -> Result<String, ChatError> {
        let now = Local::now();
        let filename = paths::unused_timestamped_name(&self.dir, "chat", "json", now);
        history.created_at = now.with_timezone(&Utc);
        self.write(history, &filename)?;
        Ok(filename)
    }

    /// Overwrite `filename`, keeping the history's original `created_at`.
    pub fn save_as(&self, history: &mut ChatHistory, filename: &str) -> Result<(), ChatError> {
        self.write(history, filename)
    }

    fn write(&self, history: &mut ChatHistory, filename: &str) -> Result<(), ChatError> {
        if history.messages.is_empty() {
            return Err(ChatError::Empty {
                what: "messages to save",
            });
        }
        let path = paths::resolve_file(&self.dir, filename)?;
        history.updated_at = Utc::now().max(history.created_at);

        let data =
            serde_json::to_vec_pretty(history).map_err(|source| ChatError::Encode { source })?;
        paths::write_file(&path, &data)?;
        debug!(file = %filename, messages = history.messages.len(), "saved chat history");
        Ok(())
    }

    pub fn load(&self, filename: &str) -> Result<ChatHistory, ChatError> {
        let path = paths::resolve_file(&self.dir, filename)?;
        let data =
            fs::read(&path).map_err(|source| ChatError::io("read chat file", &path, source))?;
        serde_json::from_slice(&data).map_err(|source| ChatError::Parse { path, source })
    }

    pub fn list(&self) -> Result<Vec<String>, ChatError> {
        paths::list_files(&self.dir, |name| name.ends_with(".json"))
    }

    /// Write a markdown transcript next to the JSON files and return its name.
    pub fn export_markdown(&self, history: &ChatHistory) -> Result<String, ChatError> {
        if history.messages.is_empty() {
            return Err(ChatError::Empty {
                what: "messages to export",
            });
        }
        let now = Local::now();
        let filename = paths::unused_timestamped_name(&self.dir, "chat", "md", now);
        let path = paths::resolve_file(&self.dir, &filename)?;
        paths::write_file(&path, history.to_markdown(now).as_bytes())?;
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_messages;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn store() -> (TempDir, HistoryStore) {
        let temp = TempDir::new().expect("temp dir");
        let store = HistoryStore::open(temp.path().join("chats")).expect("open store");
        (temp, store)
    }

    #[test]
    fn save_load_round_trip() {
        let (_temp, store) = store();
        let mut history = ChatHistory::new(create_test_messages(), "Buddy", "gpt-4o");

        let name = store.save(&mut history).unwrap();
        assert!(name.starts_with("chat_") && name.ends_with(".json"));

        let loaded = store.load(&name).unwrap();
        assert_eq!(loaded, history);
        assert_eq!(store.list().unwrap(), vec![name]);
    }

    #[test]
    fn back_to_back_saves_get_separate_files() {
        let (_temp, store) = store();
        let mut first = ChatHistory::new(create_test_messages(), "Buddy", "gpt-4o");
        let mut second = ChatHistory::new(vec![Message::user("other")], "Buddy", "gpt-4o");

        let a = store.save(&mut first).unwrap();
        let b = store.save(&mut second).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.list().unwrap().len(), 2);
        assert_eq!(store.load(&a).unwrap().messages.len(), 4);
    }

    #[test]
    fn empty_history_is_not_saved() {
        let (_temp, store) = store();
        let mut history = ChatHistory::new(Vec::new(), "Buddy", "gpt-4o");
        let err = store.save(&mut history).unwrap_err();
        assert!(matches!(err, ChatError::Empty { .. }));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn save_as_overwrites_the_same_file() {
        let (_temp, store) = store();
        let mut history = ChatHistory::new(create_test_messages(), "Buddy", "gpt-4o");
        store.save_as(&mut history, "chat_session.json").unwrap();
        history.messages.push(Message::user("one more"));
        store.save_as(&mut history, "chat_session.json").unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(store.load("chat_session.json").unwrap().messages.len(), 5);
    }

    #[test]
    fn markdown_export_layout() {
        let mut messages = create_test_messages();
        messages.truncate(2);
        let history = ChatHistory::new(messages, "Scholar", "gpt-4o");
        let exported_at = Local.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap();

        let markdown = history.to_markdown(exported_at);

        assert!(markdown.starts_with("# Chat with Scholar\n\n"));
        assert!(markdown.contains("**Date:** January 2, 2024 15:04:05\n"));
        assert!(markdown.contains("**Model:** gpt-4o\n\n---\n\n"));
        assert!(markdown.contains("**You** ("));
        assert!(markdown.contains("):\nHello\n\n"));
        assert!(markdown.contains("**Scholar** ("));
        assert!(markdown.ends_with("Hi there!\n\n"));
    }

    #[test]
    fn export_writes_md_file() {
        let (_temp, store) = store();
        let history = ChatHistory::new(create_test_messages(), "Buddy", "gpt-4o");
        let name = store.export_markdown(&history).unwrap();
        assert!(name.ends_with(".md"));
        let body = fs::read_to_string(store.dir().join(&name)).unwrap();
        assert!(body.contains("I'm doing well"));
        // markdown exports are not chat files
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn loading_missing_chat_is_io_error() {
        let (_temp, store) = store();
        assert!(store.load("chat_missing.json").unwrap_err().is_io());
    }
}
