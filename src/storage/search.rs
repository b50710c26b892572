//! Case-insensitive text search over everything saved on disk.
//!
//! Files that cannot be read or parsed are skipped rather than failing the
//! whole search; only an unreadable store directory is an error.

use crate::core::error::ChatError;
use crate::core::message::Message;
use crate::storage::history::HistoryStore;
use crate::storage::trees::TreeStore;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHit {
    pub file: String,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointHit {
    pub file: String,
    pub branch_id: String,
    pub checkpoint_id: String,
    pub checkpoint_name: String,
    pub message: Message,
}

fn matches(message: &Message, needle: &str) -> bool {
    !message.is_system() && message.content.to_lowercase().contains(needle)
}

/// Every non-system message in saved chats containing `query`.
pub fn search_chats(store: &HistoryStore, query: &str) -> Result<Vec<ChatHit>, ChatError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let needle = query.to_lowercase();

    let mut hits = Vec::new();
    for file in store.list()? {
        let history = match store.load(&file) {
            Ok(history) => history,
            Err(err) => {
                debug!(file = %file, error = %err, "skipping chat during search");
                continue;
            }
        };
        hits.extend(
            history
                .messages
                .into_iter()
                .filter(|msg| matches(msg, &needle))
                .map(|message| ChatHit {
                    file: file.clone(),
                    message,
                }),
        );
    }
    Ok(hits)
}

/// Every non-system checkpoint message in saved trees containing `query`,
/// reported once per checkpoint that holds it.
pub fn search_trees(store: &TreeStore, query: &str) -> Result<Vec<CheckpointHit>, ChatError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let needle = query.to_lowercase();

    let mut hits = Vec::new();
    for file in store.list()? {
        let tree = match store.load(&file) {
            Ok(tree) => tree,
            Err(err) => {
                debug!(file = %file, error = %err, "skipping tree during search");
                continue;
            }
        };
        for branch in tree.branches() {
            for checkpoint in &branch.checkpoints {
                hits.extend(
                    checkpoint
                        .messages
                        .iter()
                        .filter(|msg| matches(msg, &needle))
                        .map(|message| CheckpointHit {
                            file: file.clone(),
                            branch_id: branch.id.clone(),
                            checkpoint_id: checkpoint.id.clone(),
                            checkpoint_name: checkpoint.name.clone(),
                            message: message.clone(),
                        }),
                );
            }
        }
    }
    Ok(hits)
}
