//! JSON files on disk: saved conversation trees, linear chat histories, and
//! search across both.

pub mod history;
pub mod paths;
pub mod search;
pub mod trees;

pub use history::{ChatHistory, HistoryStore};
pub use search::{search_chats, search_trees};
pub use trees::TreeStore;
