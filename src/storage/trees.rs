use crate::core::branching::ConversationTree;
use crate::core::error::ChatError;
use crate::storage::paths::{self, BRANCHES_DIR};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const TREE_FILE_PREFIX: &str = "tree_";
const TREE_FILE_SUFFIX: &str = ".json";

/// Saved conversation trees, one JSON file each.
///
/// There is no locking: two processes saving the same file race and the
/// last write wins.
#[derive(Debug, Clone)]
pub struct TreeStore {
    dir: PathBuf,
}

impl TreeStore {
    /// The per-user store, `~/.lil_guy_branches`.
    pub fn open_default() -> Result<Self, ChatError> {
        Self::open(paths::data_root()?.join(BRANCHES_DIR))
    }

    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ChatError> {
        let dir = dir.into();
        paths::ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `tree` as indented JSON and return the file name used. An
    /// empty `filename` gets an unused `tree_<timestamp>.json` name; a given
    /// name is overwritten.
    pub fn save(&self, tree: &ConversationTree, filename: &str) -> Result<String, ChatError> {
        let filename = if filename.trim().is_empty() {
            paths::unused_timestamped_name(&self.dir, "tree", "json", Local::now())
        } else {
            filename.to_string()
        };
        let path = paths::resolve_file(&self.dir, &filename)?;

        let data =
            serde_json::to_vec_pretty(tree).map_err(|source| ChatError::Encode { source })?;
        paths::write_file(&path, &data)?;
        debug!(file = %filename, branches = tree.branch_count(), "saved conversation tree");
        Ok(filename)
    }

    pub fn load(&self, filename: &str) -> Result<ConversationTree, ChatError> {
        let path = paths::resolve_file(&self.dir, filename)?;
        let data =
            fs::read(&path).map_err(|source| ChatError::io("read tree file", &path, source))?;
        serde_json::from_slice(&data).map_err(|source| ChatError::Parse { path, source })
    }

    pub fn exists(&self, filename: &str) -> Result<bool, ChatError> {
        Ok(paths::resolve_file(&self.dir, filename)?.is_file())
    }

    /// Files following the `tree_*.json` convention, sorted by name.
    pub fn list(&self) -> Result<Vec<String>, ChatError> {
        paths::list_files(&self.dir, is_tree_file)
    }
}

fn is_tree_file(name: &str) -> bool {
    name.starts_with(TREE_FILE_PREFIX) && name.ends_with(TREE_FILE_SUFFIX)
}
