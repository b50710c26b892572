use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User preferences persisted as TOML.
///
/// Every field is optional so that a partially written file still loads;
/// accessors in `defaults.rs` supply the fallbacks.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Display name of the assistant (e.g., "AI", "CodeMaster")
    pub buddy_name: Option<String>,
    /// Base system prompt before personality affixes are applied
    pub system_message: Option<String>,
    /// Model id used for new sessions (e.g., "gpt-4o")
    pub model: Option<String>,
    /// Colour scheme name for the interactive front end
    pub theme: Option<String>,
    /// Save the linear chat history after every assistant reply
    pub auto_save: Option<bool>,
    /// Personality id (e.g., "pirate", "zen")
    pub personality: Option<String>,
    pub retro_theme: Option<String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.lil_guy_branches/tree.json` → `~/.lil_guy_branches/tree.json`
/// - Windows: paths are shown unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
