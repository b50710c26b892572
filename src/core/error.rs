use crate::core::config::data::path_display;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

/// What a [`ChatError::NotFound`] failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Branch,
    Checkpoint,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Branch => "branch",
            EntityKind::Checkpoint => "checkpoint",
        }
    }
}

/// Errors produced by the conversation tree and the on-disk stores.
#[derive(Debug)]
pub enum ChatError {
    /// A branch or checkpoint id did not resolve.
    NotFound { kind: EntityKind, id: String },

    /// Filesystem failure, including a missing home directory.
    Io {
        /// Short description of what was being attempted.
        action: &'static str,
        /// The file or directory involved, when there is one.
        path: Option<PathBuf>,
        source: std::io::Error,
    },

    /// A persisted file was not valid JSON, or decoded into an invalid tree.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Serializing to JSON failed.
    Encode { source: serde_json::Error },

    /// There was nothing to write.
    Empty { what: &'static str },
}

impl ChatError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        ChatError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChatError::Io {
            action,
            path: Some(path.into()),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ChatError::NotFound { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, ChatError::Io { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, ChatError::Parse { .. })
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            ChatError::Io {
                action,
                path: Some(path),
                source,
            } => write!(f, "failed to {action} {}: {source}", path_display(path)),
            ChatError::Io {
                action,
                path: None,
                source,
            } => write!(f, "failed to {action}: {source}"),
            ChatError::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path_display(path))
            }
            ChatError::Encode { source } => write!(f, "failed to encode JSON: {source}"),
            ChatError::Empty { what } => write!(f, "no {what}"),
        }
    }
}

impl StdError for ChatError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ChatError::Io { source, .. } => Some(source),
            ChatError::Parse { source, .. } => Some(source),
            ChatError::Encode { source } => Some(source),
            ChatError::NotFound { .. } | ChatError::Empty { .. } => None,
        }
    }
}
