//! Where saved trees and chats live, and the low-level file helpers shared by
//! both stores.

use crate::core::error::ChatError;
use chrono::{DateTime, Local};
use directories::BaseDirs;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Replaces the home directory as the parent of the data directories.
pub const DATA_DIR_ENV: &str = "LIL_GUY_DATA_DIR";
pub const BRANCHES_DIR: &str = ".lil_guy_branches";
pub const CHATS_DIR: &str = ".lil_guy_chats";

const FILE_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

pub fn data_root() -> Result<PathBuf, ChatError> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| ChatError::Io {
            action: "get home directory",
            path: None,
            source: io::Error::new(io::ErrorKind::NotFound, "no home directory for this user"),
        })
}

/// Create `dir` (mode 0755 on unix) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), ChatError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(dir)
        .map_err(|source| ChatError::io("create directory", dir, source))
}

/// Join a caller-supplied file name onto a store directory, refusing names
/// that would leave it.
pub fn resolve_file(dir: &Path, filename: &str) -> Result<PathBuf, ChatError> {
    let candidate = Path::new(filename);
    let mut components = candidate.components();
    let is_plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !is_plain {
        return Err(ChatError::io(
            "resolve file name",
            candidate,
            io::Error::new(io::ErrorKind::InvalidInput, "not a plain file name"),
        ));
    }
    Ok(dir.join(candidate))
}

/// Write `contents` in place with mode 0644 for new files. Not atomic: a
/// crash mid-write can leave a truncated file.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<(), ChatError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let mut file = options
        .open(path)
        .map_err(|source| ChatError::io("open file for writing", path, source))?;
    file.write_all(contents)
        .map_err(|source| ChatError::io("write file", path, source))
}

/// File names in `dir` accepted by `keep`, sorted.
pub fn list_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<String>, ChatError> {
    let entries =
        fs::read_dir(dir).map_err(|source| ChatError::io("read directory", dir, source))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ChatError::io("read directory", dir, source))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if keep(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

pub fn timestamped_name(prefix: &str, extension: &str, now: DateTime<Local>) -> String {
    format!("{prefix}_{}.{extension}", now.format(FILE_STAMP_FORMAT))
}

/// A timestamped name not yet taken in `dir`. Saves within the same second
/// get `_2`, `_3`, ... appended to the stamp.
pub fn unused_timestamped_name(
    dir: &Path,
    prefix: &str,
    extension: &str,
    now: DateTime<Local>,
) -> String {
    let mut name = timestamped_name(prefix, extension, now);
    let stamp = now.format(FILE_STAMP_FORMAT);
    let mut n = 2;
    while dir.join(&name).exists() {
        name = format!("{prefix}_{stamp}_{n}.{extension}");
        n += 1;
    }
    name
}
