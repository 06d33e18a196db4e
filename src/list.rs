//! Single-level directory listing for the file browser side of the tool layer.
use crate::error::ListError;
use crate::search::absolutize;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    pub path: String,
}

/// Lists the immediate children of `dir` in filesystem order. A relative
/// `dir` is resolved against the working directory, so every returned path
/// is absolute. Symlinks are classified by their target; a dangling link is
/// reported as a file.
pub fn list_directory(dir: &Path) -> Result<Vec<ListEntry>, ListError> {
    let dir = &absolutize(dir).map_err(|source| ListError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let metadata = fs::metadata(dir).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ListError::NotFound(dir.to_path_buf()),
        _ => ListError::Io {
            path: dir.to_path_buf(),
            source: e,
        },
    })?;
    if !metadata.is_dir() {
        return Err(ListError::NotADirectory(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|source| ListError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut listing = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };
        let path: PathBuf = entry.path();
        let kind = if path.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        listing.push(ListEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind,
            path: path.to_string_lossy().into_owned(),
        });
    }
    Ok(listing)
}
