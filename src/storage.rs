//! File storage for containers.
//!
//! Containers are immutable once written. Writes go through a
//! write-sync-rename sequence so a crash never leaves a half-written
//! container at the final path, and an existing file is never silently
//! overwritten: the caller-provided [`OverwritePrompt`] must confirm first.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// Errors related to container file I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// File not found.
    NotFound,
    /// File already exists and overwrite was not confirmed.
    AlreadyExists,
    /// Permission denied.
    PermissionDenied,
    /// Open or create failed.
    OpenFailed,
    /// Read failed.
    ReadFailed,
    /// Write failed.
    WriteFailed,
    /// Invalid path or filename.
    InvalidPath,
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound,
            std::io::ErrorKind::AlreadyExists => StorageError::AlreadyExists,
            std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied,
            _ => StorageError::OpenFailed,
        }
    }
}

/// Decides whether an existing file may be replaced. The CLI layer backs
/// this with an interactive yes/no; batch callers deny.
pub trait OverwritePrompt {
    fn confirm_overwrite(&mut self, path: &Path) -> bool;
}

/// Never overwrites. The safe default for non-interactive use.
pub struct DenyOverwrite;

impl OverwritePrompt for DenyOverwrite {
    fn confirm_overwrite(&mut self, _path: &Path) -> bool {
        false
    }
}

pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists()
}

/// Size of an existing file in bytes.
pub fn file_size<P: AsRef<Path>>(path: P) -> Result<usize, StorageError> {
    let metadata = fs::metadata(path)?;
    Ok(metadata.len() as usize)
}

/// Reads a whole container file.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, StorageError> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    // Containers are tiny; anything huge is not ours.
    if len > 1024 * 1024 {
        return Err(StorageError::ReadFailed);
    }

    let mut buffer = Vec::with_capacity(len as usize);
    file.read_to_end(&mut buffer)
        .map_err(|_| StorageError::ReadFailed)?;
    Ok(buffer)
}

/// Writes a new container file atomically, refusing to replace an existing
/// one unless the prompt confirms.
pub fn write_new<P: AsRef<Path>>(
    path: P,
    data: &[u8],
    prompt: &mut dyn OverwritePrompt,
) -> Result<(), StorageError> {
    let path = path.as_ref();
    if path.exists() && !prompt.confirm_overwrite(path) {
        return Err(StorageError::AlreadyExists);
    }
    write_atomic(path, data)
}

/// Writes a container file atomically without an existence check. For
/// callers that already ran the overwrite pre-check on the whole file set.
pub fn write_file<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<(), StorageError> {
    write_atomic(path.as_ref(), data)
}

/// Write-sync-rename. Atomic on POSIX filesystems.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    let filename = path.file_name().ok_or(StorageError::InvalidPath)?;
    let mut temp_path = path.to_path_buf();
    temp_path.set_file_name(format!("{}.tmp", filename.to_string_lossy()));

    let mut file = File::create(&temp_path)?;
    let written = file.write_all(data).and_then(|_| file.sync_all());
    drop(file);
    if written.and_then(|_| fs::rename(&temp_path, path)).is_err() {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::WriteFailed);
    }
    Ok(())
}
