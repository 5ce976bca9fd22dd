//! Atomic write primitives
//!
//! Uses temp→rename so a concurrent reader sees either the old document or
//! the new one, never a partial write.

use crate::errors::{io_error, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temp file used while writing `target`: same directory, `.tmp` appended.
pub(crate) fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("snapshot"));
    name.push(".tmp");
    target.with_file_name(name)
}

/// Atomically write bytes to a file
///
/// Creates missing parent directories. The temp file is flushed to disk
/// before the rename and removed if the rename fails.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error("create_snapshot_dir", parent, e))?;
    }

    let temp_path = temp_path_for(target_path);

    {
        let mut file =
            File::create(&temp_path).map_err(|e| io_error("create_snapshot_temp", &temp_path, e))?;
        file.write_all(content)
            .map_err(|e| io_error("write_snapshot_temp", &temp_path, e))?;
        file.sync_all()
            .map_err(|e| io_error("sync_snapshot_temp", &temp_path, e))?;
    }

    if let Err(e) = fs::rename(&temp_path, target_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error("rename_snapshot_temp", target_path, e));
    }

    Ok(())
}
