//! Saving finished archives to disk.
//!
//! Bytes go to a hidden `.part` temp file in the target directory, are
//! fsynced, then atomically renamed to the final name, so a crash never
//! leaves a truncated archive under the final name.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Write `bytes` to `dir/file_name`. Creates `dir` if needed. An existing
/// file is replaced only when `overwrite` is set.
pub fn save_archive(dir: &Path, file_name: &str, bytes: &[u8], overwrite: bool) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let final_path = dir.join(file_name);
    if !overwrite && final_path.exists() {
        anyhow::bail!(
            "{} already exists; use --overwrite to replace it",
            final_path.display()
        );
    }

    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    temp.write_all(bytes)
        .with_context(|| format!("write {}", temp.path().display()))?;
    temp.as_file().sync_all().context("storage sync failed")?;

    if overwrite {
        temp.persist(&final_path)
    } else {
        temp.persist_noclobber(&final_path)
    }
    .with_context(|| format!("failed to save {}", final_path.display()))?;

    tracing::debug!(path = %final_path.display(), bytes = bytes.len(), "archive saved");
    Ok(final_path)
}
