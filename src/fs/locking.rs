//! Advisory-locked file access for artifact files
//!
//! Several `kodebase` invocations (a CLI run and a CI hook, say) may touch the
//! same artifact at once. Every read takes a shared `fs2` lock, every write an
//! exclusive one, and `locked_update` holds the exclusive lock across the whole
//! read-modify-write so an appended event cannot be lost.
//!
//! The locks are advisory: only callers going through these functions are
//! serialized.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Read a file under a shared lock.
pub fn locked_read(path: &Path) -> Result<String> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    file.lock_shared()
        .with_context(|| format!("Failed to acquire shared lock: {}", path.display()))?;
    let mut content = String::new();
    BufReader::new(&file)
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(content)
}

/// Replace a file's contents under an exclusive lock, creating it (and its
/// parent directories) if needed.
///
/// Order is open, lock, truncate, write, flush. Truncating before the lock is
/// held would let a concurrent reader see an empty file.
pub fn locked_write(path: &Path, content: &str) -> Result<()> {
    let file = open_for_update(path)?;
    write_locked(&file, path, content)
}

/// Read-modify-write under a single exclusive lock.
///
/// `update` receives the current contents (empty for a new file) and returns
/// the replacement, or `None` to leave the file untouched.
pub fn locked_update<F>(path: &Path, update: F) -> Result<bool>
where
    F: FnOnce(&str) -> Result<Option<String>>,
{
    let file = open_for_update(path)?;

    let mut current = String::new();
    BufReader::new(&file)
        .read_to_string(&mut current)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    match update(&current)? {
        Some(next) => {
            write_locked(&file, path, &next)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Open read+write without truncating and take the exclusive lock.
fn open_for_update(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    #[allow(clippy::suspicious_open_options)]
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .with_context(|| format!("Failed to open file for writing: {}", path.display()))?;
    file.lock_exclusive()
        .with_context(|| format!("Failed to acquire exclusive lock: {}", path.display()))?;
    Ok(file)
}

fn write_locked(mut file: &File, path: &Path, content: &str) -> Result<()> {
    file.set_len(0)
        .with_context(|| format!("Failed to truncate file: {}", path.display()))?;
    file.seek(SeekFrom::Start(0))
        .with_context(|| format!("Failed to rewind file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(content.as_bytes())
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush file: {}", path.display()))?;
    Ok(())
}
