//! Crash-safe whole-file replacement: write a sibling temp file, fsync it,
//! then rename it over the target.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;

/// Atomically replaces `path` with `data`.
pub fn save_data(path: &Path, data: &[u8]) -> Result<()> {
    save_with(path, |file| file.write_all(data))
}

/// Atomically replaces `path` with whatever `write` puts into the temp file.
///
/// The temp file is named `<file name>.tmp.<random>` in the target's
/// directory and created exclusively. If `write`, the fsync, or the rename
/// fails, the temp file is removed and `path` is left untouched.
pub fn save_with<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", path.display()),
        )
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut prefix = OsString::from(file_name);
    prefix.push(".tmp.");

    // NamedTempFile removes itself on drop, which covers every early return.
    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .rand_bytes(8)
        .tempfile_in(dir)?;

    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;

    let tmp_path = tmp.path().to_path_buf();
    tmp.persist(path).map_err(|err| err.error)?;
    debug!(from = %tmp_path.display(), to = %path.display(), "atomic replace");

    if let Err(err) = sync_dir(dir) {
        warn!(dir = %dir.display(), error = %err, "fsync of parent directory failed");
    }
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
