use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory a file lives in; `.` for bare file names.
#[must_use]
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Create the parent directory of `path` if it does not exist yet.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> io::Result<PathBuf> {
    let dir = parent_dir(path);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Flush a directory entry so a completed rename survives power loss.
///
/// No-op where directories cannot be opened as files.
///
/// # Errors
/// Returns an error if the directory cannot be opened or synced on Unix.
pub fn sync_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        fs::File::open(dir)?.sync_all()
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
        Ok(())
    }
}

/// Make a relative data path absolute against the working directory.
#[must_use]
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(path)
    }
}
