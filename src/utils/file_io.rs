use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;
use tracing::error;

use crate::FileError;
use crate::Result;

/// Reads the whole target file as UTF-8 text.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| {
        error!(path = %path.display(), "Failed to read target file: {:?}", source);
        FileError::Read {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

/// Replaces `path` with `content` so readers observe either the old or the
/// new file, never a truncated one.
///
/// The content goes to a temporary file in the same directory, which is
/// flushed and then renamed over the target. The target's permissions are
/// carried over when it already exists.
pub fn write_atomically(
    path: &Path,
    content: &str,
) -> Result<()> {
    let write_err = |source| FileError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    if let Ok(metadata) = fs::metadata(path) {
        tmp.as_file().set_permissions(metadata.permissions()).map_err(write_err)?;
    }

    tmp.persist(path).map_err(|source| FileError::Persist {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), bytes = content.len(), "Target file replaced");
    Ok(())
}
