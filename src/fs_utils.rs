//! Filesystem utilities for materializing generated files.

use crate::error::GenError;
use std::fs;
use std::path::Path;

/// Write content to a file, creating parent directories if needed.
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<(), GenError> {
    let path = path.as_ref();
    let write_err = |e: std::io::Error| GenError::Write {
        path: path.display().to_string(),
        detail: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, contents).map_err(write_err)
}
