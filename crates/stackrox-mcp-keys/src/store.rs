//! Atomic persistence of key material.
//!
//! Both writers stage the content in a sibling temporary file and rename it
//! into place, so a concurrent publisher never observes a partially written
//! file. No locking is performed; only one writer may run at a time.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{KeyError, Result};
use crate::jwk::KeySetDocument;

/// Write a private key PEM with owner-only permissions (`0600` on Unix).
///
/// # Errors
///
/// Returns [`KeyError::Io`] if the parent directory cannot be created or the
/// file cannot be written or renamed.
pub fn write_private_key(path: impl AsRef<Path>, pem: &str) -> Result<()> {
    let path = path.as_ref();
    write_atomic(path, pem.as_bytes(), true)?;
    info!(path = %path.display(), "Private key saved");
    Ok(())
}

/// Write a key-set document as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`KeyError::Encoding`] if serialization fails and [`KeyError::Io`]
/// if the file cannot be written.
pub fn write_key_set(path: impl AsRef<Path>, document: &KeySetDocument) -> Result<()> {
    let path = path.as_ref();
    let json =
        serde_json::to_string_pretty(document).map_err(|e| KeyError::Encoding(e.to_string()))?;
    write_atomic(path, json.as_bytes(), false)?;
    info!(path = %path.display(), keys = document.keys.len(), "JWKS file saved");
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8], owner_only: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| KeyError::io(parent, e))?;
    }

    let staging = staging_path(path);
    // A stale staging file would keep its old permissions.
    let _ = fs::remove_file(&staging);

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    restrict_permissions(&mut options, owner_only);

    let result = options
        .open(&staging)
        .and_then(|mut file| {
            file.write_all(contents)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&staging, path));

    if let Err(source) = result {
        let _ = fs::remove_file(&staging);
        return Err(KeyError::io(path, source));
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(options: &mut OpenOptions, owner_only: bool) {
    use std::os::unix::fs::OpenOptionsExt;
    if owner_only {
        options.mode(0o600);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_options: &mut OpenOptions, _owner_only: bool) {}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
