//! # Identity Persistence
//!
//! The signed-in user's identifier, saved by `handdown login` to
//! `~/.handdown/identity.json` and removed by `handdown logout`.
//!
//! Writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

const IDENTITY_FILE: &str = "identity.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Identity {
    pub user_id: String,
    /// Unix seconds of the login that stored this identity.
    pub logged_in_at: i64,
}

impl Identity {
    pub fn new(user_id: String) -> Self {
        Self {
            user_id,
            logged_in_at: Utc::now().timestamp(),
        }
    }
}

/// Returns `~/.handdown/`, creating it if needed.
pub fn identity_dir() -> io::Result<PathBuf> {
    let dir = crate::core::config::handdown_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?;
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn save_identity(identity: &Identity) -> io::Result<()> {
    save_identity_at(&identity_dir()?, identity)
}

pub fn save_identity_at(dir: &Path, identity: &Identity) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    atomic_write_json(&dir.join(IDENTITY_FILE), identity)?;
    info!("Stored identity for user {}", identity.user_id);
    Ok(())
}

/// Loads the stored identity. A missing file is `Ok(None)`.
pub fn load_identity() -> io::Result<Option<Identity>> {
    load_identity_at(&identity_dir()?)
}

pub fn load_identity_at(dir: &Path) -> io::Result<Option<Identity>> {
    let path = dir.join(IDENTITY_FILE);
    let json = match fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No stored identity at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let identity: Identity = serde_json::from_str(&json)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(identity))
}

/// Removes the stored identity. Returns false if there was none.
pub fn clear_identity() -> io::Result<bool> {
    clear_identity_at(&identity_dir()?)
}

pub fn clear_identity_at(dir: &Path) -> io::Result<bool> {
    match fs::remove_file(dir.join(IDENTITY_FILE)) {
        Ok(()) => {
            info!("Removed stored identity");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => {
            warn!("Failed to remove identity: {}", e);
            Err(e)
        }
    }
}
