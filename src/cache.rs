//! Simple cache to remember the last reading position per document.
//!
//! Files are stored under `.cache/` using a hash of the layout path as the
//! directory name to avoid filesystem issues. The format is a tiny TOML file
//! with a single `position` field. Errors are ignored so a broken cache can
//! never break a session.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub const CACHE_DIR: &str = ".cache";

/// Load the cached scroll position for a given document, if present.
pub fn load_position(layout_path: &Path) -> Option<f64> {
    let path = position_path(layout_path);
    let data = fs::read_to_string(path).ok()?;
    let entry: CacheEntry = toml::from_str(&data).ok()?;
    entry.position.is_finite().then_some(entry.position)
}

/// Persist the current scroll position for a given document.
pub fn save_position(layout_path: &Path, position: f64) {
    let path = position_path(layout_path);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let entry = CacheEntry { position };
    if let Ok(contents) = toml::to_string(&entry) {
        let _ = fs::write(path, contents);
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct CacheEntry {
    position: f64,
}

fn hash_dir(layout_path: &Path) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(layout_path.as_os_str().to_string_lossy().as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    Path::new(CACHE_DIR).join(hash)
}

fn position_path(layout_path: &Path) -> PathBuf {
    hash_dir(layout_path).join("position.toml")
}
