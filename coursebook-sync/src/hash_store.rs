//! Hash store: SHA-256 digests of the files a program render last wrote.
//!
//! Persists a [`HashStoreFile`] JSON document at
//! `<home>/.coursebook/hashes/<program>.json`, saved with the same `.tmp` +
//! rename pattern as the program store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coursebook_core::store;

use crate::error::{io_err, SyncError};

/// Output path string → last written SHA-256 hex digest.
pub type HashStore = HashMap<String, String>;

/// On-disk hash store payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashStoreFile {
    #[serde(default = "Utc::now")]
    pub synced_at: DateTime<Utc>,
    #[serde(default)]
    pub files: HashStore,
}

/// `<home>/.coursebook/hashes/<program>.json`
pub fn store_path_at(home: &Path, program: &str) -> PathBuf {
    store::coursebook_root(home)
        .join("hashes")
        .join(format!("{program}.json"))
}

/// Load the hash store for `program`; empty if none has been saved yet.
pub fn load_at(home: &Path, program: &str) -> Result<HashStoreFile, SyncError> {
    let path = store_path_at(home, program);
    if !path.exists() {
        return Ok(HashStoreFile {
            synced_at: Utc::now(),
            files: HashMap::new(),
        });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save the hash store for `program` atomically.
pub fn save_at(home: &Path, program: &str, store: &HashStoreFile) -> Result<(), SyncError> {
    let path = store_path_at(home, program);
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid hash store path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(store)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(())
}
