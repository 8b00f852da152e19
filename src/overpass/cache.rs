//! On-disk cache of Overpass responses keyed by query checksum.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use xxhash_rust::xxh64::xxh64;

pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    /// Open the cache, creating `dir` if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Checksum of the query text
    pub fn key(query: &str) -> String {
        format!("{:016x}", xxh64(query.as_bytes(), 0))
    }

    pub fn path_for(&self, query: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key(query)))
    }

    pub fn get(&self, query: &str) -> Result<Option<String>> {
        let path = self.path_for(query);
        match fs::read_to_string(&path) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    pub fn put(&self, query: &str, body: &str) -> Result<()> {
        let path = self.path_for(query);
        fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))
    }
}
