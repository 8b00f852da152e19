use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::border::{Partitioner, DEFAULT_MAX_DEPTH};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub overpass: OverpassConfig,
    pub storage: StorageConfig,
    pub partition: PartitionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OverpassConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PartitionConfig {
    /// Largest piece dimension in degrees; 1.5 suits country borders
    pub split_size: f64,
    pub max_depth: usize,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: "https://overpass-api.de/api/interpreter/".to_string(),
            timeout_secs: 180,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            split_size: 1.5,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn overpass_url(&self) -> Result<Url> {
        Url::parse(&self.overpass.url)
            .with_context(|| format!("Invalid Overpass URL: {}", self.overpass.url))
    }

    pub fn overpass_timeout(&self) -> Duration {
        Duration::from_secs(self.overpass.timeout_secs)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.storage.data_dir.join("cache")
    }

    pub fn geometry_dir(&self) -> PathBuf {
        self.storage.data_dir.join("geometry")
    }

    pub fn countries_file(&self) -> PathBuf {
        self.storage.data_dir.join("countries.json")
    }

    pub fn partitioner(&self) -> Result<Partitioner> {
        Ok(Partitioner::new(self.partition.split_size)?.with_max_depth(self.partition.max_depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.partition.split_size, 1.5);
        assert_eq!(config.partition.max_depth, 250);
        assert_eq!(config.cache_dir(), PathBuf::from("data/cache"));
        assert_eq!(
            config.overpass_url().unwrap().as_str(),
            "https://overpass-api.de/api/interpreter/"
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            data_dir = "/var/lib/alfresco"

            [partition]
            split_size = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.geometry_dir(), PathBuf::from("/var/lib/alfresco/geometry"));
        assert_eq!(config.partition.split_size, 0.5);
        assert_eq!(config.partition.max_depth, 250);
        assert_eq!(config.overpass.timeout_secs, 180);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alfresco.toml");
        fs::write(&path, "[overpass]\nurl = \"http://localhost:12345/api/interpreter\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.overpass_url().unwrap().port(), Some(12345));
    }

    #[test]
    fn test_invalid_values() {
        let config: Config = toml::from_str("[overpass]\nurl = \"not a url\"\n").unwrap();
        assert!(config.overpass_url().is_err());

        let config: Config = toml::from_str("[partition]\nsplit_size = 0.0\n").unwrap();
        assert!(config.partitioner().is_err());
    }
}
