// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persistent settings for tile tools.
//!
//! A [`ConfigStore`] holds JSON documents by key, [`ConfigService`] turns
//! them into typed values, and [`FsConfigStore`] keeps each key as
//! `<key>.json` in the platform config directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Where config documents live.
pub trait ConfigStore {
    /// The document saved under `key`, or `None` if there is none.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ConfigError>;
    /// Replace the document saved under `key`.
    fn write(&self, key: &str, doc: &[u8]) -> Result<(), ConfigError>;
}

/// Failure reading or writing settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform reports no per-user config directory.
    #[error("no config directory for this platform")]
    NoConfigDir,
    /// A config file or directory could not be accessed.
    #[error("{}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// A stored document does not match the expected shape.
    #[error("config `{key}` is malformed: {source}")]
    Json {
        /// Key of the offending document.
        key: String,
        /// Parser or serializer failure.
        #[source]
        source: serde_json::Error,
    },
    /// Failure reported by a store that is not file-backed.
    #[error("config store: {0}")]
    Backend(String),
}

/// Typed JSON access on top of a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Wrap `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ConfigStore> ConfigService<S> {
    /// Value stored under `key`; `Ok(None)` when the key is missing or its
    /// document is empty.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.store.read(key)? {
            Some(doc) if !doc.is_empty() => serde_json::from_slice(&doc)
                .map(Some)
                .map_err(|source| ConfigError::Json {
                    key: key.to_owned(),
                    source,
                }),
            _ => Ok(None),
        }
    }

    /// Like [`load`](Self::load) but falls back to `T::default()`.
    pub fn load_or_default<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.load(key)?.unwrap_or_default())
    }

    /// Store `value` under `key` as pretty-printed JSON.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let doc = serde_json::to_vec_pretty(value).map_err(|source| ConfigError::Json {
            key: key.to_owned(),
            source,
        })?;
        self.store.write(key, &doc)
    }
}

/// One `<key>.json` file per key under a single directory.
#[derive(Debug, Clone)]
pub struct FsConfigStore {
    dir: PathBuf,
}

impl FsConfigStore {
    /// Store in the per-user config directory (`~/.config/tilesync` on Linux).
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("dev", "flyingrobots", "tilesync")
            .ok_or(ConfigError::NoConfigDir)?;
        Self::at(dirs.config_dir())
    }

    /// Store in `dir`, creating it when absent.
    pub fn at(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| ConfigError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key).with_extension("json")
    }
}

impl ConfigStore for FsConfigStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ConfigError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(doc) => Ok(Some(doc)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    fn write(&self, key: &str, doc: &[u8]) -> Result<(), ConfigError> {
        let path = self.path_for(key);
        fs::write(&path, doc).map_err(|source| ConfigError::Io { path, source })
    }
}
