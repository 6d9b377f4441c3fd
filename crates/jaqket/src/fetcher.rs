//! Resolving remote resources to local files

use std::path::{Path, PathBuf};

use jaqket_core::{SharedProgress, StreamError};

use crate::error::DatasetError;
use crate::version::ResourceKey;

/// Turns a version's resource URLs into readable local paths.
///
/// Compressed resources must come back decompressed.
pub trait ResourceFetcher {
    fn fetch(&self, key: ResourceKey, url: &str) -> Result<PathBuf, DatasetError>;
}

/// Downloads over HTTP into a cache directory; cached files are reused.
pub struct HttpFetcher {
    cache_dir: PathBuf,
    progress: SharedProgress,
}

impl HttpFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>, progress: SharedProgress) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            progress,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

impl ResourceFetcher for HttpFetcher {
    fn fetch(&self, key: ResourceKey, url: &str) -> Result<PathBuf, DatasetError> {
        let new_bar = || self.progress.download_bar(key.name());
        jaqket_core::fetch_cached(url, &self.cache_dir, new_bar).map_err(|source| {
            DatasetError::Fetch {
                url: url.to_string(),
                source,
            }
        })
    }
}

/// Reads resources already present in a directory, named like the cache
/// would name them minus the hash prefix (`train_questions.json`,
/// `candidate_entities.json`, ...).
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    dir: PathBuf,
}

impl LocalFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Expected file name for `url` (basename, `.gz` suffix dropped)
    pub fn file_name(url: &str) -> &str {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let base = path.rsplit('/').next().unwrap_or(path);
        base.strip_suffix(".gz").unwrap_or(base)
    }
}

impl ResourceFetcher for LocalFetcher {
    fn fetch(&self, key: ResourceKey, url: &str) -> Result<PathBuf, DatasetError> {
        let path = self.dir.join(Self::file_name(url));
        if path.is_file() {
            log::debug!("{key}: using {}", path.display());
            return Ok(path);
        }
        Err(DatasetError::Fetch {
            url: url.to_string(),
            source: StreamError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{key}: {} does not exist", path.display()),
            )),
        })
    }
}
