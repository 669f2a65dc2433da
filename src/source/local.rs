//! Local directory content source

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::{DirectoryLister, Fetcher};
use crate::error::FetchError;

/// Reads documents from a content tree on disk
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolve a content path under the root, refusing `..` and absolute paths
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl Fetcher for LocalSource {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let Some(full_path) = self.resolve(path) else {
            return Err(FetchError::NotFound {
                path: path.to_string(),
            });
        };
        tracing::debug!("Reading {:?}", full_path);

        tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => FetchError::NotFound {
                    path: path.to_string(),
                },
                _ => FetchError::Io {
                    path: path.to_string(),
                    source,
                },
            })
    }
}

#[async_trait]
impl DirectoryLister for LocalSource {
    async fn list(&self, dir: &str) -> Vec<String> {
        let Some(full_path) = self.resolve(dir) else {
            tracing::warn!("Refusing to list {}", dir);
            return Vec::new();
        };

        match tokio::task::spawn_blocking(move || list_files(&full_path)).await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!("Failed to list {}: {}", dir, e);
                Vec::new()
            }
        }
    }
}

/// File names directly inside `dir`, sorted by name
pub(crate) fn list_files(dir: &Path) -> Vec<String> {
    if !dir.is_dir() {
        tracing::warn!("Not a directory: {:?}", dir);
        return Vec::new();
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect()
}
