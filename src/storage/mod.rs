use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;
use tokio::fs;

use crate::engine::models::Registry;
use crate::env::LauncherPaths;

pub mod format;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unable to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Clone)]
pub struct StorageManager {
    paths: LauncherPaths,
}

impl StorageManager {
    pub fn new(paths: LauncherPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &LauncherPaths {
        &self.paths
    }

    pub async fn load_registry(&self) -> Registry {
        read_registry(&self.paths.installs_file()).await
    }

    pub async fn save_registry(&self, registry: &Registry) -> Result<(), StorageError> {
        write_registry(&self.paths.installs_file(), registry).await
    }

    pub async fn load_catalog(&self) -> Registry {
        read_registry(&self.paths.catalog_file()).await
    }

    /// Delete the install and user-data directories for `label`.
    pub async fn remove_version_dirs(&self, label: &str) -> Result<(), StorageError> {
        for dir in [self.paths.install_dir(label), self.paths.user_dir(label)] {
            match fs::remove_dir_all(&dir).await {
                Ok(()) => info!("storage: removed {}", dir.display()),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    debug!("storage: {} already absent", dir.display());
                }
                Err(source) => return Err(StorageError::Remove { path: dir, source }),
            }
        }
        Ok(())
    }
}

/// Read a registry file. A missing or unreadable file gives the default registry.
pub async fn read_registry(path: &Path) -> Registry {
    match fs::read(path).await {
        Ok(bytes) => format::parse(&String::from_utf8_lossy(&bytes)),
        Err(err) => {
            if err.kind() != ErrorKind::NotFound {
                warn!("storage: unable to read {}: {err}", path.display());
            }
            Registry::default()
        }
    }
}

/// Rewrite a registry file in full.
pub async fn write_registry(path: &Path, registry: &Registry) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    fs::write(path, format::serialize(registry))
        .await
        .map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("storage: wrote {}", path.display());
    Ok(())
}
