use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::utils::validation::{candidate_name, validate_file_size};

/// Upper bound on `name_N.ext` candidates tried before giving up
const MAX_NAME_ATTEMPTS: u32 = 10_000;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file exceeds the maximum allowed size of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("{0}")]
    Prepare(#[source] io::Error),

    #[error("{0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Name under the upload directory, after de-duplication
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    fn base_dir(&self) -> &Path;

    /// Creates the upload directory if it is missing.
    async fn ensure_ready(&self) -> Result<(), StorageError>;

    /// Streams `reader` into the upload directory under a unique name derived
    /// from `filename`. Nothing is left on disk if the body fails or grows
    /// past `max_size`.
    async fn store_stream<'a>(
        &self,
        filename: &str,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
        max_size: usize,
    ) -> Result<StoredFile, StorageError>;

    async fn exists(&self, filename: &str) -> Result<bool, StorageError>;
    async fn delete(&self, filename: &str) -> Result<(), StorageError>;
}

pub struct LocalStorageService {
    base_dir: PathBuf,
    chunk_size: usize,
}

impl LocalStorageService {
    pub fn new(base_dir: impl Into<PathBuf>, chunk_size: usize) -> Self {
        Self {
            base_dir: base_dir.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Claims the first free candidate name by creating an empty placeholder.
    /// `create_new` makes the claim atomic across concurrent uploads.
    async fn reserve(&self, filename: &str) -> Result<(String, PathBuf), StorageError> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = candidate_name(filename, attempt);
            let path = self.base_dir.join(&name);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(_) => {
                    if attempt > 0 {
                        debug!("Name {} taken, storing as {}", filename, name);
                    }
                    return Ok((name, path));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(StorageError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free name left for {}", filename),
        )))
    }

    async fn write_staging(
        &self,
        staging_path: &Path,
        reader: &mut (dyn AsyncRead + Unpin + Send + '_),
        max_size: usize,
    ) -> Result<u64, StorageError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(staging_path)
            .await?;

        let mut buffer = vec![0u8; self.chunk_size];
        let mut total: usize = 0;

        loop {
            let n = reader.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            total += n;
            validate_file_size(total, max_size)
                .map_err(|_| StorageError::TooLarge { limit: max_size })?;
            file.write_all(&buffer[..n]).await?;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(total as u64)
    }
}

async fn remove_quietly(path: &Path) {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            warn!("Failed to remove partial upload {}: {}", path.display(), e);
        }
        _ => {}
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    async fn ensure_ready(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(StorageError::Prepare)
    }

    async fn store_stream<'a>(
        &self,
        filename: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
        max_size: usize,
    ) -> Result<StoredFile, StorageError> {
        self.ensure_ready().await?;

        let (stored_name, final_path) = self.reserve(filename).await?;
        let staging_path = self.base_dir.join(format!(".{}.part", Uuid::new_v4()));

        let written = self
            .write_staging(&staging_path, reader.as_mut(), max_size)
            .await;

        let size_bytes = match written {
            Ok(size) => size,
            Err(e) => {
                remove_quietly(&staging_path).await;
                remove_quietly(&final_path).await;
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&staging_path, &final_path).await {
            remove_quietly(&staging_path).await;
            remove_quietly(&final_path).await;
            return Err(e.into());
        }

        Ok(StoredFile {
            filename: stored_name,
            path: final_path,
            size_bytes,
        })
    }

    async fn exists(&self, filename: &str) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.base_dir.join(filename)).await?)
    }

    async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        fs::remove_file(self.base_dir.join(filename)).await?;
        Ok(())
    }
}
