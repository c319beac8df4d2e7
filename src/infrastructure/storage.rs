use crate::config::UploadConfig;
use crate::services::storage::{LocalStorageService, StorageService};
use std::sync::Arc;
use tracing::info;

/// Builds the local storage backend and makes sure its directory exists
/// before the first request arrives.
pub async fn setup_storage(config: &UploadConfig) -> anyhow::Result<Arc<LocalStorageService>> {
    let upload_dir = std::path::absolute(&config.upload_dir)?;
    let storage = LocalStorageService::new(&upload_dir, config.chunk_size);

    storage.ensure_ready().await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to prepare upload directory {}: {}",
            upload_dir.display(),
            e
        )
    })?;

    info!("📁 Upload directory: {}", upload_dir.display());
    Ok(Arc::new(storage))
}
