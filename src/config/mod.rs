use std::env;
use std::path::PathBuf;

/// Upload configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory uploads are persisted into (default: "./upload")
    pub upload_dir: PathBuf,

    /// Maximum file size in bytes (default: 500 MB)
    pub max_file_size: usize,

    /// Size of each buffered write while streaming to disk (default: 1 MB)
    pub chunk_size: usize,

    /// Uploads allowed to write to disk at the same time (default: 16)
    pub max_concurrent_uploads: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./upload"),
            max_file_size: 500 * 1024 * 1024, // 500 MB
            chunk_size: 1024 * 1024,          // 1 MB
            max_concurrent_uploads: 16,
        }
    }
}

impl UploadConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            upload_dir: env::var("UPLOAD_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            chunk_size: env::var("UPLOAD_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&v: &usize| v > 0)
                .unwrap_or(default.chunk_size),

            max_concurrent_uploads: env::var("MAX_CONCURRENT_UPLOADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&v: &usize| v > 0)
                .unwrap_or(default.max_concurrent_uploads),
        }
    }

    /// Config rooted at `upload_dir`, everything else default
    pub fn with_upload_dir(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            ..Self::default()
        }
    }

    /// Human readable size limit used in error messages, e.g. "500MB"
    pub fn max_size_label(&self) -> String {
        let mb = 1024 * 1024;
        if self.max_file_size >= mb && self.max_file_size % mb == 0 {
            format!("{}MB", self.max_file_size / mb)
        } else {
            format!("{} bytes", self.max_file_size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UploadConfig::default();
        assert_eq!(config.max_file_size, 500 * 1024 * 1024);
        assert_eq!(config.chunk_size, 1024 * 1024);
        assert_eq!(config.upload_dir, PathBuf::from("./upload"));
        assert_eq!(config.max_concurrent_uploads, 16);
    }

    #[test]
    fn test_with_upload_dir() {
        let config = UploadConfig::with_upload_dir("/tmp/videos");
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/videos"));
        assert_eq!(config.max_file_size, 500 * 1024 * 1024);
    }

    #[test]
    fn test_max_size_label() {
        assert_eq!(UploadConfig::default().max_size_label(), "500MB");

        let config = UploadConfig {
            max_file_size: 1500,
            ..UploadConfig::default()
        };
        assert_eq!(config.max_size_label(), "1500 bytes");
    }
}
