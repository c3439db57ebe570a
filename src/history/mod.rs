mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use log::info;
use std::sync::Arc;
use thiserror::Error;
use crate::cli::Args;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
    #[error("unsupported storage type: {0}")]
    Unsupported(String),
}

/// Durable string key/value store scoped to one user profile.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

pub fn create_storage(args: &Args) -> Result<Arc<dyn KeyValueStorage>, StorageError> {
    match args.storage_type.to_lowercase().as_str() {
        "file" => {
            info!("Chat sessions will be stored in: {}", args.storage_dir);
            Ok(Arc::new(FileStorage::new(&args.storage_dir)))
        }
        "memory" => {
            info!("Chat sessions will be kept in memory only");
            Ok(Arc::new(MemoryStorage::default()))
        }
        other => Err(StorageError::Unsupported(other.to_string())),
    }
}
