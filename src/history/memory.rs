use std::collections::HashMap;
use std::sync::Mutex;
use super::{ KeyValueStorage, StorageError };

#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
