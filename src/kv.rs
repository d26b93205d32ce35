use anyhow::Result;
use std::collections::BTreeMap;

/// Synchronous, string-valued key-value storage surviving across sessions.
///
/// This is the only durability mechanism the app relies on. Keys are shared
/// with whatever else lives in the same store, so callers namespace their own.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Every key currently stored, in the backend's enumeration order.
    fn keys(&self) -> Result<Vec<String>>;

    fn clear(&mut self) -> Result<()>;
}

/// In-memory store. Data lives as long as the value.
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    data: BTreeMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.data.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<()> {
        self.data.clear();
        Ok(())
    }
}
