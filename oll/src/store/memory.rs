use std::collections::HashMap;

use crate::error::Error;
use crate::store::WeightStore;
use crate::Extension;

type Result<T> = std::result::Result<T, Error>;

/// Weight store that only lives as long as the process. Mostly useful for tests
/// and for models that are rebuilt on every start.
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    client: HashMap<Vec<u8>, f64>,
    opened: bool,
}

impl Extension for MemoryStore {
    fn id(&self) -> String {
        String::from("oll-store-memory")
    }

    fn name(&self) -> String {
        String::from("In-Memory Weight Store")
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.client.len()
    }

    pub fn is_empty(&self) -> bool {
        self.client.is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }
}

impl WeightStore for MemoryStore {
    fn open(&mut self) -> Result<()> {
        self.opened = true;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<f64>> {
        if !self.opened {
            return Err(Error::StorageNotOpened);
        }
        Ok(self.client.get(key).copied())
    }

    fn set(&mut self, key: &[u8], value: f64) -> Result<()> {
        if !self.opened {
            return Err(Error::StorageNotOpened);
        }
        self.client.insert(key.to_vec(), value);
        Ok(())
    }
}
