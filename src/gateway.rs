// Store gateway: whole-node reads and writes against the hierarchical store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{PalError, PalResult};

/// The four top-level nodes of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorePath {
    Species,
    Traits,
    TraitCombos,
    StoredRecords,
}

impl StorePath {
    pub const ALL: [StorePath; 4] = [
        StorePath::Species,
        StorePath::Traits,
        StorePath::TraitCombos,
        StorePath::StoredRecords,
    ];

    /// Node name in the store.
    pub fn as_str(self) -> &'static str {
        match self {
            StorePath::Species => "pals",
            StorePath::Traits => "passive_skills",
            StorePath::TraitCombos => "passive_skill_combos",
            StorePath::StoredRecords => "stored_pals",
        }
    }
}

impl std::fmt::Display for StorePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Each call reads or replaces one whole node. Nothing spans calls: a
/// read followed by a write is not atomic at this level.
#[async_trait]
pub trait StoreGateway: Send + Sync {
    /// `None` when the node has never been written.
    async fn read(&self, path: StorePath) -> PalResult<Option<Value>>;

    async fn write(&self, path: StorePath, value: &Value) -> PalResult<()>;
}

/// In-process gateway for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: Mutex<HashMap<StorePath, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate nodes.
    pub fn with_nodes(nodes: impl IntoIterator<Item = (StorePath, Value)>) -> Self {
        Self {
            nodes: Mutex::new(nodes.into_iter().collect()),
        }
    }
}

#[async_trait]
impl StoreGateway for MemoryStore {
    async fn read(&self, path: StorePath) -> PalResult<Option<Value>> {
        let nodes = self
            .nodes
            .lock()
            .map_err(|_| PalError::StoreUnavailable("memory store poisoned".into()))?;
        Ok(nodes.get(&path).cloned())
    }

    async fn write(&self, path: StorePath, value: &Value) -> PalResult<()> {
        let mut nodes = self
            .nodes
            .lock()
            .map_err(|_| PalError::StoreUnavailable("memory store poisoned".into()))?;
        nodes.insert(path, value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_path_names() {
        let names: Vec<&str> = StorePath::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            vec!["pals", "passive_skills", "passive_skill_combos", "stored_pals"]
        );
        assert_eq!(StorePath::StoredRecords.to_string(), "stored_pals");
    }

    #[tokio::test]
    async fn test_memory_store_read_absent_then_write() {
        let store = MemoryStore::new();
        assert!(store.read(StorePath::Traits).await.unwrap().is_none());

        let value = json!([{"name": "Swift"}]);
        store.write(StorePath::Traits, &value).await.unwrap();
        assert_eq!(store.read(StorePath::Traits).await.unwrap(), Some(value));
        assert!(store.read(StorePath::Species).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_write_replaces_node() {
        let store = MemoryStore::with_nodes([(StorePath::StoredRecords, json!([1, 2]))]);
        store
            .write(StorePath::StoredRecords, &json!([]))
            .await
            .unwrap();
        assert_eq!(
            store.read(StorePath::StoredRecords).await.unwrap(),
            Some(json!([]))
        );
    }
}
