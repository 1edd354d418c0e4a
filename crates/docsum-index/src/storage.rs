//! On-disk formats for [`VectorStoreIndex`]
//!
//! Two layouts are supported:
//! - storage context: `docstore.json`, `vector_store.json` and `index_store.json`
//!   written side by side into a persist directory
//! - legacy: the whole index in a single `index.json`

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use docsum_core::{Error, Result};

use crate::vector_index::{DocumentInfo, TextNode, VectorStoreIndex};

pub const DOCSTORE_FILE: &str = "docstore.json";
pub const VECTOR_STORE_FILE: &str = "vector_store.json";
pub const INDEX_STORE_FILE: &str = "index_store.json";
pub const LEGACY_INDEX_FILE: &str = "index.json";

/// Bumped whenever any of the layouts changes shape
pub const STORAGE_FORMAT_VERSION: u32 = 1;

const VECTOR_INDEX_TYPE: &str = "vector_store";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredNode {
    id: String,
    document_id: String,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DocStore {
    documents: Vec<DocumentInfo>,
    nodes: Vec<StoredNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct VectorStoreData {
    embedding_dict: BTreeMap<String, Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct IndexStruct {
    version: u32,
    index_id: String,
    index_type: String,
    embed_model: String,
    created_at: DateTime<Utc>,
    node_ids: Vec<String>,
}

/// The three stores making up a persisted index
#[derive(Debug, Clone, PartialEq)]
pub struct StorageContext {
    docstore: DocStore,
    vector_store: VectorStoreData,
    index_store: IndexStruct,
}

impl StorageContext {
    /// Split an in-memory index into its stores
    pub fn from_index(index: &VectorStoreIndex) -> Self {
        let nodes = index
            .nodes
            .iter()
            .map(|node| StoredNode {
                id: node.id.clone(),
                document_id: node.document_id.clone(),
                text: node.text.clone(),
            })
            .collect();

        let embedding_dict = index
            .nodes
            .iter()
            .map(|node| (node.id.clone(), node.embedding.clone()))
            .collect();

        Self {
            docstore: DocStore {
                documents: index.documents.clone(),
                nodes,
            },
            vector_store: VectorStoreData { embedding_dict },
            index_store: IndexStruct {
                version: STORAGE_FORMAT_VERSION,
                index_id: index.index_id.clone(),
                index_type: VECTOR_INDEX_TYPE.to_string(),
                embed_model: index.embed_model.clone(),
                created_at: index.created_at,
                node_ids: index.nodes.iter().map(|n| n.id.clone()).collect(),
            },
        }
    }

    /// Read the stores persisted in `persist_dir`
    pub fn from_defaults(persist_dir: &Path) -> Result<Self> {
        let index_store: IndexStruct = read_json(&persist_dir.join(INDEX_STORE_FILE))?;
        if index_store.version != STORAGE_FORMAT_VERSION {
            return Err(Error::Storage(format!(
                "unsupported storage format version {} (expected {})",
                index_store.version, STORAGE_FORMAT_VERSION
            )));
        }
        if index_store.index_type != VECTOR_INDEX_TYPE {
            return Err(Error::Storage(format!(
                "unsupported index type {}",
                index_store.index_type
            )));
        }

        Ok(Self {
            docstore: read_json(&persist_dir.join(DOCSTORE_FILE))?,
            vector_store: read_json(&persist_dir.join(VECTOR_STORE_FILE))?,
            index_store,
        })
    }

    /// Write every store into `persist_dir`, creating it if needed
    pub fn persist(&self, persist_dir: &Path) -> Result<()> {
        fs::create_dir_all(persist_dir)?;
        write_json(&persist_dir.join(DOCSTORE_FILE), &self.docstore)?;
        write_json(&persist_dir.join(VECTOR_STORE_FILE), &self.vector_store)?;
        write_json(&persist_dir.join(INDEX_STORE_FILE), &self.index_store)?;
        debug!(dir = %persist_dir.display(), "persisted storage context");
        Ok(())
    }

    /// Reassemble the index, failing if any node lacks text or an embedding
    pub fn into_index(self) -> Result<VectorStoreIndex> {
        let StorageContext {
            docstore,
            mut vector_store,
            index_store,
        } = self;

        let mut texts: BTreeMap<String, StoredNode> = docstore
            .nodes
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect();

        let mut nodes = Vec::with_capacity(index_store.node_ids.len());
        for node_id in &index_store.node_ids {
            let stored = texts
                .remove(node_id)
                .ok_or_else(|| Error::Storage(format!("node {} missing from docstore", node_id)))?;
            let embedding = vector_store
                .embedding_dict
                .remove(node_id)
                .ok_or_else(|| Error::Storage(format!("node {} missing from vector store", node_id)))?;

            nodes.push(TextNode {
                id: stored.id,
                document_id: stored.document_id,
                text: stored.text,
                embedding,
            });
        }

        Ok(VectorStoreIndex {
            index_id: index_store.index_id,
            created_at: index_store.created_at,
            embed_model: index_store.embed_model,
            documents: docstore.documents,
            nodes,
        })
    }
}

/// Load an index from a storage context
pub fn load_index_from_storage(storage_context: StorageContext) -> Result<VectorStoreIndex> {
    storage_context.into_index()
}

#[derive(Serialize, Deserialize)]
struct LegacyIndexFile {
    version: u32,
    index: VectorStoreIndex,
}

/// Write the whole index as a single `index.json` inside `dir`
pub fn save_to_disk(index: &VectorStoreIndex, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let file = LegacyIndexFile {
        version: STORAGE_FORMAT_VERSION,
        index: index.clone(),
    };
    write_json(&dir.join(LEGACY_INDEX_FILE), &file)
}

/// Read an index written by [`save_to_disk`]
pub fn load_from_disk(dir: &Path) -> Result<VectorStoreIndex> {
    let file: LegacyIndexFile = read_json(&dir.join(LEGACY_INDEX_FILE))?;
    if file.version != STORAGE_FORMAT_VERSION {
        return Err(Error::Storage(format!(
            "unsupported legacy index version {}",
            file.version
        )));
    }
    Ok(file.index)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::Storage(format!("{} not found", path.display())));
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Serialization(format!("{}: {}", path.display(), e)))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string(value)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_index::VectorStoreIndex;
    use tempfile::TempDir;

    fn sample_index() -> VectorStoreIndex {
        let doc = DocumentInfo {
            id: "doc-1".to_string(),
            hash: "abc".to_string(),
            metadata: BTreeMap::from([("file_name".to_string(), "essay.txt".to_string())]),
        };
        let nodes = vec![
            TextNode {
                id: "n1".to_string(),
                document_id: "doc-1".to_string(),
                text: "first chunk".to_string(),
                embedding: vec![1.0, 0.0],
            },
            TextNode {
                id: "n2".to_string(),
                document_id: "doc-1".to_string(),
                text: "second chunk".to_string(),
                embedding: vec![0.0, 1.0],
            },
        ];
        VectorStoreIndex::from_parts("test-model", vec![doc], nodes)
    }

    #[test]
    fn test_storage_context_roundtrip() {
        let dir = TempDir::new().unwrap();
        let index = sample_index();

        StorageContext::from_index(&index).persist(dir.path()).unwrap();
        assert!(dir.path().join(DOCSTORE_FILE).exists());
        assert!(dir.path().join(VECTOR_STORE_FILE).exists());
        assert!(dir.path().join(INDEX_STORE_FILE).exists());

        let loaded = load_index_from_storage(StorageContext::from_defaults(dir.path()).unwrap()).unwrap();
        assert_eq!(loaded, index);
    }

    #[test]
    fn test_storage_context_missing_files() {
        let dir = TempDir::new().unwrap();
        let err = StorageContext::from_defaults(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_storage_context_missing_embedding() {
        let dir = TempDir::new().unwrap();
        StorageContext::from_index(&sample_index()).persist(dir.path()).unwrap();
        fs::write(dir.path().join(VECTOR_STORE_FILE), r#"{"embedding_dict":{"n1":[1.0,0.0]}}"#).unwrap();

        let err = StorageContext::from_defaults(dir.path())
            .and_then(load_index_from_storage)
            .unwrap_err();
        assert_eq!(err.to_string(), "Storage context error: node n2 missing from vector store");
    }

    #[test]
    fn test_legacy_roundtrip() {
        let dir = TempDir::new().unwrap();
        let index = sample_index();

        save_to_disk(&index, dir.path()).unwrap();
        assert!(dir.path().join(LEGACY_INDEX_FILE).exists());
        assert_eq!(load_from_disk(dir.path()).unwrap(), index);
    }

    #[test]
    fn test_legacy_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LEGACY_INDEX_FILE), "not json").unwrap();
        assert!(matches!(load_from_disk(dir.path()), Err(Error::Serialization(_))));
    }
}
