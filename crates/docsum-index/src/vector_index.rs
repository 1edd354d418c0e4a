//! In-memory vector index over chunked documents

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use docsum_core::{
    DirectoryWriter, Document, Error, IndexBuilder, IndexHandle, QueryEngine, Result, Settings,
    SourceNode,
};

use crate::query_engine::RetrieverQueryEngine;
use crate::storage::StorageContext;

/// Configuration for splitting documents into nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embed_batch_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_overlap: 200,
            embed_batch_size: 10,
        }
    }
}

/// Source document as recorded in the docstore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: String,
    pub hash: String,
    pub metadata: BTreeMap<String, String>,
}

impl From<&Document> for DocumentInfo {
    fn from(doc: &Document) -> Self {
        let metadata = doc
            .metadata
            .as_object()
            .map(|fields| {
                fields
                    .iter()
                    .map(|(k, v)| {
                        let value = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                        (k.clone(), value)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: doc.id.clone(),
            hash: doc.hash.clone(),
            metadata,
        }
    }
}

/// A chunk of a document together with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub id: String,
    pub document_id: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Vector index holding every node in memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreIndex {
    pub(crate) index_id: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) embed_model: String,
    pub(crate) documents: Vec<DocumentInfo>,
    pub(crate) nodes: Vec<TextNode>,
}

impl VectorStoreIndex {
    pub const TYPE_NAME: &'static str = "VectorStoreIndex";

    /// Assemble an index from already-embedded nodes
    pub fn from_parts(embed_model: impl Into<String>, documents: Vec<DocumentInfo>, nodes: Vec<TextNode>) -> Self {
        Self {
            index_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            embed_model: embed_model.into(),
            documents,
            nodes,
        }
    }

    /// Build an index, embedding every chunk with the model in `settings`
    pub async fn from_documents(documents: &[Document], settings: &Settings) -> Result<Self> {
        VectorIndexBuilder::default().build(documents, settings).await
    }

    pub fn index_id(&self) -> &str {
        &self.index_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn embed_model(&self) -> &str {
        &self.embed_model
    }

    pub fn documents(&self) -> &[DocumentInfo] {
        &self.documents
    }

    pub fn nodes(&self) -> &[TextNode] {
        &self.nodes
    }

    /// Rank nodes by cosine similarity to `query_embedding`, best first
    pub fn retrieve(&self, query_embedding: &[f32], top_k: usize) -> Vec<SourceNode> {
        let mut scored: Vec<(f32, &TextNode)> = self
            .nodes
            .iter()
            .map(|node| (cosine_similarity(query_embedding, &node.embedding), node))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(top_k)
            .map(|(score, node)| SourceNode {
                document_id: node.document_id.clone(),
                text: node.text.clone(),
                score,
            })
            .collect()
    }
}

impl IndexHandle for VectorStoreIndex {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn document_count(&self) -> usize {
        self.documents.len()
    }

    fn as_query_engine<'a>(&'a self, settings: &Settings) -> Result<Box<dyn QueryEngine + 'a>> {
        let engine = RetrieverQueryEngine::new(self, settings.embed_model()?, settings.llm()?);
        Ok(Box::new(engine))
    }

    fn directory_writers(&self) -> &[DirectoryWriter] {
        &[DirectoryWriter::Persist]
    }

    fn write_directory(&self, writer: DirectoryWriter, dir: &Path) -> Result<()> {
        match writer {
            DirectoryWriter::Persist => StorageContext::from_index(self).persist(dir),
            other => Err(Error::Unsupported(format!(
                "{} does not expose {}",
                Self::TYPE_NAME,
                other
            ))),
        }
    }
}

/// Builds [`VectorStoreIndex`] values: chunk, embed, assemble
#[derive(Debug, Clone, Default)]
pub struct VectorIndexBuilder {
    config: ChunkingConfig,
}

impl VectorIndexBuilder {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        if config.chunk_size == 0 || config.chunk_overlap >= config.chunk_size {
            return Err(Error::Configuration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.embed_batch_size == 0 {
            return Err(Error::Configuration("embed_batch_size must be positive".to_string()));
        }
        Ok(Self { config })
    }

    /// Split text into overlapping character windows
    pub fn chunk_text(&self, content: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let chars: Vec<char> = content.chars().collect();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.config.chunk_size).min(chars.len());
            let chunk: String = chars[start..end].iter().collect();
            if !chunk.trim().is_empty() {
                chunks.push(chunk);
            }

            if end >= chars.len() {
                break;
            }

            start = end - self.config.chunk_overlap;
        }

        chunks
    }

    pub async fn build(&self, documents: &[Document], settings: &Settings) -> Result<VectorStoreIndex> {
        let embed_model = settings.embed_model()?;

        let mut pending: Vec<(String, String)> = Vec::new();
        for doc in documents {
            for chunk in self.chunk_text(doc.get_content()) {
                pending.push((doc.id.clone(), chunk));
            }
        }
        debug!(documents = documents.len(), nodes = pending.len(), "chunked documents");

        let mut nodes = Vec::with_capacity(pending.len());
        for batch in pending.chunks(self.config.embed_batch_size) {
            let texts: Vec<String> = batch.iter().map(|(_, text)| text.clone()).collect();
            let embeddings = embed_model.embed_documents(&texts).await?;

            if embeddings.len() != texts.len() {
                return Err(Error::Index(format!(
                    "embedding model returned {} vectors for {} nodes",
                    embeddings.len(),
                    texts.len()
                )));
            }

            for ((document_id, text), embedding) in batch.iter().zip(embeddings) {
                nodes.push(TextNode {
                    id: Uuid::new_v4().to_string(),
                    document_id: document_id.clone(),
                    text: text.clone(),
                    embedding,
                });
            }
        }

        let infos = documents.iter().map(DocumentInfo::from).collect();
        let index = VectorStoreIndex::from_parts(embed_model.model_name(), infos, nodes);
        info!(nodes = index.nodes.len(), "built vector index");
        Ok(index)
    }
}

#[async_trait]
impl IndexBuilder<VectorStoreIndex> for VectorIndexBuilder {
    async fn from_documents(&self, documents: &[Document], settings: &Settings) -> Result<VectorStoreIndex> {
        self.build(documents, settings).await
    }
}

/// Simple cosine similarity calculation
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
