//! Retrieval-augmented query engine

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use docsum_core::{EmbeddingModel, Error, LLMProvider, QueryEngine, Response, Result, SourceNode};

use crate::vector_index::VectorStoreIndex;

/// Answers questions by retrieving the closest nodes and prompting the LLM
pub struct RetrieverQueryEngine<'a> {
    index: &'a VectorStoreIndex,
    embed_model: Arc<dyn EmbeddingModel>,
    llm: Arc<dyn LLMProvider>,
    similarity_top_k: usize,
}

impl<'a> RetrieverQueryEngine<'a> {
    pub const DEFAULT_TOP_K: usize = 2;

    pub fn new(index: &'a VectorStoreIndex, embed_model: Arc<dyn EmbeddingModel>, llm: Arc<dyn LLMProvider>) -> Self {
        Self {
            index,
            embed_model,
            llm,
            similarity_top_k: Self::DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.similarity_top_k = top_k.max(1);
        self
    }

    /// Build context from retrieved nodes
    pub fn build_context(nodes: &[SourceNode]) -> String {
        nodes
            .iter()
            .map(|node| node.text.trim())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Question-answering prompt over the retrieved context
    pub fn build_prompt(context: &str, query: &str) -> String {
        format!(
            "Context information is below.\n\
            ---------------------\n\
            {}\n\
            ---------------------\n\
            Given the context information and not prior knowledge, answer the query.\n\
            Query: {}\n\
            Answer: ",
            context, query
        )
    }
}

#[async_trait]
impl QueryEngine for RetrieverQueryEngine<'_> {
    async fn query(&self, text: &str) -> Result<Response> {
        if self.index.nodes().is_empty() {
            return Err(Error::QueryEngine("index contains no nodes".to_string()));
        }

        let query_embedding = self.embed_model.embed_query(text).await?;
        let source_nodes = self.index.retrieve(&query_embedding, self.similarity_top_k);
        debug!(retrieved = source_nodes.len(), "retrieved context nodes");

        let prompt = Self::build_prompt(&Self::build_context(&source_nodes), text);
        let answer = self.llm.complete(&prompt).await?;

        Ok(Response {
            response: answer,
            source_nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EchoLLM, KeywordEmbedding};
    use docsum_core::{Document, IndexHandle, Settings};

    #[tokio::test]
    async fn test_query_prompts_llm_with_best_context() {
        let docs = vec![
            Document::from_text("painting and art school"),
            Document::from_text("startups and founders"),
        ];
        let settings = Settings::new()
            .with_embed_model(Arc::new(KeywordEmbedding))
            .with_llm(Arc::new(EchoLLM));
        let index = VectorStoreIndex::from_documents(&docs, &settings).await.unwrap();

        let engine = RetrieverQueryEngine::new(&index, settings.embed_model().unwrap(), settings.llm().unwrap())
            .with_top_k(1);
        let response = engine.query("tell me about startups").await.unwrap();

        assert_eq!(response.source_nodes.len(), 1);
        assert_eq!(response.source_nodes[0].text, "startups and founders");
        assert!(response.response.contains("startups and founders"));
        assert!(response.response.contains("Query: tell me about startups"));
        assert!(!response.response.contains("painting"));
    }

    #[tokio::test]
    async fn test_as_query_engine_requires_llm() {
        let index = VectorStoreIndex::from_parts("m", Vec::new(), Vec::new());
        let settings = Settings::new().with_embed_model(Arc::new(KeywordEmbedding));
        assert!(index.as_query_engine(&settings).is_err());
    }

    #[tokio::test]
    async fn test_empty_index_query_fails() {
        let index = VectorStoreIndex::from_parts("m", Vec::new(), Vec::new());
        let engine = RetrieverQueryEngine::new(&index, Arc::new(KeywordEmbedding), Arc::new(EchoLLM));
        let err = engine.query("anything").await.unwrap_err();
        assert!(matches!(err, Error::QueryEngine(_)));
    }

    #[test]
    fn test_build_context_joins_nodes() {
        let nodes = vec![
            SourceNode { document_id: "a".to_string(), text: " one ".to_string(), score: 0.9 },
            SourceNode { document_id: "b".to_string(), text: "two".to_string(), score: 0.8 },
        ];
        assert_eq!(RetrieverQueryEngine::build_context(&nodes), "one\n\ntwo");
    }
}
