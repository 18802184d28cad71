use crate::domain::model::{FunctionMetadata, MemoryQueryResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Semantic memory backend: embedding search and persistence live behind this port.
#[async_trait]
pub trait SemanticTextMemory: Send + Sync {
    /// Returns at most `limit` records scoring at least `min_relevance_score`,
    /// best match first.
    async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        min_relevance_score: f64,
    ) -> Result<Vec<MemoryQueryResult>>;

    async fn save_information(
        &self,
        collection: &str,
        text: &str,
        id: &str,
        description: Option<&str>,
        additional_metadata: Option<&str>,
    ) -> Result<()>;
}

/// Exposes a plugin's functions to a calling layer for registration.
pub trait KernelFunctionProvider: Send + Sync {
    fn plugin_name(&self) -> &str;
    fn functions(&self) -> Vec<FunctionMetadata>;

    fn function(&self, name: &str) -> Option<FunctionMetadata> {
        self.functions()
            .into_iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }
}
