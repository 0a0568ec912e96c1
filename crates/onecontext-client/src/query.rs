use onecontext_core::{
    validation,
    Chunk,
    ClientError,
    ClientResult,
};
use serde_json::Value;
use urlencoding::encode;

use crate::{
    mapper,
    types,
    OneContext,
};

#[derive(Debug, Clone)]
pub struct QueryArgs {
    pub pipeline_name: String,
    /// Optional YAML overriding the pipeline's query section for this
    /// call only.
    pub override_oc_yaml: Option<String>,
}

impl QueryArgs {
    pub fn new(pipeline_name: impl Into<String>) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            override_oc_yaml: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GetChunksArgs {
    pub knowledge_base_name: String,
    pub metadata_filters: Value,
    pub top_k: Option<u32>,
}

impl GetChunksArgs {
    pub fn new(knowledge_base_name: impl Into<String>) -> Self {
        Self {
            knowledge_base_name: knowledge_base_name.into(),
            metadata_filters: Value::Object(serde_json::Map::new()),
            top_k: None,
        }
    }
}

impl OneContext {
    /// Runs the pipeline's query section and returns chunks with their
    /// metadata flattened.
    pub async fn query(&self, args: &QueryArgs) -> ClientResult<Vec<Chunk>> {
        validation::validate_resource_name("Pipeline", &args.pipeline_name)?;

        let url = self.url("query");
        let response = self
            .http
            .post(&url)
            .json(&types::QueryBody {
                pipeline_name: &args.pipeline_name,
                override_oc_yaml: args.override_oc_yaml.as_deref(),
            })
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to query: {e}")))?;

        let body: types::ChunksResponse = self.handle_response(response).await?;
        Ok(body.chunks.into_iter().map(mapper::map_chunk).collect())
    }

    /// Fetches raw chunks from a knowledge base, filtered by metadata.
    pub async fn get_chunks(&self, args: &GetChunksArgs) -> ClientResult<Vec<Chunk>> {
        validation::validate_resource_name("Knowledge base", &args.knowledge_base_name)?;
        validation::validate_metadata_filters(&args.metadata_filters)?;
        if let Some(top_k) = args.top_k {
            validation::validate_positive("top_k", f64::from(top_k))?;
        }

        let chunks: Vec<types::ChunkWire> = self
            .retry_policy
            .retry(|| async {
                let url = self.url(&format!(
                    "knowledgebase/{}/chunks",
                    encode(&args.knowledge_base_name)
                ));
                let response = self
                    .http
                    .get(&url)
                    .json(&types::ChunksBody {
                        metadata_filters: &args.metadata_filters,
                        top_k: args.top_k,
                    })
                    .send()
                    .await
                    .map_err(|e| {
                        ClientError::NetworkError(format!("Failed to fetch chunks: {e}"))
                    })?;

                self.handle_response(response).await
            })
            .await?;

        Ok(chunks.into_iter().map(mapper::map_chunk).collect())
    }
}
