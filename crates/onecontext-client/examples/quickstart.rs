//! End-to-end tour: create a knowledge base, vector index and
//! pipelines, upload a document, wait for embeddings, run a retrieval
//! query, then clean everything up.
//!
//! Needs `ONECONTEXT_API_KEY` (and optionally `ONECONTEXT_BASE_URL`) in
//! the environment:
//!
//! ```sh
//! cargo run --example quickstart
//! ```

use anyhow::Result;
use onecontext_client::{
    OneContext,
    PollOptions,
    QueryArgs,
    RunArgs,
    UploadArgs,
    UploadSource,
};
use serde_json::json;

const KNOWLEDGE_BASE: &str = "demoKnowledgeBase";
const VECTOR_INDEX: &str = "demoVectorIndex";
const INDEX_PIPELINE: &str = "demoIndexPipeline";
const RETRIEVER_PIPELINE: &str = "demoRetrieverPipeline";

const INDEX_YAML: &str = r#"
index:
  name: demoIndexPipeline
  stages:
    - stage: Chunker
      steps:
        - step: OCChunker
          name: chunker
          step_args:
            chunk_size: 512
          depends_on: []
    - stage: Embedder
      steps:
        - step: SentenceTransformerEmbedder
          name: embedder
          step_args:
            model_name: BAAI/bge-base-en-v1.5
          depends_on: [chunker]
"#;

const RETRIEVER_YAML: &str = r#"
index:
  name: demoIndexPipeline
  stages: []
query:
  name: demoRetrieverPipeline
  stages:
    - stage: Retriever
      steps:
        - step: OCRetriever
          name: retriever
          step_args:
            top_k: 5
          depends_on: []
    - stage: Reranker
      steps:
        - step: OCReranker
          name: reranker
          depends_on: [retriever]
"#;

#[tokio::main]
async fn main() -> Result<()> {
    onecontext_core::logging::init();

    let client = OneContext::from_env()?;

    client.create_knowledge_base(KNOWLEDGE_BASE).await?;
    client
        .create_vector_index(VECTOR_INDEX, "BAAI/bge-base-en-v1.5")
        .await?;
    client.create_pipeline(INDEX_PIPELINE, INDEX_YAML).await?;
    client
        .create_pipeline(RETRIEVER_PIPELINE, RETRIEVER_YAML)
        .await?;

    client
        .upload_files(&UploadArgs {
            knowledge_base_name: KNOWLEDGE_BASE.to_string(),
            sources: vec![UploadSource::Content {
                name: "munger.txt".to_string(),
                content: "I never allow myself to have an opinion on anything that I don't \
                          know the other side's argument better than they do."
                    .to_string(),
            }],
            metadata_json: Some(json!({"tag": "charlie_munger"})),
        })
        .await?;

    client
        .await_embeddings(KNOWLEDGE_BASE, "munger.txt", &PollOptions::default())
        .await?;

    let run_id = client
        .submit_run(&RunArgs::new(INDEX_PIPELINE))
        .await?;
    let run = client.wait_for_run(&run_id, &PollOptions::default()).await?;
    println!("run {} finished: {:?}", run.id, run.status);

    let chunks = client
        .query(&QueryArgs::new(RETRIEVER_PIPELINE))
        .await?;
    for chunk in &chunks {
        println!("{}: {}", chunk.id, chunk.content);
    }

    client.delete_pipeline(RETRIEVER_PIPELINE).await?;
    client.delete_pipeline(INDEX_PIPELINE).await?;
    client.delete_vector_index(VECTOR_INDEX).await?;
    client.delete_knowledge_base(KNOWLEDGE_BASE).await?;

    Ok(())
}
