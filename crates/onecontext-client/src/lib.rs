//! Rust client for the OneContext document-pipeline API.
//!
//! Every remote operation is a method on [`OneContext`]; request
//! arguments are validated locally (including the YAML pipeline
//! configuration) before anything goes over the wire, and failures come
//! back as typed [`ClientError`]s carrying the server's own error
//! detail.
//!
//! ```no_run
//! use onecontext_client::{ClientConfig, OneContext};
//!
//! # async fn demo() -> onecontext_client::ClientResult<()> {
//! let client = OneContext::new(ClientConfig::new("oc-api-key"))?;
//! client.create_knowledge_base("demoKnowledgeBase").await?;
//! for kb in client.list_knowledge_bases().await? {
//!     println!("{} ({})", kb.name, kb.id);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod files;
mod generate;
mod indexes;
mod knowledge_bases;
mod mapper;
mod pipelines;
mod query;
mod runs;
pub mod throughput;
mod types;

pub use client::OneContext;
pub use config::{
    ClientConfig,
    DEFAULT_BASE_URL,
};
pub use files::{
    UploadArgs,
    UploadSource,
};
pub use generate::{
    CompletionArgs,
    QuestArgs,
    QuizArgs,
};
// Re-exported so downstream crates only need one dependency.
pub use onecontext_core::{
    Chunk,
    ClientError,
    ClientResult,
    FileStatus,
    KnowledgeBase,
    KnowledgeBaseFile,
    KnowledgeBaseStatus,
    PipelineConfig,
    PipelineOverrides,
    PipelineSummary,
    RunRecord,
    RunStatus,
    TopicOutput,
    VectorIndex,
};
pub use query::{
    GetChunksArgs,
    QueryArgs,
};
pub use runs::{
    PollOptions,
    RunArgs,
    RunResultsQuery,
};
