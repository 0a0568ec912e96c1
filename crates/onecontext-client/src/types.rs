//! Wire types for the OneContext API.
//!
//! Request bodies and query params use the documented snake_case keys;
//! response types are internal and mapped to the domain types in
//! `mapper`.

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct CreateKnowledgeBaseBody<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePipelineBody<'a> {
    pub name: &'a str,
    pub yaml_config: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateVectorIndexBody<'a> {
    pub name: &'a str,
    pub model_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteFilesBody<'a> {
    pub file_names: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct YouTubeUrlsBody<'a> {
    pub urls: &'a [String],
    pub knowledgebase_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RunBody<'a> {
    pub pipeline_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_args: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QueryBody<'a> {
    pub pipeline_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_oc_yaml: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChunksBody<'a> {
    pub metadata_filters: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizBody<'a> {
    pub pipeline_name: &'a str,
    pub prompt_per_topic: &'a str,
    pub metadata_filters: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_percentile_label: Option<&'a str>,
    pub total_num_questions: u32,
    pub extract_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestBody<'a> {
    pub vision: &'a str,
    pub user_mission: &'a str,
    pub quest: &'a str,
    pub intro_prompt: &'a str,
    pub intro_context_budget: u32,
    pub quiz_total_context_budget: u32,
    pub metadata_filters: &'a Value,
    pub prompt_per_topic: &'a str,
    pub knowledge_base_name: &'a str,
    pub total_num_questions: u32,
    pub model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompletionBody<'a> {
    pub prompt: &'a str,
    pub context_token_budget: u32,
    pub model: &'a str,
    pub temperature: f64,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<&'a str>,
    pub pipeline_name: &'a str,
    pub metadata_json: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_percentile_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub knowledgebase_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunRecordWire {
    pub id: String,
    #[serde(default)]
    pub pipeline_name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub date_created: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRunResponse {
    pub run_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChunksResponse {
    #[serde(default)]
    pub chunks: Vec<ChunkWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChunkWire {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata_json: Option<Value>,
    // Anything else the server tacks onto a chunk survives into the
    // flattened metadata.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
