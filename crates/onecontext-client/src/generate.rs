use onecontext_core::{
    validation,
    ClientError,
    ClientResult,
    TopicOutput,
};
use serde_json::Value;

use crate::{
    types,
    OneContext,
};

/// Arguments for per-topic quiz generation. `prompt_per_topic` must
/// contain the `{topic}`, `{chunks}` and `{num_questions_topic}`
/// placeholders.
#[derive(Debug, Clone)]
pub struct QuizArgs {
    pub pipeline_name: String,
    pub prompt_per_topic: String,
    pub metadata_filters: Value,
    pub cluster_label: Option<String>,
    pub score_percentile_label: Option<String>,
    pub total_num_questions: u32,
    pub extract_percentage: f64,
}

#[derive(Debug, Clone)]
pub struct QuestArgs {
    pub knowledge_base_name: String,
    pub vision: String,
    pub mission: String,
    pub quest: String,
    pub intro_prompt: String,
    pub intro_context_budget: u32,
    pub quiz_total_context_budget: u32,
    pub prompt_per_topic: String,
    pub metadata_filters: Value,
    pub total_num_questions: u32,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct CompletionArgs {
    pub pipeline_name: String,
    pub prompt: String,
    pub context_token_budget: u32,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stop: Option<String>,
    pub metadata_json: Value,
    pub score_percentile_key: Option<String>,
    pub chunks_limit: Option<u32>,
}

impl OneContext {
    pub async fn generate_quiz(&self, args: &QuizArgs) -> ClientResult<Vec<TopicOutput>> {
        validation::validate_resource_name("Pipeline", &args.pipeline_name)?;
        validation::validate_quiz_prompt(&args.prompt_per_topic)?;
        validation::validate_metadata_filters(&args.metadata_filters)?;
        validation::validate_positive("total_num_questions", f64::from(args.total_num_questions))?;
        validation::validate_ratio("extract_percentage", args.extract_percentage)?;

        let url = self.url("quiz_completion");
        let response = self
            .http
            .get(&url)
            .json(&types::QuizBody {
                pipeline_name: &args.pipeline_name,
                prompt_per_topic: &args.prompt_per_topic,
                metadata_filters: &args.metadata_filters,
                cluster_label: args.cluster_label.as_deref(),
                score_percentile_label: args.score_percentile_label.as_deref(),
                total_num_questions: args.total_num_questions,
                extract_percentage: args.extract_percentage,
                openai_api_key: self.openai_key(),
            })
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to generate quiz: {e}")))?;

        self.handle_response(response).await
    }

    pub async fn generate_quest(&self, args: &QuestArgs) -> ClientResult<Vec<TopicOutput>> {
        validation::validate_resource_name("Knowledge base", &args.knowledge_base_name)?;
        validation::validate_resource_name("Model", &args.model)?;
        for (field, value) in [
            ("vision", &args.vision),
            ("mission", &args.mission),
            ("quest", &args.quest),
            ("intro_prompt", &args.intro_prompt),
            ("prompt_per_topic", &args.prompt_per_topic),
        ] {
            if value.trim().is_empty() {
                return Err(ClientError::InvalidArgument(format!(
                    "{field} cannot be empty"
                )));
            }
        }
        validation::validate_metadata_filters(&args.metadata_filters)?;
        validation::validate_positive("intro_context_budget", f64::from(args.intro_context_budget))?;
        validation::validate_positive(
            "quiz_total_context_budget",
            f64::from(args.quiz_total_context_budget),
        )?;
        validation::validate_positive("total_num_questions", f64::from(args.total_num_questions))?;

        let url = self.url("quest_gen");
        let response = self
            .http
            .get(&url)
            .json(&types::QuestBody {
                vision: &args.vision,
                user_mission: &args.mission,
                quest: &args.quest,
                intro_prompt: &args.intro_prompt,
                intro_context_budget: args.intro_context_budget,
                quiz_total_context_budget: args.quiz_total_context_budget,
                metadata_filters: &args.metadata_filters,
                prompt_per_topic: &args.prompt_per_topic,
                knowledge_base_name: &args.knowledge_base_name,
                total_num_questions: args.total_num_questions,
                model: &args.model,
                openai_api_key: self.openai_key(),
            })
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to generate quest: {e}")))?;

        self.handle_response(response).await
    }

    /// Completion grounded in retrieved context; returns the raw
    /// completion payload.
    pub async fn context_completion(&self, args: &CompletionArgs) -> ClientResult<Value> {
        validation::validate_resource_name("Pipeline", &args.pipeline_name)?;
        validation::validate_resource_name("Model", &args.model)?;
        validation::validate_metadata_filters(&args.metadata_json)?;
        validation::validate_positive("context_token_budget", f64::from(args.context_token_budget))?;
        validation::validate_positive("temperature", args.temperature)?;
        validation::validate_positive("max_tokens", f64::from(args.max_tokens))?;
        if let Some(chunks_limit) = args.chunks_limit {
            validation::validate_positive("chunks_limit", f64::from(chunks_limit))?;
        }

        let url = self.url("context_completion");
        let response = self
            .http
            .post(&url)
            .json(&types::CompletionBody {
                prompt: &args.prompt,
                context_token_budget: args.context_token_budget,
                model: &args.model,
                temperature: args.temperature,
                max_tokens: args.max_tokens,
                stop: args.stop.as_deref(),
                pipeline_name: &args.pipeline_name,
                metadata_json: &args.metadata_json,
                score_percentile_key: args.score_percentile_key.as_deref(),
                chunks_limit: args.chunks_limit,
                openai_api_key: self.openai_key(),
            })
            .send()
            .await
            .map_err(|e| {
                ClientError::NetworkError(format!("Failed to run context completion: {e}"))
            })?;

        self.handle_response(response).await
    }
}
