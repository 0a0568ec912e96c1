use std::time::{
    Duration,
    Instant,
};

use chrono::{
    DateTime,
    Utc,
};
use onecontext_core::{
    validation,
    Chunk,
    ClientError,
    ClientResult,
    FileStatus,
    RunRecord,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    mapper,
    types,
    OneContext,
};

#[derive(Debug, Clone)]
pub struct RunArgs {
    pub pipeline_name: String,
    /// Per-step overrides forwarded verbatim, e.g.
    /// `{"retriever": {"query": "..."}}`.
    pub override_args: Option<Value>,
}

impl RunArgs {
    pub fn new(pipeline_name: impl Into<String>) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            override_args: None,
        }
    }

    pub fn with_override_args(mut self, override_args: Value) -> Self {
        self.override_args = Some(override_args);
        self
    }
}

/// Filters for the `run_results` endpoint; serialized as snake_case
/// query params.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResultsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created_gte: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created_lte: Option<DateTime<Utc>>,
}

impl RunResultsQuery {
    pub fn for_run(run_id: impl Into<String>) -> Self {
        Self {
            run_id: Some(run_id.into()),
            ..Self::default()
        }
    }
}

/// Knobs for the polling helpers. The defaults match the service's
/// one-second status cadence and poll until a terminal state; set
/// `timeout` to bound the wait.
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: None,
        }
    }
}

impl OneContext {
    /// Runs a pipeline synchronously and returns the retrieved chunks.
    pub async fn run_pipeline(&self, args: &RunArgs) -> ClientResult<Vec<Chunk>> {
        validation::validate_resource_name("Pipeline", &args.pipeline_name)?;

        let url = self.url("run");
        let response = self
            .http
            .post(&url)
            .json(&types::RunBody {
                pipeline_name: &args.pipeline_name,
                override_args: args.override_args.as_ref(),
            })
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to run pipeline: {e}")))?;

        let body: types::ChunksResponse = self.handle_response(response).await?;
        Ok(body.chunks.into_iter().map(mapper::map_chunk).collect())
    }

    /// Submits a pipeline run for asynchronous execution; pair with
    /// [`Self::wait_for_run`].
    pub async fn submit_run(&self, args: &RunArgs) -> ClientResult<String> {
        validation::validate_resource_name("Pipeline", &args.pipeline_name)?;

        let url = self.url("submit-run");
        let response = self
            .http
            .post(&url)
            .json(&types::RunBody {
                pipeline_name: &args.pipeline_name,
                override_args: args.override_args.as_ref(),
            })
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to submit run: {e}")))?;

        let body: types::SubmitRunResponse = self.handle_response(response).await?;
        debug!(run_id = %body.run_id, pipeline = %args.pipeline_name, "submitted run");
        Ok(body.run_id)
    }

    pub async fn get_run_results(&self, query: &RunResultsQuery) -> ClientResult<Vec<RunRecord>> {
        let runs: Vec<types::RunRecordWire> = self
            .retry_policy
            .retry(|| async {
                let url = self.url("run_results");
                let response = self
                    .http
                    .get(&url)
                    .query(query)
                    .send()
                    .await
                    .map_err(|e| {
                        ClientError::NetworkError(format!("Failed to fetch run results: {e}"))
                    })?;

                self.handle_response(response).await
            })
            .await?;

        Ok(runs.into_iter().map(mapper::map_run).collect())
    }

    /// Polls `run_results` until the run reaches `SUCCESSFUL` or
    /// `FAILED`; `RUNNING` keeps the loop going. A run id the server
    /// does not know is a `NotFound` error.
    pub async fn wait_for_run(&self, run_id: &str, opts: &PollOptions) -> ClientResult<RunRecord> {
        let started = Instant::now();
        let query = RunResultsQuery::for_run(run_id);

        loop {
            let runs = self.get_run_results(&query).await?;
            let run = runs
                .into_iter()
                .find(|run| run.id == run_id)
                .ok_or_else(|| ClientError::NotFound(format!("Run {run_id} not found")))?;

            if run.status.is_terminal() {
                debug!(run_id, status = ?run.status, "run finished");
                return Ok(run);
            }

            check_deadline(started, opts, &format!("run {run_id}"))?;
            tokio::time::sleep(opts.interval).await;
        }
    }

    /// Polls the file listing until `file_name` is `EMBEDDED`. The file
    /// vanishing from the listing is a `NotFound` error; an embedding
    /// failure surfaces as `ApiError`.
    pub async fn await_embeddings(
        &self, knowledge_base_name: &str, file_name: &str, opts: &PollOptions,
    ) -> ClientResult<()> {
        validation::validate_resource_name("File", file_name)?;
        let started = Instant::now();

        loop {
            let files = self.list_files(knowledge_base_name).await?;
            let file = files
                .iter()
                .find(|file| file.name == file_name)
                .ok_or_else(|| {
                    ClientError::NotFound(format!(
                        "File {file_name} not found in knowledge base {knowledge_base_name}"
                    ))
                })?;

            match file.status {
                FileStatus::Embedded => return Ok(()),
                FileStatus::Failed => {
                    return Err(ClientError::ApiError(format!(
                        "Embedding failed for file {file_name}"
                    )));
                }
                FileStatus::Uploaded | FileStatus::Embedding => {}
            }

            check_deadline(started, opts, &format!("embeddings for {file_name}"))?;
            tokio::time::sleep(opts.interval).await;
        }
    }
}

fn check_deadline(started: Instant, opts: &PollOptions, what: &str) -> ClientResult<()> {
    if let Some(timeout) = opts.timeout {
        if started.elapsed() >= timeout {
            return Err(ClientError::Timeout(format!(
                "gave up waiting for {what} after {}s",
                timeout.as_secs()
            )));
        }
    }
    Ok(())
}
