use onecontext_core::{
    validation,
    ClientError,
    ClientResult,
    PipelineConfig,
    PipelineSummary,
};
use tracing::debug;
use urlencoding::encode;

use crate::{
    types,
    OneContext,
};

impl OneContext {
    /// Validates the YAML locally (collecting every issue) before the
    /// pipeline is sent to the server.
    pub async fn create_pipeline(&self, name: &str, pipeline_yaml: &str) -> ClientResult<()> {
        validation::validate_resource_name("Pipeline", name)?;
        let config = PipelineConfig::from_yaml(pipeline_yaml)?;
        debug!(
            pipeline = %name,
            index_stages = config.index.stages.len(),
            "validated pipeline config"
        );

        let url = self.url("pipeline");
        let response = self
            .http
            .post(&url)
            .json(&types::CreatePipelineBody {
                name,
                yaml_config: pipeline_yaml,
            })
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to create pipeline: {e}")))?;

        self.expect_success(response).await
    }

    pub async fn delete_pipeline(&self, name: &str) -> ClientResult<()> {
        validation::validate_resource_name("Pipeline", name)?;

        let url = self.url(&format!("pipeline/{}", encode(name)));
        let response = self.http.delete(&url).send().await.map_err(|e| {
            ClientError::NetworkError(format!("Failed to delete pipeline: {e}"))
        })?;

        self.expect_success(response).await
    }

    pub async fn list_pipelines(&self) -> ClientResult<Vec<PipelineSummary>> {
        self.retry_policy
            .retry(|| async {
                let url = self.url("pipeline");
                let response = self.http.get(&url).send().await.map_err(|e| {
                    ClientError::NetworkError(format!("Failed to list pipelines: {e}"))
                })?;

                self.handle_response(response).await
            })
            .await
    }

    /// Fetches a pipeline's YAML from the server and parses it back
    /// into a validated [`PipelineConfig`].
    pub async fn get_pipeline(&self, name: &str) -> ClientResult<PipelineConfig> {
        validation::validate_resource_name("Pipeline", name)?;

        let yaml = self
            .retry_policy
            .retry(|| async {
                let url = self.url(&format!("pipeline/{}", encode(name)));
                let response = self.http.get(&url).send().await.map_err(|e| {
                    ClientError::NetworkError(format!("Failed to fetch pipeline: {e}"))
                })?;

                self.handle_text_response(response).await
            })
            .await?;

        Ok(PipelineConfig::from_yaml(&yaml)?)
    }
}
