use onecontext_core::{
    validation,
    ClientError,
    ClientResult,
    VectorIndex,
};
use urlencoding::encode;

use crate::{
    types,
    OneContext,
};

impl OneContext {
    /// Creates a vector index backed by the given embedding model
    /// (e.g. `BAAI/bge-base-en-v1.5`).
    pub async fn create_vector_index(
        &self, name: &str, model_name: &str,
    ) -> ClientResult<VectorIndex> {
        validation::validate_resource_name("Vector index", name)?;
        validation::validate_resource_name("Model", model_name)?;

        let url = self.url("index");
        let response = self
            .http
            .post(&url)
            .json(&types::CreateVectorIndexBody { name, model_name })
            .send()
            .await
            .map_err(|e| {
                ClientError::NetworkError(format!("Failed to create vector index: {e}"))
            })?;

        self.handle_response(response).await
    }

    pub async fn delete_vector_index(&self, name: &str) -> ClientResult<()> {
        validation::validate_resource_name("Vector index", name)?;

        let url = self.url(&format!("index/{}", encode(name)));
        let response = self.http.delete(&url).send().await.map_err(|e| {
            ClientError::NetworkError(format!("Failed to delete vector index: {e}"))
        })?;

        self.expect_success(response).await
    }

    pub async fn list_vector_indexes(&self) -> ClientResult<Vec<VectorIndex>> {
        self.retry_policy
            .retry(|| async {
                let url = self.url("index");
                let response = self.http.get(&url).send().await.map_err(|e| {
                    ClientError::NetworkError(format!("Failed to list vector indexes: {e}"))
                })?;

                self.handle_response(response).await
            })
            .await
    }
}
