use onecontext_core::{
    validation,
    ClientError,
    ClientResult,
    KnowledgeBase,
    KnowledgeBaseFile,
    KnowledgeBaseStatus,
};
use tracing::debug;
use urlencoding::encode;

use crate::{
    mapper,
    types,
    OneContext,
};

impl OneContext {
    pub async fn create_knowledge_base(&self, name: &str) -> ClientResult<KnowledgeBase> {
        validation::validate_resource_name("Knowledge base", name)?;

        let url = self.url("knowledgebase");
        let response = self
            .http
            .post(&url)
            .json(&types::CreateKnowledgeBaseBody { name })
            .send()
            .await
            .map_err(|e| {
                ClientError::NetworkError(format!("Failed to create knowledge base: {e}"))
            })?;

        let created: KnowledgeBase = self.handle_response(response).await?;
        debug!(name = %created.name, id = %created.id, "created knowledge base");
        Ok(created)
    }

    pub async fn delete_knowledge_base(&self, name: &str) -> ClientResult<()> {
        validation::validate_resource_name("Knowledge base", name)?;

        let url = self.url(&format!("knowledgebase/{}", encode(name)));
        let response = self.http.delete(&url).send().await.map_err(|e| {
            ClientError::NetworkError(format!("Failed to delete knowledge base: {e}"))
        })?;

        self.expect_success(response).await
    }

    pub async fn list_knowledge_bases(&self) -> ClientResult<Vec<KnowledgeBase>> {
        self.retry_policy
            .retry(|| async {
                let url = self.url("knowledgebase");
                let response = self.http.get(&url).send().await.map_err(|e| {
                    ClientError::NetworkError(format!("Failed to list knowledge bases: {e}"))
                })?;

                self.handle_response(response).await
            })
            .await
    }

    pub async fn knowledge_base_status(&self, name: &str) -> ClientResult<KnowledgeBaseStatus> {
        validation::validate_resource_name("Knowledge base", name)?;

        self.retry_policy
            .retry(|| async {
                let url = self.url(&format!("knowledgebase/{}/status", encode(name)));
                let response = self.http.get(&url).send().await.map_err(|e| {
                    ClientError::NetworkError(format!("Failed to fetch knowledge base status: {e}"))
                })?;

                self.handle_response(response).await
            })
            .await
    }

    /// Lists the files in a knowledge base with their ingestion status.
    pub async fn list_files(&self, name: &str) -> ClientResult<Vec<KnowledgeBaseFile>> {
        validation::validate_resource_name("Knowledge base", name)?;

        let files: Vec<types::FileRecord> = self
            .retry_policy
            .retry(|| async {
                let url = self.url(&format!("knowledgebase/{}/files", encode(name)));
                let response = self.http.get(&url).send().await.map_err(|e| {
                    ClientError::NetworkError(format!("Failed to list files: {e}"))
                })?;

                self.handle_response(response).await
            })
            .await?;

        Ok(files.into_iter().map(mapper::map_file).collect())
    }

    pub async fn delete_files(&self, name: &str, file_names: &[String]) -> ClientResult<()> {
        validation::validate_resource_name("Knowledge base", name)?;
        for file_name in file_names {
            validation::validate_resource_name("File", file_name)?;
        }
        if file_names.is_empty() {
            return Err(ClientError::InvalidArgument(
                "file_names cannot be empty".to_string(),
            ));
        }

        let url = self.url(&format!("knowledgebase/{}/files", encode(name)));
        let response = self
            .http
            .delete(&url)
            .json(&types::DeleteFilesBody { file_names })
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to delete files: {e}")))?;

        self.expect_success(response).await
    }
}
