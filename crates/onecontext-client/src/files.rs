use std::path::{
    Path,
    PathBuf,
};

use onecontext_core::{
    validation,
    ClientError,
    ClientResult,
};
use reqwest::multipart::{
    Form,
    Part,
};
use serde_json::Value;
use tracing::{
    debug,
    warn,
};

use crate::OneContext;

/// Extensions the upload endpoint accepts when walking a directory.
const UPLOAD_EXTENSIONS: &[&str] = &["txt", "pdf", "docx", "doc"];

/// One file to upload: either read from disk, or built from in-memory
/// text (which must be named `*.txt` and is sent as `text/plain`).
#[derive(Debug, Clone)]
pub enum UploadSource {
    Path(PathBuf),
    Content { name: String, content: String },
}

#[derive(Debug, Clone)]
pub struct UploadArgs {
    pub knowledge_base_name: String,
    pub sources: Vec<UploadSource>,
    pub metadata_json: Option<Value>,
}

impl OneContext {
    /// Uploads files to a knowledge base as one multipart request with
    /// a `files` part per file, the `knowledgebase_name` field, and an
    /// optional JSON-encoded `metadata_json` field.
    pub async fn upload_files(&self, args: &UploadArgs) -> ClientResult<()> {
        validation::validate_resource_name("Knowledge base", &args.knowledge_base_name)?;
        if args.sources.is_empty() {
            return Err(ClientError::InvalidArgument(
                "at least one file is required".to_string(),
            ));
        }

        let mut form = Form::new();
        for source in &args.sources {
            form = form.part("files", build_part(source).await?);
        }
        form = form.text("knowledgebase_name", args.knowledge_base_name.clone());
        if let Some(metadata) = &args.metadata_json {
            form = form.text("metadata_json", serde_json::to_string(metadata)?);
        }

        let url = self.url("upload");
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to upload files: {e}")))?;

        self.expect_success(response).await?;
        debug!(
            knowledge_base = %args.knowledge_base_name,
            files = args.sources.len(),
            "uploaded files"
        );
        Ok(())
    }

    /// Uploads every supported file (`.txt`, `.pdf`, `.docx`, `.doc`)
    /// in a directory, returning how many were sent.
    pub async fn upload_directory(
        &self, knowledge_base_name: &str, directory: &Path, metadata_json: Option<Value>,
    ) -> ClientResult<usize> {
        validation::validate_resource_name("Knowledge base", knowledge_base_name)?;

        let mut entries = tokio::fs::read_dir(directory).await.map_err(|e| {
            ClientError::InvalidArgument(format!(
                "Failed to read directory {}: {e}",
                directory.display()
            ))
        })?;

        let mut sources = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            ClientError::InvalidArgument(format!(
                "Failed to read directory {}: {e}",
                directory.display()
            ))
        })? {
            let path = entry.path();
            let supported = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| UPLOAD_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
            if supported {
                sources.push(UploadSource::Path(path));
            }
        }

        if sources.is_empty() {
            warn!(directory = %directory.display(), "no uploadable files found");
            return Ok(0);
        }

        let count = sources.len();
        self.upload_files(&UploadArgs {
            knowledge_base_name: knowledge_base_name.to_string(),
            sources,
            metadata_json,
        })
        .await?;

        Ok(count)
    }

    /// Queues YouTube URLs for server-side transcription into a
    /// knowledge base.
    pub async fn upload_youtube_urls(
        &self, knowledge_base_name: &str, urls: &[String],
    ) -> ClientResult<()> {
        validation::validate_resource_name("Knowledge base", knowledge_base_name)?;
        if urls.is_empty() {
            return Err(ClientError::InvalidArgument(
                "urls cannot be empty".to_string(),
            ));
        }

        let url = self.url("yt_urls");
        let response = self
            .http
            .post(&url)
            .json(&crate::types::YouTubeUrlsBody {
                urls,
                knowledgebase_name: knowledge_base_name,
            })
            .send()
            .await
            .map_err(|e| {
                ClientError::NetworkError(format!("Failed to submit YouTube URLs: {e}"))
            })?;

        self.expect_success(response).await
    }
}

async fn build_part(source: &UploadSource) -> ClientResult<Part> {
    match source {
        UploadSource::Content { name, content } => {
            if !name.ends_with(".txt") {
                return Err(ClientError::InvalidArgument(format!(
                    "in-memory file '{name}' must be named *.txt"
                )));
            }

            Part::bytes(content.clone().into_bytes())
                .file_name(name.clone())
                .mime_str("text/plain")
                .map_err(|e| ClientError::Internal(format!("Failed to build upload part: {e}")))
        }
        UploadSource::Path(path) => {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    ClientError::InvalidArgument(format!(
                        "{} has no file name",
                        path.display()
                    ))
                })?;

            let bytes = tokio::fs::read(path).await.map_err(|e| {
                ClientError::InvalidArgument(format!("Failed to read {}: {e}", path.display()))
            })?;

            let mime = mime_guess::from_path(path).first_or_octet_stream();
            Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(mime.as_ref())
                .map_err(|e| ClientError::Internal(format!("Failed to build upload part: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_content_files_must_be_txt() {
        let source = UploadSource::Content {
            name: "notes.pdf".to_string(),
            content: "not really a pdf".to_string(),
        };
        let err = build_part(&source).await.unwrap_err();
        assert!(err.to_string().contains("*.txt"));
    }

    #[tokio::test]
    async fn test_content_part_builds() {
        let source = UploadSource::Content {
            name: "notes.txt".to_string(),
            content: "hello".to_string(),
        };
        assert!(build_part(&source).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_path_is_an_invalid_argument() {
        let source = UploadSource::Path(PathBuf::from("/definitely/not/here.txt"));
        let err = build_part(&source).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }
}
