use chrono::{
    DateTime,
    Utc,
};
use onecontext_core::{
    Chunk,
    FileStatus,
    KnowledgeBaseFile,
    RunRecord,
    RunStatus,
};
use serde_json::Value;

use crate::types;

/// Unknown statuses map to `Running` so polling only terminates on the
/// documented terminal states (or its deadline).
pub(crate) fn map_run_status(status: &str) -> RunStatus {
    match status {
        "SUCCESSFUL" => RunStatus::Successful,
        "FAILED" => RunStatus::Failed,
        "RUNNING" | "PENDING" | "QUEUED" => RunStatus::Running,
        _ => RunStatus::Running,
    }
}

pub(crate) fn map_file_status(status: &str) -> FileStatus {
    match status {
        "EMBEDDED" => FileStatus::Embedded,
        "EMBEDDING" => FileStatus::Embedding,
        "FAILED" => FileStatus::Failed,
        "UPLOADED" => FileStatus::Uploaded,
        _ => FileStatus::Uploaded,
    }
}

pub(crate) fn map_file(file: types::FileRecord) -> KnowledgeBaseFile {
    let status = map_file_status(&file.status);
    KnowledgeBaseFile {
        id: file.id,
        name: file.name,
        knowledgebase_id: file.knowledgebase_id,
        status,
    }
}

pub(crate) fn map_run(run: types::RunRecordWire) -> RunRecord {
    let status = map_run_status(&run.status);
    let date_created = run
        .date_created
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    RunRecord {
        id: run.id,
        pipeline_name: run.pipeline_name,
        status,
        date_created,
    }
}

/// Flattens `metadata_json` into the chunk's metadata, one level deep,
/// dropping the internal `_split_overlap` bookkeeping key.
pub(crate) fn map_chunk(chunk: types::ChunkWire) -> Chunk {
    let mut metadata = chunk.extra;

    if let Some(Value::Object(inner)) = chunk.metadata_json {
        for (key, value) in inner {
            metadata.insert(key, value);
        }
    }
    metadata.remove("_split_overlap");

    Chunk {
        id: chunk.id,
        content: chunk.content,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_map_run_status() {
        assert_eq!(map_run_status("SUCCESSFUL"), RunStatus::Successful);
        assert_eq!(map_run_status("FAILED"), RunStatus::Failed);
        assert_eq!(map_run_status("RUNNING"), RunStatus::Running);
        assert_eq!(map_run_status("SOMETHING_NEW"), RunStatus::Running);
        assert!(!map_run_status("SOMETHING_NEW").is_terminal());
    }

    #[test]
    fn test_map_file_status() {
        assert_eq!(map_file_status("EMBEDDED"), FileStatus::Embedded);
        assert_eq!(map_file_status("EMBEDDING"), FileStatus::Embedding);
        assert_eq!(map_file_status("FAILED"), FileStatus::Failed);
        assert_eq!(map_file_status("whatever"), FileStatus::Uploaded);
    }

    #[test]
    fn test_map_chunk_flattens_metadata() {
        let wire: types::ChunkWire = serde_json::from_value(json!({
            "id": "chunk-1",
            "content": "the content",
            "file_name": "munger.pdf",
            "metadata_json": {
                "tag": "charlie_munger",
                "_split_overlap": [12, 40],
            },
        }))
        .unwrap();

        let chunk = map_chunk(wire);
        assert_eq!(chunk.metadata["tag"], json!("charlie_munger"));
        assert_eq!(chunk.metadata["file_name"], json!("munger.pdf"));
        assert!(!chunk.metadata.contains_key("_split_overlap"));
        assert!(!chunk.metadata.contains_key("metadata_json"));
    }

    #[test]
    fn test_map_chunk_without_metadata() {
        let wire: types::ChunkWire = serde_json::from_value(json!({
            "id": "chunk-2",
            "content": "bare",
        }))
        .unwrap();

        let chunk = map_chunk(wire);
        assert!(chunk.metadata.is_empty());
    }

    #[test]
    fn test_map_run_parses_timestamps() {
        let wire: types::RunRecordWire = serde_json::from_value(json!({
            "id": "run-1",
            "status": "SUCCESSFUL",
            "date_created": "2024-03-01T12:00:00Z",
        }))
        .unwrap();

        let run = map_run(wire);
        assert_eq!(run.status, RunStatus::Successful);
        assert!(run.date_created.is_some());
    }
}
