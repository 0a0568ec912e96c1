use std::io::Write;
use std::time::Duration;

use onecontext_client::{
    ClientConfig,
    ClientError,
    FileStatus,
    OneContext,
    PollOptions,
    QueryArgs,
    RunArgs,
    RunResultsQuery,
    RunStatus,
    UploadArgs,
    UploadSource,
};
use serde_json::json;
use wiremock::matchers::{
    body_json,
    body_string_contains,
    header,
    method,
    path,
    query_param,
};
use wiremock::{
    Mock,
    MockServer,
    ResponseTemplate,
};

async fn client_for(server: &MockServer) -> OneContext {
    OneContext::new(ClientConfig::new("test-key").with_base_url(server.uri())).unwrap()
}

fn fast_poll() -> PollOptions {
    PollOptions {
        interval: Duration::from_millis(5),
        timeout: Some(Duration::from_secs(5)),
    }
}

#[tokio::test]
async fn create_knowledge_base_sends_snake_case_body_and_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/knowledgebase"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(json!({"name": "demoKnowledgeBase"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "kb-1", "name": "demoKnowledgeBase"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let kb = client.create_knowledge_base("demoKnowledgeBase").await.unwrap();
    assert_eq!(kb.id, "kb-1");
    assert_eq!(kb.name, "demoKnowledgeBase");
}

#[tokio::test]
async fn whitespace_only_names_are_rejected_before_any_request() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;

    let err = client.create_knowledge_base("   ").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));

    let err = client
        .run_pipeline(&RunArgs::new("\t\n"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));

    // Nothing was sent.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_pipeline_validates_yaml_locally() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;

    let bad_yaml = r#"
index:
  name: demo
  stages:
    - stage: Shuffler
      steps:
        - step: OCChunker
          name: chunker
"#;
    let err = client.create_pipeline("demo", bad_yaml).await.unwrap_err();
    match err {
        ClientError::InvalidPipelineConfig(message) => {
            assert!(message.contains("invalid stage name 'Shuffler'"));
        }
        other => panic!("expected InvalidPipelineConfig, got {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_pipeline_posts_yaml_config_key() {
    let server = MockServer::start().await;

    let yaml = r#"
index:
  name: demo
  stages:
    - stage: Chunker
      steps:
        - step: OCChunker
          name: chunker
"#;

    Mock::given(method("POST"))
        .and(path("/pipeline"))
        .and(body_json(json!({"name": "demo", "yaml_config": yaml})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.create_pipeline("demo", yaml).await.unwrap();
}

#[tokio::test]
async fn get_pipeline_parses_the_returned_yaml() {
    let server = MockServer::start().await;

    let yaml = "index:\n  name: demo\n  stages:\n    - stage: Embedder\n      steps:\n        - step: SentenceTransformerEmbedder\n          name: embedder\n";
    Mock::given(method("GET"))
        .and(path("/pipeline/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_string(yaml))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let config = client.get_pipeline("demo").await.unwrap();
    assert_eq!(config.index.name, "demo");
    assert_eq!(config.index.stages[0].stage, "Embedder");
}

#[tokio::test]
async fn run_results_params_use_documented_snake_case_keys() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/run_results"))
        .and(query_param("run_id", "run-42"))
        .and(query_param("limit", "10"))
        .and(query_param("sort", "date_created"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "run-42", "status": "SUCCESSFUL", "date_created": "2024-03-01T12:00:00Z"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let query = RunResultsQuery {
        run_id: Some("run-42".to_string()),
        limit: Some(10),
        sort: Some("date_created".to_string()),
        ..RunResultsQuery::default()
    };
    let runs = client.get_run_results(&query).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Successful);
}

#[tokio::test]
async fn wait_for_run_loops_on_running_and_stops_on_terminal_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/run_results"))
        .and(query_param("run_id", "run-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "run-1", "status": "RUNNING"}])),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/run_results"))
        .and(query_param("run_id", "run-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "run-1", "status": "SUCCESSFUL"}])),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let run = client.wait_for_run("run-1", &fast_poll()).await.unwrap();
    assert_eq!(run.status, RunStatus::Successful);

    // Two RUNNING polls plus the terminal one.
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn wait_for_run_errors_when_the_run_is_unknown() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/run_results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .wait_for_run("run-gone", &fast_poll())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn await_embeddings_polls_until_embedded() {
    let server = MockServer::start().await;

    let pending = json!([
        {"id": "f-1", "name": "munger.txt", "knowledgebase_id": "kb-1", "status": "EMBEDDING"}
    ]);
    let done = json!([
        {"id": "f-1", "name": "munger.txt", "knowledgebase_id": "kb-1", "status": "EMBEDDED"}
    ]);

    Mock::given(method("GET"))
        .and(path("/knowledgebase/demo/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/knowledgebase/demo/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(done))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client
        .await_embeddings("demo", "munger.txt", &fast_poll())
        .await
        .unwrap();
}

#[tokio::test]
async fn await_embeddings_errors_when_the_file_vanishes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/knowledgebase/demo/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .await_embeddings("demo", "missing.txt", &fast_poll())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn list_files_maps_statuses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/knowledgebase/demo/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "f-1", "name": "a.txt", "knowledgebase_id": "kb-1", "status": "EMBEDDED"},
            {"id": "f-2", "name": "b.pdf", "knowledgebase_id": "kb-1", "status": "UPLOADED"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let files = client.list_files("demo").await.unwrap();
    assert_eq!(files[0].status, FileStatus::Embedded);
    assert_eq!(files[1].status, FileStatus::Uploaded);
}

#[tokio::test]
async fn query_flattens_chunk_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(json!({"pipeline_name": "retrieve"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chunks": [{
                "id": "c-1",
                "content": "Charlie Munger on circles of competence",
                "metadata_json": {
                    "tag": "charlie_munger",
                    "_split_overlap": [3, 17]
                }
            }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let chunks = client.query(&QueryArgs::new("retrieve")).await.unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].metadata["tag"], json!("charlie_munger"));
    assert!(!chunks[0].metadata.contains_key("_split_overlap"));
}

#[tokio::test]
async fn upload_sends_multipart_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("knowledgebase_name"))
        .and(body_string_contains("metadata_json"))
        .and(body_string_contains("from-memory.txt"))
        .and(body_string_contains("on-disk.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut on_disk = tempfile::Builder::new()
        .suffix("-on-disk.txt")
        .tempfile()
        .unwrap();
    writeln!(on_disk, "file contents").unwrap();

    let client = client_for(&server).await;
    client
        .upload_files(&UploadArgs {
            knowledge_base_name: "demo".to_string(),
            sources: vec![
                UploadSource::Content {
                    name: "from-memory.txt".to_string(),
                    content: "in-memory contents".to_string(),
                },
                UploadSource::Path(on_disk.path().to_path_buf()),
            ],
            metadata_json: Some(json!({"tag": "charlie_munger"})),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn server_error_detail_is_decoded_in_preference_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/knowledgebase"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": ["knowledge base already exists"],
            "detail": "should not be used",
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/knowledgebase"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "name is too short"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    let err = client.create_knowledge_base("demo").await.unwrap_err();
    assert!(err.to_string().contains("knowledge base already exists"));

    let err = client.create_knowledge_base("demo").await.unwrap_err();
    assert!(err.to_string().contains("name is too short"));
}

#[tokio::test]
async fn unauthorized_is_a_typed_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/knowledgebase/demo"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "invalid api key"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.delete_knowledge_base("demo").await.unwrap_err();
    match err {
        ClientError::AuthenticationFailed(detail) => assert!(detail.contains("invalid api key")),
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn submit_run_returns_the_run_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/submit-run"))
        .and(body_json(json!({
            "pipeline_name": "index-pipeline",
            "override_args": {"chunker": {"chunk_size": 512}},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"run_id": "run-7"})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let run_id = client
        .submit_run(
            &RunArgs::new("index-pipeline")
                .with_override_args(json!({"chunker": {"chunk_size": 512}})),
        )
        .await
        .unwrap();
    assert_eq!(run_id, "run-7");
}

#[tokio::test]
async fn transient_server_errors_are_retried_on_reads() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/knowledgebase"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "flaky"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/knowledgebase"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": "kb-1", "name": "demo"}])),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let kbs = client.list_knowledge_bases().await.unwrap();
    assert_eq!(kbs.len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
