//! # Summary Pipeline Tests
//!
//! End-to-end runs of the orchestrator with a mock extractor and mock or wiremock-backed
//! providers. Each test sets up its own router so routing, timeouts and citation checks
//! can be observed in isolation.

use anycite::providers::ai::openai::OpenAiProvider;
use anycite::{
    DocumentRef, InMemoryContent, ModelOption, PipelineConfig, Provider, ProviderEndpoints,
    ProviderError, ProviderRouter, SummaryError, SummaryPipeline, SummaryRequest,
};
use anycite_test_utils::{init_tracing, InMemorySink, MockAiProvider, MockExtractor, MockReply};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const MAX_CHARS: usize = 10_000;

fn lecture_extractor() -> MockExtractor {
    let extractor = MockExtractor::new();
    extractor.add_document(
        "lecture.pdf",
        [
            "Cells are the basic unit of life.",
            "Mitochondria produce ATP through respiration.",
            "Ribosomes synthesize proteins.",
        ],
    );
    extractor
}

fn two_document_extractor() -> MockExtractor {
    let extractor = MockExtractor::new();
    extractor.add_document("a.pdf", ["Alpha page one.", "Alpha page two."]);
    extractor.add_document("b.pdf", ["Beta page one."]);
    extractor
}

fn doc(id: i64, name: &str) -> DocumentRef {
    DocumentRef::new(
        id,
        Some(name.to_string()),
        InMemoryContent::new(b"%PDF-stub".to_vec()),
    )
}

fn request(documents: Vec<DocumentRef>, model_key: &str) -> SummaryRequest {
    SummaryRequest {
        requester: Some("user-1".to_string()),
        documents,
        title: "Biology".to_string(),
        description: "Week 1".to_string(),
        model_key: model_key.to_string(),
        instruction: None,
    }
}

fn pipeline_with(
    extractor: MockExtractor,
    provider: Provider,
    ai: MockAiProvider,
    config: PipelineConfig,
) -> SummaryPipeline {
    let router = ProviderRouter::new().with_route(provider, Arc::new(ai));
    SummaryPipeline::new(Arc::new(extractor), router, config)
}

#[tokio::test]
async fn test_single_document_gpt4o_returns_cited_item() {
    init_tracing();
    let ai = MockAiProvider::with_responses([
        r#"[{"summarySentence":"X","originalQuote":"Y","docsId":7,"pageNumber":2}]"#,
    ]);
    let pipeline = pipeline_with(
        lecture_extractor(),
        Provider::OpenAi,
        ai.clone(),
        PipelineConfig::new(MAX_CHARS),
    );

    let summary = pipeline
        .run(request(vec![doc(7, "lecture.pdf")], "GPT_4O"))
        .await
        .unwrap();

    assert_eq!(summary.items.len(), 1);
    assert_eq!(summary.items[0].docs_id, 7);
    assert_eq!(summary.items[0].page_number, 2);
    assert_eq!(summary.items[0].summary_sentence, "X");
    assert_eq!(summary.model_key, ModelOption::Gpt4o);
    assert_eq!(summary.document_ids, vec![7]);
    assert_eq!(summary.title, "Biology");
    assert_eq!(summary.description, "Week 1");

    let calls = ai.get_calls();
    assert_eq!(calls.len(), 1);
    let (prompt, model_id) = &calls[0];
    assert_eq!(model_id, "gpt-4o");
    assert!(prompt.contains("docsId: 7"));
    assert!(prompt.contains("fileName: lecture.pdf"));
    for n in 1..=3 {
        assert!(prompt.contains(&format!("--- Page {n} ---")));
    }
}

#[tokio::test]
async fn test_unknown_model_fails_before_any_work() {
    let extractor = lecture_extractor();
    let ai = MockAiProvider::with_responses(["[]"]);
    let pipeline = pipeline_with(
        extractor.clone(),
        Provider::OpenAi,
        ai.clone(),
        PipelineConfig::new(MAX_CHARS),
    );

    let err = pipeline
        .run(request(vec![doc(7, "lecture.pdf")], "unknown-model"))
        .await
        .unwrap_err();

    assert!(matches!(err, SummaryError::InvalidModel(ref k) if k == "unknown-model"));
    assert!(ai.get_calls().is_empty());
    assert!(extractor.get_calls().is_empty());
}

#[tokio::test]
async fn test_fenced_empty_array_yields_zero_citations() {
    let ai = MockAiProvider::with_responses(["```json\n[]\n```"]);
    let pipeline = pipeline_with(
        lecture_extractor(),
        Provider::Gemini,
        ai,
        PipelineConfig::new(MAX_CHARS),
    );

    let summary = pipeline
        .run(request(vec![doc(7, "lecture.pdf")], "gemini-2.0-flash-lite"))
        .await
        .unwrap();

    assert!(summary.items.is_empty());
    assert_eq!(summary.model_key, ModelOption::Gemini20FlashLite);
}

#[tokio::test]
async fn test_provider_http_timeout_fails_with_provider_call_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(800))
                .set_body_json(json!({"choices": [{"message": {"content": "[]"}}]})),
        )
        .mount(&server)
        .await;

    let timeout = Duration::from_millis(100);
    let client = OpenAiProvider::new(
        ProviderEndpoints::new(server.uri()),
        "sk-test".to_string(),
        timeout,
    )
    .unwrap();
    let router = ProviderRouter::new().with_route(Provider::OpenAi, Arc::new(client));
    let sink = InMemorySink::new();
    let pipeline = SummaryPipeline::new(
        Arc::new(lecture_extractor()),
        router,
        PipelineConfig::new(MAX_CHARS).with_request_timeout(Duration::from_secs(5)),
    );

    let err = pipeline
        .run_and_persist(request(vec![doc(7, "lecture.pdf")], "GPT_4O"), &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, SummaryError::ProviderCall(ProviderError::Timeout)), "got {err:?}");
    assert_eq!(err.status_code(), 504);
    assert!(sink.saved().is_empty());
}

/// A provider that ignores its own timeout is still cut off by the pipeline deadline.
#[tokio::test]
async fn test_pipeline_deadline_bounds_slow_providers() {
    let ai = MockAiProvider::new();
    ai.push_reply(MockReply::Delayed(Duration::from_secs(30), "[]".to_string()));
    let pipeline = pipeline_with(
        lecture_extractor(),
        Provider::OpenAi,
        ai,
        PipelineConfig::new(MAX_CHARS).with_request_timeout(Duration::from_millis(50)),
    );

    let err = pipeline
        .run(request(vec![doc(7, "lecture.pdf")], "GPT_41_MINI"))
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::ProviderCall(ProviderError::Timeout)));
}

#[tokio::test]
async fn test_dropping_the_run_cancels_the_provider_call() {
    let ai = MockAiProvider::new();
    ai.push_reply(MockReply::Delayed(Duration::from_millis(500), "[]".to_string()));
    let pipeline = pipeline_with(
        lecture_extractor(),
        Provider::OpenAi,
        ai.clone(),
        PipelineConfig::new(MAX_CHARS),
    );

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        pipeline.run(request(vec![doc(7, "lecture.pdf")], "GPT_4O")),
    )
    .await;
    assert!(outcome.is_err(), "run should still be waiting on the provider");

    // Give the delayed reply time to resolve had the call not been dropped.
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(ai.get_calls().len(), 1);
    assert_eq!(ai.completed_calls(), 0);
}

#[tokio::test]
async fn test_stray_document_citation_is_dropped() {
    let ai = MockAiProvider::with_responses([r#"[
        {"summarySentence":"A","originalQuote":"Alpha page one.","docsId":1,"pageNumber":1},
        {"summarySentence":"Ghost","originalQuote":"Nowhere","docsId":999,"pageNumber":1},
        {"summarySentence":"B","originalQuote":"Beta page one.","docsId":2,"pageNumber":1}
    ]"#]);
    let pipeline = pipeline_with(
        two_document_extractor(),
        Provider::OpenAi,
        ai,
        PipelineConfig::new(MAX_CHARS),
    );

    let summary = pipeline
        .run(request(vec![doc(1, "a.pdf"), doc(2, "b.pdf")], "gpt-4o"))
        .await
        .unwrap();

    let cited: Vec<i64> = summary.items.iter().map(|i| i.docs_id).collect();
    assert_eq!(cited, vec![1, 2]);
    assert_eq!(summary.document_ids, vec![1, 2]);
}

#[tokio::test]
async fn test_out_of_range_pages_are_dropped() {
    let ai = MockAiProvider::with_responses([r#"[
        {"summarySentence":"ok","originalQuote":"q","docsId":1,"pageNumber":2},
        {"summarySentence":"zero","originalQuote":"q","docsId":1,"pageNumber":0},
        {"summarySentence":"past end","originalQuote":"q","docsId":2,"pageNumber":2}
    ]"#]);
    let pipeline = pipeline_with(
        two_document_extractor(),
        Provider::OpenAi,
        ai,
        PipelineConfig::new(MAX_CHARS),
    );

    let summary = pipeline
        .run(request(vec![doc(1, "a.pdf"), doc(2, "b.pdf")], "GPT_4O"))
        .await
        .unwrap();

    assert_eq!(summary.items.len(), 1);
    assert_eq!(summary.items[0].summary_sentence, "ok");
}

#[tokio::test]
async fn test_quote_verification_flag_drops_fabricated_quotes() {
    let reply = r#"[
        {"summarySentence":"real","originalQuote":"Alpha page two.","docsId":1,"pageNumber":2},
        {"summarySentence":"wrong page","originalQuote":"Alpha page one.","docsId":1,"pageNumber":2},
        {"summarySentence":"made up","originalQuote":"Gamma","docsId":2,"pageNumber":1}
    ]"#;

    let lenient = pipeline_with(
        two_document_extractor(),
        Provider::OpenAi,
        MockAiProvider::with_responses([reply]),
        PipelineConfig::new(MAX_CHARS),
    );
    let summary = lenient
        .run(request(vec![doc(1, "a.pdf"), doc(2, "b.pdf")], "GPT_4O"))
        .await
        .unwrap();
    assert_eq!(summary.items.len(), 3);

    let strict = pipeline_with(
        two_document_extractor(),
        Provider::OpenAi,
        MockAiProvider::with_responses([reply]),
        PipelineConfig::new(MAX_CHARS).with_quote_verification(true),
    );
    let summary = strict
        .run(request(vec![doc(1, "a.pdf"), doc(2, "b.pdf")], "GPT_4O"))
        .await
        .unwrap();
    let kept: Vec<&str> = summary
        .items
        .iter()
        .map(|i| i.summary_sentence.as_str())
        .collect();
    assert_eq!(kept, vec!["real"]);
}

#[tokio::test]
async fn test_blocks_are_clipped_and_kept_in_input_order() {
    let extractor = MockExtractor::new();
    extractor.add_document("long.pdf", ["x".repeat(500)]);
    extractor.add_document("short.pdf", ["short text"]);
    let ai = MockAiProvider::with_responses(["[]"]);
    let pipeline = pipeline_with(extractor, Provider::OpenAi, ai.clone(), PipelineConfig::new(100));

    let mut req = request(vec![doc(5, "long.pdf"), doc(3, "short.pdf")], "GPT_4O");
    req.instruction = Some("Only key terms.".to_string());
    pipeline.run(req).await.unwrap();

    let (prompt, _) = &ai.get_calls()[0];
    assert!(prompt.contains("... [TRUNCATED]"));
    assert!(!prompt.contains(&"x".repeat(101)));
    assert!(prompt.find("docsId: 5").unwrap() < prompt.find("docsId: 3").unwrap());
    assert!(prompt.contains("Only key terms."));
}

#[tokio::test]
async fn test_malformed_reply_fails_with_parse_error_and_nothing_is_saved() {
    let ai = MockAiProvider::with_responses(["Here is your summary: [oops"]);
    let pipeline = pipeline_with(
        lecture_extractor(),
        Provider::OpenAi,
        ai,
        PipelineConfig::new(MAX_CHARS),
    );
    let sink = InMemorySink::new();

    let err = pipeline
        .run_and_persist(request(vec![doc(7, "lecture.pdf")], "GPT_4O"), &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, SummaryError::SummaryParse(_)));
    assert!(sink.saved().is_empty());
}

#[tokio::test]
async fn test_provider_error_status_fails_the_run() {
    let ai = MockAiProvider::new();
    ai.push_reply(MockReply::Error {
        status: 502,
        body: "bad gateway".to_string(),
    });
    let pipeline = pipeline_with(
        lecture_extractor(),
        Provider::OpenAi,
        ai,
        PipelineConfig::new(MAX_CHARS),
    );

    let err = pipeline
        .run(request(vec![doc(7, "lecture.pdf")], "GPT_4O"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SummaryError::ProviderCall(ProviderError::Api { status: 502, .. })
    ));
}

#[tokio::test]
async fn test_corrupt_document_fails_extraction_without_provider_call() {
    let ai = MockAiProvider::with_responses(["[]"]);
    let pipeline = pipeline_with(
        two_document_extractor(),
        Provider::OpenAi,
        ai.clone(),
        PipelineConfig::new(MAX_CHARS),
    );
    let corrupt = DocumentRef::new(
        2,
        Some("b.pdf".to_string()),
        InMemoryContent::new(MockExtractor::CORRUPT.to_vec()),
    );

    let err = pipeline
        .run(request(vec![doc(1, "a.pdf"), corrupt], "GPT_4O"))
        .await
        .unwrap_err();

    assert!(matches!(err, SummaryError::Extraction { ref file_name, .. } if file_name == "b.pdf"));
    assert!(ai.get_calls().is_empty());
}

#[tokio::test]
async fn test_missing_file_surfaces_as_extraction_error() {
    let ai = MockAiProvider::with_responses(["[]"]);
    let pipeline = pipeline_with(
        lecture_extractor(),
        Provider::OpenAi,
        ai,
        PipelineConfig::new(MAX_CHARS),
    );
    let missing = DocumentRef::new(
        1,
        None,
        anycite::FileContent::new("/definitely/not/here.pdf"),
    );

    let err = pipeline
        .run(request(vec![missing], "GPT_4O"))
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::Extraction { ref file_name, .. } if file_name == "document-1"));
}

#[tokio::test]
async fn test_invalid_requests_are_rejected() {
    let pipeline = pipeline_with(
        lecture_extractor(),
        Provider::OpenAi,
        MockAiProvider::new(),
        PipelineConfig::new(MAX_CHARS),
    );

    let empty = pipeline.run(request(vec![], "GPT_4O")).await.unwrap_err();
    assert!(matches!(empty, SummaryError::InvalidRequest(_)));
    assert_eq!(empty.status_code(), 400);

    let duplicate = pipeline
        .run(request(
            vec![doc(7, "lecture.pdf"), doc(7, "lecture.pdf")],
            "GPT_4O",
        ))
        .await
        .unwrap_err();
    assert!(matches!(duplicate, SummaryError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_unrouted_provider_is_unavailable() {
    let pipeline = pipeline_with(
        lecture_extractor(),
        Provider::OpenAi,
        MockAiProvider::new(),
        PipelineConfig::new(MAX_CHARS),
    );

    let err = pipeline
        .run(request(vec![doc(7, "lecture.pdf")], "GEMINI_20_FLASH"))
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::ProviderUnavailable(Provider::Gemini)));
}

#[tokio::test]
async fn test_successful_run_is_persisted_once() {
    let ai = MockAiProvider::with_responses([
        r#"[{"summarySentence":"S","originalQuote":"Q","docsId":7,"pageNumber":1}]"#,
    ]);
    let pipeline = pipeline_with(
        lecture_extractor(),
        Provider::OpenAi,
        ai,
        PipelineConfig::new(MAX_CHARS),
    );
    let sink = InMemorySink::new();

    let stored = pipeline
        .run_and_persist(request(vec![doc(7, "lecture.pdf")], "GPT_4O"), &sink)
        .await
        .unwrap();

    let saved = sink.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, stored.id);
    assert_eq!(saved[0].1, stored.summary);

    let json = serde_json::to_value(&stored.summary).unwrap();
    assert_eq!(json["modelKey"], "GPT_4O");
    assert_eq!(json["documentIds"], json!([7]));
    assert_eq!(json["items"][0]["pageNumber"], 1);
    assert!(json["createdAt"].is_string());
}
