use super::*;
use crate::cache::EmbeddingCacheHandle;
use crate::embedding::{EmbeddingClient, EmbeddingSettings, MockEmbeddingBackend};
use crate::generation::{GenerationClient, GenerationParams, MockGenerationBackend, PromptBuilder};
use crate::quality::{CommentController, QualityRules};
use crate::remote::RemoteError;
use crate::retrieval::{Corpus, CorpusEntry, InMemoryCorpusProvider, RetrievalService};
use crate::retry::{RecordingSleeper, RetryPolicy};
use std::time::Duration;

const GOOD: &str = "KiloCode can help narrow down why the device refuses to boot. Since three disk \
                    images all failed the same way, compare their boot logs to see whether the \
                    failure happens before or after the bootloader hands over.";

const TITLE: &str = "Cannot get my device to boot";
const BODY: &str = "Tried three disk images, no luck.";

fn controller(
    backend: &MockGenerationBackend,
) -> CommentController<MockGenerationBackend, RecordingSleeper> {
    CommentController::new(
        GenerationClient::with_sleeper(
            backend.clone(),
            GenerationParams::default(),
            RetryPolicy::new(3, Duration::from_millis(1)),
            RecordingSleeper::new(),
        ),
        PromptBuilder::default(),
    )
}

fn chain() -> Vec<String> {
    vec!["primary".to_string()]
}

type TestRetriever =
    CorpusRetriever<MockEmbeddingBackend, RecordingSleeper, InMemoryCorpusProvider>;

fn retriever(embedder: &MockEmbeddingBackend) -> TestRetriever {
    let provider = InMemoryCorpusProvider::new();
    provider.insert(
        Corpus::new(
            DOCS_CORPUS,
            vec![
                CorpusEntry {
                    id: "d1".into(),
                    text: "Boot failures often come from the bootloader config.".into(),
                    vector: vec![1.0, 0.0],
                },
                CorpusEntry {
                    id: "d2".into(),
                    text: "Unrelated note about themes.".into(),
                    vector: vec![0.0, 1.0],
                },
            ],
        )
        .unwrap(),
    );
    provider.insert(
        Corpus::new(
            COMMENTS_CORPUS,
            vec![CorpusEntry {
                id: "c1".into(),
                text: "Check the firmware settings first.".into(),
                vector: vec![1.0, 0.0],
            }],
        )
        .unwrap(),
    );

    let embedding = EmbeddingClient::with_sleeper(
        embedder.clone(),
        EmbeddingCacheHandle::new(),
        EmbeddingSettings {
            retry: RetryPolicy::none(),
            ..EmbeddingSettings::default()
        },
        RecordingSleeper::new(),
    );
    CorpusRetriever::new(RetrievalService::new(embedding), provider)
}

fn query() -> String {
    format!("{TITLE}\n\n{BODY}")
}

#[tokio::test]
async fn test_supplied_context_is_used_verbatim() {
    let backend = MockGenerationBackend::new();
    backend.respond("primary", GOOD);
    let embedder = MockEmbeddingBackend::new(2);
    let service = CommentService::new(controller(&backend), Some(retriever(&embedder)), chain());

    let text = service
        .produce_comment(TITLE, BODY, Some(vec!["Supplied snippet.".to_string()]))
        .await;

    assert_eq!(text, GOOD);
    assert_eq!(embedder.call_count(), 0);
    assert!(backend.calls()[0].prompt.user.contains("Supplied snippet."));
}

#[tokio::test]
async fn test_retrieved_context_feeds_prompt() {
    let backend = MockGenerationBackend::new();
    backend.respond("primary", GOOD);
    let embedder = MockEmbeddingBackend::new(2);
    embedder.set_vector(&query(), vec![0.9, 0.1]);
    let service =
        CommentService::new(controller(&backend), retriever(&embedder), chain()).with_top_k(1);

    service.produce_comment(TITLE, BODY, None).await;

    let user = &backend.calls()[0].prompt.user;
    assert!(user.contains("Boot failures often come from the bootloader config."));
    assert!(!user.contains("Unrelated note about themes."));
    assert!(user.contains("STYLE EXAMPLES\nCheck the firmware settings first."));
    assert_eq!(embedder.call_count(), 1);
}

#[tokio::test]
async fn test_retrieval_failure_falls_back_to_context_pack() {
    let backend = MockGenerationBackend::new();
    backend.respond("primary", GOOD);
    let embedder = MockEmbeddingBackend::new(2);
    embedder.fail_always(RemoteError::Unauthorized {
        reason: "no key".into(),
    });
    let service = CommentService::new(controller(&backend), retriever(&embedder), chain());

    let comment = service.produce(TITLE, BODY, None).await;

    assert!(!comment.is_fallback());
    let user = &backend.calls()[0].prompt.user;
    assert!(user.contains("KiloCode can read the failing code path"));
}

#[tokio::test]
async fn test_without_retrieval_uses_context_pack() {
    let backend = MockGenerationBackend::new();
    backend.respond("primary", GOOD);
    let service = CommentService::new(controller(&backend), NoRetrieval, chain());

    service.produce_comment(TITLE, BODY, Some(Vec::new())).await;

    assert!(backend.calls()[0].prompt.user.contains("REFERENCE CONTEXT\nKiloCode"));
}

#[tokio::test]
async fn test_empty_topic_still_returns_text() {
    let backend = MockGenerationBackend::new();
    let service = CommentService::new(controller(&backend), NoRetrieval, Vec::new());

    let comment = service.produce("", "", None).await;

    assert!(comment.is_fallback());
    assert!(QualityRules::default().validate(&comment.text, "").accepted);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_all_models_transient_still_returns_text() {
    let backend = MockGenerationBackend::new();
    for model in ["a", "b"] {
        backend.always(
            model,
            Err(RemoteError::Server {
                status: 503,
                reason: "down".into(),
            }),
        );
    }
    let service = CommentService::new(
        controller(&backend),
        NoRetrieval,
        vec!["a".to_string(), "b".to_string()],
    );

    let comment = service.produce(TITLE, BODY, None).await;

    assert!(comment.is_fallback());
    assert_eq!(backend.calls_for("a"), 4);
    assert_eq!(backend.calls_for("b"), 4);
    assert!(
        QualityRules::default()
            .validate(&comment.text, &query())
            .accepted
    );
}
