use std::time::Duration;

use quill::cache::EmbeddingCacheHandle;
use quill::embedding::{EmbeddingClient, EmbeddingSettings, MockEmbeddingBackend};
use quill::generation::{GenerationClient, GenerationParams, MockGenerationBackend, PromptBuilder};
use quill::pipeline::{CommentService, NoRetrieval};
use quill::quality::CommentController;
use quill::retry::{RecordingSleeper, RetryPolicy};

pub const TITLE: &str = "Cannot get my device to boot";
pub const BODY: &str = "Tried three disk images, no luck.";

/// Specific, on-topic reply that passes the default rules.
pub const SPECIFIC_REPLY: &str = "KiloCode can help narrow down why the device refuses to boot. \
    Since three disk images all failed the same way, compare their boot logs to see whether \
    the failure happens before or after the bootloader hands over.";

pub const EMBEDDING_DIM: usize = 8;

pub fn topic_text() -> String {
    format!("{TITLE}\n\n{BODY}")
}

pub fn test_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(100))
}

pub fn chain(models: &[&str]) -> Vec<String> {
    models.iter().map(|m| m.to_string()).collect()
}

pub fn generation_client(
    backend: &MockGenerationBackend,
    sleeper: &RecordingSleeper,
) -> GenerationClient<MockGenerationBackend, RecordingSleeper> {
    GenerationClient::with_sleeper(
        backend.clone(),
        GenerationParams::default(),
        test_retry(),
        sleeper.clone(),
    )
}

pub fn comment_service(
    backend: &MockGenerationBackend,
    models: &[&str],
) -> CommentService<MockGenerationBackend, RecordingSleeper, NoRetrieval> {
    let controller = CommentController::new(
        generation_client(backend, &RecordingSleeper::new()),
        PromptBuilder::default(),
    );
    CommentService::new(controller, NoRetrieval, chain(models))
}

pub fn embedding_client(
    backend: &MockEmbeddingBackend,
    cache: &EmbeddingCacheHandle,
    batch_size: usize,
) -> EmbeddingClient<MockEmbeddingBackend, RecordingSleeper> {
    EmbeddingClient::with_sleeper(
        backend.clone(),
        cache.clone(),
        EmbeddingSettings {
            batch_size,
            retry: test_retry(),
            ..EmbeddingSettings::default()
        },
        RecordingSleeper::new(),
    )
}

/// Distinct texts, `count` of them.
pub fn numbered_texts(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("Discussion snippet number {i} about build failures"))
        .collect()
}
