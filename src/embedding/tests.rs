use super::*;
use crate::cache::EmbeddingCacheHandle;
use crate::hashing::Fingerprint;
use crate::remote::{Classify, ErrorClass, RemoteError};
use crate::retry::{RecordingSleeper, RetryPolicy};
use std::time::Duration;

const DIM: usize = 8;

fn settings() -> EmbeddingSettings {
    EmbeddingSettings {
        model_id: "test-embed".to_string(),
        max_text_chars: 1500,
        batch_size: 20,
        timeout: Duration::from_secs(5),
        retry: RetryPolicy::new(3, Duration::from_millis(10)),
    }
}

fn client(
    backend: &MockEmbeddingBackend,
) -> (
    EmbeddingClient<MockEmbeddingBackend, RecordingSleeper>,
    RecordingSleeper,
) {
    let sleeper = RecordingSleeper::new();
    let client = EmbeddingClient::with_sleeper(
        backend.clone(),
        EmbeddingCacheHandle::new(),
        settings(),
        sleeper.clone(),
    );
    (client, sleeper)
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[tokio::test]
async fn test_empty_input_makes_no_call() {
    let backend = MockEmbeddingBackend::new(DIM);
    let (client, _) = client(&backend);

    let out = client.embed::<&str>(&[], 20, true).await.unwrap();
    assert!(out.is_empty());
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_same_text_twice_embeds_once() {
    let backend = MockEmbeddingBackend::new(DIM);
    let (client, _) = client(&backend);

    let first = client.embed(&["What is X?"], 20, false).await.unwrap();
    let second = client.embed(&["What is X?"], 20, false).await.unwrap();

    assert_eq!(backend.call_count(), 1);
    assert_eq!(first, second);
    assert_eq!(client.cache().len(), 1);
}

#[tokio::test]
async fn test_duplicate_texts_in_one_call_are_submitted_once() {
    let backend = MockEmbeddingBackend::new(DIM);
    let (client, _) = client(&backend);

    let out = client
        .embed(&["alpha", "beta", "alpha"], 20, false)
        .await
        .unwrap();

    assert_eq!(out.len(), 3);
    assert_eq!(out[0], out[2]);
    assert_eq!(backend.requests(), vec![vec!["alpha".to_string(), "beta".to_string()]]);
}

#[tokio::test]
async fn test_output_order_with_mixed_hits() {
    let backend = MockEmbeddingBackend::new(DIM);
    let (client, _) = client(&backend);

    client.embed(&["b"], 20, false).await.unwrap();
    let out = client.embed(&["a", "b", "c"], 20, false).await.unwrap();

    assert_eq!(out[0], backend.vector_for("a"));
    assert_eq!(out[1], backend.vector_for("b"));
    assert_eq!(out[2], backend.vector_for("c"));
    assert_eq!(
        backend.requests()[1],
        vec!["a".to_string(), "c".to_string()]
    );
}

#[tokio::test]
async fn test_normalized_output_has_unit_length() {
    let backend = MockEmbeddingBackend::new(DIM);
    let (client, _) = client(&backend);

    let out = client.embed(&["one", "two"], 20, true).await.unwrap();
    for v in &out {
        assert!((norm(v) - 1.0).abs() < 1e-5);
    }
}

#[tokio::test]
async fn test_cache_holds_raw_vectors() {
    let backend = MockEmbeddingBackend::new(2);
    backend.set_vector("raw", vec![3.0, 4.0]);
    let (client, _) = client(&backend);

    let normalized = client.embed(&["raw"], 20, true).await.unwrap();
    let raw = client.embed(&["raw"], 20, false).await.unwrap();

    assert_eq!(raw[0], vec![3.0, 4.0]);
    assert!((normalized[0][0] - 0.6).abs() < 1e-6);
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_zero_vector_stays_zero_when_normalized() {
    let backend = MockEmbeddingBackend::new(3);
    backend.set_vector("nothing", vec![0.0, 0.0, 0.0]);
    let (client, _) = client(&backend);

    let out = client.embed(&["nothing"], 20, true).await.unwrap();
    assert_eq!(out[0], vec![0.0, 0.0, 0.0]);
}

#[tokio::test]
async fn test_batches_of_twenty_five() {
    let backend = MockEmbeddingBackend::new(DIM);
    let (client, _) = client(&backend);

    let texts: Vec<String> = (0..25).map(|i| format!("text number {i}")).collect();
    let out = client.embed(&texts, 20, true).await.unwrap();

    assert_eq!(out.len(), 25);
    assert_eq!(backend.call_count(), 2);
    let sizes: Vec<usize> = backend.requests().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![20, 5]);
}

#[tokio::test]
async fn test_warm_cache_skips_full_sub_batches() {
    let backend = MockEmbeddingBackend::new(DIM);
    let (client, _) = client(&backend);

    let texts: Vec<String> = (0..25).map(|i| format!("text number {i}")).collect();
    client.embed(&texts[..20], 20, true).await.unwrap();
    assert_eq!(backend.call_count(), 1);

    client.embed(&texts, 20, true).await.unwrap();
    assert_eq!(backend.call_count(), 2);
    assert_eq!(backend.requests()[1].len(), 5);

    client.embed(&texts, 20, true).await.unwrap();
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_long_text_is_truncated_before_fingerprinting() {
    let backend = MockEmbeddingBackend::new(DIM);
    let sleeper = RecordingSleeper::new();
    let client = EmbeddingClient::with_sleeper(
        backend.clone(),
        EmbeddingCacheHandle::new(),
        EmbeddingSettings {
            max_text_chars: 10,
            ..settings()
        },
        sleeper,
    );

    client
        .embed(&["short text that keeps going"], 20, false)
        .await
        .unwrap();

    assert_eq!(backend.requests()[0], vec!["short text".to_string()]);
    assert!(
        client
            .cache()
            .contains(&Fingerprint::of("short text"), "test-embed")
    );
}

#[tokio::test]
async fn test_invalid_batch_size() {
    let backend = MockEmbeddingBackend::new(DIM);
    let (client, _) = client(&backend);

    let err = client.embed(&["x"], 0, true).await.unwrap_err();
    assert!(matches!(err, EmbeddingError::InvalidBatchSize { size: 0, .. }));

    let err = client.embed(&["x"], 101, true).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Config);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let backend = MockEmbeddingBackend::new(DIM);
    backend.fail_next(RemoteError::RateLimited {
        reason: "slow down".into(),
    });
    let (client, sleeper) = client(&backend);

    let out = client.embed(&["retry me"], 20, true).await.unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(backend.call_count(), 2);
    assert_eq!(sleeper.delays(), vec![Duration::from_millis(10)]);
}

#[tokio::test]
async fn test_persistent_transient_failure_fails_call() {
    let backend = MockEmbeddingBackend::new(DIM);
    backend.fail_always(RemoteError::Server {
        status: 503,
        reason: "down".into(),
    });
    let (client, sleeper) = client(&backend);

    let err = client.embed(&["doomed"], 20, true).await.unwrap_err();

    match &err {
        EmbeddingError::Remote {
            batch, attempts, ..
        } => {
            assert_eq!(*batch, 0);
            assert_eq!(*attempts, 4);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.class(), ErrorClass::Transient);
    assert_eq!(backend.call_count(), 4);
    assert_eq!(sleeper.count(), 3);
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_config_failure_is_not_retried() {
    let backend = MockEmbeddingBackend::new(DIM);
    backend.fail_always(RemoteError::ModelNotFound {
        model: "test-embed".into(),
    });
    let (client, sleeper) = client(&backend);

    let err = client.embed(&["doomed"], 20, true).await.unwrap_err();

    assert_eq!(err.class(), ErrorClass::Config);
    assert_eq!(backend.call_count(), 1);
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn test_failure_in_second_sub_batch_keeps_first_cached() {
    let backend = MockEmbeddingBackend::new(DIM);
    let sleeper = RecordingSleeper::new();
    let client = EmbeddingClient::with_sleeper(
        backend.clone(),
        EmbeddingCacheHandle::new(),
        EmbeddingSettings {
            retry: RetryPolicy::none(),
            ..settings()
        },
        sleeper,
    );

    client.embed(&["warm"], 2, false).await.unwrap();
    backend.fail_always(RemoteError::Transport {
        reason: "reset".into(),
    });

    let err = client
        .embed(&["warm", "also warm?", "cold"], 2, false)
        .await
        .unwrap_err();
    assert!(matches!(err, EmbeddingError::Remote { batch: 0, .. }));
    assert_eq!(client.cache().len(), 1);
}

#[tokio::test]
async fn test_wrong_vector_count_is_malformed() {
    struct ShortBackend;

    impl EmbeddingBackend for ShortBackend {
        async fn embed_batch(
            &self,
            _model: &str,
            _texts: &[String],
        ) -> Result<Vec<Vec<f32>>, RemoteError> {
            Ok(vec![vec![1.0, 0.0]])
        }
    }

    let client = EmbeddingClient::with_sleeper(
        ShortBackend,
        EmbeddingCacheHandle::new(),
        EmbeddingSettings {
            retry: RetryPolicy::none(),
            ..settings()
        },
        RecordingSleeper::new(),
    );

    let err = client.embed(&["a", "b"], 20, true).await.unwrap_err();
    match err {
        EmbeddingError::Remote { source, .. } => {
            assert!(matches!(source, RemoteError::MalformedResponse { .. }))
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_embed_one() {
    let backend = MockEmbeddingBackend::new(DIM);
    let (client, _) = client(&backend);

    let v = client.embed_one("solo", true).await.unwrap();
    assert_eq!(v.len(), DIM);
    assert!((norm(&v) - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn test_shared_cache_across_clients() {
    let backend = MockEmbeddingBackend::new(DIM);
    let cache = EmbeddingCacheHandle::new();
    let a = EmbeddingClient::with_sleeper(
        backend.clone(),
        cache.clone(),
        settings(),
        RecordingSleeper::new(),
    );
    let b = EmbeddingClient::with_sleeper(
        backend.clone(),
        cache.clone(),
        settings(),
        RecordingSleeper::new(),
    );

    a.embed(&["shared"], 20, true).await.unwrap();
    b.embed(&["shared"], 20, true).await.unwrap();

    assert_eq!(backend.call_count(), 1);
}
