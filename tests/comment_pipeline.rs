//! End-to-end comment production against scripted models.

mod common;

use common::fixtures::{
    BODY, SPECIFIC_REPLY, TITLE, chain, comment_service, generation_client, topic_text,
};
use quill::generation::{GenerationError, MockGenerationBackend, Prompt};
use quill::quality::{CommentOrigin, FallbackReason, QualityRules, topic_overlap};
use quill::remote::{ErrorClass, RemoteError};
use quill::retry::RecordingSleeper;
use std::time::Duration;

fn unavailable() -> RemoteError {
    RemoteError::Server {
        status: 503,
        reason: "service unavailable".into(),
    }
}

fn assert_publishable(text: &str) {
    let chars = text.chars().count();
    assert!((200..=800).contains(&chars), "length {chars}: {text}");
    assert!(text.to_lowercase().contains("kilocode"), "{text}");
    assert!(topic_overlap(text, &topic_text()) >= 2, "{text}");
    assert!(
        QualityRules::default().validate(text, &topic_text()).accepted,
        "{text}"
    );
}

#[tokio::test]
async fn test_generic_first_reply_is_regenerated() {
    let backend = MockGenerationBackend::new();
    backend
        .respond("primary", "Thanks for sharing!")
        .respond("primary", SPECIFIC_REPLY);
    let service = comment_service(&backend, &["primary"]);

    let comment = service.produce(TITLE, BODY, None).await;

    assert_eq!(comment.text, SPECIFIC_REPLY);
    assert_eq!(
        comment.origin,
        CommentOrigin::Generated {
            attempt: 2,
            model: "primary".into()
        }
    );
    assert_publishable(&comment.text);

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert!(!calls[0].prompt.user.contains("CORRECTIONS"));
    assert!(calls[1].prompt.user.contains("CORRECTIONS"));
}

#[tokio::test]
async fn test_two_generic_replies_fall_back() {
    let backend = MockGenerationBackend::new();
    backend.always("primary", Ok("Thanks for sharing!".into()));
    let service = comment_service(&backend, &["primary"]);

    let comment = service.produce(TITLE, BODY, None).await;

    assert!(matches!(
        comment.origin,
        CommentOrigin::Fallback {
            reason: FallbackReason::ValidationFailed { .. }
        }
    ));
    assert_eq!(backend.call_count(), 2);
    assert_publishable(&comment.text);
}

#[tokio::test]
async fn test_all_models_transient_aggregates_failures() {
    let backend = MockGenerationBackend::new();
    backend
        .always("primary", Err(unavailable()))
        .always("secondary", Err(unavailable()));
    let sleeper = RecordingSleeper::new();
    let client = generation_client(&backend, &sleeper);

    let err = client
        .generate(
            &Prompt {
                system: "system".into(),
                user: "user".into(),
            },
            &chain(&["primary", "secondary"]),
        )
        .await
        .unwrap_err();

    let failures = err.failures();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].model, "primary");
    assert_eq!(failures[1].model, "secondary");
    for failure in failures {
        assert_eq!(failure.class, ErrorClass::Transient);
        assert_eq!(failure.attempts, 4);
    }

    let message = err.to_string();
    assert!(message.contains("primary (transient_error after 4 attempt(s)"));
    assert!(message.contains("secondary (transient_error after 4 attempt(s)"));

    assert_eq!(backend.call_count(), 8);
    assert_eq!(sleeper.count(), 6);
    let delays = sleeper.delays();
    assert_eq!(
        &delays[..3],
        &[
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400),
        ]
    );
}

#[tokio::test]
async fn test_all_models_transient_still_produces_comment() {
    let backend = MockGenerationBackend::new();
    backend
        .always("primary", Err(unavailable()))
        .always("secondary", Err(unavailable()));
    let service = comment_service(&backend, &["primary", "secondary"]);

    let comment = service.produce(TITLE, BODY, None).await;

    match &comment.origin {
        CommentOrigin::Fallback {
            reason: FallbackReason::GenerationFailed { attempt, error },
        } => {
            assert_eq!(*attempt, 1);
            assert!(matches!(error, GenerationError::Exhausted { .. }));
        }
        other => panic!("unexpected origin: {other:?}"),
    }
    assert_publishable(&comment.text);
}

#[tokio::test]
async fn test_missing_model_advances_chain_without_retry() {
    let backend = MockGenerationBackend::new();
    backend.respond("secondary", SPECIFIC_REPLY);
    let service = comment_service(&backend, &["retired-model", "secondary"]);

    let text = service.produce_comment(TITLE, BODY, None).await;

    assert_eq!(text, SPECIFIC_REPLY);
    assert_eq!(backend.calls_for("retired-model"), 1);
    assert_eq!(backend.models_called(), vec!["retired-model", "secondary"]);
}

#[tokio::test]
async fn test_markdown_reply_is_sanitized_before_validation() {
    let backend = MockGenerationBackend::new();
    backend.respond("primary", &format!("**{SPECIFIC_REPLY}**"));
    let service = comment_service(&backend, &["primary"]);

    let text = service.produce_comment(TITLE, BODY, None).await;

    assert_eq!(text, SPECIFIC_REPLY);
    assert_eq!(backend.call_count(), 1);
}
