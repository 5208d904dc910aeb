use super::*;

#[test]
fn test_class_partition() {
    let config = [
        RemoteError::ModelNotFound {
            model: "m".into(),
        },
        RemoteError::Unauthorized { reason: "x".into() },
        RemoteError::InvalidRequest { reason: "x".into() },
    ];
    for err in &config {
        assert_eq!(err.class(), ErrorClass::Config, "{err}");
    }

    let transient = [
        RemoteError::RateLimited { reason: "x".into() },
        RemoteError::Timeout {
            after: Duration::from_secs(30),
        },
        RemoteError::Server {
            status: 503,
            reason: "x".into(),
        },
        RemoteError::Transport { reason: "x".into() },
        RemoteError::MalformedResponse { reason: "x".into() },
    ];
    for err in &transient {
        assert_eq!(err.class(), ErrorClass::Transient, "{err}");
    }
}

#[test]
fn test_from_status() {
    assert_eq!(
        RemoteError::from_status(404, "gemini-x", ""),
        RemoteError::ModelNotFound {
            model: "gemini-x".into()
        }
    );
    assert_eq!(
        RemoteError::from_status(401, "m", "bad key").class(),
        ErrorClass::Config
    );
    assert_eq!(
        RemoteError::from_status(400, "m", "bad shape").class(),
        ErrorClass::Config
    );
    assert!(matches!(
        RemoteError::from_status(429, "m", "slow down"),
        RemoteError::RateLimited { .. }
    ));
    assert!(matches!(
        RemoteError::from_status(503, "m", "unavailable"),
        RemoteError::Server { status: 503, .. }
    ));
    assert_eq!(
        RemoteError::from_status(408, "m", "").class(),
        ErrorClass::Transient
    );
}

#[test]
fn test_from_message_model_not_found() {
    let err = RemoteError::from_message(
        "404 models/gemini-2.0-flash-exp is not found",
        "gemini-2.0-flash-exp",
    );
    assert_eq!(
        err,
        RemoteError::ModelNotFound {
            model: "gemini-2.0-flash-exp".into()
        }
    );

    let err = RemoteError::from_message("Model not found", "m");
    assert_eq!(err.class(), ErrorClass::Config);
}

#[test]
fn test_from_message_rate_limit() {
    let err = RemoteError::from_message("429 rate limit exceeded", "m");
    assert!(matches!(err, RemoteError::RateLimited { .. }));

    let err = RemoteError::from_message("Resource exhausted: quota", "m");
    assert_eq!(err.class(), ErrorClass::Transient);
}

#[test]
fn test_from_message_server_and_timeout() {
    let err = RemoteError::from_message("503 service unavailable", "m");
    assert!(matches!(err, RemoteError::Server { status: 503, .. }));

    let err = RemoteError::from_message("Deadline exceeded", "m");
    assert!(matches!(err, RemoteError::Timeout { .. }));
}

#[test]
fn test_from_message_credentials() {
    let err = RemoteError::from_message("API key not valid. Please pass a valid API key.", "m");
    assert_eq!(err.class(), ErrorClass::Config);
}

#[test]
fn test_from_message_unknown_is_transient() {
    let err = RemoteError::from_message("connection reset by peer", "m");
    assert!(matches!(err, RemoteError::Transport { .. }));
    assert_eq!(err.class(), ErrorClass::Transient);
}

#[test]
fn test_reason_is_truncated() {
    let body = "x".repeat(1000);
    match RemoteError::from_status(500, "m", &body) {
        RemoteError::Server { reason, .. } => assert!(reason.len() < 250),
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn test_error_class_display() {
    assert_eq!(ErrorClass::Config.to_string(), "config_error");
    assert_eq!(ErrorClass::Transient.to_string(), "transient_error");
    assert!(ErrorClass::Transient.is_transient());
    assert!(!ErrorClass::Config.is_transient());
}

#[test]
fn test_from_message_ignores_digits_in_model_id() {
    let message = "Web call failed for model 'llama-3.1-405b (adapter: Groq)'.\n\
                   Cause: Request failed with status code '429 Too Many Requests'. \
                   Response body:\n{}";
    let err = RemoteError::from_message(message, "llama-3.1-405b");
    assert!(matches!(err, RemoteError::RateLimited { .. }));
    assert_eq!(err.class(), ErrorClass::Transient);

    let err = RemoteError::from_message("model qwen-500b-chat is overloaded", "qwen-500b-chat");
    assert!(matches!(err, RemoteError::Server { .. }));
}

#[test]
fn test_from_message_status_after_cue() {
    let err = RemoteError::from_message("upstream returned HTTP 502", "m");
    assert!(matches!(err, RemoteError::Server { status: 502, .. }));

    let err = RemoteError::from_message("error: 401 invalid credentials", "m");
    assert_eq!(err.class(), ErrorClass::Config);
}
