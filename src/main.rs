//! Quill command-line entrypoint.
//!
//! `quill <title> [body]` prints one comment for the topic. `quill --check-config` loads and
//! validates the environment configuration, then exits.

use std::process::ExitCode;

use quill::cache::EmbeddingCacheHandle;
use quill::config::Config;
use quill::embedding::{EmbeddingClient, HttpEmbeddingBackend};
use quill::generation::{GenaiBackend, GenerationClient, PromptBuilder};
use quill::pipeline::{COMMENTS_CORPUS, CommentService, CorpusRetriever, DOCS_CORPUS};
use quill::quality::CommentController;
use quill::retrieval::{InMemoryCorpusProvider, RetrievalService};

const USAGE: &str = "usage: quill <title> [body]\n       quill --check-config";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{USAGE}");
        return Ok(ExitCode::SUCCESS);
    }

    if args.iter().any(|arg| arg == "--check-config") {
        return Ok(run_config_check());
    }

    let Some(title) = args.first() else {
        eprintln!("{USAGE}");
        return Ok(ExitCode::from(2));
    };
    let body = args.get(1).map(String::as_str).unwrap_or_default();

    let config = Config::from_env()?;
    config.validate()?;

    let chain = config.model_chain();
    tracing::info!(
        models = ?chain,
        embedding_model = %config.embedding_model,
        corpus_dir = ?config.corpus_dir,
        "Quill starting"
    );

    let retriever = match &config.corpus_dir {
        Some(dir) => {
            let provider =
                InMemoryCorpusProvider::load_dir(dir, &[DOCS_CORPUS, COMMENTS_CORPUS])?;
            tracing::info!(corpora = ?provider.names(), "Corpora loaded");

            let backend = HttpEmbeddingBackend::new(
                config.embedding_url.clone(),
                config.embedding_api_key.clone(),
                config.timeout,
            );
            let embedder = EmbeddingClient::new(
                backend,
                EmbeddingCacheHandle::new(),
                config.embedding_settings(),
            );
            Some(CorpusRetriever::new(RetrievalService::new(embedder), provider))
        }
        None => {
            tracing::info!("No QUILL_CORPUS_DIR configured, using built-in context pack");
            None
        }
    };

    let generator = GenerationClient::new(
        GenaiBackend::default(),
        config.generation_params(),
        config.retry_policy(),
    )
    .with_timeout(config.timeout);
    let prompts = PromptBuilder::new(config.quality.clone(), config.max_text_chars);
    let controller = CommentController::new(generator, prompts);

    let service = CommentService::new(controller, retriever, chain).with_top_k(config.top_k);

    let comment = service.produce(title, body, None).await;
    tracing::info!(origin = ?comment.origin, "Done");
    println!("{}", comment.text);

    Ok(ExitCode::SUCCESS)
}

fn run_config_check() -> ExitCode {
    match Config::from_env().and_then(|config| config.validate().map(|()| config)) {
        Ok(config) => {
            println!("configuration ok: models {:?}", config.model_chain());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("configuration error: {e}");
            ExitCode::FAILURE
        }
    }
}
