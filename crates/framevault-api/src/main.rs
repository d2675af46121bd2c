//! Framevault API server.
//!
//! Wires configuration, Postgres, storage, the frame extraction pipeline, and
//! the HTTP surface together. Job execution runs in-process by default and
//! moves behind SQS when a queue URL is configured.

mod api_doc;
mod auth;
mod error;
mod handlers;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use auth::JwksVerifier;
use framevault_core::Config;
use framevault_db::{create_pool, run_migrations, PgVideoStore, VideoStore};
use framevault_processing::{FfmpegFrameExtractor, UploadValidator};
use framevault_storage::create_storage;
use framevault_worker::{
    run_sqs_consumer, JobQueue, LocalJobQueue, ProcessVideoHandler, SqsJobQueue,
};
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        environment = %config.environment,
        storage_backend = %config.storage_backend,
        "Starting Framevault API"
    );

    let pool = create_pool(&config).await?;
    run_migrations(&pool).await?;
    let store: Arc<dyn VideoStore> = Arc::new(PgVideoStore::new(pool.clone()));

    let storage = create_storage(&config).await?;

    let extractor = Arc::new(FfmpegFrameExtractor::new(
        config.storage_base_dir.clone(),
        config.ffmpeg_path.clone(),
        config.frame_sample_rate_fps,
    ));
    let handler = Arc::new(ProcessVideoHandler::new(store.clone(), extractor));

    let jobs: Arc<dyn JobQueue> = match &config.sqs_queue_url {
        Some(queue_url) => {
            let queue = SqsJobQueue::from_env(queue_url.clone()).await;
            // The API process doubles as the consumer; a dedicated worker
            // deployment would run this loop on its own.
            tokio::spawn(run_sqs_consumer(
                queue.client(),
                queue_url.clone(),
                handler,
            ));
            Arc::new(queue)
        }
        None => Arc::new(LocalJobQueue::new(
            handler,
            config.job_queue_size,
            config.job_max_concurrent,
        )),
    };

    let validator = Arc::new(UploadValidator::new(
        config.max_upload_size_bytes,
        config.allowed_extensions.clone(),
        config.allowed_content_types.clone(),
    ));

    let verifier = match (&config.auth_issuer, &config.auth_client_id) {
        (Some(issuer), Some(client_id)) => Some(Arc::new(JwksVerifier::new(
            issuer.clone(),
            client_id.clone(),
            None,
        ))),
        _ => None,
    };

    let server_port = config.server_port;
    let state = AppState {
        config: Arc::new(config),
        store,
        storage,
        jobs,
        validator,
        verifier,
        pool: Some(pool),
    };

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Framevault API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
