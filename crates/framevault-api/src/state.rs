//! Application state shared across handlers.

use crate::auth::JwksVerifier;
use framevault_core::Config;
use framevault_db::VideoStore;
use framevault_processing::UploadValidator;
use framevault_storage::Storage;
use framevault_worker::JobQueue;
use sqlx::PgPool;
use std::sync::Arc;

/// Dependencies behind trait objects so tests can substitute in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn VideoStore>,
    pub storage: Arc<dyn Storage>,
    pub jobs: Arc<dyn JobQueue>,
    pub validator: Arc<UploadValidator>,
    pub verifier: Option<Arc<JwksVerifier>>,
    /// Present in real deployments; readiness reports not_ready without it.
    pub pool: Option<PgPool>,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
