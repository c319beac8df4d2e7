pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::UploadConfig;
use crate::services::storage::StorageService;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Slack on top of the file limit for multipart boundaries and headers
pub const MULTIPART_OVERHEAD: usize = 10 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Video Upload Backend",
        description = "REST endpoints for uploading videos.\n\
            - Accepts multipart/form-data uploads via POST /upload\n\
            - Enforces a maximum file size of 500MB\n\
            - Saves uploaded files to the ./upload directory",
        version = "1.0.0"
    ),
    paths(
        api::handlers::health::health_check,
        api::handlers::upload::upload_video,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            api::handlers::upload::UploadResponse,
            api::handlers::upload::UploadForm,
            api::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health and diagnostics"),
        (name = "upload", description = "Endpoints for uploading video files")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageService>,
    pub config: UploadConfig,
    pub upload_slots: Arc<Semaphore>,
}

impl AppState {
    pub fn new(storage: Arc<dyn StorageService>, config: UploadConfig) -> Self {
        let upload_slots = Arc::new(Semaphore::new(config.max_concurrent_uploads.max(1)));
        Self {
            storage,
            config,
            upload_slots,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_file_size.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::health::health_check))
        .route(
            "/upload",
            post(api::handlers::upload::upload_video)
                .layer(axum::extract::DefaultBodyLimit::max(body_limit)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
