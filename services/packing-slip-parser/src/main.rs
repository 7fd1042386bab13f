use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    serve, Router,
};
use packslip_utils::{init_logging, AppConfig, CorsConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

mod extraction;
mod gemini_client;
mod handlers;
mod middleware;
mod orchestrator;
mod pdf_processor;
mod prompts;
mod rate_limiter;
mod routes;

#[cfg(test)]
mod testing;

use extraction::{ExtractionSettings, SlipExtractor};
use gemini_client::{CompletionClient, GeminiClient};
use middleware::*;
use orchestrator::UploadOrchestrator;
use pdf_processor::{PageTextExtractor, PdfProcessor};
use rate_limiter::RateLimiter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.logging)?;
    info!("Starting Packing Slip Parser");
    info!(
        model = %config.gemini.model,
        temperature = config.gemini.temperature,
        api_key_present = !config.gemini.api_key.is_empty(),
        api_key_length = config.gemini.api_key.len(),
        max_calls_per_minute = config.gemini.max_calls_per_minute,
        "Gemini configuration"
    );

    let ai_client = Arc::new(GeminiClient::new(&config.gemini)?);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    // Build application router
    let state = build_state(config, ai_client, Arc::new(PdfProcessor::new()));
    let app = create_app(state);

    // Start server
    let listener = TcpListener::bind(&addr).await?;
    info!("Packing Slip Parser listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<UploadOrchestrator>,
    pub extractor: Arc<SlipExtractor>,
    pub ai_client: Arc<dyn CompletionClient>,
    pub config: Arc<AppConfig>,
}

/// Wire the extraction pipeline. One rate limiter is shared by every request.
pub fn build_state(
    config: AppConfig,
    ai_client: Arc<dyn CompletionClient>,
    pdf: Arc<dyn PageTextExtractor>,
) -> AppState {
    let limiter = Arc::new(RateLimiter::new(config.gemini.max_calls_per_minute));
    let extractor = Arc::new(SlipExtractor::new(
        Arc::clone(&ai_client),
        limiter,
        ExtractionSettings::from_config(&config),
    ));
    let orchestrator = Arc::new(UploadOrchestrator::new(
        Arc::clone(&extractor),
        pdf,
        config.extraction.batch_size,
    ));

    AppState {
        orchestrator,
        extractor,
        ai_client,
        config: Arc::new(config),
    }
}

pub fn create_app(state: AppState) -> Router {
    with_middleware(routes::create_routes(), state)
}

fn with_middleware(router: Router<AppState>, state: AppState) -> Router {
    router
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors))
                .layer(DefaultBodyLimit::max(state.config.server.max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(axum::middleware::from_fn(request_logging_middleware)),
        )
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
