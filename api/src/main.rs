use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use destress_core::catalog::DomainCatalog;
use destress_core::plan::PlanSynthesizer;

mod error;
mod extract;
mod generate;
mod middleware;
mod routes;
mod session;
mod sessions;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Destress API",
        version = "0.1.0",
        description = "Stress-intake chatbot: a scripted conversation that collects \
                       stress details for one domain and answers with a tailored support plan."
    ),
    paths(
        routes::health::health_check,
        routes::chat::chat,
        routes::chat::reset,
    ),
    components(schemas(
        HealthResponse,
        routes::chat::ChatRequest,
        routes::chat::ChatMessage,
        routes::chat::ChatResponse,
        destress_core::plan::PlanResult,
        destress_core::error::ApiError,
    ))
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_sessions: usize,
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "destress_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let catalog = Arc::new(DomainCatalog::builtin());
    tracing::info!(domains = catalog.len(), "domain catalog loaded");

    let synthesizer = Arc::new(PlanSynthesizer::new(generate::generator_from_env()));

    let app_state = state::AppState {
        catalog,
        sessions: sessions::SessionStore::new(),
        synthesizer,
    };

    // CORS
    let cors_layer = middleware::cors::build_cors_layer();

    // Router with per-endpoint rate limiting on the chat routes
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::chat::chat_router().layer(middleware::rate_limit::chat_layer()))
        .merge(routes::chat::reset_router().layer(middleware::rate_limit::reset_layer()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Destress API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
