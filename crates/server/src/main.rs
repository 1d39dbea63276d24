//! Medresearch Server
//!
//! Axum server exposing the Medical Deep Research engine to the frontend:
//! job submission, polling, listing, and advisory cancellation. Each
//! research run executes as a background task that publishes progress
//! snapshots into the injected job store.

mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use medresearch_core::models::{LlmProvider, ModelConfig, SearchProvider};
use medresearch_core::pipeline::Coordinator;
use medresearch_core::tools::PubMedClient;

use store::{JobStore, MemoryJobStore, ResearchJob, StoreObserver};

/// Application state
struct AppState {
    store: Arc<dyn JobStore>,
}

type SharedState = Arc<AppState>;

#[derive(Parser)]
#[command(name = "medresearch", about = "Evidence-Based Medical Research Assistant API")]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Additional CORS origin allowed to call the API
    #[arg(long)]
    cors_origin: Vec<String>,
}

// === API Types ===

/// Request model for starting research
#[derive(Debug, Deserialize)]
struct ResearchRequest {
    research_id: Option<String>,
    query: String,
    #[serde(default)]
    llm_provider: LlmProvider,
    #[serde(default = "default_model")]
    model: String,
    base_url: Option<String>,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

#[derive(Serialize)]
struct StartResponse {
    research_id: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("medresearch=info,medresearch_core=info")),
        )
        .init();

    let cli = Cli::parse();

    let state: SharedState = Arc::new(AppState {
        store: Arc::new(MemoryJobStore::new()),
    });

    let mut origins: Vec<HeaderValue> = vec![
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];
    for origin in &cli.cors_origin {
        origins.push(origin.parse()?);
    }
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/research", get(list_research).post(start_research))
        .route(
            "/research/:id",
            get(get_research).delete(cancel_research),
        )
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    tracing::info!("Medical Deep Research API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// === Handlers ===

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Medical Deep Research API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// Start a new research job
async fn start_research(
    State(state): State<SharedState>,
    Json(request): Json<ResearchRequest>,
) -> Json<StartResponse> {
    let research_id = request
        .research_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    state
        .store
        .create(ResearchJob::new(research_id.as_str(), request.query.as_str()));

    let store = Arc::clone(&state.store);
    let id = research_id.clone();
    tokio::spawn(async move {
        run_research(store, id, request).await;
    });

    Json(StartResponse { research_id })
}

/// Get research status and progress
async fn get_research(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ResearchJob>, StatusCode> {
    state
        .store
        .get(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// List all research jobs
async fn list_research(State(state): State<SharedState>) -> Json<Vec<ResearchJob>> {
    Json(state.store.list())
}

/// Cancel a research job.
///
/// Advisory only: the status flips, but an in-flight pipeline runs to
/// completion regardless.
async fn cancel_research(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, StatusCode> {
    if !state.store.mark_cancelled(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(MessageResponse {
        message: "Research cancelled".to_string(),
    }))
}

/// Run the research pipeline in the background
async fn run_research(store: Arc<dyn JobStore>, research_id: String, request: ResearchRequest) {
    store.mark_running(&research_id);

    let config = ModelConfig {
        provider: request.llm_provider,
        model: request.model,
        base_url: request.base_url,
    };

    let llm = match config.connect() {
        Ok(llm) => llm,
        Err(e) => {
            tracing::error!("model configuration failed: {e:#}");
            store.mark_failed(&research_id, &format!("model configuration error: {e}"));
            return;
        }
    };

    let search: Option<Arc<dyn SearchProvider>> = match PubMedClient::new() {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!("PubMed client unavailable: {e:#}");
            None
        }
    };

    let observer = StoreObserver::new(Arc::clone(&store), research_id.as_str());
    let mut coordinator =
        Coordinator::new(research_id.as_str(), llm, search).with_observer(Box::new(observer));

    match coordinator.run(&request.query).await {
        Ok(report) => {
            store.mark_completed(&research_id, &report.formatted);
            tracing::info!(%research_id, "research completed");
        }
        Err(e) => {
            store.mark_failed(&research_id, &e.to_string());
            tracing::error!(%research_id, "research failed: {e:#}");
        }
    }
}
