//! Axum-based chat gateway: entry point for minichat. Config-driven via CoreConfig.
//!
//! Two answer paths behind one `/chat` endpoint: the Groq LLM (mock or live)
//! and the offline knowledge-tree responder. Both are constructed once at
//! startup and shared read-only with the request handlers.

mod handlers;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use minichat_core::{ConversationStore, CoreConfig, KnowledgeBase, TreeResponder};
use minichat_llm::{GroqClient, LlmMode};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) responder: Arc<TreeResponder>,
    pub(crate) llm: Arc<GroqClient>,
    pub(crate) conversations: Arc<ConversationStore>,
}

/// Pre-flight check: config loads, knowledge base builds, port is available.
fn run_verify() -> Result<(), String> {
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;

    print!("Checking knowledge base at {}... ", config.knowledge_path);
    let kb = KnowledgeBase::load(&config.knowledge_path)
        .map_err(|e| format!("Knowledge base check failed: {}", e))?;
    let responder = TreeResponder::new(&kb);
    println!(
        "OK ({} categories, {} tree nodes)",
        kb.categories.len(),
        responder.node_count()
    );

    print!("Checking port {}... ", config.port);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    match std::net::TcpListener::bind(addr) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => {
            return Err(format!("Port {} BLOCKED: {}", config.port, e));
        }
    }

    println!("\n✅ SUCCESS: ready to start gateway.");
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[minichat-gateway] .env not loaded: {} (using system environment)", e);
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("❌ PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let config = Arc::new(CoreConfig::load().expect("load CoreConfig"));

    // Startup-fatal by design: the responder must exist before any query is served.
    let kb = KnowledgeBase::load(&config.knowledge_path).expect("load knowledge base");
    let responder = Arc::new(TreeResponder::new(&kb));

    let llm = Arc::new(
        GroqClient::from_env(LlmMode::from_config(&config.llm_mode)).expect("configure Groq client"),
    );
    let conversations = Arc::new(ConversationStore::new(config.system_prompt.clone()));

    let app = build_app(AppState {
        config: Arc::clone(&config),
        responder,
        llm,
        conversations,
    });

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("{} listening on {}", config.app_name, addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}

fn build_app(state: AppState) -> Router {
    // Development CORS posture, as in the original backend: all origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/favicon.ico", get(favicon))
        .route("/chat", post(handlers::chat::chat))
        .with_state(state)
        .layer(cors)
}

/// GET / – welcome envelope and endpoint map.
async fn root(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": format!("Welcome to the {}", state.config.app_name),
        "status": "running",
        "endpoints": {
            "chat": "/chat",
            "health": "/health"
        },
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// GET /health – liveness check for UI and scripts.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// GET /favicon.ico – browsers ask; there is nothing to serve.
async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
