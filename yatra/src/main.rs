use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yatra::api::{create_router, AppState};
use yatra::chat::InMemoryConversationStore;
use yatra::config::{Config, VectorBackendKind};
use yatra::embeddings::EmbeddingProvider;
use yatra::knowledge::{FileContentStore, PersonaStore};
use yatra::llm::LlmProvider;
use yatra::vector::{ChromaIndex, InMemoryIndex, SharedIndex, VectorIndex};

#[derive(Parser)]
#[command(name = "yatra")]
#[command(about = "Persona-guided India travel assistant")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Rebuild the vector index before accepting requests
        #[arg(long)]
        ingest: bool,
    },
    /// Rebuild the vector index from the knowledge catalog and exit
    Ingest,
    /// Print vector index statistics and exit
    Stats,
}

fn build_index(config: &Config) -> anyhow::Result<SharedIndex> {
    let index: Arc<dyn VectorIndex> = match config.vector.backend {
        VectorBackendKind::Chroma => {
            tracing::info!(
                "Connecting to vector index at {} (collection {})...",
                config.vector.url,
                config.vector.collection
            );
            Arc::new(ChromaIndex::new(&config.vector)?)
        }
        VectorBackendKind::Memory => {
            tracing::warn!("Using in-memory vector index - contents are lost on exit");
            Arc::new(InMemoryIndex::new(config.vector.collection.clone()))
        }
    };
    Ok(SharedIndex::new(index))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yatra=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Loading embedding model: {}...", config.embeddings.model);
    let embeddings = EmbeddingProvider::new(&config.embeddings)?;
    if embeddings.is_mock() {
        tracing::warn!("Mock embeddings enabled - retrieval quality is meaningless");
    }

    let index = build_index(&config)?;

    tracing::info!("Loading knowledge catalog from {}...", config.content.data_dir.display());
    let content = Arc::new(FileContentStore::new(config.content.data_dir.clone()));
    let personas =
        PersonaStore::load(&config.content.data_dir, config.content.default_persona_id.clone())
            .await?;
    tracing::info!("Loaded {} personas", personas.list().len());

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - dialogue turns will fail until LLM_MODEL is set");
    }

    let embedding_model = embeddings.model().to_string();
    let state = AppState::new(
        config.clone(),
        content,
        Arc::new(embeddings),
        embedding_model,
        index,
        Arc::new(llm.clone()),
        llm,
        personas,
        Arc::new(InMemoryConversationStore::new()),
    );

    match args.command.unwrap_or(Command::Serve { ingest: false }) {
        Command::Ingest => {
            let report = state.ingestion.ingest_all().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Stats => {
            let stats = state.index.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Command::Serve { ingest } => serve(config, state, ingest).await,
    }
}

async fn serve(config: Config, state: AppState, ingest: bool) -> anyhow::Result<()> {
    if config.server.api_keys.is_empty() {
        tracing::warn!(
            "YATRA_API_KEYS is not set - admin endpoints are locked. Set YATRA_API_KEYS to enable /admin/* routes."
        );
    }

    let cancel_token = CancellationToken::new();

    if ingest {
        tracing::info!("Starting background ingestion...");
        let pipeline = state.ingestion.clone();
        let token = cancel_token.child_token();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Ingestion cancelled by shutdown");
                }
                result = pipeline.ingest_all() => {
                    if let Err(e) = result {
                        tracing::error!("Startup ingestion failed: {}", e);
                    }
                }
            }
        });
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Yatra starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
