use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatweave_api::{build_router, config::Config, state::AppState, telegram::TelegramClient};
use chatweave_engine::{Delivery, Orchestrator};
use chatweave_llm::ClientFactory;
use chatweave_persist::PersistClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config =
        Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting chatweave server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    tracing::info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        "Initializing text generator"
    );
    let generator =
        ClientFactory::create_generator(config.llm.provider_config(&config.llm_api_key))?;

    let persist = PersistClient::builder()
        .maybe_mongodb_uri(config.mongodb_uri.clone())
        .database(&config.mongodb.database)
        .build()
        .await?;

    let orchestrator = Orchestrator::builder()
        .generator(generator)
        .persist(persist)
        .classifier_config(config.engine.classifier())
        .arbitrator_config(config.engine.arbitrator())
        .pipeline_config(config.engine.pipeline())
        .build()?;

    let delivery: Arc<dyn Delivery> = Arc::new(TelegramClient::new(
        &config.telegram.api,
        &config.telegram_bot_token,
    )?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, orchestrator, delivery));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.log.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
