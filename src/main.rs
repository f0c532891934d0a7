use anyhow::Result;
use showroom::{config::Config, proxy};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("showroom=info".parse()?),
        )
        .init();

    info!("Starting translation proxy");

    let config = Config::from_env()?;
    info!("Environment: {}", config.environment);

    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY not set: product translation requests will fail");
    }
    if config.google_translate_api_key.is_none() {
        warn!("GOOGLE_TRANSLATE_API_KEY not set: text translation requests will fail");
    }

    proxy::serve(config).await
}
