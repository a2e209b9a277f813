use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use relay::{build_router, AppState, Config, Mode};

#[derive(Parser, Debug)]
struct Args {
    #[clap(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,
    #[clap(short, long, env = "PORT", default_value = "5000")]
    port: u16,
    #[clap(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,
    #[clap(long, env = "GEMINI_MODEL", default_value = gemini_client::DEFAULT_MODEL)]
    model: String,
    #[clap(long, env = "GEMINI_BASE_URL", default_value = gemini_client::DEFAULT_BASE_URL)]
    gemini_base_url: String,
    #[clap(long, env = "RELAY_ENV", value_enum, default_value_t = Mode::Production)]
    mode: Mode,
}

impl Args {
    fn into_config(self) -> Config {
        Config::new(self.gemini_api_key, self.mode)
            .with_model(self.model)
            .with_gemini_base_url(self.gemini_base_url)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = dotenv {
        tracing::debug!("No .env file loaded: {}", e);
    }

    let args = Args::parse();
    let address = format!("{}:{}", args.host, args.port);
    let config = args.into_config();
    tracing::info!("config: {:?}", &config);

    if config.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set, chat requests will fail");
    }

    let app = build_router(AppState::new(config));

    let listener = TcpListener::bind(&address).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("Server is running on {}", address);
    tracing::info!("Health check: http://localhost:{}/health", port);
    tracing::info!("Chat endpoint: http://localhost:{}/api/chat", port);

    axum::serve(listener, app).await?;
    tracing::info!("Server shutdown");

    Ok(())
}
