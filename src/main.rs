use consultas::{config::Config, error::AppResult, server};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    server::run(config).await
}
