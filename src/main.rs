use color_eyre::eyre::Result;
use dotenv::dotenv;
use washclub_api::config::ApiConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    washclub_api::init_tracing(config.log_level)?;

    // Connect the configured booking store
    let state = washclub_api::build_state(&config).await?;

    // Start API server
    washclub_api::start_server(config, state).await?;

    Ok(())
}
