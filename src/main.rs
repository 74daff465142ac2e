use memento::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting Memento");

    // Load configuration
    let config = startup::load_config().await?;

    // Run the reminder service
    startup::start_service(config).await
}
