use crate::components::store::{JsonFileStore, StoreHandle};
use crate::components::{ComponentManager, Reminders};
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Apply the configured locale and open the data file
pub async fn prepare(config: &Arc<RwLock<Config>>) -> StoreHandle {
    let config_read = config.read().await;
    crate::utils::i18n::set_locale(&config_read.locale);
    info!("Setting locale to {}", config_read.locale);

    let store = JsonFileStore::new(config_read.data_file.clone());
    info!("Using data file {}", store.path().display());
    Arc::new(store)
}

/// Start the background service and run until a shutdown signal arrives
pub async fn start_service(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let store = prepare(&config).await;

    let mut component_manager = ComponentManager::new(Arc::clone(&config));
    component_manager.register_if_enabled(Reminders::new()).await;

    if component_manager.is_empty() {
        warn!("No components enabled, nothing will be scheduled");
    }

    let component_manager = Arc::new(component_manager);
    component_manager.init_all(store).await?;

    let (shutdown_send, shutdown_recv) = oneshot::channel();
    let shutdown_components = Arc::clone(&component_manager);
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components).await;
    });

    info!("Memento is running");
    if shutdown_recv.await.is_err() {
        error!("Signal handler stopped without sending shutdown");
    }

    info!("Received shutdown signal, exiting");
    Ok(())
}
