pub mod dispatcher;
pub mod emails;
pub mod notifications;
mod scheduler;

pub use dispatcher::{NotificationDispatcher, OutgoingEmail, ResendDispatcher};
pub use notifications::{run_daily_check, send_backup, send_welcome, unsubscribe, CheckSummary};

use crate::components::store::StoreHandle;
use crate::config::Config;
use crate::error::{component_error, MementoResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;

use scheduler::start_scheduler;

/// Daily event reminders and the monthly digest
#[derive(Default)]
pub struct Reminders {
    dispatcher: RwLock<Option<Arc<dyn NotificationDispatcher>>>,
    task: RwLock<Option<JoinHandle<()>>>,
}

impl Reminders {
    /// Create a component that builds a Resend dispatcher from the config on init
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a component that sends through `dispatcher`
    pub fn with_dispatcher(dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self {
            dispatcher: RwLock::new(Some(dispatcher)),
            task: RwLock::new(None),
        }
    }

    /// Whether the scheduler loop is running
    pub async fn is_running(&self) -> bool {
        self.task
            .read()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

#[async_trait]
impl super::Component for Reminders {
    fn name(&self) -> &'static str {
        "reminders"
    }

    async fn init(&self, config: Arc<RwLock<Config>>, store: StoreHandle) -> MementoResult<()> {
        let mut dispatcher_lock = self.dispatcher.write().await;
        if dispatcher_lock.is_none() {
            let config_read = config.read().await;
            let api_key = config_read
                .resend_api_key
                .as_deref()
                .ok_or_else(|| component_error("RESEND_API_KEY is required to send reminders"))?;
            let dispatcher = ResendDispatcher::new(api_key, &config_read.from_email)?;
            *dispatcher_lock = Some(Arc::new(dispatcher));
        }

        let dispatcher = match dispatcher_lock.as_ref() {
            Some(dispatcher) => Arc::clone(dispatcher),
            None => return Err(component_error("No notification dispatcher available")),
        };
        drop(dispatcher_lock);

        let mut task_lock = self.task.write().await;
        if let Some(previous) = task_lock.take() {
            previous.abort();
        }
        *task_lock = Some(start_scheduler(config, store, dispatcher));
        info!("Reminder scheduler started");

        Ok(())
    }

    async fn shutdown(&self) -> MementoResult<()> {
        if let Some(task) = self.task.write().await.take() {
            task.abort();
            info!("Reminder scheduler stopped");
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::store::MemoryStore;
    use crate::components::Component;
    use crate::error::Error;

    struct NullDispatcher;

    #[async_trait]
    impl NotificationDispatcher for NullDispatcher {
        async fn send(&self, _email: &OutgoingEmail) -> MementoResult<()> {
            Ok(())
        }
    }

    fn store() -> StoreHandle {
        Arc::new(MemoryStore::default())
    }

    #[tokio::test]
    async fn test_init_requires_api_key() {
        let config = Arc::new(RwLock::new(Config::default()));
        let reminders = Reminders::new();

        let err = reminders.init(config, store()).await.unwrap_err();
        assert!(matches!(err, Error::Component(_)));
        assert!(!reminders.is_running().await);
    }

    #[tokio::test]
    async fn test_init_and_shutdown() {
        let config = Arc::new(RwLock::new(Config::default()));
        let reminders = Reminders::with_dispatcher(Arc::new(NullDispatcher));

        reminders.init(config, store()).await.unwrap();
        assert!(reminders.is_running().await);

        reminders.shutdown().await.unwrap();
        assert!(!reminders.is_running().await);
    }
}
