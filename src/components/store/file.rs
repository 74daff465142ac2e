use super::models::AppState;
use super::StateStore;
use crate::error::{store_error, MementoResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Store that keeps the snapshot as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> MementoResult<AppState> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No state file at {}, starting empty", self.path.display());
                return Ok(AppState::default());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(AppState::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            store_error(&format!(
                "Failed to parse state file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn save(&self, state: &AppState) -> MementoResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;

        // Write next to the target and rename so readers never see half a file
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, &self.path).await?;

        debug!(
            "Saved state with {} people to {}",
            state.people.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::store::models::{Person, Relationship};

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("memento-test-{}", uuid::Uuid::new_v4()))
            .join("state.json")
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let store = JsonFileStore::new(temp_path());
        assert_eq!(store.load().await.unwrap(), AppState::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let path = temp_path();
        let store = JsonFileStore::new(&path);

        let mut state = AppState::default();
        let mut person = Person::new("p1", "Ana", Relationship::Parent);
        person.birthday = Some("1960-03-02".to_string());
        state.people.push(person);

        store.save(&state).await.unwrap();
        assert!(path.exists());
        assert_eq!(store.load().await.unwrap(), state);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_store_error() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Store(_)));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
