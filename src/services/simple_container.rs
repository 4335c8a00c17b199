use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::config::Config;
use crate::core::data::database::{SqliteStore, StoreOptions};
use crate::error::Result;
use crate::services::SongService;

pub struct SimpleServices {
    config: Arc<Config>,
    config_path: PathBuf,
}

impl SimpleServices {
    /// `config_path` is the file `config` was loaded from.
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
        }
    }

    pub fn config(&self) -> Arc<Config> {
        self.config.clone()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub async fn create_store(&self) -> Result<SqliteStore> {
        SqliteStore::open(&self.config.database_path, StoreOptions::from(self.config.as_ref())).await
    }

    pub async fn song_service(&self) -> Result<SongService> {
        let store = self.create_store().await?;
        Ok(SongService::new(Arc::new(store)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{NewSong, SongFilter};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_song_service_uses_configured_database() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            database_path: dir.path().join("songbook.db"),
            pool_size: 2,
            ..Config::default()
        };
        let services = SimpleServices::new(config, dir.path().join("config.toml"));
        assert_eq!(services.config_path(), dir.path().join("config.toml").as_path());

        let store = services.create_store().await.unwrap();
        assert_eq!(store.pool_size(), 2);
        drop(store);

        let service = services.song_service().await.unwrap();
        service.add_song(&NewSong::new("Imagine", "John Lennon")).await.unwrap();
        assert!(dir.path().join("songbook.db").exists());
        assert_eq!(service.find_all(&SongFilter::new()).await.unwrap().len(), 1);
    }
}
