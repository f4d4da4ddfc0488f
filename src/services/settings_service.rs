use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::store::Store;
use crate::error::Result;
use crate::models::platform_settings::{PlatformSettings, SETTINGS_ID};

/// Owns the platform settings singleton.
///
/// The row is read once when the service is built and kept in memory;
/// every save writes through to the store and refreshes the cached copy.
#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn Store>,
    current: Arc<RwLock<PlatformSettings>>,
}

impl SettingsService {
    pub async fn load(store: Arc<dyn Store>) -> Result<Self> {
        let settings = store.load_settings().await?;
        tracing::debug!(site_name = %settings.site_name, "platform settings loaded");
        Ok(Self {
            store,
            current: Arc::new(RwLock::new(settings)),
        })
    }

    pub async fn current(&self) -> PlatformSettings {
        self.current.read().await.clone()
    }

    /// Persists `settings` as the singleton whatever id it carries.
    pub async fn save(&self, mut settings: PlatformSettings) -> Result<PlatformSettings> {
        settings.id = SETTINGS_ID;
        settings.updated_at = Utc::now();
        let saved = self.store.save_settings(&settings).await?;
        *self.current.write().await = saved.clone();
        tracing::info!(
            maintenance_mode = saved.maintenance_mode,
            "platform settings updated"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn saving_a_fresh_instance_overwrites_the_singleton() {
        let store = Arc::new(MemoryStore::new());
        let service = SettingsService::load(store.clone()).await.unwrap();
        assert_eq!(service.current().await.site_name, "Voluntree");

        let fresh = PlatformSettings {
            id: 42,
            site_name: "Helpers".into(),
            ..PlatformSettings::default()
        };
        let saved = service.save(fresh).await.unwrap();
        assert_eq!(saved.id, SETTINGS_ID);
        assert_eq!(service.current().await.site_name, "Helpers");
        assert_eq!(store.settings_row_count().await, 1);

        let reloaded = SettingsService::load(store.clone()).await.unwrap();
        assert_eq!(reloaded.current().await.site_name, "Helpers");
        assert_eq!(store.settings_row_count().await, 1);
    }
}
