// src/services/settings_service.rs

use crate::{
    common::error::AppError,
    db::{CollectionKey, RecordStore},
    models::settings::Settings,
    services::document_service::parse_hex_color,
};

#[derive(Clone)]
pub struct SettingsService {
    store: RecordStore,
}

impl SettingsService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub async fn get_settings(&self) -> Result<Settings, AppError> {
        self.store.load_document(CollectionKey::Settings).await
    }

    /// Replaces the whole document. Colors are checked here so a bad value
    /// never reaches the renderer.
    pub async fn update_settings(&self, settings: Settings) -> Result<Settings, AppError> {
        let _writes = self.store.write_lock().await;
        for color in [&settings.pdf_primary_color, &settings.pdf_accent_color]
            .into_iter()
            .flatten()
        {
            parse_hex_color(color)
                .map_err(|_| AppError::BadRequest(format!("'{}' is not a #rrggbb color", color)))?;
        }

        self.store.save_document(CollectionKey::Settings, &settings).await?;
        tracing::info!(company = %settings.company_name(), "settings updated");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRepository;
    use std::sync::Arc;

    #[tokio::test]
    async fn defaults_until_saved() {
        let service = SettingsService::new(RecordStore::new(Arc::new(MemoryRepository::new())));
        let settings = service.get_settings().await.unwrap();
        assert_eq!(settings.company_name(), "Company Name");
        assert_eq!(settings.currency(), "USD");

        let saved = service
            .update_settings(Settings {
                company_name: Some("Acme Builders".into()),
                pdf_primary_color: Some("#112233".into()),
                ..Settings::default()
            })
            .await
            .unwrap();
        assert_eq!(service.get_settings().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn bad_color_is_rejected() {
        let service = SettingsService::new(RecordStore::new(Arc::new(MemoryRepository::new())));
        let err = service
            .update_settings(Settings {
                pdf_accent_color: Some("teal".into()),
                ..Settings::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
