//! Custom promotional media.
//!
//! The admin panel can replace the storefront's promotional animation either with
//! an uploaded file, kept inline as a `data:` URL, or with a remote URL. The
//! storefront only reads the resolved path.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::domain::events::{Notifier, Topic};
use crate::domain::value_objects::DataUrl;
use crate::storage::{keys, read_raw, KeyValueStore};
use crate::{Result, StorefrontError};

pub const ACCEPTED_TYPES: &[&str] = &["image/gif", "image/png", "image/jpeg", "image/webp"];

#[derive(Clone, Debug)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct MediaStore {
    store: Arc<dyn KeyValueStore>,
    notifier: Notifier,
    max_bytes: usize,
    default_path: String,
}

impl MediaStore {
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Notifier, config: &StorefrontConfig) -> Self {
        Self {
            store,
            notifier,
            max_bytes: config.media_max_bytes,
            default_path: config.default_promo_media.clone(),
        }
    }

    /// Stores an uploaded file as the promotional media. Rejected uploads leave
    /// the stored media untouched.
    pub fn upload(&self, upload: MediaUpload) -> Result<DataUrl> {
        let content_type = upload.content_type.trim().to_ascii_lowercase();
        if !ACCEPTED_TYPES.contains(&content_type.as_str()) {
            return Err(StorefrontError::Media(format!("unsupported file type `{}`", upload.content_type)));
        }
        if upload.bytes.is_empty() {
            return Err(StorefrontError::Media(format!("{} is empty", upload.file_name)));
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(StorefrontError::Media(format!(
                "{} is {} bytes, limit is {}",
                upload.file_name,
                upload.bytes.len(),
                self.max_bytes
            )));
        }

        let data_url = DataUrl::encode(&content_type, &upload.bytes);
        self.store.set(keys::CUSTOM_PROMO_MEDIA, data_url.as_str())?;
        self.store.remove(keys::CUSTOM_PROMO_MEDIA_URL)?;
        self.store.set(keys::PROMO_MEDIA_PATH, data_url.as_str())?;
        tracing::info!(file = %upload.file_name, bytes = upload.bytes.len(), "promotional media uploaded");
        self.notifier.publish(Topic::MediaChanged);
        Ok(data_url)
    }

    /// Points the promotional media at a remote http(s) URL.
    pub fn set_url(&self, url: &str) -> Result<()> {
        let url = url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) || url.contains(char::is_whitespace) {
            return Err(StorefrontError::Media(format!("`{url}` is not an http(s) URL")));
        }
        self.store.set(keys::CUSTOM_PROMO_MEDIA_URL, url)?;
        self.store.remove(keys::CUSTOM_PROMO_MEDIA)?;
        self.store.set(keys::PROMO_MEDIA_PATH, url)?;
        tracing::info!(url, "promotional media url set");
        self.notifier.publish(Topic::MediaChanged);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(keys::CUSTOM_PROMO_MEDIA)?;
        self.store.remove(keys::CUSTOM_PROMO_MEDIA_URL)?;
        self.store.remove(keys::PROMO_MEDIA_PATH)?;
        tracing::info!("promotional media reset to default");
        self.notifier.publish(Topic::MediaChanged);
        Ok(())
    }

    pub fn custom_upload(&self) -> Option<String> { read_raw(self.store.as_ref(), keys::CUSTOM_PROMO_MEDIA) }
    pub fn custom_url(&self) -> Option<String> { read_raw(self.store.as_ref(), keys::CUSTOM_PROMO_MEDIA_URL) }

    /// What the storefront should display.
    pub fn resolved_path(&self) -> String {
        read_raw(self.store.as_ref(), keys::PROMO_MEDIA_PATH)
            .or_else(|| self.custom_upload())
            .or_else(|| self.custom_url())
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| self.default_path.clone())
    }
}

impl std::fmt::Debug for MediaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStore").field("max_bytes", &self.max_bytes).finish_non_exhaustive()
    }
}
