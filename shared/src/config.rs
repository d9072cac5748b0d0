use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{HttpError, PhotoApi, ValidatedUrl};
use crate::event::AccessKey;
use crate::pagination::{DuplicatePolicy, HasMorePolicy, PagingSettings};
use crate::{DEFAULT_API_BASE_URL, DEFAULT_DEBOUNCE_MS, DEFAULT_PAGE_SIZE};

/// Upper bound the photo API accepts for `per_page`.
pub const MAX_PAGE_SIZE: u32 = 30;
pub const MAX_DEBOUNCE_MS: u64 = 60_000;
pub const DEFAULT_CACHE_CAPACITY: usize = 8;
pub const MAX_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("page_size must be between 1 and {MAX_PAGE_SIZE}, got {0}")]
    PageSize(u32),

    #[error("debounce_ms must be at most {MAX_DEBOUNCE_MS}, got {0}")]
    Debounce(u64),

    #[error("cache_capacity must be at most {MAX_CACHE_CAPACITY}, got {0}")]
    CacheCapacity(usize),

    #[error("api_base_url: {0}")]
    BaseUrl(#[from] HttpError),
}

/// Everything the shell supplies at startup.
///
/// Missing fields take the product defaults, so a shell only has to send the
/// access key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub api_base_url: String,
    /// Sent as `client_id`. An empty key is passed through; upstream rejects it.
    pub access_key: AccessKey,
    pub page_size: u32,
    pub debounce_ms: u64,
    pub has_more: HasMorePolicy,
    pub duplicates: DuplicatePolicy,
    pub cache_capacity: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            access_key: AccessKey::default(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            has_more: HasMorePolicy::default(),
            duplicates: DuplicatePolicy::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl GalleryConfig {
    pub fn with_access_key(mut self, key: impl Into<String>) -> Self {
        self.access_key = AccessKey::new(key);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::PageSize(self.page_size));
        }
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Debounce(self.debounce_ms));
        }
        if self.cache_capacity > MAX_CACHE_CAPACITY {
            return Err(ConfigError::CacheCapacity(self.cache_capacity));
        }
        ValidatedUrl::new(self.api_base_url.as_str())?;
        Ok(())
    }

    pub fn api(&self) -> Result<PhotoApi, ConfigError> {
        let base = ValidatedUrl::new(self.api_base_url.as_str())?;
        Ok(PhotoApi::new(base, self.access_key.clone()))
    }

    pub fn paging(&self) -> PagingSettings {
        PagingSettings {
            page_size: self.page_size,
            has_more: self.has_more,
            duplicates: self.duplicates,
            cache_capacity: self.cache_capacity,
        }
    }
}
