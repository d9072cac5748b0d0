use serde::{Deserialize, Serialize};

use crate::capabilities::{PhotoApi, TimerId};
use crate::config::GalleryConfig;
use crate::debounce::Debouncer;
use crate::pagination::PagedFetcher;
use crate::photo::ImageRecord;

/// Core state. Lives only in memory; nothing here is persisted.
#[derive(Debug)]
pub struct Model {
    pub config: GalleryConfig,
    /// `None` when the configured base URL did not validate.
    pub api: Option<PhotoApi>,
    pub debouncer: Debouncer,
    pub fetcher: PagedFetcher,
    /// Set when the last `Configure` was rejected.
    pub config_error: Option<String>,
}

impl Model {
    pub fn new(config: GalleryConfig) -> Self {
        let api = config.api().ok();
        let debouncer = Debouncer::new(config.debounce_ms);
        let fetcher = PagedFetcher::new(config.paging());
        Self {
            config,
            api,
            debouncer,
            fetcher,
            config_error: None,
        }
    }

    /// Installs a validated configuration. Pages fetched under the previous
    /// configuration are dropped; the typed and committed query survive.
    ///
    /// Returns the debounce ticket that was pending under the old quiet
    /// window, if any.
    pub fn reconfigure(&mut self, config: GalleryConfig) -> Option<TimerId> {
        let interrupted = self.debouncer.pending();
        let mut next = Self::new(config);
        next.debouncer.carry_over(&self.debouncer);
        next.fetcher.carry_over(&self.fetcher);
        *self = next;
        interrupted
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(GalleryConfig::default())
    }
}

/// What the shell renders.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewModel {
    /// Raw text in the search box.
    pub query: String,
    /// Query the images belong to.
    pub committed_query: String,
    pub images: Vec<ImageRecord>,
    pub is_loading: bool,
    pub is_fetching_next: bool,
    pub has_more: bool,
    /// Whether a load-more affordance would do anything right now.
    pub can_load_more: bool,
    pub is_debouncing: bool,
    pub error: Option<String>,
}
