//! Per-query page collections and the fetcher that drives them.
//!
//! The fetcher is a plain state machine: it hands out [`PageRequest`]s and is
//! told how they ended through [`PagedFetcher::complete`]. It never performs
//! I/O itself, so the app decides how requests reach the network.

use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroUsize;

use crate::config::DEFAULT_CACHE_CAPACITY;
use crate::event::PhotoId;
use crate::photo::ImageRecord;
use crate::{FetchError, DEFAULT_PAGE_SIZE};

/// How the fetcher decides that no further pages exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HasMorePolicy {
    /// Never conclude the end; every successful page leaves `has_more` true.
    #[default]
    Always,
    /// A successful page with no records ends the collection.
    EmptyPage,
    /// A page shorter than the page size ends the collection.
    ShortPage,
    /// Trust the search endpoint's `total_pages`. Listing pages carry no
    /// total and fall back to [`HasMorePolicy::EmptyPage`].
    ReportedTotal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep upstream order verbatim, repeats included.
    #[default]
    Preserve,
    /// Drop records whose id is already in the collection.
    DropRepeated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingSettings {
    pub page_size: u32,
    pub has_more: HasMorePolicy,
    pub duplicates: DuplicatePolicy,
    /// Number of inactive query collections kept for instant switch-back.
    /// Zero disables the cache.
    pub cache_capacity: usize,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            has_more: HasMorePolicy::default(),
            duplicates: DuplicatePolicy::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// One page fetch, as handed to the network layer and echoed back on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub query: String,
    /// 1-based.
    pub page: u32,
    pub per_page: u32,
    /// Activation the request belongs to; results for older activations are stale.
    pub generation: u64,
}

/// A decoded, normalized page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageBody {
    pub records: Vec<ImageRecord>,
    pub total_pages: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Appended { page: u32, records: usize },
    Failed,
    /// The request was abandoned; nothing changed.
    Stale,
}

/// Pages fetched so far for one committed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCollection {
    query: String,
    pages: Vec<Vec<ImageRecord>>,
    seen: HashSet<PhotoId>,
    error: Option<FetchError>,
    exhausted: bool,
}

impl PageCollection {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            pages: Vec::new(),
            seen: HashSet::new(),
            error: None,
            exhausted: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn pages(&self) -> &[Vec<ImageRecord>] {
        &self.pages
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageRecord> {
        self.pages.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(Vec::is_empty)
    }

    pub fn next_page(&self) -> u32 {
        u32::try_from(self.pages.len()).map_or(u32::MAX, |n| n.saturating_add(1))
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    fn append(&mut self, page: u32, body: PageBody, settings: &PagingSettings) -> usize {
        let fetched = body.records.len();
        let page_size = usize::try_from(settings.page_size).unwrap_or(usize::MAX);

        self.exhausted = match settings.has_more {
            HasMorePolicy::Always => false,
            HasMorePolicy::EmptyPage => fetched == 0,
            HasMorePolicy::ShortPage => fetched < page_size,
            HasMorePolicy::ReportedTotal => match body.total_pages {
                Some(total) => page >= total,
                None => fetched == 0,
            },
        };

        let records: Vec<ImageRecord> = match settings.duplicates {
            DuplicatePolicy::Preserve => {
                for record in &body.records {
                    self.seen.insert(record.id.clone());
                }
                body.records
            }
            DuplicatePolicy::DropRepeated => body
                .records
                .into_iter()
                .filter(|record| self.seen.insert(record.id.clone()))
                .collect(),
        };

        let appended = records.len();
        self.pages.push(records);
        self.error = None;
        appended
    }
}

/// Keeps the active query's collection, at most one outstanding request for
/// it, and an LRU of collections for queries that were switched away from.
pub struct PagedFetcher {
    settings: PagingSettings,
    generation: u64,
    active: Option<PageCollection>,
    outstanding: Option<PageRequest>,
    parked: Option<LruCache<String, PageCollection>>,
}

impl PagedFetcher {
    pub fn new(settings: PagingSettings) -> Self {
        let parked = NonZeroUsize::new(settings.cache_capacity).map(LruCache::new);
        Self {
            settings,
            generation: 0,
            active: None,
            outstanding: None,
            parked,
        }
    }

    pub fn settings(&self) -> &PagingSettings {
        &self.settings
    }

    /// Continues the activation count of a fetcher this one replaces, so no
    /// request it issues can be mistaken for one the previous fetcher issued.
    pub fn carry_over(&mut self, previous: &PagedFetcher) {
        self.generation = self.generation.max(previous.generation);
    }

    /// Points the fetcher at `query`.
    ///
    /// A query equal to the active one changes nothing. Any other query
    /// abandons the outstanding request, parks the current collection and
    /// activates the collection for `query` (restored from the cache when
    /// possible). Returns the page-1 request when the activated collection has
    /// no pages yet.
    pub fn observe(&mut self, query: &str) -> Option<PageRequest> {
        if self.active.as_ref().is_some_and(|c| c.query == query) {
            return None;
        }

        if let Some(abandoned) = self.outstanding.take() {
            tracing::debug!(
                query = %abandoned.query,
                page = abandoned.page,
                "abandoning outstanding page request"
            );
        }

        if let Some(previous) = self.active.take() {
            self.park(previous);
        }

        let collection = self
            .parked
            .as_mut()
            .and_then(|cache| cache.pop(query))
            .unwrap_or_else(|| PageCollection::new(query));

        self.generation += 1;
        let needs_first_page = collection.pages.is_empty();
        if !needs_first_page {
            tracing::debug!(query, pages = collection.pages.len(), "restored cached collection");
        }
        self.active = Some(collection);

        if needs_first_page {
            self.issue()
        } else {
            None
        }
    }

    /// Requests the next page of the active query.
    ///
    /// No-op while a request is outstanding, before any query was observed,
    /// or once the collection is known to be exhausted. After a failure the
    /// failed page is requested again.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.outstanding.is_some() {
            return None;
        }
        if !self.active.as_ref()?.has_more() {
            return None;
        }
        self.issue()
    }

    pub fn complete(
        &mut self,
        request: &PageRequest,
        outcome: Result<PageBody, FetchError>,
    ) -> Completion {
        if self.outstanding.as_ref() != Some(request) {
            return Completion::Stale;
        }
        self.outstanding = None;

        let Some(collection) = self.active.as_mut() else {
            return Completion::Stale;
        };

        match outcome {
            Ok(body) => {
                let records = collection.append(request.page, body, &self.settings);
                Completion::Appended {
                    page: request.page,
                    records,
                }
            }
            Err(error) => {
                collection.error = Some(error);
                Completion::Failed
            }
        }
    }

    pub fn collection(&self) -> Option<&PageCollection> {
        self.active.as_ref()
    }

    pub fn query(&self) -> Option<&str> {
        self.active.as_ref().map(PageCollection::query)
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageRecord> {
        self.active.iter().flat_map(|c| c.images())
    }

    /// Pages of the active query, one entry per successful fetch.
    pub fn pages(&self) -> &[Vec<ImageRecord>] {
        match &self.active {
            Some(collection) => collection.pages(),
            None => &[],
        }
    }

    pub fn outstanding(&self) -> Option<&PageRequest> {
        self.outstanding.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.outstanding.as_ref().is_some_and(|r| r.page == 1)
    }

    pub fn is_fetching_next(&self) -> bool {
        self.outstanding.as_ref().is_some_and(|r| r.page > 1)
    }

    pub fn has_more(&self) -> bool {
        self.active.as_ref().map_or(true, PageCollection::has_more)
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.active.as_ref().and_then(PageCollection::error)
    }

    pub fn cached_queries(&self) -> usize {
        self.parked.as_ref().map_or(0, LruCache::len)
    }

    fn issue(&mut self) -> Option<PageRequest> {
        let collection = self.active.as_ref()?;
        let request = PageRequest {
            query: collection.query.clone(),
            page: collection.next_page(),
            per_page: self.settings.page_size,
            generation: self.generation,
        };
        self.outstanding = Some(request.clone());
        Some(request)
    }

    fn park(&mut self, mut collection: PageCollection) {
        let Some(cache) = self.parked.as_mut() else {
            return;
        };
        if collection.pages.is_empty() {
            return;
        }
        collection.error = None;
        cache.put(collection.query.clone(), collection);
    }
}

impl Default for PagedFetcher {
    fn default() -> Self {
        Self::new(PagingSettings::default())
    }
}

impl fmt::Debug for PagedFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedFetcher")
            .field("settings", &self.settings)
            .field("generation", &self.generation)
            .field("active", &self.active)
            .field("outstanding", &self.outstanding)
            .field("cached_queries", &self.cached_queries())
            .finish()
    }
}
