//! Catalog search/filter/pagination controller
//!
//! Owns the current filter set and page, runs the
//! `Idle -> Loading -> (Ready | Failed)` fetch cycle, and keeps the state
//! synchronized with a URL query string so a shared or reloaded URL
//! reproduces the same view.
//!
//! The controller is headless: state transitions are synchronous methods,
//! and the actual network call happens between `begin`-style methods (which
//! hand out a [`FetchTicket`]) and [`SearchController::apply`]. In-flight
//! requests are never cancelled; instead each dispatch bumps a generation
//! counter and stale outcomes are dropped on arrival, so the last
//! dispatched request always wins regardless of arrival order.

use crate::api::{ApiError, MangaApi, TitleListOptions};
use crate::filters::{same_query, CatalogQuery, FilterSet};
use crate::models::{Page, Title};

/// Catalog screens show 24 items per page.
pub const CATALOG_PAGE_SIZE: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Capability to apply one fetch's outcome. Carries the generation at
/// dispatch time plus the fully resolved request options.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    pub options: TitleListOptions,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Success(Page<Title>),
    Failure(String),
}

impl FetchOutcome {
    pub fn from_result(result: Result<Page<Title>, ApiError>) -> Self {
        match result {
            Ok(page) => FetchOutcome::Success(page),
            Err(e) => FetchOutcome::Failure(e.to_string()),
        }
    }
}

pub struct SearchController {
    query: CatalogQuery,
    page_size: u32,
    phase: LoadPhase,
    items: Vec<Title>,
    total: u64,
    error: Option<String>,
    generation: u64,
    url_query: String,
}

impl SearchController {
    /// Derive the initial state synchronously from the URL's query string,
    /// so a bookmarked URL renders its view without a flash of defaults.
    pub fn from_url_query(query_string: &str) -> Self {
        Self {
            query: CatalogQuery::parse(query_string),
            page_size: CATALOG_PAGE_SIZE,
            phase: LoadPhase::Idle,
            items: Vec::new(),
            total: 0,
            error: None,
            generation: 0,
            url_query: query_string.to_string(),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn items(&self) -> &[Title] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.query.page
    }

    pub fn filters(&self) -> &FilterSet {
        &self.query.filters
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Total pages derived from the API-reported match count, never from
    /// the number of items actually received.
    pub fn total_pages(&self) -> u32 {
        ((self.total + self.page_size as u64 - 1) / self.page_size as u64) as u32
    }

    /// Ticket for loading whatever the current URL-derived state says.
    /// Used for the first fetch after construction.
    pub fn load_current(&mut self) -> FetchTicket {
        self.dispatch()
    }

    /// Submit a new filter set. Resets the page to 1 unconditionally: a
    /// filter change invalidates the meaning of the current page.
    pub fn submit_filters(&mut self, filters: FilterSet) -> FetchTicket {
        self.query.filters = filters;
        self.query.page = 1;
        self.dispatch()
    }

    /// Move to a different page, preserving the filter set. Returns `None`
    /// when the page would not change.
    pub fn change_page(&mut self, page: u32) -> Option<FetchTicket> {
        let page = page.max(1);
        if page == self.query.page {
            return None;
        }
        self.query.page = page;
        Some(self.dispatch())
    }

    fn dispatch(&mut self) -> FetchTicket {
        self.phase = LoadPhase::Loading;
        self.error = None;
        self.generation += 1;

        FetchTicket {
            generation: self.generation,
            options: TitleListOptions {
                limit: self.page_size,
                offset: self.query.offset(self.page_size),
                filters: self.query.filters.clone(),
                ..TitleListOptions::default()
            },
        }
    }

    /// Run a ticket's request against the API.
    pub async fn execute(api: &MangaApi, ticket: &FetchTicket) -> FetchOutcome {
        FetchOutcome::from_result(api.search_titles(&ticket.options).await)
    }

    /// Fetch whatever the current state says, apply the outcome, and hand
    /// back the URL write if one is due. Convenience composition of
    /// `load_current`, `execute`, `apply` and `url_write`.
    pub async fn refresh(&mut self, api: &MangaApi) -> Option<String> {
        let ticket = self.load_current();
        let outcome = Self::execute(api, &ticket).await;
        self.apply(&ticket, outcome);
        self.url_write()
    }

    /// Apply a fetch outcome. Outcomes from a superseded dispatch are
    /// dropped so responses arriving out of order cannot clobber newer
    /// state.
    pub fn apply(&mut self, ticket: &FetchTicket, outcome: FetchOutcome) {
        if ticket.generation != self.generation {
            log::debug!(
                "dropping stale search outcome (generation {} < {})",
                ticket.generation,
                self.generation
            );
            return;
        }

        match outcome {
            FetchOutcome::Success(page) => {
                self.items = page.items;
                self.total = page.total;
                self.error = None;
                self.phase = LoadPhase::Ready;
            }
            FetchOutcome::Failure(message) => {
                // A failed page load must not silently look like an empty
                // result set; the error text is what distinguishes it.
                self.items.clear();
                self.total = 0;
                self.error = Some(message);
                self.phase = LoadPhase::Failed;
            }
        }
    }

    /// Query string to write back into the URL, replace-style. `None` when
    /// the serialized state already matches the URL (order-independent), so
    /// redundant history writes and render loops are avoided.
    pub fn url_write(&mut self) -> Option<String> {
        let serialized = self.query.to_query_string();
        if same_query(&serialized, &self.url_query) {
            return None;
        }
        self.url_query = serialized.clone();
        Some(serialized)
    }
}
