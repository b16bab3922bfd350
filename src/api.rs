//! Typed client for the upstream manga API
//!
//! Four read-only operations: paginated title search, single title detail,
//! chapter feed, and chapter page resolution. Every failure mode (missing
//! local input, transport error, HTTP error with a structured body, or an
//! HTTP 200 whose body reports `result: "error"`) normalizes into an
//! [`ApiError`] carrying a human-readable message, so callers branch on one
//! `Result` and never catch panics.

use crate::filters::FilterSet;
use crate::http_client::ApiHttpClient;
use crate::metrics::{track_request, MetricsTracker};
use crate::models::{
    AtHomeResponse, Chapter, ContentRating, EntityResponse, ListResponse, Page, PageResolution,
    Title,
};
use reqwest::StatusCode;
use reqwest::Url;
use std::fmt;

pub const DEFAULT_API_BASE_URL: &str = "https://api.mangadex.org";

/// Sort direction in an `order[<field>]` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Ordered field-to-direction mapping; insertion order is preserved in the
/// outgoing query string.
pub type Order = Vec<(String, SortDirection)>;

pub fn relevance_order() -> Order {
    vec![("relevance".to_string(), SortDirection::Desc)]
}

/// Popularity default used when no filter is active.
pub fn popularity_order() -> Order {
    vec![("followedCount".to_string(), SortDirection::Desc)]
}

pub fn chapter_feed_order() -> Order {
    vec![
        ("volume".to_string(), SortDirection::Desc),
        ("chapter".to_string(), SortDirection::Desc),
    ]
}

/// Options for [`MangaApi::search_titles`]. An empty `order` picks the
/// default at request time: relevance when any filter is active, popularity
/// otherwise.
#[derive(Debug, Clone)]
pub struct TitleListOptions {
    pub limit: u32,
    pub offset: u32,
    pub order: Order,
    pub includes: Vec<String>,
    pub languages: Vec<String>,
    pub filters: FilterSet,
}

impl Default for TitleListOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            order: Vec::new(),
            includes: vec!["cover_art".to_string()],
            languages: vec!["en".to_string()],
            filters: FilterSet::default(),
        }
    }
}

/// Options for [`MangaApi::chapter_feed`].
#[derive(Debug, Clone)]
pub struct ChapterFeedOptions {
    pub limit: u32,
    pub offset: u32,
    pub order: Order,
    pub includes: Vec<String>,
    pub languages: Vec<String>,
    pub content_rating: Vec<ContentRating>,
}

impl Default for ChapterFeedOptions {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            order: chapter_feed_order(),
            includes: vec!["scanlation_group".to_string()],
            languages: vec!["en".to_string()],
            content_rating: Vec::new(),
        }
    }
}

/// Unified failure shape of all API operations.
#[derive(Debug)]
pub enum ApiError {
    /// A required identifier was empty; caught before any network call.
    MissingId(&'static str),
    /// No HTTP response was obtained.
    Transport(reqwest::Error),
    /// HTTP error status whose body carried no usable detail.
    Http { status: StatusCode },
    /// The upstream reported a failure in a parseable body, regardless of
    /// HTTP status.
    Upstream { message: String },
    /// A 2xx body that did not match the expected shape.
    Decode(serde_json::Error),
    BadUrl(url::ParseError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingId(what) => write!(f, "{} is required", what),
            ApiError::Transport(e) => write!(f, "network error: {}", e),
            ApiError::Http { status } => write!(f, "upstream returned {}", status),
            ApiError::Upstream { message } => f.write_str(message),
            ApiError::Decode(e) => write!(f, "unexpected response body: {}", e),
            ApiError::BadUrl(e) => write!(f, "bad request url: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e)
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::BadUrl(e)
    }
}

/// Client for the upstream manga API. Cheap to share behind a reference;
/// holds no per-request state.
pub struct MangaApi {
    http: ApiHttpClient,
    base_url: String,
    metrics: MetricsTracker,
}

impl MangaApi {
    pub fn new(http: ApiHttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            metrics: MetricsTracker::new(),
        }
    }

    /// Share an externally owned tracker (the server passes its own).
    pub fn with_metrics(mut self, metrics: MetricsTracker) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Paginated title search. Parameters with unset/empty values are
    /// omitted from the query entirely.
    pub async fn search_titles(&self, opts: &TitleListOptions) -> Result<Page<Title>, ApiError> {
        track_request(&self.metrics, "title_search", self.search_titles_impl(opts)).await
    }

    async fn search_titles_impl(&self, opts: &TitleListOptions) -> Result<Page<Title>, ApiError> {
        let pairs = title_query_pairs(opts);
        let url = Url::parse_with_params(&format!("{}/manga", self.base_url), &pairs)?;
        let (status, text) = self.fetch(url).await?;
        parse_list::<Title>(status, &text)
    }

    /// Single title record with author/artist/cover relations expanded.
    pub async fn title_detail(&self, id: &str) -> Result<Title, ApiError> {
        if id.trim().is_empty() {
            return Err(ApiError::MissingId("title id"));
        }
        track_request(&self.metrics, "title_detail", self.title_detail_impl(id)).await
    }

    async fn title_detail_impl(&self, id: &str) -> Result<Title, ApiError> {
        let pairs = [
            ("includes[]", "cover_art"),
            ("includes[]", "author"),
            ("includes[]", "artist"),
        ];
        let url = Url::parse_with_params(&format!("{}/manga/{}", self.base_url, id), pairs)?;
        let (status, text) = self.fetch(url).await?;

        let parsed: Result<EntityResponse<Title>, _> = serde_json::from_str(&text);
        match parsed {
            Ok(body) => {
                if body.is_ok() {
                    body.data.ok_or(ApiError::Upstream {
                        message: "title record missing from response".to_string(),
                    })
                } else {
                    Err(upstream_error(status, body.error_message()))
                }
            }
            Err(e) => Err(fallback_error(status, e)),
        }
    }

    /// Paginated chapter feed of one title.
    pub async fn chapter_feed(
        &self,
        title_id: &str,
        opts: &ChapterFeedOptions,
    ) -> Result<Page<Chapter>, ApiError> {
        if title_id.trim().is_empty() {
            return Err(ApiError::MissingId("title id"));
        }
        track_request(
            &self.metrics,
            "chapter_feed",
            self.chapter_feed_impl(title_id, opts),
        )
        .await
    }

    async fn chapter_feed_impl(
        &self,
        title_id: &str,
        opts: &ChapterFeedOptions,
    ) -> Result<Page<Chapter>, ApiError> {
        let pairs = feed_query_pairs(opts);
        let url = Url::parse_with_params(
            &format!("{}/manga/{}/feed", self.base_url, title_id),
            &pairs,
        )?;
        let (status, text) = self.fetch(url).await?;
        parse_list::<Chapter>(status, &text)
    }

    /// Resolve a chapter into its transient page-server record. An HTTP 200
    /// whose body reports a logical failure is still an error.
    pub async fn resolve_pages(&self, chapter_id: &str) -> Result<PageResolution, ApiError> {
        if chapter_id.trim().is_empty() {
            return Err(ApiError::MissingId("chapter id"));
        }
        track_request(
            &self.metrics,
            "page_resolution",
            self.resolve_pages_impl(chapter_id),
        )
        .await
    }

    async fn resolve_pages_impl(&self, chapter_id: &str) -> Result<PageResolution, ApiError> {
        let url = Url::parse(&format!(
            "{}/at-home/server/{}",
            self.base_url, chapter_id
        ))?;
        let (status, text) = self.fetch(url).await?;

        let parsed: Result<AtHomeResponse, _> = serde_json::from_str(&text);
        match parsed {
            Ok(body) => {
                if !body.is_ok() {
                    return Err(upstream_error(status, body.error_message()));
                }
                match (body.base_url, body.chapter) {
                    (Some(base_url), Some(chapter)) => Ok(PageResolution {
                        base_url,
                        hash: chapter.hash,
                        data: chapter.data,
                        data_saver: chapter.data_saver,
                    }),
                    _ => Err(ApiError::Upstream {
                        message: "page server response is incomplete".to_string(),
                    }),
                }
            }
            Err(e) => Err(fallback_error(status, e)),
        }
    }

    async fn fetch(&self, url: Url) -> Result<(StatusCode, String), ApiError> {
        log::debug!("GET {}", url);
        let response = self.http.get_with_retry(url.as_str()).await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

/// Query pairs for the title search endpoint. Unset or empty options
/// contribute nothing; an empty order picks the filter-dependent default.
fn title_query_pairs(opts: &TitleListOptions) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = vec![
        ("limit".into(), opts.limit.to_string()),
        ("offset".into(), opts.offset.to_string()),
    ];
    let order = if opts.order.is_empty() {
        if opts.filters.is_active() {
            relevance_order()
        } else {
            popularity_order()
        }
    } else {
        opts.order.clone()
    };
    for (field, dir) in &order {
        pairs.push((format!("order[{}]", field), dir.as_str().into()));
    }
    for inc in &opts.includes {
        pairs.push(("includes[]".into(), inc.clone()));
    }
    for lang in &opts.languages {
        pairs.push(("availableTranslatedLanguage[]".into(), lang.clone()));
    }
    if let Some(title) = opts.filters.title.as_deref() {
        if !title.trim().is_empty() {
            pairs.push(("title".into(), title.to_string()));
        }
    }
    if let Some(year) = opts.filters.year {
        pairs.push(("year".into(), year.to_string()));
    }
    for s in &opts.filters.status {
        pairs.push(("status[]".into(), s.as_str().into()));
    }
    for cr in &opts.filters.content_rating {
        pairs.push(("contentRating[]".into(), cr.as_str().into()));
    }
    pairs
}

/// Query pairs for the chapter feed endpoint.
fn feed_query_pairs(opts: &ChapterFeedOptions) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = vec![
        ("limit".into(), opts.limit.to_string()),
        ("offset".into(), opts.offset.to_string()),
    ];
    for (field, dir) in &opts.order {
        pairs.push((format!("order[{}]", field), dir.as_str().into()));
    }
    for lang in &opts.languages {
        pairs.push(("translatedLanguage[]".into(), lang.clone()));
    }
    for inc in &opts.includes {
        pairs.push(("includes[]".into(), inc.clone()));
    }
    for cr in &opts.content_rating {
        pairs.push(("contentRating[]".into(), cr.as_str().into()));
    }
    pairs
}

/// Shared success/failure decoding for collection endpoints. The body is
/// parsed even on a non-2xx status because the upstream puts structured
/// detail there.
fn parse_list<T: serde::de::DeserializeOwned>(
    status: StatusCode,
    text: &str,
) -> Result<Page<T>, ApiError> {
    let parsed: Result<ListResponse<T>, _> = serde_json::from_str(text);
    match parsed {
        Ok(body) => {
            if body.is_ok() {
                Ok(Page {
                    items: body.data,
                    limit: body.limit,
                    offset: body.offset,
                    total: body.total,
                })
            } else {
                Err(upstream_error(status, body.error_message()))
            }
        }
        Err(e) => Err(fallback_error(status, e)),
    }
}

fn upstream_error(status: StatusCode, detail: Option<&str>) -> ApiError {
    match detail {
        Some(message) => ApiError::Upstream {
            message: message.to_string(),
        },
        None => ApiError::Http { status },
    }
}

/// Body did not parse: blame the HTTP status when it was an error, the body
/// shape otherwise.
fn fallback_error(status: StatusCode, decode: serde_json::Error) -> ApiError {
    if status.is_success() {
        ApiError::Decode(decode)
    } else {
        ApiError::Http { status }
    }
}
