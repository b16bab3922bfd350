//! Search filter set and its URL query codec
//!
//! The filter set is the only locally mutated entity in the system: it is
//! created from URL query parameters, changed by user interaction, and
//! serialized back into the URL. The query parameters owned here are `q`,
//! `year`, `status` (repeatable), `contentRating` (repeatable) and `page`
//! (1-based, omitted when 1).

use crate::models::{ContentRating, TitleStatus};
use url::form_urlencoded;

/// User-chosen catalog filters. Everything is optional; an empty set means
/// the default (popularity-ordered) catalog view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub status: Vec<TitleStatus>,
    pub content_rating: Vec<ContentRating>,
}

impl FilterSet {
    /// True when any filter is active, which switches the catalog sort from
    /// popularity to relevance.
    pub fn is_active(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
            || self.year.is_some()
            || !self.status.is_empty()
            || !self.content_rating.is_empty()
    }
}

/// Filters plus the 1-based page, the full URL-owned state of the catalog
/// screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub filters: FilterSet,
    pub page: u32,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            filters: FilterSet::default(),
            page: 1,
        }
    }
}

impl CatalogQuery {
    /// Parse from a URL query string (without the leading `?`).
    ///
    /// Unknown parameters, malformed years and unrecognized enum values are
    /// skipped, never errors: a shared URL with junk in it still produces a
    /// usable view.
    pub fn parse(query: &str) -> Self {
        let mut filters = FilterSet::default();
        let mut page = 1u32;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "q" => {
                    if !value.is_empty() {
                        filters.title = Some(value.into_owned());
                    }
                }
                "year" => {
                    if let Ok(y) = value.parse::<i32>() {
                        filters.year = Some(y);
                    }
                }
                "status" => {
                    if let Some(s) = TitleStatus::parse(&value) {
                        filters.status.push(s);
                    }
                }
                "contentRating" => {
                    if let Some(cr) = ContentRating::parse(&value) {
                        filters.content_rating.push(cr);
                    }
                }
                "page" => {
                    if let Ok(p) = value.parse::<u32>() {
                        page = p.max(1);
                    }
                }
                _ => {}
            }
        }

        Self { filters, page }
    }

    /// Serialize back into the query string written to the URL. `page` is
    /// omitted when 1 so the canonical first-page URL stays clean.
    pub fn to_query_string(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        if let Some(title) = self.filters.title.as_deref() {
            if !title.is_empty() {
                ser.append_pair("q", title);
            }
        }
        if let Some(year) = self.filters.year {
            ser.append_pair("year", &year.to_string());
        }
        for s in &self.filters.status {
            ser.append_pair("status", s.as_str());
        }
        for cr in &self.filters.content_rating {
            ser.append_pair("contentRating", cr.as_str());
        }
        if self.page > 1 {
            ser.append_pair("page", &self.page.to_string());
        }
        ser.finish()
    }

    /// Pagination offset for a given page size: `(page - 1) * page_size`.
    pub fn offset(&self, page_size: u32) -> u32 {
        (self.page - 1) * page_size
    }
}

/// Order-independent equality of two query strings. Used to suppress URL
/// writes that would only reorder parameters.
pub fn same_query(a: &str, b: &str) -> bool {
    normalize_query(a) == normalize_query(b)
}

fn normalize_query(query: &str) -> Vec<String> {
    let mut parts: Vec<String> = query
        .split('&')
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect();
    parts.sort();
    parts
}
