//! Chapter reader: page URL derivation and navigation
//!
//! A reading session resolves a chapter into an ordered list of absolute
//! image URLs and tracks the current page index. The page-server record is
//! a short-lived capability and is re-resolved from scratch whenever the
//! chapter changes; nothing here is cached.

use crate::api::{ApiError, MangaApi};
use crate::models::PageResolution;

/// Fixed choice between full-resolution and reduced-bandwidth page images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    #[default]
    Full,
    DataSaver,
}

impl Quality {
    /// Path segment between the base URL and the chapter hash.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Quality::Full => "data",
            Quality::DataSaver => "data-saver",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "data" | "full" => Some(Quality::Full),
            "data-saver" => Some(Quality::DataSaver),
            _ => None,
        }
    }
}

/// Keys the reader reacts to while mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Right,
}

/// Ordered absolute image URLs for one chapter at one quality:
/// `<base>/<quality>/<hash>/<file>` per file, in file order.
pub fn page_image_urls(resolution: &PageResolution, quality: Quality) -> Vec<String> {
    let files = match quality {
        Quality::Full => &resolution.data,
        Quality::DataSaver => &resolution.data_saver,
    };
    let base = resolution.base_url.trim_end_matches('/');

    files
        .iter()
        .map(|file| format!("{}/{}/{}/{}", base, quality.path_segment(), resolution.hash, file))
        .collect()
}

/// One chapter's reading state: the derived URLs plus a clamped page index.
pub struct Reader {
    urls: Vec<String>,
    index: usize,
}

impl Reader {
    pub fn new(resolution: &PageResolution, quality: Quality) -> Self {
        Self {
            urls: page_image_urls(resolution, quality),
            index: 0,
        }
    }

    /// Resolve a chapter and open it at page 0.
    pub async fn open(
        api: &MangaApi,
        chapter_id: &str,
        quality: Quality,
    ) -> Result<Self, ApiError> {
        let resolution = api.resolve_pages(chapter_id).await?;
        Ok(Self::new(&resolution, quality))
    }

    pub fn page_count(&self) -> usize {
        self.urls.len()
    }

    pub fn page_urls(&self) -> &[String] {
        &self.urls
    }

    /// 0-based index of the page being shown, always within bounds while
    /// any page exists.
    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_url(&self) -> Option<&str> {
        self.urls.get(self.index).map(String::as_str)
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// End-of-chapter affordance: active once the last index is reached.
    pub fn at_end(&self) -> bool {
        !self.urls.is_empty() && self.index + 1 == self.urls.len()
    }

    /// Step back one page; no-op (no wraparound) at the first page.
    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Step forward one page; no-op (no wraparound) at the last page.
    pub fn next(&mut self) {
        if self.index + 1 < self.urls.len() {
            self.index += 1;
        }
    }

    /// Jump to an arbitrary index, clamped to the valid range.
    pub fn jump_to(&mut self, index: usize) {
        if self.urls.is_empty() {
            self.index = 0;
        } else {
            self.index = index.min(self.urls.len() - 1);
        }
    }

    /// Keyboard navigation: left is previous, right is next.
    pub fn handle_key(&mut self, key: NavKey) {
        match key {
            NavKey::Left => self.previous(),
            NavKey::Right => self.next(),
        }
    }

    /// "Page N of M" display label, 1-based.
    pub fn page_label(&self) -> String {
        if self.urls.is_empty() {
            "No pages".to_string()
        } else {
            format!("Page {} of {}", self.index + 1, self.urls.len())
        }
    }
}
