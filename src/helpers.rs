//! Helper functions for derived presentation values
//!
//! This module turns raw upstream records into the strings screens show:
//! - preferred localized title/description picks
//! - cover image URLs with a fixed placeholder fallback
//! - relationship display names (author, artist, scanlation group)
//! - chapter list labels
//!
//! # Examples
//!
//! ```
//! use yomidex::helpers::{preferred_text, PLACEHOLDER_COVER_URL};
//! use std::collections::HashMap;
//!
//! let mut title = HashMap::new();
//! title.insert("ja".to_string(), "ワンピース".to_string());
//! title.insert("en".to_string(), "One Piece".to_string());
//! assert_eq!(preferred_text(&title, "Untitled"), "One Piece");
//!
//! assert!(PLACEHOLDER_COVER_URL.starts_with("https://"));
//! ```

use crate::models::{Chapter, LocalizedString, Relationship, Title};

/// Shown whenever a cover cannot be derived; also the right src for an
/// image that failed to load.
pub const PLACEHOLDER_COVER_URL: &str =
    "https://placehold.co/300x450/1F2937/E5E7EB?text=No+Cover&font=roboto";

pub const DEFAULT_CDN_BASE_URL: &str = "https://uploads.mangadex.org";

/// Thumbnail size variants the CDN serves for covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    Small,
    Medium,
    Original,
}

impl CoverSize {
    /// Filename suffix appended to the cover file name.
    fn suffix(&self) -> &'static str {
        match self {
            CoverSize::Small => ".256.jpg",
            CoverSize::Medium => ".512.jpg",
            CoverSize::Original => "",
        }
    }
}

/// Pick display text out of a localized map: `en` first, then any entry,
/// then the fallback.
pub fn preferred_text<'a>(localized: &'a LocalizedString, fallback: &'a str) -> &'a str {
    localized
        .get("en")
        .filter(|s| !s.is_empty())
        .or_else(|| localized.values().find(|s| !s.is_empty()))
        .map(String::as_str)
        .unwrap_or(fallback)
}

/// Display title of a series.
pub fn title_text(title: &Title) -> &str {
    preferred_text(&title.attributes.title, "Untitled")
}

/// Display description, empty string when none is available.
pub fn description_text(title: &Title) -> &str {
    preferred_text(&title.attributes.description, "")
}

/// Cover image URL for a title: `<cdn>/covers/<titleId>/<fileName><size>`.
///
/// A missing cover_art relationship or a payload without a file name yields
/// the placeholder, never an error or a malformed URL.
pub fn cover_url(cdn_base: &str, title: &Title, size: CoverSize) -> String {
    let file_name = title.relationships.iter().find_map(|rel| match rel {
        Relationship::CoverArt { attributes, .. } => {
            attributes.as_ref().and_then(|a| a.file_name.as_deref())
        }
        _ => None,
    });

    match file_name {
        Some(file_name) => format!(
            "{}/covers/{}/{}{}",
            cdn_base.trim_end_matches('/'),
            title.id,
            file_name,
            size.suffix()
        ),
        None => PLACEHOLDER_COVER_URL.to_string(),
    }
}

/// Name of the first author relationship, if expanded.
pub fn author_name(title: &Title) -> Option<&str> {
    title.relationships.iter().find_map(|rel| match rel {
        Relationship::Author { .. } => rel.display_name(),
        _ => None,
    })
}

/// Name of the first artist relationship, if expanded.
pub fn artist_name(title: &Title) -> Option<&str> {
    title.relationships.iter().find_map(|rel| match rel {
        Relationship::Artist { .. } => rel.display_name(),
        _ => None,
    })
}

/// Name of the scanlation group credited on a chapter, if expanded.
pub fn scanlation_group_name(chapter: &Chapter) -> Option<&str> {
    chapter.relationships.iter().find_map(|rel| match rel {
        Relationship::ScanlationGroup { .. } => rel.display_name(),
        _ => None,
    })
}

/// Chapter list label, e.g. `Vol. 2 Ch. 14 - The Raid`. Falls back to
/// "Oneshot" when the chapter carries neither numbering nor a title.
pub fn chapter_label(chapter: &Chapter) -> String {
    let attrs = &chapter.attributes;
    let mut parts: Vec<String> = Vec::new();

    if let Some(volume) = attrs.volume.as_deref() {
        parts.push(format!("Vol. {}", volume));
    }
    if let Some(number) = attrs.chapter.as_deref() {
        parts.push(format!("Ch. {}", number));
    }
    let mut label = parts.join(" ");

    if let Some(title) = attrs.title.as_deref() {
        if !title.is_empty() {
            if label.is_empty() {
                label = title.to_string();
            } else {
                label.push_str(" - ");
                label.push_str(title);
            }
        }
    }

    if label.is_empty() {
        "Oneshot".to_string()
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChapterAttributes;
    use std::collections::HashMap;

    fn title_with_relationships(relationships: Vec<Relationship>) -> Title {
        let json = r#"{ "id": "t1", "attributes": { "title": { "en": "T" } } }"#;
        let mut title: Title = serde_json::from_str(json).unwrap();
        title.relationships = relationships;
        title
    }

    fn rel(json: &str) -> Relationship {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn preferred_text_prefers_english() {
        let mut map = HashMap::new();
        map.insert("ja".to_string(), "ジャ".to_string());
        map.insert("en".to_string(), "En".to_string());
        assert_eq!(preferred_text(&map, "x"), "En");
    }

    #[test]
    fn preferred_text_falls_back() {
        let mut map = HashMap::new();
        map.insert("ja".to_string(), "ジャ".to_string());
        assert_eq!(preferred_text(&map, "x"), "ジャ");
        assert_eq!(preferred_text(&HashMap::new(), "x"), "x");
    }

    #[test]
    fn cover_url_with_expanded_relation() {
        let title = title_with_relationships(vec![rel(
            r#"{ "id": "c1", "type": "cover_art", "attributes": { "fileName": "f.jpg" } }"#,
        )]);
        assert_eq!(
            cover_url(DEFAULT_CDN_BASE_URL, &title, CoverSize::Medium),
            "https://uploads.mangadex.org/covers/t1/f.jpg.512.jpg"
        );
        assert_eq!(
            cover_url(DEFAULT_CDN_BASE_URL, &title, CoverSize::Original),
            "https://uploads.mangadex.org/covers/t1/f.jpg"
        );
    }

    #[test]
    fn missing_cover_relation_yields_placeholder() {
        let title = title_with_relationships(vec![]);
        assert_eq!(
            cover_url(DEFAULT_CDN_BASE_URL, &title, CoverSize::Small),
            PLACEHOLDER_COVER_URL
        );
    }

    #[test]
    fn unexpanded_cover_relation_yields_placeholder() {
        // Relation present but not included in the request: no payload.
        let title =
            title_with_relationships(vec![rel(r#"{ "id": "c1", "type": "cover_art" }"#)]);
        assert_eq!(
            cover_url(DEFAULT_CDN_BASE_URL, &title, CoverSize::Medium),
            PLACEHOLDER_COVER_URL
        );
    }

    #[test]
    fn cover_without_file_name_yields_placeholder() {
        let title = title_with_relationships(vec![rel(
            r#"{ "id": "c1", "type": "cover_art", "attributes": { "volume": "1" } }"#,
        )]);
        assert_eq!(
            cover_url(DEFAULT_CDN_BASE_URL, &title, CoverSize::Medium),
            PLACEHOLDER_COVER_URL
        );
    }

    #[test]
    fn relationship_names() {
        let title = title_with_relationships(vec![
            rel(r#"{ "id": "a1", "type": "author", "attributes": { "name": "Oda" } }"#),
            rel(r#"{ "id": "a2", "type": "artist", "attributes": { "name": "Oda A" } }"#),
        ]);
        assert_eq!(author_name(&title), Some("Oda"));
        assert_eq!(artist_name(&title), Some("Oda A"));
    }

    #[test]
    fn chapter_labels() {
        let mk = |volume: Option<&str>, chapter: Option<&str>, title: Option<&str>| Chapter {
            id: "c".into(),
            attributes: ChapterAttributes {
                volume: volume.map(str::to_owned),
                chapter: chapter.map(str::to_owned),
                title: title.map(str::to_owned),
                translated_language: Some("en".into()),
                pages: 1,
                publish_at: None,
            },
            relationships: vec![],
        };

        assert_eq!(
            chapter_label(&mk(Some("2"), Some("14"), Some("The Raid"))),
            "Vol. 2 Ch. 14 - The Raid"
        );
        assert_eq!(chapter_label(&mk(None, Some("omake"), None)), "Ch. omake");
        assert_eq!(chapter_label(&mk(None, None, None)), "Oneshot");
    }
}
