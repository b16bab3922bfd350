//! Wire types for the upstream manga API
//!
//! Everything in this module mirrors the upstream JSON contract verbatim:
//! entities are read-only, constructed fresh on every fetch and never
//! mutated locally. Response envelopes keep all of their fields defaulted
//! so that an error body (`result: "error"` plus an `errors` array)
//! deserializes into the same struct as a success body.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Language code to text, e.g. `{ "en": "One Piece", "ja": "ワンピース" }`.
pub type LocalizedString = HashMap<String, String>;

/// Publication status of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleStatus {
    Ongoing,
    Completed,
    Hiatus,
    Cancelled,
}

impl TitleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TitleStatus::Ongoing => "ongoing",
            TitleStatus::Completed => "completed",
            TitleStatus::Hiatus => "hiatus",
            TitleStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ongoing" => Some(TitleStatus::Ongoing),
            "completed" => Some(TitleStatus::Completed),
            "hiatus" => Some(TitleStatus::Hiatus),
            "cancelled" => Some(TitleStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TitleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content rating of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRating {
    Safe,
    Suggestive,
    Erotica,
    Pornographic,
}

impl ContentRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentRating::Safe => "safe",
            ContentRating::Suggestive => "suggestive",
            ContentRating::Erotica => "erotica",
            ContentRating::Pornographic => "pornographic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "safe" => Some(ContentRating::Safe),
            "suggestive" => Some(ContentRating::Suggestive),
            "erotica" => Some(ContentRating::Erotica),
            "pornographic" => Some(ContentRating::Pornographic),
            _ => None,
        }
    }
}

impl fmt::Display for ContentRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping of a tag. The upstream vocabulary is open-ended, anything
/// unrecognized lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TagGroup {
    Genre,
    Theme,
    Format,
    #[serde(other)]
    #[default]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagAttributes {
    #[serde(default)]
    pub name: LocalizedString,
    #[serde(default)]
    pub group: TagGroup,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub id: String,
    pub attributes: TagAttributes,
}

/// Expanded attributes of a `cover_art` relationship.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverArtAttributes {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
}

/// Expanded attributes of an `author` or `artist` relationship.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonAttributes {
    #[serde(default)]
    pub name: Option<String>,
}

/// Expanded attributes of a `scanlation_group` relationship.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupAttributes {
    #[serde(default)]
    pub name: Option<String>,
}

/// A typed reference from one entity to another.
///
/// The attribute payload is only present when the request asked for that
/// relation to be expanded via `includes[]`; a bare reference is the normal
/// case and never an error. Kinds the client does not interpret are kept as
/// `Other` so the rest of the record still parses.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawRelationship")]
pub enum Relationship {
    CoverArt {
        id: String,
        attributes: Option<CoverArtAttributes>,
    },
    Author {
        id: String,
        attributes: Option<PersonAttributes>,
    },
    Artist {
        id: String,
        attributes: Option<PersonAttributes>,
    },
    ScanlationGroup {
        id: String,
        attributes: Option<GroupAttributes>,
    },
    Other {
        id: String,
        kind: String,
    },
}

/// Wire shape of a relationship before the kind discriminator is applied.
#[derive(Debug, Deserialize)]
struct RawRelationship {
    id: String,
    #[serde(rename = "type")]
    rel_type: String,
    #[serde(default)]
    attributes: Option<serde_json::Value>,
}

impl From<RawRelationship> for Relationship {
    fn from(raw: RawRelationship) -> Self {
        // A payload that fails to parse is treated the same as an absent
        // one; only the discriminator decides the variant.
        fn expanded<T: serde::de::DeserializeOwned>(v: Option<serde_json::Value>) -> Option<T> {
            v.and_then(|value| serde_json::from_value(value).ok())
        }

        match raw.rel_type.as_str() {
            "cover_art" => Relationship::CoverArt {
                id: raw.id,
                attributes: expanded(raw.attributes),
            },
            "author" => Relationship::Author {
                id: raw.id,
                attributes: expanded(raw.attributes),
            },
            "artist" => Relationship::Artist {
                id: raw.id,
                attributes: expanded(raw.attributes),
            },
            "scanlation_group" => Relationship::ScanlationGroup {
                id: raw.id,
                attributes: expanded(raw.attributes),
            },
            _ => Relationship::Other {
                id: raw.id,
                kind: raw.rel_type,
            },
        }
    }
}

impl Relationship {
    pub fn id(&self) -> &str {
        match self {
            Relationship::CoverArt { id, .. }
            | Relationship::Author { id, .. }
            | Relationship::Artist { id, .. }
            | Relationship::ScanlationGroup { id, .. }
            | Relationship::Other { id, .. } => id,
        }
    }

    /// Display name carried by an expanded author/artist/group payload.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Relationship::Author { attributes, .. } | Relationship::Artist { attributes, .. } => {
                attributes.as_ref().and_then(|a| a.name.as_deref())
            }
            Relationship::ScanlationGroup { attributes, .. } => {
                attributes.as_ref().and_then(|a| a.name.as_deref())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleAttributes {
    #[serde(default)]
    pub title: LocalizedString,
    #[serde(default)]
    pub alt_titles: Vec<LocalizedString>,
    #[serde(default)]
    pub description: LocalizedString,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub status: Option<TitleStatus>,
    #[serde(default)]
    pub content_rating: Option<ContentRating>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub available_translated_languages: Vec<Option<String>>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub last_volume: Option<String>,
    #[serde(default)]
    pub last_chapter: Option<String>,
}

/// A manga series record.
#[derive(Debug, Clone, Deserialize)]
pub struct Title {
    pub id: String,
    pub attributes: TitleAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// Volume/chapter numbers stay strings: values like "omake" occur upstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAttributes {
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub translated_language: Option<String>,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub publish_at: Option<DateTime<Utc>>,
}

/// One chapter of a title, scoped to the feed it was fetched from.
#[derive(Debug, Clone, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub attributes: ChapterAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// Structured error detail the upstream puts in error bodies.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorDetail {
    /// Best human-readable text in the detail, preferring `detail`.
    pub fn message(&self) -> Option<&str> {
        self.detail.as_deref().or(self.title.as_deref())
    }
}

fn result_is_ok(result: &str) -> bool {
    result == "ok"
}

/// Envelope for paginated collection responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub result: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

impl<T> ListResponse<T> {
    pub fn is_ok(&self) -> bool {
        result_is_ok(&self.result)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.errors.iter().find_map(|e| e.message())
    }
}

/// Envelope for single-entity responses.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityResponse<T> {
    #[serde(default)]
    pub result: String,
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

impl<T> EntityResponse<T> {
    pub fn is_ok(&self) -> bool {
        result_is_ok(&self.result)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.errors.iter().find_map(|e| e.message())
    }
}

/// Filename lists of a resolved chapter, keyed by quality mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterImages {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(default)]
    pub data_saver: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHomeResponse {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub base_url: Option<String>,
    pub chapter: Option<ChapterImages>,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

impl AtHomeResponse {
    pub fn is_ok(&self) -> bool {
        result_is_ok(&self.result)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.errors.iter().find_map(|e| e.message())
    }
}

/// Short-lived indirection mapping a chapter to a delivery host.
///
/// The base URL rotates and may be geographically routed, so this record
/// must be re-resolved for every reading session and never stored.
#[derive(Debug, Clone)]
pub struct PageResolution {
    pub base_url: String,
    pub hash: String,
    pub data: Vec<String>,
    pub data_saver: Vec<String>,
}

/// A page of items plus the pagination bookkeeping the upstream reported.
/// `total` always comes from the response, never from local counting.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub limit: u32,
    pub offset: u32,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_kind_selects_variant() {
        let json = r#"{
            "id": "c1",
            "type": "cover_art",
            "attributes": { "fileName": "cover.jpg", "volume": "1" }
        }"#;
        let rel: Relationship = serde_json::from_str(json).unwrap();
        match rel {
            Relationship::CoverArt { id, attributes } => {
                assert_eq!(id, "c1");
                assert_eq!(attributes.unwrap().file_name.unwrap(), "cover.jpg");
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn relationship_without_payload_is_normal() {
        let json = r#"{ "id": "a1", "type": "author" }"#;
        let rel: Relationship = serde_json::from_str(json).unwrap();
        match rel {
            Relationship::Author { id, attributes } => {
                assert_eq!(id, "a1");
                assert!(attributes.is_none());
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn unknown_relationship_kind_is_kept() {
        let json = r#"{ "id": "x1", "type": "creator" }"#;
        let rel: Relationship = serde_json::from_str(json).unwrap();
        match rel {
            Relationship::Other { id, kind } => {
                assert_eq!(id, "x1");
                assert_eq!(kind, "creator");
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn malformed_payload_degrades_to_absent() {
        let json = r#"{ "id": "g1", "type": "scanlation_group", "attributes": 42 }"#;
        let rel: Relationship = serde_json::from_str(json).unwrap();
        match rel {
            Relationship::ScanlationGroup { attributes, .. } => assert!(attributes.is_none()),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn error_body_parses_into_list_envelope() {
        let json = r#"{
            "result": "error",
            "errors": [{ "status": 400, "title": "Bad Request", "detail": "Title too short" }]
        }"#;
        let resp: ListResponse<Title> = serde_json::from_str(json).unwrap();
        assert!(!resp.is_ok());
        assert!(resp.data.is_empty());
        assert_eq!(resp.error_message(), Some("Title too short"));
    }

    #[test]
    fn title_parses_with_sparse_attributes() {
        let json = r#"{
            "id": "t1",
            "attributes": {
                "title": { "en": "Example" },
                "status": "ongoing",
                "contentRating": "safe",
                "year": null,
                "tags": [
                    { "id": "tag1", "attributes": { "name": { "en": "Action" }, "group": "genre" } },
                    { "id": "tag2", "attributes": { "name": { "en": "Award" }, "group": "award_nominee" } }
                ]
            },
            "relationships": [{ "id": "c1", "type": "cover_art" }]
        }"#;
        let title: Title = serde_json::from_str(json).unwrap();
        assert_eq!(title.attributes.status, Some(TitleStatus::Ongoing));
        assert_eq!(title.attributes.year, None);
        assert_eq!(title.attributes.tags[0].attributes.group, TagGroup::Genre);
        assert_eq!(title.attributes.tags[1].attributes.group, TagGroup::Other);
        assert_eq!(title.relationships.len(), 1);
    }

    #[test]
    fn chapter_volume_stays_textual() {
        let json = r#"{
            "id": "ch1",
            "attributes": {
                "volume": null,
                "chapter": "omake",
                "title": "Extras",
                "translatedLanguage": "en",
                "pages": 8,
                "publishAt": "2024-03-01T12:00:00+00:00"
            }
        }"#;
        let ch: Chapter = serde_json::from_str(json).unwrap();
        assert_eq!(ch.attributes.chapter.as_deref(), Some("omake"));
        assert!(ch.attributes.volume.is_none());
        assert_eq!(ch.attributes.pages, 8);
        assert!(ch.attributes.publish_at.is_some());
    }

    #[test]
    fn at_home_logical_failure_detected() {
        let json = r#"{ "result": "error", "errors": [{ "detail": "Chapter not found" }] }"#;
        let resp: AtHomeResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.is_ok());
        assert_eq!(resp.error_message(), Some("Chapter not found"));
    }
}
