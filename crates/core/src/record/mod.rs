//! Release record data model.
//!
//! A [`DraftRecord`] is what the extractor pulls out of a single forum post.
//! An [`EnrichedRecord`] is the same logical release after bilingual metadata
//! resolution, ready to hand to a [`crate::store::RecordStore`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A structured release draft extracted from one forum post.
///
/// Ephemeral: created per fetch, consumed once by the enricher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    /// Normalized catalog code (e.g. "STARS-123"), if one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Post title as found on the page.
    pub title: String,
    /// Bounded excerpt of the post body, kept for diagnostics.
    pub raw_text: String,
    /// Normalized size label ("3.5GB" / "700MB").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_label: Option<String>,
    /// Whether the post advertises an uncensored release.
    pub is_uncensored: bool,
    /// Absolute image URLs, deduplicated, in document order.
    pub images: Vec<String>,
    /// Magnet URIs, exact-string deduplicated, first-seen order.
    pub magnets: Vec<String>,
    /// URL of the source post.
    pub source_url: String,
}

/// Provenance of the localized fields on an [`EnrichedRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    /// No external metadata involved (e.g. title was already Chinese).
    #[default]
    None,
    /// Fields adopted from a MetaTube candidate.
    Metatube,
    /// Localized fields produced by machine translation.
    Translated,
}

impl std::fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MetadataSource::None => "none",
            MetadataSource::Metatube => "metatube",
            MetadataSource::Translated => "translated",
        };
        write!(f, "{}", s)
    }
}

/// A draft record plus bilingual metadata, ready for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub title: String,
    pub raw_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_label: Option<String>,
    pub is_uncensored: bool,
    pub images: Vec<String>,
    pub magnets: Vec<String>,
    pub source_url: String,

    /// Chinese title, from the provider or machine translation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_cn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio_cn: Option<String>,
    #[serde(default)]
    pub actresses: Vec<String>,
    #[serde(default)]
    pub actresses_cn: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tags_cn: Vec<String>,
    /// Release date in the provider's native format, not reparsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// Where the localized fields came from. Set once per enrichment pass.
    pub source: MetadataSource,
}

impl EnrichedRecord {
    /// Lifts a draft into an enriched record with all metadata fields empty.
    pub fn from_draft(draft: DraftRecord) -> Self {
        Self {
            code: draft.code,
            title: draft.title,
            raw_text: draft.raw_text,
            size_label: draft.size_label,
            is_uncensored: draft.is_uncensored,
            images: draft.images,
            magnets: draft.magnets,
            source_url: draft.source_url,
            title_cn: None,
            studio: None,
            studio_cn: None,
            actresses: Vec::new(),
            actresses_cn: Vec::new(),
            tags: Vec::new(),
            tags_cn: Vec::new(),
            release_date: None,
            cover_url: None,
            source: MetadataSource::None,
        }
    }

    /// Checks the persistence preconditions: a record without a catalog code
    /// or without at least one magnet link is never stored.
    pub fn validate_for_storage(&self) -> Result<(), InvalidRecord> {
        match &self.code {
            None => return Err(InvalidRecord::MissingCode),
            Some(c) if c.is_empty() => return Err(InvalidRecord::MissingCode),
            Some(_) => {}
        }
        if self.magnets.is_empty() {
            return Err(InvalidRecord::NoMagnets);
        }
        Ok(())
    }
}

/// Why a record was rejected before reaching the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRecord {
    #[error("record has no catalog code")]
    MissingCode,

    #[error("record has no magnet links")]
    NoMagnets,
}
