//! Metadata resolution for catalog codes.
//!
//! A [`MetadataProvider`] turns a catalog code into a bilingual
//! [`MetaCandidate`]. The enricher depends only on the trait, so backends
//! are interchangeable and tests can inject doubles.

mod code;
mod metatube;

pub use code::{display_code, query_variants, strip_code};
pub use metatube::MetaTubeProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by metadata backends.
///
/// The enricher treats every variant as "no candidate"; these exist so
/// failures can be logged with a cause.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing base URL, etc.).
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// The best-scoring metadata candidate for a catalog code.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetaCandidate {
    /// Stripped canonical code (`[A-Z0-9]` only).
    pub code: String,
    /// Display form of the code (`STARS-123`).
    pub code_display: String,
    /// Primary (English/Japanese) title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Chinese title, when the backend has one.
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
    /// Backend-native date string, not reparsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

/// Trait for metadata lookup backends.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Backend name, for logs and provenance.
    fn name(&self) -> &str;

    /// Resolve a catalog code to its best candidate, or `None` when the
    /// backend has nothing for any query variant.
    async fn lookup(&self, code: &str) -> Result<Option<MetaCandidate>, MetadataError>;
}
