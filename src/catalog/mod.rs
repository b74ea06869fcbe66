//! Book catalog boundary — the validated [`Book`] value type and the traits
//! the engine consumes from the surrounding platform.
//!
//! The metadata-lookup service and the reading-history provider are external
//! collaborators. The engine sees only these narrow contracts; malformed
//! records are rejected here at the boundary, never deep inside scoring.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors from catalog collaborators.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lookup service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// A book record from the platform catalog. Consumed read-only.
///
/// The identifier is unique within one recommendation request's candidate
/// set; all other fields may be sparse depending on the upstream record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl Book {
    /// Whether this record is usable: a non-empty identifier is required.
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// The text fields entering the vector space, concatenated: title,
    /// description, then category labels.
    pub fn searchable_text(&self) -> String {
        let mut text =
            String::with_capacity(self.title.len() + self.description.len() + 32);
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.description);
        for category in &self.categories {
            text.push(' ');
            text.push_str(category);
        }
        text
    }
}

/// One entry of a user's reading history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub book_id: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

/// Full-text book-metadata lookup service.
///
/// Transient unavailability surfaces as an `Err` the candidate gatherer
/// treats as zero results from that call, never as a fatal error.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Books matching a category/genre label.
    async fn search_by_category(
        &self,
        category: &str,
        max_results: usize,
    ) -> Result<Vec<Book>, CatalogError>;

    /// Books matching free-text keywords.
    async fn search_by_keywords(
        &self,
        text: &str,
        max_results: usize,
    ) -> Result<Vec<Book>, CatalogError>;
}

/// Reading-history provider.
#[async_trait]
pub trait ReadingHistory: Send + Sync {
    /// A user's recent history, most recent first.
    async fn recent_history(
        &self,
        user_id: &str,
        max_items: usize,
    ) -> Result<Vec<HistoryEntry>, CatalogError>;
}
