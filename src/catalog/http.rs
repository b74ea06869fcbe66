//! HTTP adapter for the metadata-lookup collaborator.
//!
//! Speaks a volumes-style REST API (`GET {base}/volumes?q=…&maxResults=n`).
//! No engine awareness — just requests and DTO mapping into validated books.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{Book, CatalogError, MetadataLookup};

/// HTTP client for the book-metadata lookup service.
#[derive(Debug)]
pub struct HttpCatalog {
    http: Client,
    base_url: String,
}

impl HttpCatalog {
    /// Create a client against a service base URL (no trailing slash).
    /// Point this at a mock server in tests.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Book>, CatalogError> {
        let url = format!("{}/volumes", self.base_url);
        let max = max_results.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[("q", query), ("maxResults", max.as_str())])
            .send()
            .await?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(CatalogError::Service { status, message });
        }

        let page: VolumePage = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(format!("failed to parse volume page: {e}")))?;

        debug!(query = %query, count = page.items.len(), "volume lookup");
        Ok(page.items.into_iter().map(Book::from).collect())
    }
}

#[async_trait]
impl MetadataLookup for HttpCatalog {
    async fn search_by_category(
        &self,
        category: &str,
        max_results: usize,
    ) -> Result<Vec<Book>, CatalogError> {
        self.search(&format!("subject:\"{category}\""), max_results).await
    }

    async fn search_by_keywords(
        &self,
        text: &str,
        max_results: usize,
    ) -> Result<Vec<Book>, CatalogError> {
        self.search(text, max_results).await
    }
}

/// One page of volume results.
#[derive(Debug, Deserialize)]
struct VolumePage {
    #[serde(default)]
    items: Vec<VolumeItem>,
}

#[derive(Debug, Deserialize)]
struct VolumeItem {
    #[serde(default)]
    id: String,
    #[serde(default, rename = "volumeInfo")]
    info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    average_rating: Option<f32>,
}

impl From<VolumeItem> for Book {
    fn from(item: VolumeItem) -> Self {
        Book {
            id: item.id,
            title: item.info.title,
            authors: item.info.authors,
            categories: item.info.categories,
            description: item.info.description,
            rating: item.info.average_rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let catalog = HttpCatalog::new("http://localhost:9090");
        assert_eq!(catalog.base_url, "http://localhost:9090");
    }

    #[test]
    fn volume_page_maps_to_books() {
        let json = r#"{
            "items": [
                {
                    "id": "v1",
                    "volumeInfo": {
                        "title": "Historia Romana",
                        "authors": ["Apiano"],
                        "categories": ["Historia"],
                        "description": "Las guerras del imperio",
                        "averageRating": 4.5
                    }
                },
                {
                    "id": "v2",
                    "volumeInfo": { "title": "Sin metadatos" }
                }
            ]
        }"#;
        let page: VolumePage = serde_json::from_str(json).unwrap();
        let books: Vec<Book> = page.items.into_iter().map(Book::from).collect();

        assert_eq!(books.len(), 2);
        assert_eq!(books[0].id, "v1");
        assert_eq!(books[0].authors, vec!["Apiano"]);
        assert_eq!(books[0].rating, Some(4.5));
        assert_eq!(books[1].title, "Sin metadatos");
        assert!(books[1].categories.is_empty());
        assert_eq!(books[1].rating, None);
    }

    #[test]
    fn empty_page_yields_no_books() {
        let page: VolumePage = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn record_without_id_is_invalid_downstream() {
        let json = r#"{"items": [{"volumeInfo": {"title": "Anónimo"}}]}"#;
        let page: VolumePage = serde_json::from_str(json).unwrap();
        let book = Book::from(page.items.into_iter().next().unwrap());
        assert!(!book.is_valid());
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error_not_a_panic() {
        let catalog = HttpCatalog::new("http://127.0.0.1:1");
        let result = catalog.search_by_category("Historia", 5).await;
        assert!(result.is_err());
    }
}
