use std::sync::Arc;

use tracing::debug;

use crate::{
    errors::Error,
    ports::{BookCatalog, CatalogQuery, CatalogVolume, PrintType},
    Result,
};

/// Upper bound on books returned for one query.
pub const MAX_RESULTS: usize = 5;

pub const UNTITLED: &str = "Без названия";
pub const UNKNOWN_AUTHOR: &str = "Неизвестен";

/// A catalog hit with placeholders already substituted for missing fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    pub authors: Vec<String>,
}

impl From<CatalogVolume> for Book {
    fn from(v: CatalogVolume) -> Self {
        let title = v
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());
        let authors = v
            .authors
            .map(|a| {
                a.into_iter()
                    .filter(|s| !s.trim().is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| vec![UNKNOWN_AUTHOR.to_string()]);
        Self { title, authors }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Between one and [`MAX_RESULTS`] books.
    Found(Vec<Book>),
    NoResults,
}

/// Thin wrapper around a [`BookCatalog`] that enforces the bot's search policy.
#[derive(Clone)]
pub struct BookSearchClient {
    catalog: Arc<dyn BookCatalog>,
}

impl BookSearchClient {
    pub fn new(catalog: Arc<dyn BookCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("search query is empty".to_string()));
        }

        let request = CatalogQuery {
            query: query.to_string(),
            max_results: MAX_RESULTS,
            print_type: PrintType::Books,
        };
        let volumes = self.catalog.list_volumes(&request).await?;
        debug!(query, count = volumes.len(), "catalog answered");

        let books: Vec<Book> = volumes
            .into_iter()
            .take(MAX_RESULTS)
            .map(Book::from)
            .collect();

        if books.is_empty() {
            return Ok(SearchOutcome::NoResults);
        }
        Ok(SearchOutcome::Found(books))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{volume, StubCatalog};

    #[tokio::test]
    async fn requests_five_books_and_maps_results() {
        let catalog = Arc::new(StubCatalog::answering(vec![volume(
            Some("Dune"),
            Some(&["Frank Herbert"]),
        )]));
        let client = BookSearchClient::new(catalog.clone());

        let out = client.search("  Dune ").await.unwrap();
        assert_eq!(
            out,
            SearchOutcome::Found(vec![Book {
                title: "Dune".to_string(),
                authors: vec!["Frank Herbert".to_string()],
            }])
        );

        let queries = catalog.queries.lock().unwrap();
        assert_eq!(
            queries.as_slice(),
            &[CatalogQuery {
                query: "Dune".to_string(),
                max_results: 5,
                print_type: PrintType::Books,
            }]
        );
    }

    #[tokio::test]
    async fn empty_catalog_answer_is_no_results() {
        let client = BookSearchClient::new(Arc::new(StubCatalog::answering(Vec::new())));
        let out = client.search("xyzzynonexistentbook123").await.unwrap();
        assert_eq!(out, SearchOutcome::NoResults);
    }

    #[tokio::test]
    async fn caps_results_even_if_catalog_overdelivers() {
        let many = (0..8)
            .map(|i| volume(Some(format!("Book {i}").as_str()), Some(&["A"])))
            .collect();
        let client = BookSearchClient::new(Arc::new(StubCatalog::answering(many)));

        let SearchOutcome::Found(books) = client.search("book").await.unwrap() else {
            panic!("expected books");
        };
        assert_eq!(books.len(), MAX_RESULTS);
        assert_eq!(books[4].title, "Book 4");
    }

    #[tokio::test]
    async fn blank_query_never_reaches_the_catalog() {
        let catalog = Arc::new(StubCatalog::answering(Vec::new()));
        let client = BookSearchClient::new(catalog.clone());

        let err = client.search("   ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(catalog.query_count(), 0);
    }

    #[tokio::test]
    async fn catalog_errors_propagate() {
        let client = BookSearchClient::new(Arc::new(StubCatalog::failing("503")));
        let err = client.search("Dune").await.unwrap_err();
        assert!(matches!(err, Error::External(ref m) if m.contains("503")));
    }

    #[test]
    fn missing_fields_get_placeholders() {
        let book = Book::from(volume(None, None));
        assert_eq!(book.title, UNTITLED);
        assert_eq!(book.authors, vec![UNKNOWN_AUTHOR.to_string()]);

        let book = Book::from(volume(Some("  "), Some(&[])));
        assert_eq!(book.title, UNTITLED);
        assert_eq!(book.authors, vec![UNKNOWN_AUTHOR.to_string()]);

        let book = Book::from(volume(Some("Solaris"), Some(&["", "Stanisław Lem"])));
        assert_eq!(book.title, "Solaris");
        assert_eq!(book.authors, vec!["Stanisław Lem".to_string()]);
    }
}
