use std::future::Future;

use crate::error::AppError;
use crate::models::SelectedElement;

/// Fetches raw HTML content from a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Finds every element with a given tag name in a document.
pub trait ElementSelector: Send + Sync + Clone {
    /// Returns matches in document order. An empty vector means no matches;
    /// errors are reserved for markup the selector cannot process at all.
    fn select(&self, markup: &str, tag: &str) -> Result<Vec<SelectedElement>, AppError>;
}
