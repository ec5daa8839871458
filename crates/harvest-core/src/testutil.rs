//! Test utilities: mock implementations of the collaborator traits.
//!
//! Handwritten mocks for dependency injection in the unit tests.
//! Mocks share state through `Arc<Mutex<_>>` so tests can inspect recorded
//! calls after handing a clone to the service.

use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::SelectedElement;
use crate::traits::{ElementSelector, Fetcher};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns a configurable response and records requested URLs.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns a default HTML string.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    pub requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(html.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.requested.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockSelector
// ---------------------------------------------------------------------------

/// Mock selector that ignores the markup and returns canned elements.
#[derive(Clone)]
pub struct MockSelector {
    elements: Arc<Mutex<Result<Vec<SelectedElement>, Option<AppError>>>>,
    pub tags: Arc<Mutex<Vec<String>>>,
}

impl MockSelector {
    pub fn new(elements: Vec<SelectedElement>) -> Self {
        Self {
            elements: Arc::new(Mutex::new(Ok(elements))),
            tags: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A selector that never matches anything.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A selector whose first call fails with `error`.
    pub fn with_error(error: AppError) -> Self {
        Self {
            elements: Arc::new(Mutex::new(Err(Some(error)))),
            tags: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ElementSelector for MockSelector {
    fn select(&self, _markup: &str, tag: &str) -> Result<Vec<SelectedElement>, AppError> {
        self.tags.lock().unwrap().push(tag.to_string());
        let mut elements = self.elements.lock().unwrap();
        match &mut *elements {
            Ok(found) => Ok(found.clone()),
            Err(error) => match error.take() {
                Some(e) => Err(e),
                None => Ok(Vec::new()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Element builders
// ---------------------------------------------------------------------------

/// A selected `<table>` element from its outer HTML.
pub fn table_element(html: &str) -> SelectedElement {
    SelectedElement {
        html: html.to_string(),
        text: String::new(),
    }
}

/// A selected non-table element carrying only stripped text.
pub fn text_element(text: &str) -> SelectedElement {
    SelectedElement {
        html: String::new(),
        text: text.to_string(),
    }
}

/// HTML for a table with a header row and data rows.
pub fn table_html(headers: &[&str], rows: &[&[&str]]) -> String {
    let row = |cells: &[&str], tag: &str| {
        let cells: String = cells
            .iter()
            .map(|c| format!("<{tag}>{c}</{tag}>"))
            .collect();
        format!("<tr>{cells}</tr>")
    };
    let body: String = rows.iter().map(|r| row(*r, "td")).collect();
    format!("<table>{}{body}</table>", row(headers, "th"))
}
