use crate::error::AppError;
use crate::export::export;
use crate::models::{
    DatasetCollection, HarvestOutcome, HarvestRequest, SelectedElement, TABLE_TAG, normalize_tag,
};
use crate::normalize::normalize_table;
use crate::traits::{ElementSelector, Fetcher};

/// Separator placed between the texts of consecutive non-table matches.
pub const TEXT_SEPARATOR: &str = "\n\n";

/// Orchestrates one harvest: fetch -> select -> normalize + export, or join text.
///
/// Generic over the fetcher and selector so it can be driven by mocks in
/// tests. Holds no per-request state; every call builds and drops its own
/// buffers.
#[derive(Clone)]
pub struct HarvestService<F, S>
where
    F: Fetcher,
    S: ElementSelector,
{
    fetcher: F,
    selector: S,
}

impl<F, S> HarvestService<F, S>
where
    F: Fetcher,
    S: ElementSelector,
{
    pub fn new(fetcher: F, selector: S) -> Self {
        Self { fetcher, selector }
    }

    /// Run the pipeline for one request.
    ///
    /// 1. Fetch the page (a table request without a format fails before this)
    /// 2. Select every element with the requested tag
    /// 3. For `table`: normalize each match and export the collection
    /// 4. Otherwise: join the stripped text of every match
    pub async fn harvest(&self, request: &HarvestRequest) -> Result<HarvestOutcome, AppError> {
        let tag = normalize_tag(&request.tag);
        let format = if tag == TABLE_TAG {
            Some(
                request
                    .format
                    .ok_or_else(|| AppError::UnsupportedFormat(String::new()))?,
            )
        } else {
            None
        };

        // 1. Fetch
        tracing::info!("Fetching {}", request.url);
        let html = self.fetcher.fetch(&request.url).await?;
        tracing::info!("Fetched {} bytes of HTML", html.len());

        // 2. Select
        let elements = self.selector.select(&html, &tag)?;
        if elements.is_empty() {
            tracing::info!(%tag, "No matching elements");
            return Err(AppError::NoMatches(tag));
        }
        tracing::info!(%tag, matches = elements.len(), "Selected elements");

        // 3 & 4. Export or join
        match format {
            Some(format) => {
                let tables = collect_datasets(&elements)?;
                Ok(HarvestOutcome::Export(export(format, &tables)?))
            }
            None => Ok(HarvestOutcome::Text(join_text(&elements))),
        }
    }
}

/// Normalize every matched table, skipping the ones with no tabular data.
///
/// Fails with [`AppError::NoTabularData`] only when no table survives.
pub fn collect_datasets(elements: &[SelectedElement]) -> Result<DatasetCollection, AppError> {
    let mut datasets = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        match normalize_table(&element.html) {
            Ok(dataset) => datasets.push(dataset),
            Err(AppError::NoTabularData(reason)) => {
                tracing::warn!(position = index + 1, %reason, "Skipping table");
            }
            Err(e) => return Err(e),
        }
    }
    tracing::info!(
        "Normalized {} of {} tables",
        datasets.len(),
        elements.len()
    );
    DatasetCollection::new(datasets)
}

/// Join the stripped text of every element with a blank line between them.
pub fn join_text(elements: &[SelectedElement]) -> String {
    elements
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(TEXT_SEPARATOR)
}
