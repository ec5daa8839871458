use serde::Deserialize;

use harvest_core::models::{ExportFormat, HarvestRequest, TABLE_TAG, normalize_tag};
use harvest_core::AppError;

/// Fields submitted by the form on `/`.
///
/// Missing fields deserialize as empty strings so that they fail through the
/// normal pipeline (an empty URL is unreachable, an empty tag matches nothing).
#[derive(Debug, Default, Deserialize)]
pub struct HarvestForm {
    /// Page to fetch.
    #[serde(default)]
    pub url: String,
    /// HTML tag name to extract, e.g. `table` or `p`.
    #[serde(default)]
    pub tag: String,
    /// `csv`, `excel` or `pdf`; only consulted when `tag` is `table`.
    #[serde(default)]
    pub output_format: Option<String>,
}

impl HarvestForm {
    /// Validate the submission into a pipeline request.
    ///
    /// The output format is parsed only for table requests; anything other
    /// than csv/excel/pdf is rejected before the page is fetched.
    pub fn into_request(self) -> Result<HarvestRequest, AppError> {
        let format = if normalize_tag(&self.tag) == TABLE_TAG {
            let raw = self.output_format.unwrap_or_default();
            Some(raw.parse::<ExportFormat>()?)
        } else {
            None
        };

        Ok(HarvestRequest {
            url: self.url,
            tag: self.tag,
            format,
        })
    }
}
