pub mod error;
pub mod export;
pub mod models;
pub mod normalize;
pub mod service;
pub mod traits;

#[cfg(test)]
pub mod testutil;

pub use error::AppError;
pub use models::{
    Dataset, DatasetCollection, ExportArtifact, ExportFormat, HarvestOutcome, HarvestRequest,
    SelectedElement,
};
pub use service::HarvestService;
pub use traits::{ElementSelector, Fetcher};
