use harvest_client::{ReqwestFetcher, ScraperSelector};
use harvest_core::HarvestService;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
///
/// Holds only the stateless pipeline; nothing is cached between requests.
pub struct AppState {
    pub service: HarvestService<ReqwestFetcher, ScraperSelector>,
}
