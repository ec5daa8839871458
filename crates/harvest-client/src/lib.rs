pub mod fetcher;
pub mod selector;

pub use fetcher::ReqwestFetcher;
pub use selector::ScraperSelector;
