pub mod exchangerate_api;
pub mod fetcher;
pub mod util;

pub use exchangerate_api::ExchangeRateApi;
pub use fetcher::RetryingFetcher;
