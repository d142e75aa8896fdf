//! Core rate lookup: the value type, cache, fetch abstractions and provider

pub mod cache;
pub mod config;
pub mod fetch;
pub mod format;
pub mod log;
pub mod provider;
pub mod rate;
pub mod refresh;

// Re-export main types for cleaner imports
pub use cache::{KeyValueStore, RateCache};
pub use fetch::{FetchError, QuoteSource, RateFetch, RetryPolicy};
pub use provider::RateProvider;
pub use rate::ExchangeRate;
