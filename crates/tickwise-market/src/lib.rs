pub mod error;
pub mod fetcher;
pub mod indicators;
pub mod risk;
pub mod signals;
pub mod sources;

pub mod test_support;

pub use error::MarketError;
pub use fetcher::{RetryPolicy, RetryingFetcher};
pub use risk::NEUTRAL_BETA;
pub use sources::yahoo::YahooProvider;
pub use sources::MarketDataProvider;
