//! Client for the public search-interest ("Google Trends") web endpoints.

pub mod client;
pub mod error;
pub mod normalize;
pub(crate) mod retry;
pub mod series;
pub mod types;

pub use client::TrendsClient;
pub use error::TrendsError;
pub use normalize::normalize_timeline;
pub use series::{TimeSeriesResponse, TimeSeriesRow, TimeWindow};
