//! Batch refresh of the stored interest series.
//!
//! [`run_refresh`] walks every stored trend, asks an [`InterestProvider`] for
//! a fresh series, applies the [`AcceptancePolicy`](trendwatch_core::AcceptancePolicy)
//! and writes the result back through a [`TrendStore`].

pub mod acceptance;
pub mod error;
pub mod job;
pub mod ports;

pub use acceptance::{evaluate, RejectReason};
pub use error::RefreshError;
pub use job::{run_refresh, RecordOutcome, RefreshConfig, RefreshSummary, SkipReason};
pub use ports::{provider_from_config, InterestProvider, PgTrendStore, TrendStore};
