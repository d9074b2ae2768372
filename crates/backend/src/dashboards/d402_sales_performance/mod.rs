pub mod aggregate;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod generator;
pub mod metrics;
pub mod service;

pub use aggregate::aggregate;
pub use error::DashboardError;
pub use filter::{filter, FilterOutcome};
pub use generator::{generate, RecordSet};
pub use metrics::derive_metrics;
