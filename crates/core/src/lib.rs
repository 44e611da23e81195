//! Core library for ocss-replay ─ replays recorded OCSS searches against Elasticsearch.

pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod registry;
pub mod runner;

use std::sync::Arc;

pub use client::{HttpSearchClient, SearchClient, SearchError, SearchResponse};
pub use config::{ClusterConfig, Operation, RunnerParams, TrackConfig};
pub use driver::Benchmark;
pub use error::{ReplayError, Result};
pub use metrics::{Metrics, MetricsSummary};
pub use pool::QueryPool;
pub use registry::RunnerRegistry;
pub use runner::{Measurement, OcssSearchRunner, Runner, OCSS_SEARCH_RUNNER};

/// Register the `ocss-search` runner, backed by a fresh shared pool.
pub fn register(registry: &mut RunnerRegistry) -> Result<()> {
    registry.register_runner(
        OCSS_SEARCH_RUNNER,
        Arc::new(OcssSearchRunner::new(Arc::new(QueryPool::new()))),
        true,
    )
}
