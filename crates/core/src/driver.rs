// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/driver.rs
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::client::SearchClient;
use crate::config::{Operation, TrackConfig};
use crate::error::{ReplayError, Result};
use crate::metrics::Metrics;
use crate::registry::RunnerRegistry;

/// Drives registered runners one invocation at a time and collects measurements.
pub struct Benchmark {
    registry: RunnerRegistry,
    client: Arc<dyn SearchClient>,
}

impl Benchmark {
    pub fn new(registry: RunnerRegistry, client: Arc<dyn SearchClient>) -> Self {
        Self { registry, client }
    }

    /// Run every operation of the track in order; the first failure aborts the track.
    pub async fn run_track(&self, track: &TrackConfig) -> Result<Vec<Metrics>> {
        let mut results = Vec::with_capacity(track.operations.len());
        for op in &track.operations {
            results.push(self.run_operation(op).await?);
        }
        Ok(results)
    }

    /// Warmup, then measured invocations. With no `iterations` the operation
    /// runs until the runner reports an empty pool.
    pub async fn run_operation(&self, op: &Operation) -> Result<Metrics> {
        let runner = self.registry.get(&op.runner)?;
        runner.begin_operation().await;
        let mut metrics = Metrics::new(&op.name);
        let warmup = op.warmup_iterations.unwrap_or(0);

        info!(
            "Starting operation '{}' with runner '{}' ({} warmup, {} measured)",
            op.name,
            runner.name(),
            warmup,
            op.iterations.map_or("unbounded".to_string(), |n| n.to_string())
        );

        for _ in 0..warmup {
            match runner.execute(self.client.as_ref(), &op.params).await {
                Ok(_) => metrics.record_warmup(),
                Err(ReplayError::EmptyPool) => {
                    warn!("Operation '{}': pool exhausted during warmup", op.name);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        let start = Instant::now();
        let mut done: u64 = 0;
        loop {
            if op.iterations.is_some_and(|n| done >= n) {
                break;
            }

            let t0 = Instant::now();
            match runner.execute(self.client.as_ref(), &op.params).await {
                Ok(measurement) => {
                    metrics.record_search(measurement.value, t0.elapsed());
                    done += 1;
                }
                Err(ReplayError::EmptyPool) if op.iterations.is_none() => {
                    info!("Operation '{}': pool exhausted after {} searches", op.name, done);
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        metrics.record_total_time(start.elapsed());
        info!("✅ Operation '{}' completed in {:?}", op.name, start.elapsed());
        Ok(metrics)
    }
}
