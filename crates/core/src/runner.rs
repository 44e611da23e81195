// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/runner.rs
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::client::SearchClient;
use crate::config::RunnerParams;
use crate::error::{ReplayError, Result};
use crate::pool::QueryPool;

pub const OCSS_SEARCH_RUNNER: &str = "ocss-search";

/// Unit reported alongside every `took` value.
pub const TOOK_UNIT: &str = "ms";

/// What one runner invocation reports back to the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Measurement {
    pub value: u64,
    pub unit: &'static str,
}

impl Measurement {
    pub fn millis(value: u64) -> Self {
        Self { value, unit: TOOK_UNIT }
    }
}

/// A unit of benchmark work, invoked once per simulated operation.
#[async_trait]
pub trait Runner: Send + Sync {
    fn name(&self) -> &str;

    /// Called by the driver before each operation starts.
    async fn begin_operation(&self) {}

    async fn execute(&self, client: &dyn SearchClient, params: &Value) -> Result<Measurement>;
}

/// Replays recorded OCSS searches, one per invocation, newest line first.
pub struct OcssSearchRunner {
    pool: Arc<QueryPool>,
    index: Mutex<Option<String>>,
}

impl OcssSearchRunner {
    pub fn new(pool: Arc<QueryPool>) -> Self {
        Self {
            pool,
            index: Mutex::new(None),
        }
    }

    pub fn pool(&self) -> &Arc<QueryPool> {
        &self.pool
    }

    /// Index chosen by the most recent successful `initialize`.
    pub async fn index(&self) -> Option<String> {
        self.index.lock().await.clone()
    }

    /// Validate params, remember the index and fill the pool if it was never filled.
    pub async fn initialize(&self, params: &Value) -> Result<RunnerParams> {
        let params = self.configure(params).await?;
        self.pool.load_if_empty(params.source_file()).await?;
        Ok(params)
    }

    async fn configure(&self, params: &Value) -> Result<RunnerParams> {
        let params = RunnerParams::from_value(params)?;
        *self.index.lock().await = Some(params.index.clone());
        Ok(params)
    }
}

impl Default for OcssSearchRunner {
    fn default() -> Self {
        Self::new(Arc::new(QueryPool::new()))
    }
}

#[async_trait]
impl Runner for OcssSearchRunner {
    fn name(&self) -> &str {
        OCSS_SEARCH_RUNNER
    }

    /// Each operation replays its own source file from the top.
    async fn begin_operation(&self) {
        self.pool.reset().await;
    }

    async fn execute(&self, client: &dyn SearchClient, params: &Value) -> Result<Measurement> {
        let params = self.configure(params).await?;

        // The entry is consumed whether or not the search succeeds.
        let mut search = self.pool.take_next(params.source_file()).await?;
        let body = search
            .get_mut("query")
            .map(Value::take)
            .ok_or(ReplayError::MissingField("query"))?;

        let response = client.search(&body, &params.index).await?;
        debug!("{} on {} took {}ms", OCSS_SEARCH_RUNNER, params.index, response.took);
        Ok(Measurement::millis(response.took))
    }
}

impl fmt::Display for OcssSearchRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(OCSS_SEARCH_RUNNER)
    }
}

impl fmt::Debug for OcssSearchRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(OCSS_SEARCH_RUNNER)
    }
}
