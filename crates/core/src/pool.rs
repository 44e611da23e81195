// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/pool.rs
use std::path::Path;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{ReplayError, Result};

#[derive(Debug, Default)]
struct PoolState {
    entries: Vec<Value>,
    loaded: bool,
}

/// Recorded searches waiting to be replayed.
///
/// Entries are served last-line-first and each one is handed out once. The
/// source file is read the first time the pool is asked to load while empty;
/// after that the pool only shrinks until [`QueryPool::reset`] is called.
#[derive(Debug, Default)]
pub struct QueryPool {
    state: Mutex<PoolState>,
}

impl QueryPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-filled pool; counts as loaded, so no file is ever read.
    pub fn from_entries(entries: Vec<Value>) -> Self {
        Self {
            state: Mutex::new(PoolState {
                entries,
                loaded: true,
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }

    /// Read `path` into the pool if it is empty and has never been filled.
    /// Returns how many entries were appended.
    pub async fn load_if_empty(&self, path: &Path) -> Result<usize> {
        let mut state = self.state.lock().await;
        Self::load_locked(&mut state, path).await
    }

    /// Remove and return the most recently read entry.
    pub async fn pop(&self) -> Result<Value> {
        self.state
            .lock()
            .await
            .entries
            .pop()
            .ok_or(ReplayError::EmptyPool)
    }

    /// Load-if-empty and pop under one lock, so concurrent callers never
    /// read the file twice or receive the same entry.
    pub async fn take_next(&self, path: &Path) -> Result<Value> {
        let mut state = self.state.lock().await;
        Self::load_locked(&mut state, path).await?;
        state.entries.pop().ok_or(ReplayError::EmptyPool)
    }

    /// Drop whatever is left and allow the next load to read the file again.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.loaded = false;
    }

    async fn load_locked(state: &mut PoolState, path: &Path) -> Result<usize> {
        if state.loaded || !state.entries.is_empty() {
            return Ok(0);
        }

        let entries = read_ndjson(path).await?;
        let count = entries.len();
        state.entries.extend(entries);
        state.loaded = true;
        info!("Loaded {} recorded searches from {}", count, path.display());
        Ok(count)
    }
}

/// Parse a newline-delimited JSON file. Blank lines are skipped; the first
/// malformed line fails the whole read.
pub async fn read_ndjson(path: &Path) -> Result<Vec<Value>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            debug!("Skipping blank line {} in {}", idx + 1, path.display());
            continue;
        }
        let value = serde_json::from_str(line).map_err(|source| ReplayError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        entries.push(value);
    }
    Ok(entries)
}
