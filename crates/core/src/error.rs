// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/error.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::client::SearchError;

pub type Result<T, E = ReplayError> = std::result::Result<T, E>;

/// Everything a runner invocation can fail with. Nothing here is retried.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// `index` or `source-file` missing from the operation params, or not a string.
    #[error("invalid runner configuration: {0}")]
    Configuration(String),

    /// A popped pool entry lacks a required field.
    #[error("recorded search is missing the '{0}' field")]
    MissingField(&'static str),

    #[error("query pool is exhausted")]
    EmptyPool,

    #[error("failed to read source file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {} at line {line}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Search backend failure, passed through as-is.
    #[error(transparent)]
    Backend(#[from] SearchError),

    #[error("no runner registered under '{0}'")]
    UnknownRunner(String),

    #[error("a runner named '{0}' is already registered")]
    DuplicateRunner(String),
}

impl ReplayError {
    pub fn is_empty_pool(&self) -> bool {
        matches!(self, ReplayError::EmptyPool)
    }
}
