// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/params.rs
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::error;

use crate::error::{ReplayError, Result};

pub const INDEX_KEY: &str = "index";
pub const SOURCE_FILE_KEY: &str = "source-file";

/// Validated per-operation parameters for the `ocss-search` runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerParams {
    pub index: String,
    pub source_file: PathBuf,
}

impl RunnerParams {
    /// Validate a loosely typed params mapping.
    ///
    /// `index` is checked before `source-file`, and both are checked before
    /// anything touches the filesystem.
    pub fn from_value(params: &Value) -> Result<Self> {
        let index = match params.get(INDEX_KEY) {
            Some(Value::String(index)) if !index.trim().is_empty() => index.clone(),
            Some(Value::String(_)) => {
                return Err(ReplayError::Configuration(format!(
                    "'{}' must not be empty",
                    INDEX_KEY
                )))
            }
            Some(_) => {
                return Err(ReplayError::Configuration(format!(
                    "'{}' must be a string",
                    INDEX_KEY
                )))
            }
            None => {
                return Err(ReplayError::Configuration(format!(
                    "'{}' is required",
                    INDEX_KEY
                )))
            }
        };

        let source_file = match params.get(SOURCE_FILE_KEY) {
            Some(Value::String(path)) => PathBuf::from(path),
            _ => {
                error!("no source data file given, or wrong format");
                return Err(ReplayError::Configuration(format!(
                    "'{}' is required and must be a string",
                    SOURCE_FILE_KEY
                )));
            }
        };

        Ok(Self { index, source_file })
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    /// Back to the mapping shape the runner consumes.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            INDEX_KEY: self.index,
            SOURCE_FILE_KEY: self.source_file.to_string_lossy(),
        })
    }
}
