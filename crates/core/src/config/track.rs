// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/track.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::params::SOURCE_FILE_KEY;
use crate::runner::OCSS_SEARCH_RUNNER;

pub const DEFAULT_CLUSTER_URL: &str = "http://localhost:9200";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// A benchmark run: which cluster to hit and which operations to replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    #[serde(default)]
    pub cluster: ClusterConfig,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_cluster_url", alias = "host")]
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            url: default_cluster_url(),
            username: None,
            password: None,
            request_timeout_secs: None,
        }
    }
}

fn default_cluster_url() -> String {
    DEFAULT_CLUSTER_URL.to_string()
}

fn default_runner() -> String {
    OCSS_SEARCH_RUNNER.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default = "default_runner", alias = "operation-type")]
    pub runner: String,
    /// Measured invocations; `None` runs until the runner reports an empty pool.
    pub iterations: Option<u64>,
    #[serde(alias = "warmup-iterations")]
    pub warmup_iterations: Option<u64>,
    /// Passed through to the runner untouched.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl ClusterConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Fill missing credentials from `ES_USERNAME` / `ES_PASSWORD`.
    pub fn resolve_credentials(&mut self) {
        if self.username.is_none() {
            self.username = std::env::var("ES_USERNAME").ok();
        }
        if self.password.is_none() {
            self.password = std::env::var("ES_PASSWORD").ok();
        }
        if self.username.is_some() != self.password.is_some() {
            warn!("Only one of username/password is set; requests will be sent without auth");
        }
    }
}

impl TrackConfig {
    /// Parse a track from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        let track: Self = serde_json::from_str(json_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse track JSON: {}", e))?;
        track.validate()?;
        Ok(track)
    }

    /// Parse a track from YAML by converting to JSON first
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse YAML: {}", e))?;

        let json_str = serde_json::to_string(&yaml_value)
            .map_err(|e| anyhow::anyhow!("Failed to convert YAML to JSON: {}", e))?;

        Self::from_json(&json_str)
    }

    /// Load a track file; relative `source-file` params resolve against its directory.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read track file: {}", e))?;
        let mut track = Self::from_yaml(&text)?;
        if let Some(base) = path.as_ref().parent() {
            track.resolve_source_files(base);
        }
        Ok(track)
    }

    pub fn resolve_source_files(&mut self, base: &Path) {
        for op in &mut self.operations {
            let Some(Value::String(file)) = op.params.get_mut(SOURCE_FILE_KEY) else {
                continue;
            };
            if Path::new(file.as_str()).is_relative() {
                let resolved = base.join(file.as_str());
                debug!("Operation '{}': source-file {} -> {}", op.name, file, resolved.display());
                *file = resolved.to_string_lossy().into_owned();
            }
        }
    }

    /// Single-operation track, as built from CLI flags.
    pub fn single(cluster: ClusterConfig, operation: Operation) -> Self {
        Self {
            cluster,
            operations: vec![operation],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cluster.url.trim().is_empty() {
            bail!("cluster.url must not be empty");
        }
        if self.operations.is_empty() {
            bail!("track defines no operations");
        }
        for op in &self.operations {
            if op.name.trim().is_empty() {
                bail!("every operation needs a name");
            }
            if op.iterations == Some(0) {
                bail!("operation '{}': iterations must be at least 1", op.name);
            }
        }
        Ok(())
    }
}
