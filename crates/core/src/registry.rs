// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/registry.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::error::{ReplayError, Result};
use crate::runner::Runner;

#[derive(Clone)]
pub struct RegisteredRunner {
    pub runner: Arc<dyn Runner>,
    pub async_runner: bool,
}

/// Runners available to the benchmark driver, by name.
#[derive(Clone, Default)]
pub struct RunnerRegistry {
    runners: BTreeMap<String, RegisteredRunner>,
}

impl std::fmt::Debug for RunnerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerRegistry")
            .field("runners", &self.names())
            .finish()
    }
}

impl RunnerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_runner(
        &mut self,
        name: &str,
        runner: Arc<dyn Runner>,
        async_runner: bool,
    ) -> Result<()> {
        if self.runners.contains_key(name) {
            return Err(ReplayError::DuplicateRunner(name.to_string()));
        }
        info!("Registered runner '{}' (async: {})", name, async_runner);
        self.runners.insert(
            name.to_string(),
            RegisteredRunner {
                runner,
                async_runner,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Runner>> {
        self.runners
            .get(name)
            .map(|r| Arc::clone(&r.runner))
            .ok_or_else(|| ReplayError::UnknownRunner(name.to_string()))
    }

    pub fn is_async(&self, name: &str) -> Option<bool> {
        self.runners.get(name).map(|r| r.async_runner)
    }

    pub fn names(&self) -> Vec<&str> {
        self.runners.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{OcssSearchRunner, OCSS_SEARCH_RUNNER};

    #[test]
    fn test_register_and_lookup() {
        let mut registry = RunnerRegistry::new();
        registry
            .register_runner(OCSS_SEARCH_RUNNER, Arc::new(OcssSearchRunner::default()), true)
            .unwrap();

        assert_eq!(registry.get(OCSS_SEARCH_RUNNER).unwrap().name(), OCSS_SEARCH_RUNNER);
        assert_eq!(registry.is_async(OCSS_SEARCH_RUNNER), Some(true));
        assert_eq!(registry.names(), vec![OCSS_SEARCH_RUNNER]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = RunnerRegistry::new();
        let runner: Arc<dyn Runner> = Arc::new(OcssSearchRunner::default());
        registry.register_runner("r", runner.clone(), true).unwrap();
        assert!(matches!(
            registry.register_runner("r", runner, false),
            Err(ReplayError::DuplicateRunner(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_runner() {
        let registry = RunnerRegistry::new();
        assert!(matches!(registry.get("nope"), Err(ReplayError::UnknownRunner(_))));
        assert_eq!(registry.is_async("nope"), None);
    }
}
