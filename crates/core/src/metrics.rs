// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Per-operation measurements collected by the driver
#[derive(Debug, Clone)]
pub struct Metrics {
    pub operation: String,
    pub started_at: DateTime<Utc>,
    pub total_time: Option<Duration>,
    /// Server-reported `took` per measured search, in ms
    pub took_ms: Vec<u64>,
    /// Client-observed time per measured search
    pub service_times: Vec<Duration>,
    pub warmup_searches: u64,
}

/// Serializable roll-up of [`Metrics`] for the JSON report
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub operation: String,
    pub started_at: DateTime<Utc>,
    pub searches: usize,
    pub warmup_searches: u64,
    pub total_time_secs: f64,
    pub throughput_per_sec: Option<f64>,
    pub took_mean_ms: Option<f64>,
    pub took_min_ms: Option<u64>,
    pub took_max_ms: Option<u64>,
    pub took_p50_ms: Option<u64>,
    pub took_p90_ms: Option<u64>,
    pub took_p99_ms: Option<u64>,
    pub service_time_mean_ms: Option<f64>,
}

impl Metrics {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            started_at: Utc::now(),
            total_time: None,
            took_ms: Vec::new(),
            service_times: Vec::new(),
            warmup_searches: 0,
        }
    }

    pub fn record_total_time(&mut self, duration: Duration) {
        self.total_time = Some(duration);
    }

    pub fn record_search(&mut self, took_ms: u64, service_time: Duration) {
        self.took_ms.push(took_ms);
        self.service_times.push(service_time);
    }

    pub fn record_warmup(&mut self) {
        self.warmup_searches += 1;
    }

    pub fn searches(&self) -> usize {
        self.took_ms.len()
    }

    pub fn mean_took(&self) -> Option<f64> {
        if self.took_ms.is_empty() {
            return None;
        }
        let total: u64 = self.took_ms.iter().sum();
        Some(total as f64 / self.took_ms.len() as f64)
    }

    /// Nearest-rank percentile of `took`, `pct` in 0..=100
    pub fn took_percentile(&self, pct: f64) -> Option<u64> {
        if self.took_ms.is_empty() {
            return None;
        }
        let mut sorted = self.took_ms.clone();
        sorted.sort_unstable();
        let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
        let idx = rank.clamp(1, sorted.len()) - 1;
        Some(sorted[idx])
    }

    pub fn mean_service_time(&self) -> Option<Duration> {
        if self.service_times.is_empty() {
            return None;
        }
        let total: Duration = self.service_times.iter().sum();
        Some(total / self.service_times.len() as u32)
    }

    pub fn throughput(&self) -> Option<f64> {
        let seconds = self.total_time?.as_secs_f64();
        if seconds > 0.0 {
            Some(self.searches() as f64 / seconds)
        } else {
            None
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            operation: self.operation.clone(),
            started_at: self.started_at,
            searches: self.searches(),
            warmup_searches: self.warmup_searches,
            total_time_secs: self.total_time.map(|d| d.as_secs_f64()).unwrap_or(0.0),
            throughput_per_sec: self.throughput(),
            took_mean_ms: self.mean_took(),
            took_min_ms: self.took_ms.iter().min().copied(),
            took_max_ms: self.took_ms.iter().max().copied(),
            took_p50_ms: self.took_percentile(50.0),
            took_p90_ms: self.took_percentile(90.0),
            took_p99_ms: self.took_percentile(99.0),
            service_time_mean_ms: self
                .mean_service_time()
                .map(|d| d.as_secs_f64() * 1000.0),
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== {} ===", self.operation);

        if let Some(total_time) = self.total_time {
            println!("Total Time: {:?}", total_time);
        }
        println!("Searches: {} (warmup: {})", self.searches(), self.warmup_searches);

        if let Some(throughput) = self.throughput() {
            println!("Throughput: {:.2} searches/s", throughput);
        }
        if let Some(mean) = self.mean_took() {
            println!("Took mean: {:.2} ms", mean);
        }
        if let (Some(p50), Some(p90), Some(p99)) = (
            self.took_percentile(50.0),
            self.took_percentile(90.0),
            self.took_percentile(99.0),
        ) {
            println!("Took p50/p90/p99: {} / {} / {} ms", p50, p90, p99);
        }
        if let Some(service) = self.mean_service_time() {
            println!("Service time mean: {:?}", service);
        }

        println!("=============================\n");
    }
}
