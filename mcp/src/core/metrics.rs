//! Invocation metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use crate::registry::QualifiedToolName;

/// Counters for tool invocations handled by the orchestrator.
pub struct InvocationMetrics {
    invocations: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,

    // Approval
    auto_approved: AtomicU64,
    manually_approved: AtomicU64,
    denied: AtomicU64,
    hook_cancelled: AtomicU64,

    notifications_forwarded: AtomicU64,

    // Per-tool execution latency
    tool_latencies: DashMap<QualifiedToolName, LatencyStats>,
}

impl InvocationMetrics {
    pub fn new() -> Self {
        Self {
            invocations: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            auto_approved: AtomicU64::new(0),
            manually_approved: AtomicU64::new(0),
            denied: AtomicU64::new(0),
            hook_cancelled: AtomicU64::new(0),
            notifications_forwarded: AtomicU64::new(0),
            tool_latencies: DashMap::new(),
        }
    }

    /// Record a finalized call entering the pipeline.
    pub fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_approval(&self, auto_approved: bool) {
        if auto_approved {
            self.auto_approved.fetch_add(1, Ordering::Relaxed);
        } else {
            self.manually_approved.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_denied(&self) {
        self.denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hook_cancelled(&self) {
        self.hook_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notifications(&self, count: usize) {
        self.notifications_forwarded
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record the end of a tool execution.
    pub fn record_execution(&self, tool: &QualifiedToolName, success: bool, duration_ms: u64) {
        if success {
            self.completed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }

        self.tool_latencies
            .entry(tool.clone())
            .or_insert_with(LatencyStats::new)
            .record(duration_ms);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            invocations: self.invocations.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            auto_approved: self.auto_approved.load(Ordering::Relaxed),
            manually_approved: self.manually_approved.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            hook_cancelled: self.hook_cancelled.load(Ordering::Relaxed),
            notifications_forwarded: self.notifications_forwarded.load(Ordering::Relaxed),
        }
    }

    pub fn tool_latency(&self, tool: &QualifiedToolName) -> Option<LatencySnapshot> {
        self.tool_latencies.get(tool).map(|stats| stats.snapshot())
    }

    pub fn all_tool_latencies(&self) -> Vec<(QualifiedToolName, LatencySnapshot)> {
        self.tool_latencies
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().snapshot()))
            .collect()
    }

    pub fn reset(&self) {
        for counter in [
            &self.invocations,
            &self.completed,
            &self.failed,
            &self.auto_approved,
            &self.manually_approved,
            &self.denied,
            &self.hook_cancelled,
            &self.notifications_forwarded,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.tool_latencies.clear();
    }
}

impl Default for InvocationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-tool latency statistics.
pub struct LatencyStats {
    count: AtomicU64,
    total_ms: AtomicU64,
    min_ms: AtomicU64,
    max_ms: AtomicU64,
}

impl LatencyStats {
    fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            total_ms: AtomicU64::new(0),
            min_ms: AtomicU64::new(u64::MAX),
            max_ms: AtomicU64::new(0),
        }
    }

    fn record(&self, ms: u64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_ms.fetch_add(ms, Ordering::Relaxed);
        self.min_ms.fetch_min(ms, Ordering::Relaxed);
        self.max_ms.fetch_max(ms, Ordering::Relaxed);
    }

    fn snapshot(&self) -> LatencySnapshot {
        let count = self.count.load(Ordering::Relaxed);
        let total = self.total_ms.load(Ordering::Relaxed);
        let min = self.min_ms.load(Ordering::Relaxed);

        LatencySnapshot {
            count,
            avg_ms: if count > 0 { total / count } else { 0 },
            min_ms: if min == u64::MAX { 0 } else { min },
            max_ms: self.max_ms.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub invocations: u64,
    pub completed: u64,
    pub failed: u64,
    pub auto_approved: u64,
    pub manually_approved: u64,
    pub denied: u64,
    pub hook_cancelled: u64,
    pub notifications_forwarded: u64,
}

impl MetricsSnapshot {
    /// Share of executed calls that succeeded, as a percentage.
    pub fn success_rate(&self) -> f64 {
        let executed = self.completed + self.failed;
        if executed == 0 {
            100.0
        } else {
            (self.completed as f64 / executed as f64) * 100.0
        }
    }

    /// Share of decided calls that were allowed to run, as a percentage.
    pub fn approval_rate(&self) -> f64 {
        let approved = self.auto_approved + self.manually_approved;
        let total = approved + self.denied;
        if total == 0 {
            100.0
        } else {
            (approved as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatencySnapshot {
    pub count: u64,
    pub avg_ms: u64,
    pub min_ms: u64,
    pub max_ms: u64,
}
