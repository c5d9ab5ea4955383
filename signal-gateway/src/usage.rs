//! Usage log for gateway invocations.
//!
//! Keeps the most recent invocations in memory so operators can see what the
//! model is being asked to do and what it costs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ErrorKind;
use crate::result::TokenUsage;

/// Maximum entries kept before pruning.
pub const DEFAULT_USAGE_CAPACITY: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "errorKind")]
pub enum UsageOutcome {
    Success,
    Failed(ErrorKind),
}

/// One gateway invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntry {
    pub entry_id: String,
    /// Operation name, e.g. `generate-vision`
    pub kind: String,
    /// Absent when authorization failed
    pub caller_id: Option<String>,
    pub outcome: UsageOutcome,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl UsageEntry {
    /// Built when the invocation finishes; the duration runs until now.
    pub fn new(kind: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            kind: kind.into(),
            caller_id: None,
            outcome: UsageOutcome::Success,
            input_tokens: 0,
            output_tokens: 0,
            duration_ms: (Utc::now() - started_at).num_milliseconds().max(0) as u64,
            started_at,
        }
    }

    pub fn with_caller(mut self, caller_id: Option<String>) -> Self {
        self.caller_id = caller_id;
        self
    }

    pub fn succeeded(mut self, usage: TokenUsage) -> Self {
        self.outcome = UsageOutcome::Success;
        self.input_tokens = usage.input_tokens;
        self.output_tokens = usage.output_tokens;
        self
    }

    pub fn failed(mut self, kind: ErrorKind) -> Self {
        self.outcome = UsageOutcome::Failed(kind);
        self
    }
}

/// Ring of recent invocations, newest first.
pub struct UsageLog {
    entries: Arc<RwLock<VecDeque<UsageEntry>>>,
    max_entries: usize,
}

impl Default for UsageLog {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_USAGE_CAPACITY)
    }
}

impl UsageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            max_entries: max_entries.max(1),
        }
    }

    pub async fn record(&self, entry: UsageEntry) {
        let mut entries = self.entries.write().await;
        entries.push_front(entry);

        while entries.len() > self.max_entries {
            entries.pop_back();
        }
    }

    pub async fn recent(&self, limit: usize) -> Vec<UsageEntry> {
        let entries = self.entries.read().await;
        entries.iter().take(limit).cloned().collect()
    }

    pub async fn stats(&self) -> UsageStats {
        let entries = self.entries.read().await;

        let total = entries.len();
        let failed = entries
            .iter()
            .filter(|e| matches!(e.outcome, UsageOutcome::Failed(_)))
            .count();
        let avg_duration_ms = if total > 0 {
            entries.iter().map(|e| e.duration_ms).sum::<u64>() / total as u64
        } else {
            0
        };

        UsageStats {
            total_invocations: total,
            successful: total - failed,
            failed,
            input_tokens: entries.iter().map(|e| u64::from(e.input_tokens)).sum(),
            output_tokens: entries.iter().map(|e| u64::from(e.output_tokens)).sum(),
            avg_duration_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_invocations: usize,
    pub successful: usize,
    pub failed: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub avg_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: &str) -> UsageEntry {
        UsageEntry::new(kind, Utc::now())
    }

    #[tokio::test]
    async fn test_log_prunes_oldest() {
        let log = UsageLog::with_max_entries(2);
        log.record(entry("generate-vision")).await;
        log.record(entry("critique-archetype-input")).await;
        log.record(entry("suggest-hypotheses")).await;

        let kinds: Vec<String> = log.recent(10).await.into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec!["suggest-hypotheses", "critique-archetype-input"]);
    }

    #[tokio::test]
    async fn test_stats() {
        let log = UsageLog::new();
        log.record(entry("generate-vision").succeeded(TokenUsage {
            input_tokens: 100,
            output_tokens: 20,
        }))
        .await;
        log.record(entry("generate-vision").failed(ErrorKind::Internal))
            .await;

        let stats = log.stats().await;
        assert_eq!(stats.total_invocations, 2);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.input_tokens, 100);
        assert_eq!(stats.output_tokens, 20);
    }
}
