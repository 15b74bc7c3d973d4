use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Validation outcomes per contract kind.
#[derive(Debug, Default, Clone, Serialize)]
pub struct MetricsData {
    pub accepted: HashMap<String, u64>,
    pub rejected: HashMap<String, u64>,
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    inner: Arc<RwLock<MetricsData>>,
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsData::default())),
        }
    }

    pub async fn record_accepted(&self, kind: &str) {
        let mut data = self.inner.write().await;
        *data.accepted.entry(kind.to_string()).or_insert(0) += 1;
    }

    pub async fn record_rejected(&self, kind: &str) {
        let mut data = self.inner.write().await;
        *data.rejected.entry(kind.to_string()).or_insert(0) += 1;
    }

    pub async fn get_metrics(&self) -> MetricsData {
        self.inner.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_are_kept_per_kind() {
        let metrics = MetricsManager::new();
        metrics.record_accepted("conversation").await;
        metrics.record_accepted("conversation").await;
        metrics.record_rejected("preset").await;

        let data = metrics.get_metrics().await;
        assert_eq!(data.accepted.get("conversation"), Some(&2));
        assert_eq!(data.rejected.get("preset"), Some(&1));
        assert!(data.rejected.get("conversation").is_none());
    }
}
