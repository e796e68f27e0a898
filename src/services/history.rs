//! Prompt history persistence

use crate::models::PromptRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Storage for saved optimizations
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn save(&self, record: PromptRecord) -> Result<Uuid>;

    /// A user's records, newest first
    async fn list_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<PromptRecord>>;

    async fn get(&self, id: Uuid) -> Result<Option<PromptRecord>>;

    /// Returns whether a record was removed
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// A user's records at or after `since`, oldest first
    async fn list_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<Vec<PromptRecord>>;
}

/// Process-local history store
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<Vec<PromptRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn save(&self, record: PromptRecord) -> Result<Uuid> {
        let id = record.id;
        self.records.write().await.push(record);
        Ok(id)
    }

    async fn list_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<PromptRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<PromptRecord> = records
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort keeps later inserts first on equal timestamps
        matching.reverse();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PromptRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() != before)
    }

    async fn list_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<Vec<PromptRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<PromptRecord> = records
            .iter()
            .filter(|record| record.user_id == user_id && record.timestamp >= since)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptimizationSettings;
    use chrono::Duration;

    fn record(user_id: &str, prompt: &str, timestamp: DateTime<Utc>) -> PromptRecord {
        PromptRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            original_prompt: prompt.to_string(),
            optimized_prompt: format!("Optimized: {}", prompt),
            settings: OptimizationSettings::default(),
            explanation: None,
            original_score: None,
            optimized_score: None,
            score_improvement: None,
            original_tokens: 1,
            optimized_tokens: 2,
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first() {
        let store = InMemoryHistoryStore::new();
        let now = Utc::now();
        store.save(record("alice", "first", now - Duration::hours(2))).await.unwrap();
        store.save(record("bob", "other", now - Duration::hours(1))).await.unwrap();
        store.save(record("alice", "second", now)).await.unwrap();

        let records = store.list_for_user("alice", 100).await.unwrap();
        let prompts: Vec<&str> = records.iter().map(|r| r.original_prompt.as_str()).collect();
        assert_eq!(prompts, vec!["second", "first"]);

        assert_eq!(store.list_for_user("alice", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let store = InMemoryHistoryStore::new();
        let id = store.save(record("alice", "hello", Utc::now())).await.unwrap();

        assert!(store.get(id).await.unwrap().is_some());
        assert!(store.delete(id).await.unwrap());
        assert!(store.get(id).await.unwrap().is_none());
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_since() {
        let store = InMemoryHistoryStore::new();
        let now = Utc::now();
        store.save(record("alice", "old", now - Duration::days(40))).await.unwrap();
        store.save(record("alice", "recent", now - Duration::days(2))).await.unwrap();

        let records = store.list_since("alice", now - Duration::days(30)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].original_prompt, "recent");
    }
}
