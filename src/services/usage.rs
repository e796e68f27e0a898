//! Usage quota ledger
//!
//! Counts optimizations per user per day. The counter restarts once the last
//! reset is more than 24 hours old. Free users are capped at the configured
//! daily limit; pro users are never capped.

use crate::models::{Plan, UsageRecord};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Quota state for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub allowed: bool,
    pub plan: Plan,
    /// Optimizations counted in the current window
    pub used: u32,
    /// Daily limit; `None` when unlimited
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
}

#[async_trait]
pub trait UsageLedger: Send + Sync {
    async fn usage(&self, user_id: &str) -> Result<Option<UsageRecord>>;

    async fn check_quota(&self, user_id: &str) -> Result<QuotaStatus>;

    /// Count one optimization; returns the new count for the current window
    async fn record(&self, user_id: &str) -> Result<u32>;

    /// Admit and count one optimization atomically; a refused call counts nothing
    async fn try_consume(&self, user_id: &str) -> Result<QuotaStatus>;

    async fn set_plan(&self, user_id: &str, plan: Plan) -> Result<()>;
}

fn window_expired(record: &UsageRecord, now: DateTime<Utc>) -> bool {
    now - record.last_reset > Duration::hours(24)
}

/// Process-local usage ledger
#[derive(Debug)]
pub struct InMemoryUsageLedger {
    records: RwLock<HashMap<String, UsageRecord>>,
    free_daily_limit: u32,
}

impl InMemoryUsageLedger {
    pub fn new(free_daily_limit: u32) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            free_daily_limit,
        }
    }

    pub async fn check_quota_at(&self, user_id: &str, now: DateTime<Utc>) -> QuotaStatus {
        let records = self.records.read().await;
        let (plan, used) = current_window(records.get(user_id), now);
        self.status(plan, used, self.admits(plan, used))
    }

    pub async fn record_at(&self, user_id: &str, now: DateTime<Utc>) -> u32 {
        let mut records = self.records.write().await;
        increment(&mut records, user_id, now)
    }

    /// Check the quota and count the optimization under one write lock
    pub async fn try_consume_at(&self, user_id: &str, now: DateTime<Utc>) -> QuotaStatus {
        let mut records = self.records.write().await;
        let (plan, used) = current_window(records.get(user_id), now);
        if !self.admits(plan, used) {
            return self.status(plan, used, false);
        }

        let used = increment(&mut records, user_id, now);
        self.status(plan, used, true)
    }

    fn admits(&self, plan: Plan, used: u32) -> bool {
        match plan {
            Plan::Pro => true,
            Plan::Free => used < self.free_daily_limit,
        }
    }

    fn status(&self, plan: Plan, used: u32, allowed: bool) -> QuotaStatus {
        let limit = match plan {
            Plan::Pro => None,
            Plan::Free => Some(self.free_daily_limit),
        };
        QuotaStatus {
            allowed,
            plan,
            used,
            limit,
            remaining: limit.map(|limit| limit.saturating_sub(used)),
        }
    }
}

/// Plan and count for the window in force at `now`
fn current_window(record: Option<&UsageRecord>, now: DateTime<Utc>) -> (Plan, u32) {
    match record {
        Some(record) if window_expired(record, now) => (record.plan, 0),
        Some(record) => (record.plan, record.count),
        None => (Plan::Free, 0),
    }
}

fn increment(records: &mut HashMap<String, UsageRecord>, user_id: &str, now: DateTime<Utc>) -> u32 {
    let record = records
        .entry(user_id.to_string())
        .or_insert_with(|| UsageRecord::new(user_id, Plan::Free, now));

    if window_expired(record, now) {
        debug!("Usage window expired for user {}, resetting counter", user_id);
        record.count = 1;
        record.last_reset = now;
    } else {
        record.count += 1;
    }

    record.count
}

#[async_trait]
impl UsageLedger for InMemoryUsageLedger {
    async fn usage(&self, user_id: &str) -> Result<Option<UsageRecord>> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn check_quota(&self, user_id: &str) -> Result<QuotaStatus> {
        Ok(self.check_quota_at(user_id, Utc::now()).await)
    }

    async fn record(&self, user_id: &str) -> Result<u32> {
        Ok(self.record_at(user_id, Utc::now()).await)
    }

    async fn try_consume(&self, user_id: &str) -> Result<QuotaStatus> {
        Ok(self.try_consume_at(user_id, Utc::now()).await)
    }

    async fn set_plan(&self, user_id: &str, plan: Plan) -> Result<()> {
        let mut records = self.records.write().await;
        records
            .entry(user_id.to_string())
            .or_insert_with(|| UsageRecord::new(user_id, plan, Utc::now()))
            .plan = plan;
        Ok(())
    }
}
