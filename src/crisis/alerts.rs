// Durable crisis-alert store
//
// Alerts outlive process memory: the default backing is a sled database with
// one tree holding alert records by id and a second tree indexing them by
// session and creation time. An in-memory implementation backs tests and
// single-shot tooling.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

use super::detector::RiskAnalysis;
use crate::classifier::RiskLevel;

/// Follow-up action recorded when an alert is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertAction {
    ContactedUser,
    EscalatedToCounselor,
    ProvidedResources,
    NoActionNeeded,
}

/// Durable record of an elevated-risk message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisAlert {
    pub id: String,
    pub session_id: String,
    pub level: RiskLevel,
    pub text: String,
    pub text_hash: String,
    pub trigger_words: Vec<String>,
    pub risk_score: f64,
    pub sentiment_score: f64,
    pub history_snapshot: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
    pub action_taken: Option<AlertAction>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub response_time_ms: Option<i64>,
}

impl CrisisAlert {
    /// Build an alert from an analysis result. Callers only create alerts for
    /// levels above Low.
    pub fn from_analysis(
        session_id: &str,
        text: &str,
        analysis: &RiskAnalysis,
        history_snapshot: Vec<String>,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let text_hash = format!("{:x}", hasher.finalize());

        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            level: analysis.level,
            text: text.to_string(),
            text_hash,
            trigger_words: analysis.trigger_words.clone(),
            risk_score: analysis.score,
            sentiment_score: analysis.sentiment.score,
            history_snapshot,
            created_at: Utc::now(),
            resolved: false,
            action_taken: None,
            resolved_at: None,
            response_time_ms: None,
        }
    }

    /// Mark resolved, computing response time against the creation timestamp
    pub fn resolve(&mut self, action: AlertAction, resolved: bool, at: DateTime<Utc>) {
        self.action_taken = Some(action);
        self.resolved = resolved;
        if resolved {
            self.resolved_at = Some(at);
            self.response_time_ms = Some(at.signed_duration_since(self.created_at).num_milliseconds());
        }
    }
}

/// Per-level aggregate
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelStats {
    pub count: usize,
    pub resolved: usize,
    pub avg_risk_score: f64,
    pub avg_response_time_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertStats {
    pub total: usize,
    pub by_level: BTreeMap<String, LevelStats>,
}

/// Storage contract for crisis alerts
pub trait AlertStore: Send + Sync {
    fn put(&self, alert: &CrisisAlert) -> Result<()>;
    fn get(&self, alert_id: &str) -> Result<Option<CrisisAlert>>;
    /// Most recent alerts for a session, newest first
    fn recent_for_session(&self, session_id: &str, limit: usize) -> Result<Vec<CrisisAlert>>;
    fn resolve(
        &self,
        alert_id: &str,
        action: AlertAction,
        resolved: bool,
    ) -> Result<Option<CrisisAlert>>;
    fn stats_for_session(&self, session_id: &str) -> Result<AlertStats>;
}

fn aggregate(alerts: &[CrisisAlert]) -> AlertStats {
    let mut by_level: BTreeMap<String, Vec<&CrisisAlert>> = BTreeMap::new();
    for alert in alerts {
        by_level
            .entry(alert.level.as_str().to_string())
            .or_default()
            .push(alert);
    }

    let by_level = by_level
        .into_iter()
        .map(|(level, group)| {
            let count = group.len();
            let resolved = group.iter().filter(|a| a.resolved).count();
            let avg_risk_score =
                group.iter().map(|a| a.risk_score).sum::<f64>() / count as f64;
            let times: Vec<i64> = group.iter().filter_map(|a| a.response_time_ms).collect();
            let avg_response_time_ms = if times.is_empty() {
                None
            } else {
                Some(times.iter().sum::<i64>() as f64 / times.len() as f64)
            };
            (
                level,
                LevelStats {
                    count,
                    resolved,
                    avg_risk_score,
                    avg_response_time_ms,
                },
            )
        })
        .collect();

    AlertStats {
        total: alerts.len(),
        by_level,
    }
}

/// Sled-backed alert store
pub struct SledAlertStore {
    db: sled::Db,
}

impl SledAlertStore {
    /// Open (or create) the alert database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path)
            .with_context(|| format!("Failed to open alert store at {}", path.display()))?;
        Ok(Self { db })
    }

    fn alerts_tree(&self) -> Result<sled::Tree> {
        self.db.open_tree("alerts").context("Failed to open alerts tree")
    }

    fn index_tree(&self) -> Result<sled::Tree> {
        self.db
            .open_tree("alerts_by_session")
            .context("Failed to open session index tree")
    }

    fn session_key(alert: &CrisisAlert) -> Vec<u8> {
        // session/{millis}/{id} sorts chronologically under a session prefix
        format!(
            "{}/{:020}/{}",
            alert.session_id,
            alert.created_at.timestamp_millis(),
            alert.id
        )
        .into_bytes()
    }

    fn write(&self, alert: &CrisisAlert) -> Result<()> {
        let encoded = serde_json::to_vec(alert).context("Failed to serialize alert")?;
        self.alerts_tree()?
            .insert(alert.id.as_bytes(), encoded)
            .context("Failed to write alert")?;
        self.index_tree()?
            .insert(Self::session_key(alert), alert.id.as_bytes())
            .context("Failed to write session index")?;
        Ok(())
    }
}

impl AlertStore for SledAlertStore {
    fn put(&self, alert: &CrisisAlert) -> Result<()> {
        self.write(alert)?;
        tracing::info!(
            alert_id = %alert.id,
            session_id = %alert.session_id,
            level = %alert.level,
            "Persisted crisis alert"
        );
        Ok(())
    }

    fn get(&self, alert_id: &str) -> Result<Option<CrisisAlert>> {
        let Some(bytes) = self
            .alerts_tree()?
            .get(alert_id.as_bytes())
            .context("Failed to read alert")?
        else {
            return Ok(None);
        };
        let alert = serde_json::from_slice(&bytes).context("Failed to parse stored alert")?;
        Ok(Some(alert))
    }

    fn recent_for_session(&self, session_id: &str, limit: usize) -> Result<Vec<CrisisAlert>> {
        let prefix = format!("{}/", session_id);
        let mut ids: Vec<Vec<u8>> = Vec::new();
        for entry in self.index_tree()?.scan_prefix(prefix.as_bytes()) {
            let (_, id) = entry.context("Failed to scan session index")?;
            ids.push(id.to_vec());
        }

        // Index keys sort oldest first; take the tail and reverse
        let skip = ids.len().saturating_sub(limit);
        let mut alerts = Vec::new();
        for id in ids.into_iter().skip(skip).rev() {
            let id = String::from_utf8_lossy(&id).to_string();
            if let Some(alert) = self.get(&id)? {
                alerts.push(alert);
            }
        }
        Ok(alerts)
    }

    fn resolve(
        &self,
        alert_id: &str,
        action: AlertAction,
        resolved: bool,
    ) -> Result<Option<CrisisAlert>> {
        let Some(mut alert) = self.get(alert_id)? else {
            return Ok(None);
        };
        alert.resolve(action, resolved, Utc::now());
        self.write(&alert)?;
        Ok(Some(alert))
    }

    fn stats_for_session(&self, session_id: &str) -> Result<AlertStats> {
        let alerts = self.recent_for_session(session_id, usize::MAX)?;
        Ok(aggregate(&alerts))
    }
}

/// In-memory alert store for tests and single-shot tooling
pub struct MemoryAlertStore {
    alerts: DashMap<String, CrisisAlert>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self {
            alerts: DashMap::new(),
        }
    }
}

impl Default for MemoryAlertStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertStore for MemoryAlertStore {
    fn put(&self, alert: &CrisisAlert) -> Result<()> {
        self.alerts.insert(alert.id.clone(), alert.clone());
        Ok(())
    }

    fn get(&self, alert_id: &str) -> Result<Option<CrisisAlert>> {
        Ok(self.alerts.get(alert_id).map(|a| a.clone()))
    }

    fn recent_for_session(&self, session_id: &str, limit: usize) -> Result<Vec<CrisisAlert>> {
        let mut alerts: Vec<CrisisAlert> = self
            .alerts
            .iter()
            .filter(|a| a.session_id == session_id)
            .map(|a| a.clone())
            .collect();
        alerts.sort_by_key(|a| std::cmp::Reverse(a.created_at));
        alerts.truncate(limit);
        Ok(alerts)
    }

    fn resolve(
        &self,
        alert_id: &str,
        action: AlertAction,
        resolved: bool,
    ) -> Result<Option<CrisisAlert>> {
        let Some(mut entry) = self.alerts.get_mut(alert_id) else {
            return Ok(None);
        };
        entry.resolve(action, resolved, Utc::now());
        Ok(Some(entry.clone()))
    }

    fn stats_for_session(&self, session_id: &str) -> Result<AlertStats> {
        let alerts = self.recent_for_session(session_id, usize::MAX)?;
        Ok(aggregate(&alerts))
    }
}
