use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A `{ "id": ..., "kind": ... }` link as OCM embeds them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub external_cluster_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub managed: bool,
    pub plan: Option<ObjectRef>,
    #[serde(default)]
    pub metrics: Vec<SubscriptionMetrics>,
}

impl Subscription {
    pub fn plan_id(&self) -> &str {
        self.plan.as_ref().map_or("", |p| p.id.as_str())
    }

    /// Total nodes reported by the first metrics sample, 0 when absent.
    pub fn node_count(&self) -> u64 {
        self.metrics
            .first()
            .and_then(|m| m.nodes.as_ref())
            .and_then(|n| n.total)
            .map_or(0, |total| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let total = total.max(0.0) as u64;
                total
            })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionMetrics {
    pub nodes: Option<NodeMetrics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub total: Option<f64>,
    pub compute: Option<f64>,
    pub infra: Option<f64>,
    pub master: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dns {
    #[serde(default)]
    pub base_domain: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    #[serde(default)]
    pub external_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub openshift_version: String,
    #[serde(default)]
    pub state: String,
    pub cloud_provider: Option<ObjectRef>,
    pub dns: Option<Dns>,
}

impl Cluster {
    pub fn cloud_provider_id(&self) -> &str {
        self.cloud_provider.as_ref().map_or("", |p| p.id.as_str())
    }

    pub fn base_domain(&self) -> &str {
        self.dns.as_ref().map_or("", |d| d.base_domain.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitedSupportReason {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub detection_type: String,
    pub creation_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub internal_only: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    pub status: Option<Named>,
    pub priority: Option<Named>,
    pub created: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    #[serde(default)]
    pub incident_number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub urgency: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub html_url: String,
    pub service: Option<ObjectRef>,
}

/// Everything `org context` knows about one cluster.
#[derive(Debug, Clone, Default)]
pub struct ClusterInfo {
    pub name: String,
    pub id: String,
    pub version: String,
    pub cloud_provider: String,
    pub plan: String,
    pub node_count: u64,
    pub service_logs: Vec<LogEntry>,
    pub pd_alerts: IndexMap<String, Vec<Incident>>,
    pub jira_issues: Vec<Issue>,
    pub limited_support_reasons: Vec<LimitedSupportReason>,
}

impl ClusterInfo {
    pub fn new(subscription: &Subscription, cluster: &Cluster) -> Self {
        Self {
            name: subscription.display_name.clone(),
            id: subscription.cluster_id.clone(),
            version: cluster.openshift_version.clone(),
            cloud_provider: cluster.cloud_provider_id().to_string(),
            plan: subscription.plan_id().to_string(),
            node_count: subscription.node_count(),
            ..Self::default()
        }
    }

    pub fn active_incident_count(&self) -> usize {
        self.pd_alerts.values().map(Vec::len).sum()
    }
}
