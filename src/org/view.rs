use serde::Serialize;
use tabled::settings::{Padding, Style};
use tabled::{Table, Tabled};

use crate::error::Result;
use crate::models::{ClusterInfo, LimitedSupportReason, Subscription};

const PLAN_ROSA: &str = "MOA";
const PLAN_HCP: &str = "MOA-HostedControlPlane";

pub fn support_status_display_text(reasons: &[LimitedSupportReason]) -> &'static str {
    if reasons.is_empty() {
        "Fully Supported"
    } else {
        "Limited Support"
    }
}

pub fn plan_display_text(plan: &str) -> &str {
    match plan {
        PLAN_ROSA => "ROSA",
        PLAN_HCP => "HCP",
        other => other,
    }
}

/// One row of `org context` output.
#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct ClusterView {
    #[tabled(rename = "Display Name")]
    pub display_name: String,
    #[tabled(rename = "Cluster ID")]
    pub cluster_id: String,
    #[tabled(rename = "Version")]
    pub version: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Provider")]
    pub provider: String,
    #[tabled(rename = "Plan")]
    pub plan: String,
    #[tabled(rename = "Node Count")]
    pub node_count: u64,
    #[serde(rename = "recentSLs")]
    #[tabled(rename = "Recent SLs")]
    pub recent_sls: usize,
    #[serde(rename = "activePDs")]
    #[tabled(rename = "Active PDs")]
    pub active_pds: usize,
    #[serde(rename = "ohssTickets")]
    #[tabled(rename = "OHSS Tickets")]
    pub ohss_tickets: usize,
}

impl From<&ClusterInfo> for ClusterView {
    fn from(info: &ClusterInfo) -> Self {
        Self {
            display_name: info.name.clone(),
            cluster_id: info.id.clone(),
            version: info.version.clone(),
            status: support_status_display_text(&info.limited_support_reasons).to_string(),
            provider: info.cloud_provider.clone(),
            plan: plan_display_text(&info.plan).to_string(),
            node_count: info.node_count,
            recent_sls: info.service_logs.len(),
            active_pds: info.active_incident_count(),
            ohss_tickets: info.jira_issues.len(),
        }
    }
}

/// One row of `org clusters` output.
#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    #[tabled(rename = "Display Name")]
    pub display_name: String,
    #[tabled(rename = "Cluster ID")]
    pub cluster_id: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Plan")]
    pub plan: String,
    #[tabled(rename = "Managed")]
    pub managed: bool,
}

impl From<&Subscription> for SubscriptionView {
    fn from(sub: &Subscription) -> Self {
        Self {
            display_name: sub.display_name.clone(),
            cluster_id: sub.cluster_id.clone(),
            status: sub.status.clone(),
            plan: plan_display_text(sub.plan_id()).to_string(),
            managed: sub.managed,
        }
    }
}

fn table<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows)
        .with(Style::empty())
        .with(Padding::new(0, 2, 0, 0))
        .to_string()
}

pub fn render_table(clusters: &[ClusterInfo]) -> String {
    table(clusters.iter().map(ClusterView::from).collect())
}

pub fn render_json(clusters: &[ClusterInfo]) -> Result<String> {
    let views: Vec<ClusterView> = clusters.iter().map(ClusterView::from).collect();
    Ok(serde_json::to_string_pretty(&views)?)
}

pub fn render_subscriptions_table(subscriptions: &[Subscription]) -> String {
    table(subscriptions.iter().map(SubscriptionView::from).collect())
}

pub fn render_subscriptions_json(subscriptions: &[Subscription]) -> Result<String> {
    let views: Vec<SubscriptionView> = subscriptions.iter().map(SubscriptionView::from).collect();
    Ok(serde_json::to_string_pretty(&views)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Incident, Issue, IssueFields, ObjectRef};
    use indexmap::IndexMap;

    fn incident(id: &str) -> Incident {
        Incident {
            id: id.to_string(),
            incident_number: 7,
            title: "KubeAPIErrorBudgetBurn".to_string(),
            status: "acknowledged".to_string(),
            urgency: "high".to_string(),
            created_at: None,
            html_url: String::new(),
            service: None,
        }
    }

    fn cluster() -> ClusterInfo {
        ClusterInfo {
            name: "prod-eu".to_string(),
            id: "1a2b3c".to_string(),
            version: "4.15.9".to_string(),
            cloud_provider: "aws".to_string(),
            plan: "MOA".to_string(),
            node_count: 9,
            pd_alerts: IndexMap::from([
                ("PSVC1".to_string(), vec![incident("P1"), incident("P2")]),
                ("PSVC2".to_string(), vec![incident("P3")]),
            ]),
            jira_issues: vec![Issue {
                key: "OHSS-1".to_string(),
                fields: IssueFields::default(),
            }],
            ..ClusterInfo::default()
        }
    }

    #[test]
    fn test_support_status_text() {
        assert_eq!(support_status_display_text(&[]), "Fully Supported");
        assert_eq!(
            support_status_display_text(&[LimitedSupportReason::default()]),
            "Limited Support"
        );
    }

    #[test]
    fn test_plan_display_text() {
        assert_eq!(plan_display_text("MOA"), "ROSA");
        assert_eq!(plan_display_text("MOA-HostedControlPlane"), "HCP");
        assert_eq!(plan_display_text("OSD"), "OSD");
        assert_eq!(plan_display_text("OSDTrial"), "OSDTrial");
        assert_eq!(plan_display_text(""), "");
        assert_eq!(plan_display_text("moa"), "moa");
    }

    #[test]
    fn test_cluster_view_counts_enrichments() {
        let view = ClusterView::from(&cluster());

        assert_eq!(view.status, "Fully Supported");
        assert_eq!(view.plan, "ROSA");
        assert_eq!(view.recent_sls, 0);
        assert_eq!(view.active_pds, 3);
        assert_eq!(view.ohss_tickets, 1);
    }

    #[test]
    fn test_json_uses_expected_keys() {
        let json = render_json(&[cluster()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value[0].as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "activePDs",
                "clusterId",
                "displayName",
                "nodeCount",
                "ohssTickets",
                "plan",
                "provider",
                "recentSLs",
                "status",
                "version",
            ]
        );
        assert_eq!(value[0]["nodeCount"], 9);
        assert_eq!(value[0]["activePDs"], 3);
    }

    #[test]
    fn test_json_for_no_clusters_is_empty_array() {
        assert_eq!(render_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_table_columns_in_order() {
        let table = render_table(&[cluster()]);
        let header = table.lines().next().unwrap();

        let columns = [
            "Display Name",
            "Cluster ID",
            "Version",
            "Status",
            "Provider",
            "Plan",
            "Node Count",
            "Recent SLs",
            "Active PDs",
            "OHSS Tickets",
        ];
        let positions: Vec<_> = columns
            .iter()
            .map(|c| header.find(c).unwrap_or_else(|| panic!("missing column {c}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(table.contains("prod-eu"));
        assert!(table.contains("ROSA"));
    }

    #[test]
    fn test_subscription_view_maps_plan() {
        let sub = Subscription {
            id: "s1".to_string(),
            cluster_id: "c1".to_string(),
            display_name: "hcp-one".to_string(),
            status: "Active".to_string(),
            managed: true,
            plan: Some(ObjectRef {
                id: "MOA-HostedControlPlane".to_string(),
                kind: "Plan".to_string(),
            }),
            ..Subscription::default()
        };

        let table = render_subscriptions_table(&[sub]);

        assert!(table.lines().next().unwrap().contains("Managed"));
        assert!(table.contains("HCP"));
        assert!(table.contains("hcp-one"));
    }
}
