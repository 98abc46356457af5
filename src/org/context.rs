use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Duration, Utc};
use indexmap::IndexMap;
use log::{info, warn};
use tokio::task::JoinSet;

use crate::error::{OsdctlError, Result};
use crate::models::{ClusterInfo, Incident, Subscription};
use crate::providers::{
    IssueSearch, OcmConnection, OcmConnector, PagerDutyConnector, ServiceLogFilter,
    ServiceLogSource, SubscriptionSearch,
};

pub const ACTIVE_STATUS: &str = "Active";
pub const SERVICE_LOG_WINDOW_DAYS: i64 = 30;

/// Receives a tick each time a cluster finishes enriching.
pub trait Progress: Send + Sync {
    fn clusters_fetched(&self, fetched: usize, total: usize);
}

pub struct StderrProgress;

impl Progress for StderrProgress {
    fn clusters_fetched(&self, fetched: usize, total: usize) {
        eprintln!("Fetched data for {fetched} of {total} clusters");
    }
}

/// Clusters that were fully enriched, plus the first per-cluster failure if any.
#[derive(Debug, Default)]
pub struct OrgContext {
    pub clusters: Vec<ClusterInfo>,
    pub failure: Option<OsdctlError>,
}

#[derive(Clone)]
pub struct Enrichers {
    pub service_logs: Arc<dyn ServiceLogSource>,
    pub issues: Arc<dyn IssueSearch>,
    pub pagerduty: Arc<dyn PagerDutyConnector>,
}

pub struct ContextFetcher {
    subscriptions: Arc<dyn SubscriptionSearch>,
    ocm: Arc<dyn OcmConnector>,
    enrichers: Enrichers,
    progress: Arc<dyn Progress>,
}

#[derive(Default)]
struct Accumulator {
    clusters: Vec<ClusterInfo>,
    fetched: usize,
}

impl ContextFetcher {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionSearch>,
        ocm: Arc<dyn OcmConnector>,
        enrichers: Enrichers,
        progress: Arc<dyn Progress>,
    ) -> Self {
        Self {
            subscriptions,
            ocm,
            enrichers,
            progress,
        }
    }

    /// Gathers support status, service logs, OHSS tickets and PagerDuty
    /// incidents for every active cluster in `org_id`.
    ///
    /// Only the subscription search and the OCM connection are fatal. A
    /// cluster whose lookup or any enrichment fails is left out, and the
    /// first such failure is returned in [`OrgContext::failure`] next to
    /// the clusters that did succeed. Cluster order follows completion.
    pub async fn fetch_context(&self, org_id: &str) -> Result<OrgContext> {
        info!("Fetching active subscriptions for organization {org_id}");
        let subscriptions = self
            .subscriptions
            .search_subscriptions(org_id, Some(ACTIVE_STATUS), true)
            .await
            .map_err(|e| OsdctlError::Subscriptions(Box::new(e)))?;

        if subscriptions.is_empty() {
            warn!("No active clusters found for organization {org_id}");
            return Ok(OrgContext::default());
        }

        let connection = self
            .ocm
            .connect()
            .await
            .map_err(|e| OsdctlError::Connection(Box::new(e)))?;

        let total = subscriptions.len();
        let accumulator = Arc::new(Mutex::new(Accumulator::default()));
        let mut tasks: JoinSet<Result<()>> = JoinSet::new();

        for subscription in subscriptions {
            let connection = Arc::clone(&connection);
            let enrichers = self.enrichers.clone();
            let accumulator = Arc::clone(&accumulator);
            let progress = Arc::clone(&self.progress);

            tasks.spawn(async move {
                let info = fetch_cluster_context(connection.as_ref(), &enrichers, &subscription)
                    .await?;

                let mut acc = accumulator.lock().unwrap_or_else(PoisonError::into_inner);
                acc.clusters.push(info);
                acc.fetched += 1;
                progress.clusters_fetched(acc.fetched, total);
                Ok::<(), OsdctlError>(())
            });
        }

        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|e| OsdctlError::Task(e.to_string()))
                .and_then(|result| result);

            if let Err(err) = outcome {
                if failure.is_none() {
                    failure = Some(OsdctlError::Context(Box::new(err)));
                } else {
                    warn!("{err}");
                }
            }
        }

        let clusters = std::mem::take(
            &mut accumulator
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clusters,
        );
        info!("Fetched context for {} of {total} clusters", clusters.len());

        Ok(OrgContext { clusters, failure })
    }
}

/// Looks up one cluster and runs its four enrichments side by side. All
/// four must succeed for the cluster to be kept.
async fn fetch_cluster_context(
    connection: &dyn OcmConnection,
    enrichers: &Enrichers,
    subscription: &Subscription,
) -> Result<ClusterInfo> {
    let cluster_id = subscription.cluster_id.as_str();
    let cluster = connection
        .get_cluster(cluster_id)
        .await
        .map_err(|e| OsdctlError::fetch("cluster", cluster_id, e))?;

    let mut info = ClusterInfo::new(subscription, &cluster);
    let since = Utc::now() - Duration::days(SERVICE_LOG_WINDOW_DAYS);

    // All four run to completion; the first error in field order is reported.
    let (limited_support, service_logs, jira_issues, pd_alerts) = tokio::join!(
        connection.limited_support_reasons(cluster_id),
        enrichers
            .service_logs
            .service_logs_since(cluster_id, since, ServiceLogFilter::default()),
        enrichers
            .issues
            .issues_for_cluster(cluster_id, &cluster.external_id),
        firing_alerts(enrichers.pagerduty.as_ref(), cluster.base_domain()),
    );

    info.limited_support_reasons = limited_support
        .map_err(|e| OsdctlError::fetch("limited support reasons", cluster_id, e))?;
    info.service_logs =
        service_logs.map_err(|e| OsdctlError::fetch("service logs", cluster_id, e))?;
    info.jira_issues = jira_issues.map_err(|e| OsdctlError::fetch("Jira issues", cluster_id, e))?;
    info.pd_alerts =
        pd_alerts.map_err(|e| OsdctlError::fetch("PagerDuty alerts", cluster_id, e))?;

    Ok(info)
}

async fn firing_alerts(
    connector: &dyn PagerDutyConnector,
    base_domain: &str,
) -> Result<IndexMap<String, Vec<Incident>>> {
    let client = connector.client_for(base_domain)?;
    let service_ids = client.service_ids().await?;
    client.firing_alerts_for_cluster(&service_ids).await
}
