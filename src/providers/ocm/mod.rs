mod client;
mod clusters;
mod service_logs;
mod subscriptions;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use client::OcmClient;

use crate::auth::Token;
use crate::error::{OsdctlError, Result};
use crate::models::{Cluster, LimitedSupportReason, LogEntry, Subscription};
use crate::providers::{
    OcmConnection, OcmConnector, ServiceLogFilter, ServiceLogSource, SubscriptionSearch,
};

pub const DEFAULT_OCM_URL: &str = "https://api.openshift.com";

/// Connection settings for OCM. Every `connect` builds a fresh client.
pub struct Ocm {
    base_url: String,
    token: Option<Token>,
}

impl Ocm {
    pub fn new(base_url: impl Into<String>, token: Option<Token>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
        }
    }

    fn client(&self) -> Result<OcmClient> {
        let token = self.token.clone().ok_or_else(|| {
            OsdctlError::Config(
                "no OCM token configured; set OCM_TOKEN or run `ocm login`".to_string(),
            )
        })?;
        OcmClient::new(&self.base_url, token)
    }
}

#[async_trait]
impl OcmConnector for Ocm {
    async fn connect(&self) -> Result<Arc<dyn OcmConnection>> {
        Ok(Arc::new(self.client()?))
    }
}

#[async_trait]
impl SubscriptionSearch for Ocm {
    async fn search_subscriptions(
        &self,
        org_id: &str,
        status: Option<&str>,
        managed_only: bool,
    ) -> Result<Vec<Subscription>> {
        self.client()?
            .search_subscriptions(org_id, status, managed_only)
            .await
    }
}

#[async_trait]
impl ServiceLogSource for Ocm {
    async fn service_logs_since(
        &self,
        cluster_id: &str,
        since: DateTime<Utc>,
        filter: ServiceLogFilter,
    ) -> Result<Vec<LogEntry>> {
        self.client()?
            .fetch_service_logs_since(cluster_id, since, filter)
            .await
    }
}

#[async_trait]
impl OcmConnection for OcmClient {
    async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster> {
        self.fetch_cluster(cluster_id).await
    }

    async fn limited_support_reasons(
        &self,
        cluster_id: &str,
    ) -> Result<Vec<LimitedSupportReason>> {
        self.fetch_limited_support_reasons(cluster_id).await
    }
}
