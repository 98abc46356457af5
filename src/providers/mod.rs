pub mod jira;
pub mod ocm;
pub mod pagerduty;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use reqwest::Client;
use url::Url;

use crate::error::{OsdctlError, Result};
use crate::models::{Cluster, Incident, Issue, LimitedSupportReason, LogEntry, Subscription};

pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("osdctl/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| OsdctlError::Config(format!("Failed to create HTTP client: {e}")))
}

/// Parses a service base URL so that `join` appends to, rather than replaces, its path.
pub fn base_url(base_url: &str) -> std::result::Result<Url, url::ParseError> {
    if base_url.ends_with('/') {
        Url::parse(base_url)
    } else {
        Url::parse(&format!("{base_url}/"))
    }
}

/// Turns a non-2xx response into an `Api` error carrying the response body.
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    Err(OsdctlError::Api(format!("{url}: {status} - {body}")))
}

#[async_trait]
pub trait SubscriptionSearch: Send + Sync {
    async fn search_subscriptions(
        &self,
        org_id: &str,
        status: Option<&str>,
        managed_only: bool,
    ) -> Result<Vec<Subscription>>;
}

/// Opens OCM connections. A connection closes when its last handle drops.
#[async_trait]
pub trait OcmConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn OcmConnection>>;
}

/// A connection shared by every task of one fetch; must be safe for concurrent use.
#[async_trait]
pub trait OcmConnection: Send + Sync {
    async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster>;

    async fn limited_support_reasons(&self, cluster_id: &str)
        -> Result<Vec<LimitedSupportReason>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceLogFilter {
    /// Include internal-only entries alongside customer-visible ones.
    pub all_messages: bool,
    /// Only internal entries. Takes precedence over `all_messages`.
    pub internal_only: bool,
}

#[async_trait]
pub trait ServiceLogSource: Send + Sync {
    async fn service_logs_since(
        &self,
        cluster_id: &str,
        since: DateTime<Utc>,
        filter: ServiceLogFilter,
    ) -> Result<Vec<LogEntry>>;
}

#[async_trait]
pub trait IssueSearch: Send + Sync {
    async fn issues_for_cluster(
        &self,
        cluster_id: &str,
        external_cluster_id: &str,
    ) -> Result<Vec<Issue>>;
}

pub trait PagerDutyConnector: Send + Sync {
    fn client_for(&self, base_domain: &str) -> Result<Box<dyn PagerDutyClient>>;
}

#[async_trait]
pub trait PagerDutyClient: Send + Sync {
    async fn service_ids(&self) -> Result<Vec<String>>;

    async fn firing_alerts_for_cluster(
        &self,
        service_ids: &[String],
    ) -> Result<IndexMap<String, Vec<Incident>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let url = base_url("https://gateway.example.com/ocm").unwrap();

        assert_eq!(
            url.join("api/clusters_mgmt/v1/clusters").unwrap().as_str(),
            "https://gateway.example.com/ocm/api/clusters_mgmt/v1/clusters"
        );
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(base_url("not a url").is_err());
    }
}
