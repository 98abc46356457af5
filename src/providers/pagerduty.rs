use async_trait::async_trait;
use futures::future::try_join_all;
use indexmap::IndexMap;
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::auth::Token;
use crate::error::{OsdctlError, Result};
use crate::models::{Incident, ObjectRef};
use crate::providers::{base_url, check_status, http_client, PagerDutyClient, PagerDutyConnector};

pub const DEFAULT_PAGERDUTY_URL: &str = "https://api.pagerduty.com";

const PAGE_LIMIT: u32 = 100;
const FIRING_STATUSES: [&str; 2] = ["triggered", "acknowledged"];
const API_ACCEPT: &str = "application/vnd.pagerduty+json;version=2";

/// Credentials and endpoint for building per-cluster PagerDuty clients.
pub struct PagerDuty {
    base_url: String,
    user_token: Option<Token>,
    oauth_token: Option<Token>,
}

impl PagerDuty {
    pub fn new(
        base_url: impl Into<String>,
        user_token: Option<Token>,
        oauth_token: Option<Token>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            user_token,
            oauth_token,
        }
    }

    /// OAuth wins over a user API token when both are configured.
    fn authorization(&self) -> Result<String> {
        match (&self.oauth_token, &self.user_token) {
            (Some(oauth), _) => Ok(format!("Bearer {}", oauth.as_str())),
            (None, Some(user)) => Ok(format!("Token token={}", user.as_str())),
            (None, None) => Err(OsdctlError::Config(
                "no PagerDuty token configured; set pd_user_token or pd_oauth_token".to_string(),
            )),
        }
    }
}

impl PagerDutyConnector for PagerDuty {
    fn client_for(&self, base_domain: &str) -> Result<Box<dyn PagerDutyClient>> {
        let api_url = base_url(&self.base_url)
            .map_err(|e| OsdctlError::Config(format!("Invalid PagerDuty URL: {e}")))?;

        Ok(Box::new(PagerDutyApi {
            client: http_client()?,
            api_url,
            authorization: self.authorization()?,
            base_domain: base_domain.to_string(),
        }))
    }
}

pub struct PagerDutyApi {
    client: Client,
    api_url: Url,
    authorization: String,
    base_domain: String,
}

#[derive(Debug, Deserialize)]
struct ServicesPage {
    #[serde(default)]
    services: Vec<ObjectRef>,
    #[serde(default)]
    more: bool,
}

#[derive(Debug, Deserialize)]
struct IncidentsPage {
    #[serde(default)]
    incidents: Vec<Incident>,
    #[serde(default)]
    more: bool,
}

impl PagerDutyApi {
    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        offset: u32,
    ) -> Result<T> {
        let url = self
            .api_url
            .join(path)
            .map_err(|e| OsdctlError::Config(format!("Invalid PagerDuty endpoint {path}: {e}")))?;
        debug!("GET {url} (offset {offset})");

        let request = self
            .client
            .get(url)
            .header(ACCEPT, API_ACCEPT)
            .header(AUTHORIZATION, &self.authorization)
            .query(query)
            .query(&[("limit", PAGE_LIMIT), ("offset", offset)]);

        let response = check_status(request.send().await?).await?;

        Ok(response.json::<T>().await?)
    }

    async fn firing_incidents(&self, service_id: &str) -> Result<Vec<Incident>> {
        let mut query = vec![("service_ids[]", service_id)];
        query.extend(FIRING_STATUSES.iter().map(|status| ("statuses[]", *status)));

        let mut incidents = Vec::new();
        let mut offset = 0;
        loop {
            let page: IncidentsPage = self.get_page("incidents", &query, offset).await?;
            #[allow(clippy::cast_possible_truncation)]
            let fetched = page.incidents.len() as u32;
            incidents.extend(page.incidents);

            if !page.more || fetched == 0 {
                break;
            }
            offset += fetched;
        }

        Ok(incidents)
    }
}

#[async_trait]
impl PagerDutyClient for PagerDutyApi {
    async fn service_ids(&self) -> Result<Vec<String>> {
        // An empty query would match every service in the account.
        if self.base_domain.is_empty() {
            debug!("No base domain, skipping PagerDuty service lookup");
            return Ok(Vec::new());
        }

        let query = [("query", self.base_domain.as_str())];
        let mut ids = Vec::new();
        let mut offset = 0;

        loop {
            let page: ServicesPage = self.get_page("services", &query, offset).await?;
            #[allow(clippy::cast_possible_truncation)]
            let fetched = page.services.len() as u32;
            ids.extend(page.services.into_iter().map(|s| s.id));

            if !page.more || fetched == 0 {
                break;
            }
            offset += fetched;
        }

        debug!(
            "Found {} PagerDuty services for {}",
            ids.len(),
            self.base_domain
        );
        Ok(ids)
    }

    async fn firing_alerts_for_cluster(
        &self,
        service_ids: &[String],
    ) -> Result<IndexMap<String, Vec<Incident>>> {
        let per_service = try_join_all(service_ids.iter().map(|id| async move {
            let incidents = self.firing_incidents(id).await?;
            Ok::<_, OsdctlError>((id.clone(), incidents))
        }))
        .await?;

        Ok(per_service.into_iter().collect())
    }
}
