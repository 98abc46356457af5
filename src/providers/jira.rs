use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::auth::Token;
use crate::error::{OsdctlError, Result};
use crate::models::Issue;
use crate::providers::{base_url, check_status, http_client, IssueSearch};

pub const DEFAULT_JIRA_URL: &str = "https://issues.redhat.com";
pub const OHSS_PROJECT: &str = "OHSS";

const SEARCH_FIELDS: &str = "summary,status,priority,created";
const MAX_RESULTS: u32 = 100;

pub struct JiraClient {
    client: Client,
    api_url: Url,
    token: Option<Token>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    start_at: u32,
    #[serde(default)]
    total: u32,
    #[serde(default)]
    issues: Vec<Issue>,
}

/// OHSS tickets that mention either form of the cluster ID, newest first.
pub fn cluster_issues_jql(cluster_id: &str, external_cluster_id: &str) -> String {
    let mut clauses = vec![format!("\"Cluster ID\" ~ \"{cluster_id}\"")];
    if !external_cluster_id.is_empty() {
        clauses.push(format!("\"Cluster ID\" ~ \"{external_cluster_id}\""));
    }

    format!(
        "project = \"{OHSS_PROJECT}\" AND ({}) ORDER BY created DESC",
        clauses.join(" OR ")
    )
}

impl JiraClient {
    pub fn new(url: &str, token: Option<Token>) -> Result<Self> {
        let client = http_client()?;

        let api_url = base_url(url)
            .map_err(|e| OsdctlError::Config(format!("Invalid Jira URL: {e}")))?
            .join("rest/api/2/")
            .map_err(|e| OsdctlError::Config(format!("Invalid Jira API URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    pub async fn search(&self, jql: &str) -> Result<Vec<Issue>> {
        let url = self
            .api_url
            .join("search")
            .map_err(|e| OsdctlError::Config(format!("Invalid Jira search URL: {e}")))?;
        let mut all_issues = Vec::new();

        loop {
            #[allow(clippy::cast_possible_truncation)]
            let start_at = all_issues.len() as u32;
            debug!("Jira search from {start_at}: {jql}");

            let request = self.client.get(url.clone()).query(&[
                ("jql", jql.to_string()),
                ("fields", SEARCH_FIELDS.to_string()),
                ("startAt", start_at.to_string()),
                ("maxResults", MAX_RESULTS.to_string()),
            ]);

            let response = check_status(self.auth_request(request).send().await?).await?;
            let page = response.json::<SearchResponse>().await?;

            let fetched = page.issues.len();
            all_issues.extend(page.issues);

            #[allow(clippy::cast_possible_truncation)]
            let seen = page.start_at + fetched as u32;
            if fetched == 0 || seen >= page.total {
                break;
            }
        }

        Ok(all_issues)
    }
}

#[async_trait]
impl IssueSearch for JiraClient {
    async fn issues_for_cluster(
        &self,
        cluster_id: &str,
        external_cluster_id: &str,
    ) -> Result<Vec<Issue>> {
        self.search(&cluster_issues_jql(cluster_id, external_cluster_id))
            .await
    }
}
