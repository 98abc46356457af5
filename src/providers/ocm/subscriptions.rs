use log::info;

use super::client::{quote, OcmClient};
use crate::error::Result;
use crate::models::Subscription;

const SUBSCRIPTIONS_PATH: &str = "api/accounts_mgmt/v1/subscriptions";

pub fn subscription_search(org_id: &str, status: Option<&str>, managed_only: bool) -> String {
    let mut search = format!("organization_id = {}", quote(org_id));
    if let Some(status) = status {
        search.push_str(&format!(" and status = {}", quote(status)));
    }
    if managed_only {
        search.push_str(" and managed = 'true'");
    }
    search
}

impl OcmClient {
    pub async fn search_subscriptions(
        &self,
        org_id: &str,
        status: Option<&str>,
        managed_only: bool,
    ) -> Result<Vec<Subscription>> {
        let search = subscription_search(org_id, status, managed_only);
        info!("Searching subscriptions: {search}");

        let subscriptions: Vec<Subscription> = self
            .list_all(
                SUBSCRIPTIONS_PATH,
                &[("search", search), ("fetchMetrics", "true".to_string())],
            )
            .await?;

        info!(
            "Found {} subscriptions for organization {org_id}",
            subscriptions.len()
        );
        Ok(subscriptions)
    }
}
