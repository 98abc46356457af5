use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;

use super::client::{quote, OcmClient};
use crate::error::Result;
use crate::models::LogEntry;
use crate::providers::ServiceLogFilter;

pub fn service_log_search(since: DateTime<Utc>, filter: ServiceLogFilter) -> String {
    let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut search = format!("created_at >= {}", quote(&since));

    if filter.internal_only {
        search.push_str(" and internal_only = 'true'");
    } else if !filter.all_messages {
        search.push_str(" and internal_only = 'false'");
    }

    search
}

impl OcmClient {
    pub async fn fetch_service_logs_since(
        &self,
        cluster_id: &str,
        since: DateTime<Utc>,
        filter: ServiceLogFilter,
    ) -> Result<Vec<LogEntry>> {
        let path = format!(
            "api/service_logs/v1/clusters/{}/cluster_logs",
            urlencoding::encode(cluster_id)
        );
        let search = service_log_search(since, filter);

        let entries: Vec<LogEntry> = self
            .list_all(
                &path,
                &[
                    ("search", search),
                    ("orderBy", "created_at desc".to_string()),
                ],
            )
            .await?;

        debug!("Cluster {cluster_id} has {} recent service logs", entries.len());
        Ok(entries)
    }
}
