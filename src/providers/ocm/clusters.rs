use log::debug;

use super::client::OcmClient;
use crate::error::Result;
use crate::models::{Cluster, LimitedSupportReason};

fn cluster_path(cluster_id: &str) -> String {
    format!(
        "api/clusters_mgmt/v1/clusters/{}",
        urlencoding::encode(cluster_id)
    )
}

impl OcmClient {
    pub async fn fetch_cluster(&self, cluster_id: &str) -> Result<Cluster> {
        self.get(&cluster_path(cluster_id)).await
    }

    pub async fn fetch_limited_support_reasons(
        &self,
        cluster_id: &str,
    ) -> Result<Vec<LimitedSupportReason>> {
        let path = format!("{}/limited_support_reasons", cluster_path(cluster_id));
        let reasons: Vec<LimitedSupportReason> = self.list_all(&path, &[]).await?;

        debug!(
            "Cluster {cluster_id} has {} limited support reasons",
            reasons.len()
        );
        Ok(reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Token;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_fetch_cluster() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/clusters_mgmt/v1/clusters/c1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "kind": "Cluster",
                    "id": "c1",
                    "external_id": "ext-1",
                    "name": "prod-eu",
                    "openshift_version": "4.16.2",
                    "state": "ready",
                    "cloud_provider": {"kind": "CloudProviderLink", "id": "gcp"},
                    "dns": {"base_domain": "x1y2.p1.openshiftapps.com"}
                }"#,
            )
            .create_async()
            .await;

        let client = OcmClient::new(&server.url(), Token::from("ocm-token")).unwrap();
        let cluster = client.fetch_cluster("c1").await.unwrap();

        assert_eq!(cluster.external_id, "ext-1");
        assert_eq!(cluster.openshift_version, "4.16.2");
        assert_eq!(cluster.cloud_provider_id(), "gcp");
        assert_eq!(cluster.base_domain(), "x1y2.p1.openshiftapps.com");
    }

    #[tokio::test]
    async fn test_fetch_limited_support_reasons() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/clusters_mgmt/v1/clusters/c1/limited_support_reasons")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "kind": "LimitedSupportReasonList",
                    "page": 1,
                    "size": 1,
                    "total": 1,
                    "items": [{
                        "id": "lsr-1",
                        "summary": "Cluster is in Limited Support due to unsupported cloud provider configuration",
                        "details": "Security group rules were modified",
                        "detection_type": "manual",
                        "creation_timestamp": "2024-05-01T10:00:00Z"
                    }]
                }"#,
            )
            .create_async()
            .await;

        let client = OcmClient::new(&server.url(), Token::from("ocm-token")).unwrap();
        let reasons = client.fetch_limited_support_reasons("c1").await.unwrap();

        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].detection_type, "manual");
        assert!(reasons[0].creation_timestamp.is_some());
    }
}
