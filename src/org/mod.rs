pub mod context;
pub mod view;

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use clap::ValueEnum;
use log::info;

use crate::config::Settings;
use crate::org::context::{ContextFetcher, Enrichers, OrgContext, StderrProgress, ACTIVE_STATUS};
use crate::providers::jira::JiraClient;
use crate::providers::ocm::Ocm;
use crate::providers::pagerduty::PagerDuty;
use crate::providers::SubscriptionSearch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn context_fetcher(settings: &Settings) -> Result<ContextFetcher> {
    let ocm = Arc::new(Ocm::new(settings.ocm_url(), settings.ocm_token.clone()));
    let jira = JiraClient::new(settings.jira_url(), settings.jira_token.clone())?;
    let pagerduty = PagerDuty::new(
        settings.pagerduty_url(),
        settings.pd_user_token.clone(),
        settings.pd_oauth_token.clone(),
    );

    Ok(ContextFetcher::new(
        ocm.clone(),
        ocm.clone(),
        Enrichers {
            service_logs: ocm,
            issues: Arc::new(jira),
            pagerduty: Arc::new(pagerduty),
        },
        Arc::new(StderrProgress),
    ))
}

/// `org context`: prints whatever was gathered, then fails if any cluster did.
pub async fn run_context(
    fetcher: &ContextFetcher,
    org_id: &str,
    output: OutputFormat,
) -> Result<()> {
    let context = fetcher.fetch_context(org_id).await?;
    report_context(context, output, &mut std::io::stdout().lock())
}

fn report_context(context: OrgContext, output: OutputFormat, out: &mut impl Write) -> Result<()> {
    let OrgContext { clusters, failure } = context;

    if failure.is_none() || !clusters.is_empty() {
        let rendered = match output {
            OutputFormat::Table => view::render_table(&clusters),
            OutputFormat::Json => view::render_json(&clusters)?,
        };
        writeln!(out, "{rendered}")?;
    }

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// `org clusters`: lists the organization's subscriptions.
pub async fn run_clusters(
    search: &dyn SubscriptionSearch,
    org_id: &str,
    active_only: bool,
    output: OutputFormat,
) -> Result<()> {
    let status = active_only.then_some(ACTIVE_STATUS);
    let subscriptions = search.search_subscriptions(org_id, status, false).await?;
    info!(
        "Organization {org_id} has {} subscriptions",
        subscriptions.len()
    );

    let rendered = match output {
        OutputFormat::Table => view::render_subscriptions_table(&subscriptions),
        OutputFormat::Json => view::render_subscriptions_json(&subscriptions)?,
    };
    println!("{rendered}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OsdctlError;
    use crate::models::ClusterInfo;

    fn cluster(id: &str) -> ClusterInfo {
        ClusterInfo {
            name: format!("{id}-name"),
            id: id.to_string(),
            version: "4.15.9".to_string(),
            cloud_provider: "aws".to_string(),
            plan: "MOA".to_string(),
            ..ClusterInfo::default()
        }
    }

    fn cluster_failure(cluster_id: &str) -> OsdctlError {
        OsdctlError::Context(Box::new(OsdctlError::fetch(
            "Jira issues",
            cluster_id,
            OsdctlError::Api("401 Unauthorized".to_string()),
        )))
    }

    #[test]
    fn test_report_prints_clusters_on_success() {
        let context = OrgContext {
            clusters: vec![cluster("c1"), cluster("c2")],
            failure: None,
        };
        let mut out = Vec::new();

        report_context(context, OutputFormat::Json, &mut out).unwrap();

        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_report_prints_empty_org_as_empty_list() {
        let mut out = Vec::new();

        report_context(OrgContext::default(), OutputFormat::Json, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap().trim(), "[]");
    }

    #[test]
    fn test_report_prints_partial_results_then_fails() {
        let context = OrgContext {
            clusters: vec![cluster("c1")],
            failure: Some(cluster_failure("c2")),
        };
        let mut out = Vec::new();

        let err = report_context(context, OutputFormat::Table, &mut out).unwrap_err();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("c1-name"));
        assert!(!printed.contains("c2"));
        assert!(err
            .to_string()
            .contains("failed to fetch context for one or more clusters"));
    }

    #[test]
    fn test_report_prints_nothing_when_every_cluster_failed() {
        let context = OrgContext {
            clusters: Vec::new(),
            failure: Some(cluster_failure("c1")),
        };
        let mut out = Vec::new();

        let err = report_context(context, OutputFormat::Json, &mut out).unwrap_err();

        assert!(out.is_empty());
        assert!(err.to_string().contains("Jira issues for cluster c1"));
    }
}
