use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::config::{Overrides, Settings};
use crate::org::{self, OutputFormat};
use crate::providers::ocm::Ocm;

#[derive(Parser)]
#[command(name = "osdctl")]
#[command(author, version, about = "OSD/ROSA SRE tooling", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ~/.config/osdctl)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    credentials: Credentials,
}

#[derive(Args)]
struct Credentials {
    /// OCM API URL
    #[arg(long, env = "OCM_URL", global = true)]
    ocm_url: Option<String>,

    /// OCM access token (falls back to `ocm login` state)
    #[arg(long, env = "OCM_TOKEN", global = true, hide_env_values = true)]
    ocm_token: Option<String>,

    /// Jira personal access token
    #[arg(long, env = "JIRA_API_TOKEN", global = true, hide_env_values = true)]
    jira_token: Option<String>,

    /// PagerDuty user API token
    #[arg(long, env = "PD_USER_TOKEN", global = true, hide_env_values = true)]
    pd_user_token: Option<String>,

    /// PagerDuty OAuth token
    #[arg(long, env = "PD_OAUTH_TOKEN", global = true, hide_env_values = true)]
    pd_oauth_token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Organization related utilities
    #[command(subcommand)]
    Org(OrgCommand),
}

#[derive(Subcommand)]
enum OrgCommand {
    /// Fetch support context for every active cluster in an organization
    Context {
        /// OCM organization ID
        org_id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// List the cluster subscriptions of an organization
    Clusters {
        /// OCM organization ID
        org_id: String,

        /// Only list active subscriptions
        #[arg(long, default_value_t = false)]
        active: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

impl From<&Credentials> for Overrides {
    fn from(credentials: &Credentials) -> Self {
        Self {
            ocm_url: credentials.ocm_url.clone(),
            ocm_token: credentials.ocm_token.clone(),
            jira_token: credentials.jira_token.clone(),
            pd_user_token: credentials.pd_user_token.clone(),
            pd_oauth_token: credentials.pd_oauth_token.clone(),
        }
    }
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let overrides = Overrides::from(&self.credentials);
        let settings = Settings::resolve(self.config.as_deref(), &overrides)?;

        match &self.command {
            Commands::Org(OrgCommand::Context { org_id, output }) => {
                info!("Collecting context for organization: {org_id}");
                let fetcher = org::context_fetcher(&settings)?;
                org::run_context(&fetcher, org_id, *output).await
            }
            Commands::Org(OrgCommand::Clusters {
                org_id,
                active,
                output,
            }) => {
                let ocm = Ocm::new(settings.ocm_url(), settings.ocm_token.clone());
                org::run_clusters(&ocm, org_id, *active, *output).await
            }
        }
    }
}
