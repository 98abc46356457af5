use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::auth::Token;
use crate::error::{OsdctlError, Result};
use crate::providers::jira::DEFAULT_JIRA_URL;
use crate::providers::ocm::DEFAULT_OCM_URL;
use crate::providers::pagerduty::DEFAULT_PAGERDUTY_URL;

/// Settings shared by every command, read from `~/.config/osdctl`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ocm_url: Option<String>,
    pub ocm_token: Option<Token>,
    pub jira_url: Option<String>,
    pub jira_token: Option<Token>,
    pub pagerduty_url: Option<String>,
    pub pd_user_token: Option<Token>,
    pub pd_oauth_token: Option<Token>,
}

/// The bits of `ocm login`'s `ocm.json` we can reuse.
#[derive(Debug, Default, Deserialize)]
pub struct OcmCliConfig {
    pub access_token: Option<String>,
    pub url: Option<String>,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub ocm_url: Option<String>,
    pub ocm_token: Option<String>,
    pub jira_token: Option<String>,
    pub pd_user_token: Option<String>,
    pub pd_oauth_token: Option<String>,
}

fn config_dir() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".config"))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("osdctl"))
}

fn ocm_cli_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("ocm").join("ocm.json"))
}

impl Settings {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Reads `path`, or the default location when `None`. Only an explicitly
    /// requested file has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match default_config_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_yaml(&contents).map_err(|e| {
                    OsdctlError::Config(format!("failed to parse {}: {e}", path.display()))
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                debug!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fills OCM settings still missing from `ocm login` state.
    pub fn with_ocm_cli_config(mut self, ocm: OcmCliConfig) -> Self {
        if self.ocm_token.is_none() {
            self.ocm_token = Token::non_empty(ocm.access_token.as_deref());
        }
        if self.ocm_url.is_none() {
            self.ocm_url = ocm.url.filter(|u| !u.is_empty());
        }
        self
    }

    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(url) = overrides.ocm_url.as_ref().filter(|u| !u.is_empty()) {
            self.ocm_url = Some(url.clone());
        }
        if let Some(token) = Token::non_empty(overrides.ocm_token.as_deref()) {
            self.ocm_token = Some(token);
        }
        if let Some(token) = Token::non_empty(overrides.jira_token.as_deref()) {
            self.jira_token = Some(token);
        }
        if let Some(token) = Token::non_empty(overrides.pd_user_token.as_deref()) {
            self.pd_user_token = Some(token);
        }
        if let Some(token) = Token::non_empty(overrides.pd_oauth_token.as_deref()) {
            self.pd_oauth_token = Some(token);
        }
        self
    }

    /// Flags and environment first, then the osdctl file, then `ocm.json`.
    pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let ocm = load_ocm_cli_config();
        Ok(Self::load(path)?
            .with_ocm_cli_config(ocm)
            .with_overrides(overrides))
    }

    pub fn ocm_url(&self) -> &str {
        self.ocm_url.as_deref().unwrap_or(DEFAULT_OCM_URL)
    }

    pub fn jira_url(&self) -> &str {
        self.jira_url.as_deref().unwrap_or(DEFAULT_JIRA_URL)
    }

    pub fn pagerduty_url(&self) -> &str {
        self.pagerduty_url.as_deref().unwrap_or(DEFAULT_PAGERDUTY_URL)
    }
}

fn load_ocm_cli_config() -> OcmCliConfig {
    let Some(path) = ocm_cli_config_path() else {
        return OcmCliConfig::default();
    };

    std::fs::read_to_string(&path)
        .ok()
        .and_then(|contents| match serde_json::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                debug!("Ignoring unreadable {}: {e}", path.display());
                None
            }
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_reads_known_keys() {
        let settings = Settings::from_yaml(
            r"
jira_token: jira-pat
pd_user_token: pd-user
pagerduty_url: https://pd.example.com
unrelated_key: ignored
",
        )
        .unwrap();

        assert_eq!(settings.jira_token.unwrap().as_str(), "jira-pat");
        assert_eq!(settings.pd_user_token.unwrap().as_str(), "pd-user");
        assert!(settings.pd_oauth_token.is_none());
        assert_eq!(settings.pagerduty_url.as_deref(), Some("https://pd.example.com"));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::from_yaml("  \n").unwrap();

        assert_eq!(settings.ocm_url(), DEFAULT_OCM_URL);
        assert_eq!(settings.jira_url(), DEFAULT_JIRA_URL);
        assert_eq!(settings.pagerduty_url(), DEFAULT_PAGERDUTY_URL);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(Settings::from_yaml("jira_token: [unterminated").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("osdctl-config-that-does-not-exist.yaml");

        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let path = std::env::temp_dir().join(format!("osdctl-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "ocm_url: https://api.stage.openshift.com\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.ocm_url(), "https://api.stage.openshift.com");
    }

    #[test]
    fn test_ocm_cli_config_only_fills_gaps() {
        let settings = Settings {
            ocm_url: Some("https://api.integration.openshift.com".to_string()),
            ..Settings::default()
        }
        .with_ocm_cli_config(OcmCliConfig {
            access_token: Some("from-ocm-json".to_string()),
            url: Some("https://api.openshift.com".to_string()),
        });

        assert_eq!(settings.ocm_token.unwrap().as_str(), "from-ocm-json");
        assert_eq!(
            settings.ocm_url.as_deref(),
            Some("https://api.integration.openshift.com")
        );
    }

    #[test]
    fn test_overrides_win_and_blank_values_are_ignored() {
        let settings = Settings::from_yaml("jira_token: from-file\npd_user_token: from-file\n")
            .unwrap()
            .with_overrides(&Overrides {
                jira_token: Some("from-env".to_string()),
                pd_user_token: Some(String::new()),
                ..Overrides::default()
            });

        assert_eq!(settings.jira_token.unwrap().as_str(), "from-env");
        assert_eq!(settings.pd_user_token.unwrap().as_str(), "from-file");
    }
}
