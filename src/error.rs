use thiserror::Error;

#[derive(Error, Debug)]
pub enum OsdctlError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to fetch cluster subscriptions: {0}")]
    Subscriptions(#[source] Box<OsdctlError>),

    #[error("failed to create OCM connection: {0}")]
    Connection(#[source] Box<OsdctlError>),

    #[error("failed to fetch {what} for cluster {cluster_id}: {source}")]
    Fetch {
        what: &'static str,
        cluster_id: String,
        #[source]
        source: Box<OsdctlError>,
    },

    #[error("failed to fetch context for one or more clusters: {0}")]
    Context(#[source] Box<OsdctlError>),

    #[error("cluster task failed: {0}")]
    Task(String),
}

impl OsdctlError {
    pub fn fetch(what: &'static str, cluster_id: &str, source: OsdctlError) -> Self {
        Self::Fetch {
            what,
            cluster_id: cluster_id.to_string(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, OsdctlError>;
