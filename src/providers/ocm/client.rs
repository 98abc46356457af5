use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::auth::Token;
use crate::error::{OsdctlError, Result};
use crate::providers::{base_url, check_status, http_client};

const PAGE_SIZE: u32 = 100;

pub struct OcmClient {
    pub client: Client,
    pub api_url: Url,
    pub token: Token,
}

/// One page of an OCM collection response.
#[derive(Debug, Deserialize)]
pub struct ListPage<T> {
    #[serde(default)]
    pub total: u32,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl OcmClient {
    pub fn new(url: &str, token: Token) -> Result<Self> {
        let client = http_client()?;

        let api_url = base_url(url)
            .map_err(|e| OsdctlError::Config(format!("Invalid OCM URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    pub fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(self.token.as_str())
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| OsdctlError::Config(format!("Invalid OCM endpoint {path}: {e}")))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("GET {url}");

        let response = check_status(self.auth_request(self.client.get(url)).send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    /// Walks every page of a collection, carrying `query` on each request.
    pub async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = self.endpoint(path)?;
        let mut all_items = Vec::new();
        let mut page = 1;

        loop {
            debug!("GET {url} (page {page})");
            let request = self
                .client
                .get(url.clone())
                .query(query)
                .query(&[("page", page), ("size", PAGE_SIZE)]);

            let response = check_status(self.auth_request(request).send().await?).await?;
            let list = response.json::<ListPage<T>>().await?;

            let fetched = list.items.len();
            all_items.extend(list.items);

            #[allow(clippy::cast_possible_truncation)]
            let reached_total = list.total > 0 && all_items.len() as u32 >= list.total;
            if fetched < PAGE_SIZE as usize || reached_total {
                break;
            }

            page += 1;
        }

        Ok(all_items)
    }
}

pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
