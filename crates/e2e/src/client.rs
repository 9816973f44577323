//! HTTP client for the CI server's JSON API and text views

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, trace};
use url::Url;

use ciprobe_common::{HttpConfig, StatusDocument};

use crate::error::{E2eError, E2eResult};
use crate::fetcher::{Navigator, StatusSource};

/// reqwest-backed implementation of both collaborator traits
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    credentials: Option<(String, Option<String>)>,
}

impl HttpClient {
    /// Build a client whose timeouts come from `config`
    pub fn new(config: &HttpConfig) -> E2eResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(concat!("ciprobe/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let credentials = config
            .username
            .clone()
            .map(|user| (user, config.api_token.clone()));

        Ok(Self { http, credentials })
    }

    async fn get(&self, url: &Url) -> E2eResult<reqwest::Response> {
        let mut request = self.http.get(url.clone());
        if let Some((user, token)) = &self.credentials {
            request = request.basic_auth(user, token.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();
        trace!(%url, %status, "GET");

        if status == StatusCode::NOT_FOUND {
            return Err(E2eError::NotFound { url: url.to_string() });
        }
        if !status.is_success() {
            return Err(E2eError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl StatusSource for HttpClient {
    async fn fetch_status(&self, location: &Url) -> E2eResult<StatusDocument> {
        let url = location.join("api/json")?;
        let body = self.get(&url).await?.text().await?;

        StatusDocument::from_json(&body).map_err(|e| E2eError::MalformedDocument {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl Navigator for HttpClient {
    async fn visit(&self, url: &Url) -> E2eResult<()> {
        debug!(%url, "visit");
        // Drain the body so the page is fully served
        self.get(url).await?.bytes().await?;
        Ok(())
    }

    async fn read_text(&self, url: &Url) -> E2eResult<String> {
        Ok(self.get(url).await?.text().await?)
    }
}
