//! Shared HTTP client for YouTube endpoints.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{YoutubeError, YoutubeResult};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Settings for YouTube access.
#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    /// Base URL, overridable for tests
    pub base_url: String,
    /// Per-source timeout
    pub source_timeout: Duration,
    /// Caption languages in order of preference
    pub preferred_languages: Vec<String>,
    /// Interface language sent to InnerTube and the search page
    pub interface_language: String,
    pub user_agent: String,
    /// Enable the transcript panel source
    pub enable_panel_source: bool,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            source_timeout: Duration::from_secs(5),
            preferred_languages: vec!["ja".to_string(), "en".to_string()],
            interface_language: "ja".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            enable_panel_source: false,
        }
    }
}

/// Thin wrapper over `reqwest::Client` bound to a base URL.
#[derive(Debug, Clone)]
pub struct YoutubeClient {
    http: Client,
    config: YoutubeConfig,
}

impl YoutubeClient {
    pub fn new(config: YoutubeConfig) -> YoutubeResult<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.source_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &YoutubeConfig {
        &self.config
    }

    /// Resolve a path against the base URL; absolute URLs pass through.
    pub fn url(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            format!("{}{}", self.config.base_url.trim_end_matches('/'), path_or_url)
        }
    }

    /// GET a page or document as text.
    pub async fn get_text(&self, path_or_url: &str) -> YoutubeResult<String> {
        let url = self.url(path_or_url);
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .header(
                reqwest::header::ACCEPT_LANGUAGE,
                self.config.interface_language.as_str(),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(YoutubeError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.text().await?)
    }

    /// POST a JSON body to an InnerTube endpoint and return the JSON reply.
    pub async fn post_json(&self, path: &str, body: &Value) -> YoutubeResult<Value> {
        let url = self.url(path);
        debug!(url = %url, "POST");

        let response = self.http.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(YoutubeError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.json().await?)
    }
}
