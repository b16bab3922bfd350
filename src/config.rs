use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::http_client::HttpClientConfig;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the upstream manga API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL of the cover image CDN.
    #[serde(default = "default_cdn_base_url")]
    pub cdn_base_url: String,

    /// Path prefix the relay is mounted under.
    #[serde(default = "default_relay_prefix")]
    pub relay_prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Timeout for upstream requests in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retry attempts for transient upstream failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial retry delay in milliseconds.
    #[serde(default = "default_initial_retry_delay")]
    pub initial_retry_delay_ms: u64,

    /// Maximum retry delay in milliseconds.
    #[serde(default = "default_max_retry_delay")]
    pub max_retry_delay_ms: u64,

    /// User agent sent upstream.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Items per catalog page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Translated languages requested by default.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReaderConfig {
    /// Page image quality: "data" (full) or "data-saver".
    #[serde(default = "default_quality")]
    pub quality: String,
}

fn default_api_base_url() -> String {
    crate::api::DEFAULT_API_BASE_URL.to_string()
}
fn default_cdn_base_url() -> String {
    crate::helpers::DEFAULT_CDN_BASE_URL.to_string()
}
fn default_relay_prefix() -> String {
    "/api/md-proxy".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_max_retries() -> usize {
    2
}
fn default_initial_retry_delay() -> u64 {
    500
}
fn default_max_retry_delay() -> u64 {
    8000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
        .to_string()
}
fn default_page_size() -> u32 {
    24
}
fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}
fn default_quality() -> String {
    "data".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            cdn_base_url: default_cdn_base_url(),
            relay_prefix: default_relay_prefix(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            initial_retry_delay_ms: default_initial_retry_delay(),
            max_retry_delay_ms: default_max_retry_delay(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            languages: default_languages(),
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            quality: default_quality(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            http: HttpConfig::default(),
            catalog: CatalogConfig::default(),
            reader: ReaderConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let path = Path::new("config.toml");
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                match toml::from_str::<Config>(&content) {
                    Ok(cfg) => return cfg,
                    Err(e) => log::warn!("config.toml is invalid, using defaults: {}", e),
                }
            }
        }
        Self::default()
    }
}

impl HttpConfig {
    /// Build the HTTP client wrapper from this configuration.
    pub fn create_http_client(
        &self,
    ) -> Result<crate::http_client::ApiHttpClient, reqwest::Error> {
        let config = HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            initial_retry_delay_ms: self.initial_retry_delay_ms,
            max_retry_delay_ms: self.max_retry_delay_ms,
            user_agent: self.user_agent.clone(),
        };
        crate::http_client::ApiHttpClient::with_config(config)
    }
}
