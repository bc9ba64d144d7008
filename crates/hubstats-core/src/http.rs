//! Blocking HTTP transport over async reqwest.
//!
//! Uses a current-thread tokio runtime owned by the transport and presents a
//! sync interface; requests are issued one at a time.

use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::error::FetchError;

/// Raw response as seen by the retry layer
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Single GET request, no retries.
///
/// Implemented by [`HttpTransport`] for real traffic and by scripted doubles in tests.
pub trait Transport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// Client settings applied when building the transport
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(120),
            user_agent: concat!("hubstats/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// reqwest-backed transport.
///
/// One client per run so connections are reused across pages.
pub struct HttpTransport {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpTransport {
    pub fn new(settings: &HttpSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                message: format!("failed to build tokio runtime: {e}"),
            })?;
        Ok(Self { client, runtime })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let network_err = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        self.runtime.block_on(async {
            let response = self.client.get(url).send().await.map_err(network_err)?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.text().await.map_err(network_err)?;
            Ok::<_, FetchError>(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}
