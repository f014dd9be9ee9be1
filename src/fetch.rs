use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Instant;

use reqwest::Url;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::config::FetchConfig;
use crate::error::FetchError;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// A retrieved HTML page. `url` is the final URL after redirects.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub body: String,
}

/// Supplies pages to the discovery pipelines.
pub trait Fetcher: Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Page, FetchError>> + Send;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> reqwest::Result<HttpFetcher> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        let language = HeaderValue::from_str(&config.accept_language)
            .unwrap_or_else(|_| HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(ACCEPT_LANGUAGE, language);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let start = Instant::now();
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = res.status();
        log::debug!("fetched {url}: {status} in {:?}", start.elapsed());
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_type) = res.headers().get(CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default().to_ascii_lowercase();
            if !content_type.contains("html") {
                return Err(FetchError::NotHtml {
                    url: url.to_string(),
                    content_type,
                });
            }
        }

        let final_url = res.url().clone();
        let body = res.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        Ok(Page {
            url: final_url,
            body,
        })
    }
}

/// Serves pre-fetched HTML by exact URL. Records every requested URL in order.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> MemoryFetcher {
        MemoryFetcher::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> MemoryFetcher {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        match self.pages.get(url) {
            Some(body) => Ok(Page {
                url: parsed,
                body: body.clone(),
            }),
            None => Err(FetchError::NotFound(url.to_string())),
        }
    }
}
