use std::future::Future;

use registry::{PageWindow, ProductRecord, SearchResponse};
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_PROXY_FAILURE: &str = "서버 호출 오류";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{0}")]
    Proxy(String),

    #[error("서버 호출 중 오류가 발생했습니다.")]
    Transport(#[from] reqwest::Error),

    #[error("잘못된 프록시 주소입니다: {0}")]
    BadProxyUrl(String),
}

/// Anything that can hand back one window of registry rows.
pub trait PageSource: Send + Sync {
    fn fetch_page(
        &self,
        query: &str,
        window: PageWindow,
    ) -> impl Future<Output = Result<Vec<ProductRecord>, FetchError>> + Send;
}

#[derive(Deserialize)]
struct ProxyFailure {
    error: Option<String>,
}

/// Talks to the proxy's `/api/search`.
#[derive(Clone)]
pub struct ProxyClient {
    http: Client,
    search_url: Url,
}

impl ProxyClient {
    pub fn new(proxy_url: &str) -> Result<Self, FetchError> {
        let search_url = Url::parse(proxy_url)
            .and_then(|base| base.join("api/search"))
            .map_err(|e| FetchError::BadProxyUrl(format!("{proxy_url} ({e})")))?;

        Ok(Self {
            http: Client::new(),
            search_url,
        })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }
}

impl PageSource for ProxyClient {
    async fn fetch_page(
        &self,
        query: &str,
        window: PageWindow,
    ) -> Result<Vec<ProductRecord>, FetchError> {
        let response = self
            .http
            .get(self.search_url.clone())
            .query(&[
                ("productName", query.to_string()),
                ("startIdx", window.start().to_string()),
                ("endIdx", window.end().to_string()),
            ])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ProxyFailure>()
                .await
                .ok()
                .and_then(|failure| failure.error)
                .unwrap_or_else(|| DEFAULT_PROXY_FAILURE.to_string());

            warn!(%status, reason = %message, "Proxy refused page");

            return Err(FetchError::Proxy(message));
        }

        let rows = response.json::<SearchResponse>().await?.into_rows();

        debug!(
            start = window.start(),
            end = window.end(),
            rows = rows.len(),
            "Fetched page"
        );

        Ok(rows)
    }
}
