//! # Registry Proxy
//!
//! Forwards product searches to the food safety registry (`I0320`).
//!
//!
//!
//! ## Why a proxy
//! The registry key has to live in the request path, so the browser (or the
//! tracker) can never call the registry directly without leaking it. The proxy
//! injects the key and hands the upstream JSON back untouched.
//!
//! Passing the body through verbatim means the front-end can start reading new
//! upstream fields without a backend change.
//!
//!
//!
//! ## Failure mapping
//! - Non-success upstream status: same status, `{error, detail}` with the raw body
//! - Success but not JSON: `502`, `{error, detail}` with the raw body
//! - Transport failure: `500`, generic message, logged here only
//!
//!
//!
//! ## Commands
//!
//! Poke the registry directly.
//! ```sh
//! curl "https://openapi.foodsafetykorea.go.kr/api/$FOOD_API_KEY/I0320/json/1/5?PDT_NM=%EB%91%90%EB%B6%80"
//! ```
//!
//! Through the proxy.
//! ```sh
//! curl "http://localhost:1111/api/search?productName=%EB%91%90%EB%B6%80&startIdx=1&endIdx=100"
//! ```
use registry::{PageWindow, SERVICE_ID};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{error::AppError, state::AppState};

const UPSTREAM_FAILURE: &str = "외부 API 호출 실패";

pub fn search_url(
    base: &Url,
    api_key: &str,
    window: PageWindow,
    product_name: &str,
) -> Result<Url, AppError> {
    let mut url = base.clone();

    url.path_segments_mut()
        .map_err(|_| AppError::MisconfiguredUpstream)?
        .pop_if_empty()
        .push(api_key)
        .push(SERVICE_ID)
        .push("json")
        .push(&window.start().to_string())
        .push(&window.end().to_string());

    url.query_pairs_mut().append_pair("PDT_NM", product_name);

    Ok(url)
}

pub async fn forward_search(
    state: &AppState,
    api_key: &str,
    window: PageWindow,
    product_name: &str,
) -> Result<Value, AppError> {
    let url = search_url(&state.config.upstream_url, api_key, window, product_name)?;

    // The key sits in the url path, reqwest errors would carry it into the logs.
    let response = state
        .http
        .get(url)
        .send()
        .await
        .map_err(|e| e.without_url())?;
    let status = response.status();
    let body = response.text().await.map_err(|e| e.without_url())?;

    debug!(%status, bytes = body.len(), "Upstream responded");

    if !status.is_success() {
        warn!(%status, "Upstream returned failure");

        return Err(AppError::Upstream {
            status,
            message: upstream_message(&body),
            detail: body,
        });
    }

    serde_json::from_str(&body).map_err(|_| {
        warn!("Upstream returned a non-JSON body");
        AppError::UpstreamFormat { detail: body }
    })
}

fn upstream_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| UPSTREAM_FAILURE.to_string())
}
