use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use registry::{PageWindow, is_searchable};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::{error::AppError, search::forward_search, state::AppState};

#[derive(Deserialize, Debug, Default)]
pub struct SearchParams {
    #[serde(rename = "productName", default)]
    pub product_name: String,

    #[serde(rename = "startIdx")]
    pub start_idx: Option<String>,

    #[serde(rename = "endIdx")]
    pub end_idx: Option<String>,
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, AppError> {
    let product_name = params.product_name.trim();

    if !is_searchable(product_name) {
        return Err(AppError::ProductNameTooShort);
    }

    let window = PageWindow::parse(params.start_idx.as_deref(), params.end_idx.as_deref())?;

    let api_key = state
        .credentials
        .api_key()
        .ok_or_else(|| AppError::MissingCredential {
            name: state.config.api_key_name.clone(),
        })?;

    info!(
        product_name,
        start = window.start(),
        end = window.end(),
        "Forwarding search"
    );

    let body = forward_search(&state, &api_key, window, product_name).await?;

    Ok(Json(body))
}
