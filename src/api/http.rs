//! Reqwest-backed backend client.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::api::{ApiError, CatalogApi, OrdersApi};
use crate::config::Config;
use crate::orders::{OrderDraft, OrderReceipt};
use crate::products::{Banner, Category, Product};

/// Error codes the backend uses to signal a stock conflict.
const STOCK_CONFLICT_CODES: [&str; 2] = ["INSUFFICIENT_STOCK", "OUT_OF_STOCK"];

/// HTTP client for the storefront backend.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    http: Client,
}

impl HttpClient {
    /// Creates a client for the configured backend.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).send().await?;

        let response = check_status(response).await?;

        Ok(response.json().await?)
    }
}

/// Maps a non-success response to the error taxonomy, reading the body at
/// most once.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(classify_failure(status, &body))
}

/// Classifies a failed order or catalog response.
///
/// A 409, or any error body carrying a recognizable stock-conflict code,
/// becomes [`ApiError::InsufficientStock`]; everything else keeps its
/// status and body for the generic failure path.
fn classify_failure(status: StatusCode, body: &str) -> ApiError {
    if status == StatusCode::CONFLICT {
        return ApiError::InsufficientStock;
    }

    if let Ok(error_body) = serde_json::from_str::<ErrorBody>(body)
        && let Some(code) = error_body.code
        && STOCK_CONFLICT_CODES.contains(&code.as_str())
    {
        return ApiError::InsufficientStock;
    }

    ApiError::Status {
        status: status.as_u16(),
        body: body.to_owned(),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
}

#[async_trait]
impl OrdersApi for HttpClient {
    async fn create_order(&self, draft: OrderDraft) -> Result<OrderReceipt, ApiError> {
        debug!(
            idempotency_key = %draft.idempotency_key,
            items = draft.items.len(),
            "submitting order"
        );

        let response = self
            .http
            .post(self.url("/orders"))
            .json(&draft)
            .send()
            .await?;

        let response = check_status(response).await?;

        let receipt: OrderReceipt = response.json().await?;

        if !receipt.ok {
            return Err(ApiError::Unexpected(
                "order response carried ok=false".to_owned(),
            ));
        }

        Ok(receipt)
    }
}

#[async_trait]
impl CatalogApi for HttpClient {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_json("/products").await
    }

    async fn get_product(&self, slug: &str) -> Result<Product, ApiError> {
        self.get_json(&format!("/products/{slug}")).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_json("/categories").await
    }

    async fn list_banners(&self) -> Result<Vec<Banner>, ApiError> {
        self.get_json("/banners").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_status_is_insufficient_stock() {
        let error = classify_failure(StatusCode::CONFLICT, "");

        assert!(
            matches!(error, ApiError::InsufficientStock),
            "409 must classify as a stock conflict, got {error:?}"
        );
    }

    #[test]
    fn stock_conflict_codes_are_recognized_on_other_statuses() {
        for code in STOCK_CONFLICT_CODES {
            let body = format!(r#"{{"code":"{code}","message":"no stock"}}"#);
            let error = classify_failure(StatusCode::BAD_REQUEST, &body);

            assert!(
                matches!(error, ApiError::InsufficientStock),
                "code {code} must classify as a stock conflict, got {error:?}"
            );
        }
    }

    #[test]
    fn other_failures_keep_status_and_body() {
        let error = classify_failure(StatusCode::SERVICE_UNAVAILABLE, "maintenance");

        match error {
            ApiError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_error_code_is_not_a_stock_conflict() {
        let error = classify_failure(StatusCode::BAD_REQUEST, r#"{"code":"VALIDATION"}"#);

        assert!(
            matches!(error, ApiError::Status { status: 400, .. }),
            "unknown codes must fall through to the generic path, got {error:?}"
        );
    }
}
