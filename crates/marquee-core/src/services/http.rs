//! Response handling shared by the service clients.

use serde::de::DeserializeOwned;

use crate::error::{ServiceError, ServiceResult};

/// Checks the status and decodes a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ServiceResult<T> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(ServiceError::decode)
}

/// Checks the status and discards the body.
pub(crate) async fn expect_success(response: reqwest::Response) -> ServiceResult<()> {
    check_status(response).await.map(drop)
}

async fn check_status(response: reqwest::Response) -> ServiceResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), "service call failed");
    Err(ServiceError::http_status(status.as_u16(), &body))
}

/// Shared HTTP client with sane timeouts.
pub(crate) fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
