// Token endpoints: refresh, login, logout

use reqwest::StatusCode;
use serde_json::json;

use super::types::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, TokenData};
use crate::error::{ClientError, Result};
use crate::transport::{ApiRequest, Transport};

pub const REFRESH_PATH: &str = "/api/cafe/auth/token/refresh/";
pub const LOGIN_PATH: &str = "/api/cafe/auth/login/";
pub const LOGOUT_PATH: &str = "/api/cafe/auth/logout/";

/// Exchange a refresh token for a new access token
///
/// Every failure mode (transport error, rejected token, malformed body) ends
/// the session, so they all map to `SessionExpired`.
pub async fn refresh_access_token(transport: &dyn Transport, refresh: &str) -> Result<TokenData> {
    tracing::info!("Refreshing access token...");

    let body = serde_json::to_value(RefreshRequest { refresh })
        .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
    let request = ApiRequest::post(REFRESH_PATH).json(body);

    let response = transport
        .send(request)
        .await
        .map_err(|e| ClientError::SessionExpired(format!("Token refresh failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let message = response.error_message();
        tracing::error!(status = %status, body = %message, "Token refresh rejected");
        return Err(ClientError::SessionExpired(format!(
            "Token refresh rejected: {} - {}",
            status.as_u16(),
            message
        )));
    }

    let data: RefreshResponse = response.json().map_err(|e| {
        ClientError::SessionExpired(format!("Failed to parse refresh response: {}", e))
    })?;

    if data.access.is_empty() {
        return Err(ClientError::SessionExpired(
            "Refresh response does not contain an access token".to_string(),
        ));
    }

    tracing::info!(
        rotated = data.refresh.is_some(),
        "Access token refreshed"
    );

    Ok(TokenData {
        access_token: data.access,
        refresh_token: data.refresh.filter(|r| !r.is_empty()),
    })
}

/// Authenticate an operator and return the issued credential pair
pub async fn login(
    transport: &dyn Transport,
    username: &str,
    password: &str,
) -> Result<LoginResponse> {
    tracing::info!(username = username, "Logging in...");

    let body = serde_json::to_value(LoginRequest { username, password })
        .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
    let response = transport
        .send(ApiRequest::post(LOGIN_PATH).json(body))
        .await?;

    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized {
            retryable: false,
            message: response.error_message(),
        });
    }

    let response = response.error_for_status()?;
    let data: LoginResponse = response.json()?;

    if data.tokens.access.is_empty() || data.tokens.refresh.is_empty() {
        return Err(ClientError::Decode(
            "Login response does not contain both tokens".to_string(),
        ));
    }

    Ok(data)
}

/// Body of the logout call
pub fn logout_request(refresh: &str) -> ApiRequest {
    ApiRequest::post(LOGOUT_PATH).json(json!({ "refresh": refresh }))
}
