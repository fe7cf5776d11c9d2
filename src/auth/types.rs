// Authentication types

use serde::{Deserialize, Serialize};

/// Token data returned by a successful refresh
#[derive(Debug, Clone, PartialEq)]
pub struct TokenData {
    pub access_token: String,

    /// Only present when the server rotates the refresh token
    pub refresh_token: Option<String>,
}

/// Refresh endpoint request
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Refresh endpoint response
#[derive(Deserialize)]
pub struct RefreshResponse {
    #[serde(default)]
    pub access: String,
    pub refresh: Option<String>,
}

/// Login endpoint request
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Credential pair issued at login
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Operator account summary returned with the login tokens
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UserSummary {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Login endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub tokens: TokenPair,
    #[serde(default)]
    pub user: Option<UserSummary>,
}
