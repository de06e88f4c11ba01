//! Cloudflare API v4 wire types
//!
//! Every response is wrapped in the same envelope:
//! `{ "success": bool, "result": T, "errors": [{ "code", "message" }] }`.

use serde::{Deserialize, Serialize};

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "none")]
    pub result: Option<T>,
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> ApiResponse<T> {
    /// The provider's error messages joined for logging
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "no error details".to_string();
        }
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// One entry of the envelope's `errors` list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// `GET /user/tokens/verify` result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenStatus {
    pub id: String,
    pub status: String,
}

impl TokenStatus {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// A zone as listed by `GET /zones`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// A DNS record as returned by the `dns_records` endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub proxied: bool,
}

/// `POST /zones/{zone}/dns_records` body
#[derive(Debug, Serialize)]
pub struct NewRecord<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub content: String,
    pub proxied: bool,
    pub comment: &'static str,
}

/// `PATCH /zones/{zone}/dns_records/{record}` body
#[derive(Debug, Serialize)]
pub struct ContentPatch {
    pub content: String,
}
