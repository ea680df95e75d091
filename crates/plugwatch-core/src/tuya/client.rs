//! TuyaClient: signed OpenAPI calls for one device.

use chrono::{SubsecRound, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::sign::{self, SignRequest};
use super::Region;
use crate::credentials::Credentials;
use crate::error::{ApiError, ConfigError, CoreError};
use crate::reading::{DataPoint, PlugSnapshot, Reading};
use crate::recorder::SampleSource;

/// Tuya error codes that mean the credentials or token are unusable.
const AUTH_ERROR_CODES: &[i64] = &[1004, 1010, 1011, 1106, 2009];
/// Tuya error code for exceeding the API call quota.
const RATE_LIMIT_CODE: i64 = 40000309;

/// Standard Tuya response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    result: Option<T>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResult {
    access_token: String,
    #[serde(default)]
    expire_time: Option<u64>,
}

/// Device metadata from `GET /v1.0/devices/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub time_zone: String,
}

/// Client for one Tuya cloud device.
pub struct TuyaClient {
    http: Client,
    base_url: Url,
    device_id: String,
    credentials: Credentials,
}

impl TuyaClient {
    /// Create a client for `device_id` in `region`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        region: Region,
        device_id: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let base_url = Url::parse(&region.base_url()).map_err(|e| ConfigError::InvalidValue {
            key: "tuya.region".to_string(),
            message: e.to_string(),
        })?;
        Self::with_base_url(base_url, device_id, credentials, timeout)
    }

    /// Create a client against an arbitrary OpenAPI host (mock servers, proxies).
    pub fn with_base_url(
        base_url: Url,
        device_id: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::from)?;
        Ok(Self {
            http,
            base_url,
            device_id: device_id.into(),
            credentials,
        })
    }

    /// Fetch a short-lived access token.
    pub async fn token(&self) -> Result<String, ApiError> {
        let token: TokenResult = self
            .get("/v1.0/token", &[("grant_type", "1")], None)
            .await?;
        tracing::debug!(expires_in = ?token.expire_time, "obtained Tuya access token");
        Ok(token.access_token)
    }

    /// Raw data points of the device.
    pub async fn device_status(&self) -> Result<Vec<DataPoint>, ApiError> {
        let token = self.token().await?;
        let path = format!("/v1.0/devices/{}/status", self.device_id);
        self.get(&path, &[], Some(&token)).await
    }

    pub async fn device_info(&self) -> Result<DeviceInfo, ApiError> {
        let token = self.token().await?;
        let path = format!("/v1.0/devices/{}", self.device_id);
        self.get(&path, &[], Some(&token)).await
    }

    /// Decoded snapshot of the device's switch data points.
    pub async fn snapshot(&self) -> Result<PlugSnapshot, CoreError> {
        let points = self.device_status().await?;
        Ok(PlugSnapshot::from_data_points(&points)?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        access_token: Option<&str>,
    ) -> Result<T, ApiError> {
        let path_and_query = sign::path_with_sorted_query(path, query);
        let url = self
            .base_url
            .join(&path_and_query)
            .map_err(|e| ApiError::Malformed(format!("bad request url: {e}")))?;

        let t = Utc::now().timestamp_millis();
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let signature = sign::sign(
            &SignRequest {
                method: "GET",
                path_and_query: &path_and_query,
                body: b"",
                client_id: &self.credentials.api_key,
                access_token,
                timestamp_ms: t,
                nonce: &nonce,
            },
            &self.credentials.api_secret,
        );

        tracing::debug!(%url, "Tuya request");

        let mut req = self
            .http
            .get(url)
            .header("client_id", &self.credentials.api_key)
            .header("sign", signature)
            .header("t", t.to_string())
            .header("nonce", &nonce)
            .header("sign_method", "HMAC-SHA256");
        if let Some(token) = access_token {
            req = req.header("access_token", token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited(format!("HTTP {status} from {path}")));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ApiError::Auth(format!("HTTP {status} from {path}")));
        }
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }

        let envelope: Envelope<T> = resp.json().await?;
        unwrap_envelope(envelope, path)
    }
}

fn unwrap_envelope<T>(envelope: Envelope<T>, path: &str) -> Result<T, ApiError> {
    if !envelope.success {
        let code = envelope.code.unwrap_or(-1);
        let msg = envelope.msg.unwrap_or_default();
        tracing::warn!(code, %msg, path, "Tuya API rejected request");
        if AUTH_ERROR_CODES.contains(&code) {
            return Err(ApiError::Auth(format!("{msg} (code {code})")));
        }
        if code == RATE_LIMIT_CODE || msg.to_ascii_lowercase().contains("frequency") {
            return Err(ApiError::RateLimited(format!("{msg} (code {code})")));
        }
        return Err(ApiError::Rejected { code, msg });
    }
    envelope
        .result
        .ok_or_else(|| ApiError::Malformed(format!("{path}: success without result")))
}

impl SampleSource for TuyaClient {
    async fn fetch_reading(&self) -> Result<Reading, CoreError> {
        let polled_at = Utc::now().trunc_subsecs(0);
        let snapshot = self.snapshot().await?;
        Ok(Reading::from_snapshot(snapshot, polled_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_failure_codes_are_classified() {
        let auth: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"success": false, "code": 1010, "msg": "token invalid"}))
                .unwrap();
        assert!(matches!(unwrap_envelope(auth, "/x"), Err(ApiError::Auth(_))));

        let limited: Envelope<serde_json::Value> = serde_json::from_value(
            json!({"success": false, "code": 40000309, "msg": "request frequency too high"}),
        )
        .unwrap();
        assert!(matches!(
            unwrap_envelope(limited, "/x"),
            Err(ApiError::RateLimited(_))
        ));

        let other: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"success": false, "code": 2001, "msg": "device is offline"}))
                .unwrap();
        assert!(matches!(
            unwrap_envelope(other, "/x"),
            Err(ApiError::Rejected { code: 2001, .. })
        ));
    }

    #[test]
    fn success_without_result_is_malformed() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"success": true})).unwrap();
        assert!(matches!(unwrap_envelope(env, "/x"), Err(ApiError::Malformed(_))));
    }
}
