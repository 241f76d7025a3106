//! Outbound client for the Feishu open API.
//!
//! Two calls per invocation: exchange app credentials for a tenant access
//! token, then batch-append records to a Bitable table. Tokens are not
//! cached; every invocation authenticates from scratch.

use anyhow::{Result, bail};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://open.feishu.cn";
const TOKEN_PATH: &str = "/open-apis/auth/v3/tenant_access_token/internal";

/// Everything the client needs to reach one Bitable table.
/// Read once at startup and injected at construction.
#[derive(Debug, Clone)]
pub struct FeishuConfig {
    pub app_id: String,
    pub app_secret: String,
    pub bitable_id: String,
    pub table_id: String,
    /// API origin. Overridable so tests can point at a local mock server.
    pub base_url: String,
}

impl Default for FeishuConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            bitable_id: String::new(),
            table_id: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl FeishuConfig {
    /// Read configuration from the environment.
    ///
    /// Missing values stay empty: nothing is validated here, and a missing
    /// credential surfaces as a remote auth failure on the first invocation.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self {
            app_id: var("FEISHU_APP_ID"),
            app_secret: var("FEISHU_APP_SECRET"),
            bitable_id: var("FEISHU_BITABLE_ID"),
            table_id: var("FEISHU_TABLE_ID"),
            base_url: std::env::var("FEISHU_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// HTTP client for the Feishu open API.
pub struct FeishuClient {
    http: reqwest::Client,
    config: FeishuConfig,
}

impl FeishuClient {
    pub fn new(config: FeishuConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn token_url(&self) -> String {
        format!("{}{}", self.config.base_url, TOKEN_PATH)
    }

    fn batch_create_url(&self) -> String {
        format!(
            "{}/open-apis/bitable/v1/apps/{}/tables/{}/records/batch_create",
            self.config.base_url, self.config.bitable_id, self.config.table_id
        )
    }

    /// Exchange app credentials for a tenant access token.
    ///
    /// Fetched fresh on every call, no retry. Failures are logged here for
    /// operator visibility and then propagated; the caller owns the envelope.
    pub async fn tenant_access_token(&self) -> Result<String> {
        let body = json!({
            "app_id": self.config.app_id,
            "app_secret": self.config.app_secret,
        });

        let resp = match self.http.post(self.token_url()).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(error = %e, "tenant access token request failed");
                return Err(e.into());
            }
        };

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::error!(%status, body = %text, "tenant access token request rejected");
            bail!("token request failed ({}): {}", status, text);
        }

        let data: TokenResponse = resp.json().await?;
        match data.tenant_access_token {
            Some(token) if data.code == 0 => Ok(token),
            _ => {
                tracing::error!(code = data.code, msg = %data.msg, "token missing from response");
                bail!("token request failed (code {}): {}", data.code, data.msg);
            }
        }
    }

    /// Append `records` to the configured table in a single batch call.
    ///
    /// Returns the raw response body. Record contents are forwarded as-is;
    /// the remote service is authoritative for validating them.
    pub async fn batch_create(
        &self,
        token: &str,
        records: &[serde_json::Value],
    ) -> Result<serde_json::Value> {
        let resp = self
            .http
            .post(self.batch_create_url())
            .header("authorization", format!("Bearer {}", token))
            .json(&json!({ "records": records }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::error!(%status, body = %text, "batch create rejected");
            bail!("batch create failed ({}): {}", status, text);
        }

        Ok(resp.json().await?)
    }
}

// --- API types ---

#[derive(Deserialize)]
struct TokenResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    tenant_access_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_feishu() {
        let config = FeishuConfig::default();
        assert_eq!(config.base_url, "https://open.feishu.cn");
        assert!(config.app_id.is_empty());
    }

    #[test]
    fn token_url_joins_base() {
        let client = FeishuClient::new(FeishuConfig {
            base_url: "http://127.0.0.1:9999".to_string(),
            ..FeishuConfig::default()
        });
        assert_eq!(
            client.token_url(),
            "http://127.0.0.1:9999/open-apis/auth/v3/tenant_access_token/internal"
        );
    }

    #[test]
    fn batch_create_url_embeds_both_ids() {
        let client = FeishuClient::new(FeishuConfig {
            bitable_id: "app123".to_string(),
            table_id: "tbl456".to_string(),
            ..FeishuConfig::default()
        });
        assert_eq!(
            client.batch_create_url(),
            "https://open.feishu.cn/open-apis/bitable/v1/apps/app123/tables/tbl456/records/batch_create"
        );
    }

    #[test]
    fn token_response_parses_success() {
        let json = r#"{"code":0,"msg":"ok","tenant_access_token":"t-xyz","expire":7200}"#;
        let data: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(data.code, 0);
        assert_eq!(data.tenant_access_token.as_deref(), Some("t-xyz"));
    }

    #[test]
    fn token_response_parses_logical_error() {
        // Feishu answers 200 with a non-zero code when credentials are bad
        let json = r#"{"code":99991663,"msg":"app not found"}"#;
        let data: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(data.code, 99991663);
        assert!(data.tenant_access_token.is_none());
        assert_eq!(data.msg, "app not found");
    }

    #[test]
    fn token_response_tolerates_missing_msg() {
        let data: TokenResponse = serde_json::from_str(r#"{"code":1}"#).unwrap();
        assert_eq!(data.msg, "");
    }
}
