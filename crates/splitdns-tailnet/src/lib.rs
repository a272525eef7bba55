// # splitdns-tailnet
//
// Tailnet control-plane API client.
//
// Implements [`TailnetApi`] over the HTTP API: device inventory, service
// directory lookups, and split-DNS submission. Two credential schemes are
// supported:
//
// - an API key, sent as an HTTP basic credential (key as username, empty
//   password)
// - OAuth client credentials, exchanged at the token endpoint and cached
//   as a bearer token until shortly before expiry
//
// OAuth takes precedence when both schemes are configured. The selected
// mode is logged at construction time; credential values never are.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use splitdns_core::api::{Device, ServiceInfo, SplitDnsTable, TailnetApi};
use splitdns_core::error::{Error, Result};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

/// Default request timeout for API calls
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Path of the OAuth token endpoint, relative to the base URL
const OAUTH_TOKEN_PATH: &str = "/api/v2/oauth/token";

/// Safety margin subtracted from a token's reported lifetime
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Token lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Credential material for [`TailnetClient::new`]
///
/// All fields are optional; empty strings count as absent. OAuth client
/// credentials take precedence over the API key when both are supplied.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

enum AuthMode {
    /// API key sent as an HTTP basic credential
    ApiKey(String),
    /// OAuth client-credentials flow with a cached bearer token
    OAuth {
        client_id: String,
        client_secret: String,
        token: Mutex<Option<CachedToken>>,
    },
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct DeviceListResponse {
    #[serde(default)]
    devices: Vec<Device>,
}

/// Authenticated client for the tailnet control-plane API
pub struct TailnetClient {
    http: reqwest::Client,
    base_url: String,
    tailnet: String,
    auth: AuthMode,
}

// Credential material never appears in Debug output.
impl std::fmt::Debug for TailnetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TailnetClient")
            .field("base_url", &self.base_url)
            .field("tailnet", &self.tailnet)
            .field("auth", &self.auth_scheme())
            .finish()
    }
}

impl TailnetClient {
    /// Build an authenticated client
    ///
    /// Precedence: OAuth client credentials when both the ID and secret
    /// are non-empty, else the API key, else [`Error::AuthConfig`]. The
    /// base URL must parse as an absolute URL.
    pub fn new(
        tailnet: impl Into<String>,
        base_url: &str,
        credentials: Credentials,
    ) -> Result<Self> {
        let parsed =
            Url::parse(base_url).map_err(|e| Error::url(format!("{}: {}", base_url, e)))?;

        let auth = select_auth(credentials)?;

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .user_agent(concat!("splitdns/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http(format!("building HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            tailnet: tailnet.into(),
            auth,
        })
    }

    /// Name of the selected authentication scheme
    pub fn auth_scheme(&self) -> &'static str {
        match self.auth {
            AuthMode::ApiKey(_) => "api-key",
            AuthMode::OAuth { .. } => "oauth",
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v2/{}", self.base_url, path)
    }

    async fn authorize(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        match &self.auth {
            AuthMode::ApiKey(key) => Ok(req.basic_auth(key, None::<&str>)),
            AuthMode::OAuth { .. } => Ok(req.bearer_auth(self.access_token().await?)),
        }
    }

    /// Return the cached access token, fetching a fresh one when absent
    /// or within the expiry margin
    async fn access_token(&self) -> Result<String> {
        let AuthMode::OAuth {
            client_id,
            client_secret,
            token,
        } = &self.auth
        else {
            return Err(Error::auth_config("no OAuth client credentials configured"));
        };

        let mut cached = token.lock().await;
        if let Some(t) = cached.as_ref()
            && t.expires_at > Instant::now()
        {
            return Ok(t.access_token.clone());
        }

        debug!("fetching OAuth access token");
        let response = self
            .http
            .post(format!("{}{}", self.base_url, OAUTH_TOKEN_PATH))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::http(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(
                status.as_u16(),
                format!("token endpoint: {}", body.trim()),
            ));
        }

        let parsed: TokenResponse = decode_json(response).await?;
        let lifetime = parsed
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let expires_at = Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN);

        let access_token = parsed.access_token.clone();
        *cached = Some(CachedToken {
            access_token: parsed.access_token,
            expires_at,
        });

        Ok(access_token)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!(url = %url, "GET request");
        let req = self.http.get(&url);
        let response = self
            .authorize(req)
            .await?
            .send()
            .await
            .map_err(|e| Error::http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), body.trim().to_string()));
        }

        decode_json(response).await
    }
}

fn select_auth(credentials: Credentials) -> Result<AuthMode> {
    let api_key = credentials.api_key.unwrap_or_default();
    let client_id = credentials.client_id.unwrap_or_default();
    let client_secret = credentials.client_secret.unwrap_or_default();

    if !client_id.is_empty() && !client_secret.is_empty() {
        info!("using OAuth client credentials authentication");
        Ok(AuthMode::OAuth {
            client_id,
            client_secret,
            token: Mutex::new(None),
        })
    } else if !api_key.is_empty() {
        info!("using API key authentication");
        Ok(AuthMode::ApiKey(api_key))
    } else {
        Err(Error::auth_config(
            "need either an API key or OAuth client credentials",
        ))
    }
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| Error::http(format!("reading response body: {}", e)))?;
    serde_json::from_str(&body).map_err(Error::Json)
}

#[async_trait]
impl TailnetApi for TailnetClient {
    async fn list_devices(&self) -> Result<Vec<Device>> {
        let url = self.endpoint(&format!("tailnet/{}/devices", self.tailnet));
        let list: DeviceListResponse = self.get_json(url).await?;
        Ok(list.devices)
    }

    async fn get_service(&self, reference: &str) -> Result<ServiceInfo> {
        let url = self.endpoint(&format!("tailnet/{}/services/{}/", self.tailnet, reference));
        self.get_json(url).await
    }

    async fn set_split_dns(&self, table: &SplitDnsTable) -> Result<()> {
        let url = self.endpoint(&format!("tailnet/{}/dns/split-dns", self.tailnet));
        debug!(url = %url, "PUT request");
        let req = self.http.put(&url).json(table);
        let response = self
            .authorize(req)
            .await?
            .send()
            .await
            .map_err(|e| Error::http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), body.trim().to_string()));
        }

        Ok(())
    }
}
