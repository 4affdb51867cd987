//! Mattermost REST client that supplies the audit inputs.
//!
//! The audit engine only sees the [`PluginInventory`] trait, so tests and
//! other frontends can provide installed plugins and a catalogue without a
//! live server. [`MattermostClient`] is the real implementation on top of
//! the v4 REST API:
//!
//! - `GET /api/v4/plugins` - active and inactive plugin manifests
//! - `GET /api/v4/plugins/marketplace` - the Marketplace catalogue, proxied
//!   by the server and paged 200 entries at a time
//! - `POST /api/v4/users/login` - password login, session token in the
//!   `Token` response header

use crate::error::{AuditError, Cause, Result};
use crate::plugin::{Catalogue, InstalledPlugin, MarketplaceEntry, PluginStatus};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

const MARKETPLACE_PAGE_SIZE: usize = 200;

/// Source of the two audit inputs.
#[async_trait]
pub trait PluginInventory: Send + Sync {
    /// Every plugin installed on the server, active first.
    async fn installed_plugins(&self) -> Result<Vec<InstalledPlugin>>;

    /// The Marketplace catalogue keyed by plugin id.
    async fn marketplace_catalogue(&self) -> Result<Catalogue>;
}

/// Connection settings for a Mattermost server.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub url: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PluginsResponse {
    #[serde(default)]
    active: Option<Vec<Manifest>>,
    #[serde(default)]
    inactive: Option<Vec<Manifest>>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    homepage_url: Option<String>,
    #[serde(default)]
    server: Option<serde_json::Value>,
    #[serde(default)]
    webapp: Option<serde_json::Value>,
}

impl Manifest {
    fn into_installed(self, status: PluginStatus) -> InstalledPlugin {
        InstalledPlugin {
            has_server: self.server.is_some(),
            has_webapp: self.webapp.is_some(),
            id: self.id,
            name: self.name.unwrap_or_default(),
            version: self.version.unwrap_or_default(),
            homepage_url: self.homepage_url.unwrap_or_default(),
            status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MarketplaceListing {
    #[serde(default)]
    homepage_url: Option<String>,
    #[serde(default)]
    manifest: Option<Manifest>,
}

#[derive(Debug, Deserialize)]
struct SessionUser {
    #[serde(default)]
    username: String,
}

/// Authenticated client for one Mattermost server.
pub struct MattermostClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl MattermostClient {
    /// Authenticates against the server.
    ///
    /// A token is checked with a plugin listing call; a username is logged in
    /// with its password. Without either this is a configuration error.
    pub async fn connect(config: &ServerConfig) -> Result<Self> {
        let base_url = config.url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("mm-plugin-audit/", env!("CARGO_PKG_VERSION"))),
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AuditError::config("error: unable to initialise the HTTP client.")
                    .with_source(Box::new(e))
            })?;

        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let mm = Self {
                client,
                base_url,
                token: token.to_string(),
            };
            debug!("validating personal access token against {}", mm.base_url);
            mm.fetch_plugins().await?;
            return Ok(mm);
        }

        if let Some(username) = config.username.as_deref().filter(|u| !u.is_empty()) {
            let password = config.password.clone().unwrap_or_default();
            let token = login(&client, &base_url, username, &password).await?;
            return Ok(Self { client, base_url, token });
        }

        Err(AuditError::config(
            "error: authentication required. Use --token (or MM_TOKEN) for token auth, or --username (or MM_USERNAME) for password auth.",
        ))
    }

    /// Server URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, usize)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|e| classify_api_error(&self.base_url, None, Some(Box::new(e))))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_api_error(&self.base_url, Some(status.as_u16()), None));
        }

        response.json::<T>().await.map_err(|e| {
            AuditError::api(
                format!("error: unexpected response from {}{}.", self.base_url, path),
                Some(Box::new(e)),
            )
        })
    }

    async fn fetch_plugins(&self) -> Result<PluginsResponse> {
        self.get_json("/api/v4/plugins", &[]).await
    }

    async fn fetch_catalogue(&self) -> Result<Catalogue> {
        let mut catalogue = Catalogue::new();
        let mut page = 0;

        loop {
            let listings: Vec<MarketplaceListing> = self
                .get_json(
                    "/api/v4/plugins/marketplace",
                    &[("page", page), ("per_page", MARKETPLACE_PAGE_SIZE)],
                )
                .await?;
            debug!("marketplace page {} returned {} entries", page, listings.len());

            let fetched = listings.len();
            for listing in listings {
                if let Some(manifest) = listing.manifest {
                    catalogue.insert(
                        manifest.id,
                        MarketplaceEntry {
                            version: manifest.version.unwrap_or_default(),
                            homepage_url: listing.homepage_url.unwrap_or_default(),
                        },
                    );
                }
            }

            if fetched < MARKETPLACE_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(catalogue)
    }
}

#[async_trait]
impl PluginInventory for MattermostClient {
    async fn installed_plugins(&self) -> Result<Vec<InstalledPlugin>> {
        let response = self.fetch_plugins().await?;

        let active = response.active.unwrap_or_default();
        let inactive = response.inactive.unwrap_or_default();
        let mut plugins = Vec::with_capacity(active.len() + inactive.len());
        plugins.extend(active.into_iter().map(|m| m.into_installed(PluginStatus::Enabled)));
        plugins.extend(inactive.into_iter().map(|m| m.into_installed(PluginStatus::Disabled)));

        Ok(plugins)
    }

    async fn marketplace_catalogue(&self) -> Result<Catalogue> {
        self.fetch_catalogue().await.map_err(|err| match err {
            AuditError::Config { .. } => err,
            other => AuditError::marketplace(
                format!(
                    "error: unable to retrieve the Marketplace catalogue from {}. The server may be air-gapped or have Marketplace access disabled.",
                    self.base_url
                ),
                Some(Box::new(other)),
            ),
        })
    }
}

/// Logs in with a username and password and returns the session token.
async fn login(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<String> {
    let url = format!("{}/api/v4/users/login", base_url);
    let body = serde_json::json!({
        "login_id": username,
        "password": password,
    });

    let response = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| classify_api_error(base_url, None, Some(Box::new(e))))?;

    let status = response.status();
    if !status.is_success() {
        return Err(classify_api_error(base_url, Some(status.as_u16()), None));
    }

    let token = response
        .headers()
        .get("Token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            AuditError::api(
                format!("error: {} did not return a session token.", base_url),
                None,
            )
        })?;

    if let Ok(user) = response.json::<SessionUser>().await {
        debug!("logged in as {}", user.username);
    }

    Ok(token)
}

/// Maps a failed API call to an [`AuditError`].
///
/// `status` is the HTTP status when the server answered, `None` when the
/// request never got a response.
pub fn classify_api_error(
    server_url: &str,
    status: Option<u16>,
    cause: Option<Cause>,
) -> AuditError {
    if let Some(code) = status {
        match code {
            401 => {
                return AuditError::Config {
                    message: "error: authentication failed. Check your token or credentials."
                        .to_string(),
                    source: cause,
                }
            }
            403 => {
                return AuditError::Config {
                    message: "error: permission denied. This operation requires a System Administrator account."
                        .to_string(),
                    source: cause,
                }
            }
            404 => {
                return AuditError::api(
                    format!(
                        "error: API endpoint not found on {}. Check the server URL.",
                        server_url
                    ),
                    cause,
                )
            }
            code if code >= 500 => {
                return AuditError::api(
                    format!(
                        "error: the Mattermost server returned an unexpected error (HTTP {}). Check server logs for details.",
                        code
                    ),
                    cause,
                )
            }
            _ => {}
        }
    }

    if !server_url.is_empty() {
        return AuditError::api(
            format!(
                "error: unable to connect to {}. Check the URL and network connectivity.",
                server_url
            ),
            cause,
        );
    }
    AuditError::api("error: unexpected API error.", cause)
}
