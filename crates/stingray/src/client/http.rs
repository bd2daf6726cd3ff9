//! REST client backed by `ureq`.
//!
//! Objects live at
//! `{server_url}/api/tm/{api_version}/config/active/{collection}/{name}`.
//! Reads are `GET`, upserts are `PUT` with the full document, deletes are
//! `DELETE`. Every request carries HTTP Basic credentials.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::ConfigResource;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::time::Duration;

/// Default REST API version.
pub const DEFAULT_API_VERSION: &str = "3.5";

/// Connection settings for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, e.g. `https://vtm.example.com:9070`.
    pub server_url: String,
    pub username: String,
    pub password: String,
    /// Verify the server certificate. Appliances often ship self-signed ones.
    pub verify_ssl: bool,
    pub api_version: String,
    /// Overall timeout per request. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Settings with certificate verification on and the default API version.
    pub fn new(
        server_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            username: username.into(),
            password: password.into(),
            verify_ssl: true,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: None,
        }
    }
}

/// Blocking client for a live traffic manager.
///
/// # Example
///
/// ```no_run
/// use stingray::client::Client;
/// use stingray::client::http::{ClientConfig, HttpClient};
/// use stingray::Pool;
///
/// let config = ClientConfig::new("https://vtm.example.com:9070", "admin", "secret");
/// let client = HttpClient::new(&config).unwrap();
/// let pool: Pool = client.get("web").unwrap();
/// println!("{:?}", pool.properties.basic.nodes_table);
/// ```
pub struct HttpClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// `{server_url}/api/tm/{api_version}/config/active`
    api_base: String,
    /// Precomputed `Authorization` header value.
    authorization: String,
}

impl HttpClient {
    /// Build a client from connection settings.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let server_url = config.server_url.trim_end_matches('/');
        if server_url.is_empty() {
            return Err(Error::Config("server URL is empty".to_string()));
        }
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "server URL must start with http:// or https://, got '{server_url}'"
            )));
        }

        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(!config.verify_ssl)
            .build();
        let agent_config = ureq::Agent::config_builder()
            .tls_config(tls)
            .timeout_global(config.timeout)
            .build();

        if config.verify_ssl {
            log::info!("Secure vTM client configured for server {server_url}");
        } else {
            log::info!("vTM client configured for server {server_url} (certificate checks off)");
        }

        let credentials = format!("{}:{}", config.username, config.password);
        Ok(Self {
            agent: ureq::Agent::new_with_config(agent_config),
            api_base: format!(
                "{server_url}/api/tm/{}/config/active",
                config.api_version
            ),
            authorization: format!("Basic {}", STANDARD.encode(credentials)),
        })
    }

    /// Get the configuration API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build the URL of one object.
    fn object_url(&self, collection: &str, name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.api_base,
            collection,
            urlencoding::encode(name)
        )
    }

    fn decode<R: ConfigResource>(body: &str, name: &str) -> Result<R> {
        let mut resource: R = serde_json::from_str(body)?;
        resource.set_name(name.to_string());
        Ok(resource)
    }
}

impl Client for HttpClient {
    fn get<R: ConfigResource>(&self, name: &str) -> Result<R> {
        let url = self.object_url(R::COLLECTION, name);
        log::debug!("GET {url}");

        let body = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
            .call()?
            .body_mut()
            .read_to_string()?;

        Self::decode(&body, name)
    }

    fn set<R: ConfigResource>(&self, resource: &R) -> Result<R> {
        let url = self.object_url(R::COLLECTION, resource.name());
        log::debug!("PUT {url}");

        let body = self
            .agent
            .put(&url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
            .send_json(resource)?
            .body_mut()
            .read_to_string()?;

        if body.trim().is_empty() {
            return Ok(resource.clone());
        }
        Self::decode(&body, resource.name())
    }

    fn delete<R: ConfigResource>(&self, resource: &R) -> Result<u16> {
        let url = self.object_url(R::COLLECTION, resource.name());
        log::debug!("DELETE {url}");

        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &self.authorization)
            .call()?;

        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Pool, TrafficIpGroup};

    fn client() -> HttpClient {
        HttpClient::new(&ClientConfig::new("https://vtm.local:9070/", "admin", "secret")).unwrap()
    }

    #[test]
    fn test_api_base() {
        assert_eq!(
            client().api_base(),
            "https://vtm.local:9070/api/tm/3.5/config/active"
        );
    }

    #[test]
    fn test_custom_api_version() {
        let mut config = ClientConfig::new("http://vtm.local:9070", "admin", "secret");
        config.api_version = "3.0".to_string();
        let client = HttpClient::new(&config).unwrap();
        assert_eq!(client.api_base(), "http://vtm.local:9070/api/tm/3.0/config/active");
    }

    #[test]
    fn test_object_url() {
        let client = client();
        assert_eq!(
            client.object_url(Pool::COLLECTION, "web"),
            "https://vtm.local:9070/api/tm/3.5/config/active/pools/web"
        );
        assert_eq!(
            client.object_url(TrafficIpGroup::COLLECTION, "vip"),
            "https://vtm.local:9070/api/tm/3.5/config/active/traffic_ip_groups/vip"
        );
    }

    #[test]
    fn test_authorization_header() {
        // base64("admin:secret")
        assert_eq!(client().authorization, "Basic YWRtaW46c2VjcmV0");
    }

    #[test]
    fn test_object_url_encodes_name() {
        let client = client();
        let base = "https://vtm.local:9070/api/tm/3.5/config/active/pools";
        assert_eq!(
            client.object_url(Pool::COLLECTION, "web-pool_1.a"),
            format!("{base}/web-pool_1.a")
        );
        assert_eq!(
            client.object_url(Pool::COLLECTION, "my pool"),
            format!("{base}/my%20pool")
        );
        assert_eq!(
            client.object_url(Pool::COLLECTION, "a/b"),
            format!("{base}/a%2Fb")
        );
    }

    #[test]
    fn test_rejects_bad_server_url() {
        let err = HttpClient::new(&ClientConfig::new("", "u", "p")).err().unwrap();
        assert!(matches!(err, Error::Config(_)));

        let err = HttpClient::new(&ClientConfig::new("vtm.local", "u", "p"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_decode_sets_name() {
        let pool: Pool = HttpClient::decode(
            r#"{"properties": {"basic": {"note": "x"}}}"#,
            "web",
        )
        .unwrap();
        assert_eq!(pool.name, "web");
        assert_eq!(pool.properties.basic.note.as_deref(), Some("x"));
    }

    #[test]
    fn test_decode_invalid_body() {
        let err = HttpClient::decode::<Pool>("<html>", "web").unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }
}
