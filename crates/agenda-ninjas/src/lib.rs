//! HTTP client for the API Ninjas endpoints used to enrich contacts.
//!
//! | Endpoint | Query | Response |
//! |----------|-------|----------|
//! | `GET /v1/validatephone` | `number` | `{"is_valid", "country", "timezones"}` |
//! | `GET /v1/worldtime` | `city` | `{"datetime", ...}` |
//!
//! Both requests carry the credential in the `X-Api-Key` header. Anything but
//! `200 OK` is reported as [`UpstreamError::Status`].

use std::time::Duration;

use agenda_core::{
  UpstreamError,
  upstream::{ApiKey, PhoneValidation, PhoneValidator, WorldClock},
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

/// Production base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.api-ninjas.com";

const VALIDATE_PHONE: &str = "validatephone";
const WORLD_TIME: &str = "worldtime";

/// Connection settings for API Ninjas.
#[derive(Debug, Clone)]
pub struct NinjasConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

impl Default for NinjasConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_owned(),
      timeout:  Duration::from_secs(30),
    }
  }
}

/// Async HTTP client for API Ninjas.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct NinjasClient {
  client:   Client,
  base_url: String,
}

/// The subset of the `worldtime` response we read.
#[derive(Deserialize)]
struct WorldTime {
  datetime: String,
}

impl NinjasClient {
  pub fn new(config: NinjasConfig) -> reqwest::Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_owned(),
    })
  }

  fn url(&self, endpoint: &str) -> String {
    format!("{}/v1/{endpoint}", self.base_url)
  }

  /// `GET /v1/<endpoint>?<param>=<value>` and decode a `200 OK` JSON body.
  async fn get_json<T: DeserializeOwned>(
    &self,
    endpoint: &'static str,
    api_key: &ApiKey,
    param: &str,
    value: &str,
  ) -> Result<T, UpstreamError> {
    debug!(%endpoint, %value, "calling API Ninjas");

    let resp = self
      .client
      .get(self.url(endpoint))
      .header("X-Api-Key", api_key.expose())
      .query(&[(param, value)])
      .send()
      .await
      .map_err(|e| UpstreamError::Transport { service: endpoint, source: Box::new(e) })?;

    if resp.status() != StatusCode::OK {
      return Err(UpstreamError::Status {
        service: endpoint,
        status:  resp.status().as_u16(),
      });
    }

    resp
      .json()
      .await
      .map_err(|e| UpstreamError::Decode { service: endpoint, source: Box::new(e) })
  }
}

impl PhoneValidator for NinjasClient {
  async fn validate_phone(
    &self,
    api_key: &ApiKey,
    telefono: &str,
  ) -> Result<PhoneValidation, UpstreamError> {
    self.get_json(VALIDATE_PHONE, api_key, "number", telefono).await
  }
}

impl WorldClock for NinjasClient {
  async fn current_time(&self, api_key: &ApiKey, pais: &str) -> Result<String, UpstreamError> {
    let time: WorldTime = self.get_json(WORLD_TIME, api_key, "city", pais).await?;
    Ok(time.datetime)
  }
}
