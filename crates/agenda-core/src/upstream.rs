//! Traits for the two third-party services a contact write depends on.
//!
//! Implemented over HTTP by `agenda-ninjas`; tests substitute in-memory fakes.

use std::{fmt, future::Future};

use serde::Deserialize;

use crate::error::UpstreamError;

/// Credential sent to both upstream services.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
  pub fn new(key: impl Into<String>) -> Self { Self(key.into()) }

  pub fn expose(&self) -> &str { &self.0 }
}

impl fmt::Debug for ApiKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("ApiKey(***)")
  }
}

/// Body of a successful `validatephone` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhoneValidation {
  pub is_valid:  bool,
  #[serde(default)]
  pub country:   String,
  #[serde(default)]
  pub timezones: Vec<String>,
}

/// Validates phone numbers and reports their country.
///
/// A pure upstream call: uniqueness against the store is not its concern.
pub trait PhoneValidator: Send + Sync {
  fn validate_phone<'a>(
    &'a self,
    api_key: &'a ApiKey,
    telefono: &'a str,
  ) -> impl Future<Output = Result<PhoneValidation, UpstreamError>> + Send + 'a;
}

/// Reports the current local time of a country.
pub trait WorldClock: Send + Sync {
  /// Returns the upstream `datetime` string verbatim.
  fn current_time<'a>(
    &'a self,
    api_key: &'a ApiKey,
    pais: &'a str,
  ) -> impl Future<Output = Result<String, UpstreamError>> + Send + 'a;
}
