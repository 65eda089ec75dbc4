//! Error types for `agenda-core`.
//!
//! Every variant renders as the human-readable message a GraphQL client sees;
//! the API layer does not attach distinguishing error codes.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("an API Ninjas key is required for this operation")]
  MissingApiKey,

  #[error("invalid identifier: {0:?}")]
  InvalidId(String),

  #[error("contact not found: {0}")]
  NotFound(Uuid),

  #[error("contact not found after update: {0}")]
  NotFoundAfterUpdate(Uuid),

  #[error("you must update at least one value")]
  NothingToUpdate,

  #[error("phone number already registered: {0}")]
  PhoneRegistered(String),

  #[error("phone number already exists: {0}")]
  PhoneExists(String),

  #[error("phone number is not valid: {0}")]
  InvalidPhone(String),

  #[error(transparent)]
  Upstream(#[from] UpstreamError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend-specific store error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

/// A failure talking to one of the API Ninjas endpoints.
#[derive(Debug, Error)]
pub enum UpstreamError {
  /// The service answered with anything other than `200 OK`.
  #[error("API Ninjas error: {service} returned HTTP {status}")]
  Status { service: &'static str, status: u16 },

  #[error("API Ninjas error: {service} request failed: {source}")]
  Transport {
    service: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("API Ninjas error: {service} sent an unreadable body: {source}")]
  Decode {
    service: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
