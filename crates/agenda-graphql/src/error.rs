//! Conversion from domain errors to GraphQL errors.
//!
//! Every failure becomes a plain [`async_graphql::Error`] carrying only the
//! human-readable message; clients cannot tell validation, not-found and
//! upstream failures apart by code.

use agenda_core::Error;

pub fn to_graphql(err: Error) -> async_graphql::Error {
  match &err {
    Error::Store(source) => tracing::error!(error = %source, "store failure"),
    Error::Upstream(source) => tracing::warn!(error = %source, "upstream failure"),
    _ => {}
  }
  async_graphql::Error::new(err.to_string())
}
