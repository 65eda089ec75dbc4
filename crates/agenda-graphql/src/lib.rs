//! GraphQL API for the agenda.
//!
//! Exposes an axum [`Router`] serving the contacts schema over any
//! [`ContactStore`] and upstream client. Transport concerns beyond request
//! tracing are the caller's responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | GraphiQL IDE |
//! | `GET`, `POST` | `/graphql` | GraphQL endpoint |
//! | `GET`  | `/health` | Liveness probe, `ok` |

pub mod error;
pub mod schema;

use agenda_core::{
  directory::Directory,
  store::ContactStore,
  upstream::{PhoneValidator, WorldClock},
};
use async_graphql::{EmptySubscription, Schema, http::GraphiQLSource};
use async_graphql_axum::GraphQL;
use axum::{
  Router,
  response::{Html, IntoResponse},
  routing::get,
};
use tower_http::trace::TraceLayer;

pub use schema::{ContactNode, Mutation, Query};

/// Path of the GraphQL endpoint.
pub const GRAPHQL_PATH: &str = "/graphql";

/// The complete contacts schema.
pub type ContactSchema<S, U> = Schema<Query<S, U>, Mutation<S, U>, EmptySubscription>;

/// Build the schema with `directory` attached as context data.
pub fn build_schema<S, U>(directory: Directory<S, U>) -> ContactSchema<S, U>
where
  S: ContactStore + 'static,
  U: PhoneValidator + WorldClock + 'static,
{
  Schema::build(Query::default(), Mutation::default(), EmptySubscription)
    .data(directory)
    .finish()
}

/// The schema in SDL form, for `--print-schema` and client code generation.
///
/// Needs no [`Directory`]: only the types are rendered.
pub fn sdl<S, U>() -> String
where
  S: ContactStore + 'static,
  U: PhoneValidator + WorldClock + 'static,
{
  Schema::build(Query::<S, U>::default(), Mutation::<S, U>::default(), EmptySubscription)
    .finish()
    .sdl()
}

/// Build the HTTP router for `schema`.
pub fn router<S, U>(schema: ContactSchema<S, U>) -> Router
where
  S: ContactStore + 'static,
  U: PhoneValidator + WorldClock + 'static,
{
  Router::new()
    .route("/", get(graphiql))
    .route_service(GRAPHQL_PATH, GraphQL::new(schema))
    .route("/health", get(|| async { "ok" }))
    .layer(TraceLayer::new_for_http())
}

async fn graphiql() -> impl IntoResponse {
  Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}
