//! The `ContactStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `agenda-store-sqlite`).
//! The [`Directory`](crate::directory::Directory) depends on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::contact::{Contact, ContactPatch, NewContact, WriteOutcome};

/// Abstraction over the `users` collection.
///
/// Backends must reject two contacts sharing a `telefono` at write time and
/// report it as [`WriteOutcome::PhoneTaken`] rather than as an error.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// All contacts in the backend's natural (insertion) order.
  fn list_contacts(
    &self,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  /// Retrieve a contact by identifier. Returns `None` if not found.
  fn get_contact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Retrieve the contact holding exactly this phone number, if any.
  fn find_by_phone<'a>(
    &'a self,
    telefono: &'a str,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + 'a;

  /// Count contacts holding exactly this phone number.
  fn count_by_phone<'a>(
    &'a self,
    telefono: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist a new contact under a store-assigned identifier.
  ///
  /// Never returns [`WriteOutcome::Missing`].
  fn insert_contact(
    &self,
    input: NewContact,
  ) -> impl Future<Output = Result<WriteOutcome, Self::Error>> + Send + '_;

  /// Apply a partial update and return the contact as it is afterwards.
  fn update_contact(
    &self,
    id: Uuid,
    patch: ContactPatch,
  ) -> impl Future<Output = Result<WriteOutcome, Self::Error>> + Send + '_;

  /// Hard-delete a contact. Returns `true` if a row was removed.
  fn delete_contact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
