//! Contact types — the single domain entity of the agenda.
//!
//! `pais` and `hora_actual` are never supplied by clients. They are derived
//! from the upstream services every time a phone number is written.

use uuid::Uuid;

use crate::{Error, Result};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Parse a client-supplied identifier into the store's key format.
///
/// Fails with [`Error::InvalidId`] without touching the store.
pub fn parse_contact_id(raw: &str) -> Result<Uuid> {
  Uuid::parse_str(raw).map_err(|_| Error::InvalidId(raw.to_owned()))
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A persisted contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
  /// Assigned by the store on insert; never changes.
  pub contact_id:  Uuid,
  pub nombre:      String,
  /// International format, e.g. `+34645543345`. Unique across the store.
  pub telefono:    String,
  pub pais:        String,
  pub hora_actual: String,
}

// ─── NewContact ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::ContactStore::insert_contact`].
/// `contact_id` is always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewContact {
  pub nombre:      String,
  pub telefono:    String,
  pub pais:        String,
  pub hora_actual: String,
}

// ─── ContactPatch ────────────────────────────────────────────────────────────

/// A partial `$set`: `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
  pub nombre:      Option<String>,
  pub telefono:    Option<String>,
  pub pais:        Option<String>,
  pub hora_actual: Option<String>,
}

impl ContactPatch {
  /// Change only the name.
  pub fn rename(nombre: String) -> Self {
    Self { nombre: Some(nombre), ..Self::default() }
  }

  /// Change the phone together with its freshly derived country and time.
  pub fn rephone(
    nombre: Option<String>,
    telefono: String,
    enrichment: Enrichment,
  ) -> Self {
    Self {
      nombre,
      telefono: Some(telefono),
      pais: Some(enrichment.pais),
      hora_actual: Some(enrichment.hora_actual),
    }
  }
}

// ─── Enrichment ──────────────────────────────────────────────────────────────

/// Country and local time derived for a validated phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
  pub pais:        String,
  pub hora_actual: String,
}

// ─── Write outcome ───────────────────────────────────────────────────────────

/// Result of a store write that can be refused by the store itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
  /// The write happened; carries the contact as now stored.
  Written(Contact),
  /// The unique constraint on `telefono` rejected the write.
  PhoneTaken,
  /// No contact has the given identifier.
  Missing,
}
