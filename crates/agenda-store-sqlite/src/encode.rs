//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings. All other contact fields
//! are plain text.

use agenda_core::contact::Contact;
use uuid::Uuid;

use crate::Result;

/// Column list shared by every `SELECT` that builds a [`RawContact`].
pub const CONTACT_COLUMNS: &str = "contact_id, nombre, telefono, pais, hora_actual";

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Raw row types ────────────────────────────────────────────────────────────

/// A `users` row as read from SQLite, before UUID decoding.
pub struct RawContact {
  pub contact_id:  String,
  pub nombre:      String,
  pub telefono:    String,
  pub pais:        String,
  pub hora_actual: String,
}

impl RawContact {
  /// Row mapper for statements selecting [`CONTACT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id:  row.get(0)?,
      nombre:      row.get(1)?,
      telefono:    row.get(2)?,
      pais:        row.get(3)?,
      hora_actual: row.get(4)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      contact_id:  decode_uuid(&self.contact_id)?,
      nombre:      self.nombre,
      telefono:    self.telefono,
      pais:        self.pais,
      hora_actual: self.hora_actual,
    })
  }
}

// ─── Constraint detection ─────────────────────────────────────────────────────

/// Whether `err` is SQLite refusing a write on a `UNIQUE` constraint.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}
