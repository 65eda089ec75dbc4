//! [`SqliteStore`] — the SQLite implementation of [`ContactStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use agenda_core::{
  contact::{Contact, ContactPatch, NewContact, WriteOutcome},
  store::ContactStore,
};

use crate::{
  Error, Result,
  encode::{CONTACT_COLUMNS, RawContact, encode_uuid, is_unique_violation},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An agenda contact store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row `SELECT` over `users` with one text parameter.
  async fn select_one(&self, filter: &'static str, value: String) -> Result<Option<Contact>> {
    let sql = format!("SELECT {CONTACT_COLUMNS} FROM users WHERE {filter} = ?1");

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawContact::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_contacts(&self) -> Result<Vec<Contact>> {
    let raws: Vec<RawContact> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {CONTACT_COLUMNS} FROM users ORDER BY rowid"))?;
        let rows = stmt
          .query_map([], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>> {
    self.select_one("contact_id", encode_uuid(id)).await
  }

  async fn find_by_phone(&self, telefono: &str) -> Result<Option<Contact>> {
    self.select_one("telefono", telefono.to_owned()).await
  }

  async fn count_by_phone(&self, telefono: &str) -> Result<u64> {
    let telefono = telefono.to_owned();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM users WHERE telefono = ?1",
          rusqlite::params![telefono],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(count.max(0) as u64)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert_contact(&self, input: NewContact) -> Result<WriteOutcome> {
    let contact = Contact {
      contact_id:  Uuid::new_v4(),
      nombre:      input.nombre,
      telefono:    input.telefono,
      pais:        input.pais,
      hora_actual: input.hora_actual,
    };

    let id_str      = encode_uuid(contact.contact_id);
    let nombre      = contact.nombre.clone();
    let telefono    = contact.telefono.clone();
    let pais        = contact.pais.clone();
    let hora_actual = contact.hora_actual.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO users (contact_id, nombre, telefono, pais, hora_actual)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, nombre, telefono, pais, hora_actual],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      debug!(telefono = %contact.telefono, "insert refused by phone constraint");
      return Ok(WriteOutcome::PhoneTaken);
    }
    Ok(WriteOutcome::Written(contact))
  }

  async fn update_contact(&self, id: Uuid, patch: ContactPatch) -> Result<WriteOutcome> {
    let id_str = encode_uuid(id);

    let raw: Option<Option<RawContact>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // `COALESCE` keeps the stored value for every `None` in the patch.
        let changed = match tx.execute(
          "UPDATE users SET
             nombre      = COALESCE(?2, nombre),
             telefono    = COALESCE(?3, telefono),
             pais        = COALESCE(?4, pais),
             hora_actual = COALESCE(?5, hora_actual)
           WHERE contact_id = ?1",
          rusqlite::params![
            id_str,
            patch.nombre,
            patch.telefono,
            patch.pais,
            patch.hora_actual,
          ],
        ) {
          Ok(n) => n,
          Err(e) if is_unique_violation(&e) => return Ok(None),
          Err(e) => return Err(e.into()),
        };

        if changed == 0 {
          return Ok(Some(None));
        }

        let row = tx.query_row(
          &format!("SELECT {CONTACT_COLUMNS} FROM users WHERE contact_id = ?1"),
          rusqlite::params![id_str],
          RawContact::from_row,
        )?;
        tx.commit()?;
        Ok(Some(Some(row)))
      })
      .await?;

    match raw {
      None => Ok(WriteOutcome::PhoneTaken),
      Some(None) => Ok(WriteOutcome::Missing),
      Some(Some(row)) => Ok(WriteOutcome::Written(row.into_contact()?)),
    }
  }

  async fn delete_contact(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM users WHERE contact_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }
}
