//! [`Directory`] — the business logic behind every GraphQL operation.
//!
//! Resolvers are thin wrappers over these methods. Identifier parsing,
//! not-found handling, the phone uniqueness pre-check and the upstream
//! enrichment sequence all live here.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  contact::{
    Contact, ContactPatch, Enrichment, NewContact, WriteOutcome,
    parse_contact_id,
  },
  store::ContactStore,
  upstream::{ApiKey, PhoneValidator, WorldClock},
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Settings threaded into a [`Directory`] by its owner.
#[derive(Debug, Clone, Default)]
pub struct DirectoryConfig {
  /// Credential for the upstream services. Only the mutations that need it
  /// fail when it is absent.
  pub api_key: Option<ApiKey>,
}

// ─── Directory ───────────────────────────────────────────────────────────────

/// Orchestrates the store and the upstream services.
///
/// Cloning is cheap — the store and upstream client are reference-counted.
pub struct Directory<S, U> {
  store:    Arc<S>,
  upstream: Arc<U>,
  config:   DirectoryConfig,
}

impl<S, U> Clone for Directory<S, U> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      upstream: Arc::clone(&self.upstream),
      config:   self.config.clone(),
    }
  }
}

impl<S, U> Directory<S, U>
where
  S: ContactStore,
  U: PhoneValidator + WorldClock,
{
  pub fn new(store: Arc<S>, upstream: Arc<U>, config: DirectoryConfig) -> Self {
    Self { store, upstream, config }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Queries ─────────────────────────────────────────────────────────────

  pub async fn list(&self) -> Result<Vec<Contact>> {
    self.store.list_contacts().await.map_err(Error::store)
  }

  pub async fn get(&self, raw_id: &str) -> Result<Contact> {
    let id = parse_contact_id(raw_id)?;
    self.fetch(id).await
  }

  // ── Mutations ───────────────────────────────────────────────────────────

  /// Validate `telefono`, derive its country and local time, and insert.
  pub async fn add(&self, nombre: String, telefono: String) -> Result<Contact> {
    let api_key = self.api_key()?;

    self.ensure_phone_free(&telefono).await?;
    let enrichment = self.enrich(api_key, &telefono).await?;

    let input = NewContact {
      nombre,
      telefono,
      pais: enrichment.pais,
      hora_actual: enrichment.hora_actual,
    };

    match self.store.insert_contact(input.clone()).await.map_err(Error::store)? {
      WriteOutcome::Written(contact) => {
        info!(contact_id = %contact.contact_id, pais = %contact.pais, "contact added");
        Ok(contact)
      }
      WriteOutcome::PhoneTaken | WriteOutcome::Missing => {
        warn!(telefono = %input.telefono, "insert lost a race on the phone constraint");
        Err(Error::PhoneRegistered(input.telefono))
      }
    }
  }

  /// Update the name, the phone, or both.
  ///
  /// A name-only update makes no upstream calls. A phone update re-derives
  /// `pais` and `hora_actual`; `nombre` is kept when not supplied.
  pub async fn update(
    &self,
    raw_id: &str,
    nombre: Option<String>,
    telefono: Option<String>,
  ) -> Result<Contact> {
    let nombre = nombre.filter(|n| !n.is_empty());
    let telefono = telefono.filter(|t| !t.is_empty());

    if nombre.is_none() && telefono.is_none() {
      return Err(Error::NothingToUpdate);
    }
    let api_key = self.api_key()?;
    let id = parse_contact_id(raw_id)?;
    self.fetch(id).await?;

    let patch = match (nombre, telefono) {
      (Some(nombre), None) => ContactPatch::rename(nombre),
      (nombre, Some(telefono)) => {
        if let Some(holder) = self
          .store
          .find_by_phone(&telefono)
          .await
          .map_err(Error::store)?
          && holder.contact_id != id
        {
          warn!(contact_id = %id, holder = %holder.contact_id, "phone held by another contact");
          return Err(Error::PhoneExists(telefono));
        }
        let enrichment = self.enrich(api_key, &telefono).await?;
        ContactPatch::rephone(nombre, telefono, enrichment)
      }
      (None, None) => return Err(Error::NothingToUpdate),
    };

    let telefono = patch.telefono.clone();
    match self.store.update_contact(id, patch).await.map_err(Error::store)? {
      WriteOutcome::Written(contact) => {
        info!(contact_id = %id, "contact updated");
        Ok(contact)
      }
      WriteOutcome::PhoneTaken => Err(Error::PhoneExists(telefono.unwrap_or_default())),
      WriteOutcome::Missing => Err(Error::NotFoundAfterUpdate(id)),
    }
  }

  /// Hard-delete. A well-formed identifier with no contact yields `false`.
  pub async fn delete(&self, raw_id: &str) -> Result<bool> {
    let id = parse_contact_id(raw_id)?;
    let removed = self.store.delete_contact(id).await.map_err(Error::store)?;
    if removed {
      info!(contact_id = %id, "contact deleted");
    } else {
      debug!(contact_id = %id, "delete matched no contact");
    }
    Ok(removed)
  }

  // ── Steps ───────────────────────────────────────────────────────────────

  fn api_key(&self) -> Result<&ApiKey> {
    self.config.api_key.as_ref().ok_or(Error::MissingApiKey)
  }

  async fn fetch(&self, id: Uuid) -> Result<Contact> {
    self
      .store
      .get_contact(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))
  }

  /// Reject a phone number some contact already holds.
  async fn ensure_phone_free(&self, telefono: &str) -> Result<()> {
    let holders = self.store.count_by_phone(telefono).await.map_err(Error::store)?;
    if holders > 0 {
      warn!(%telefono, "phone already registered");
      return Err(Error::PhoneRegistered(telefono.to_owned()));
    }
    Ok(())
  }

  /// Validate the phone upstream, then look up the time in its country.
  async fn enrich(&self, api_key: &ApiKey, telefono: &str) -> Result<Enrichment> {
    let validation = self.upstream.validate_phone(api_key, telefono).await?;
    if !validation.is_valid {
      return Err(Error::InvalidPhone(telefono.to_owned()));
    }
    debug!(%telefono, country = %validation.country, "phone validated");

    let hora_actual = self.upstream.current_time(api_key, &validation.country).await?;
    Ok(Enrichment { pais: validation.country, hora_actual })
  }
}
