//! Tests for [`Directory`] against in-memory fakes of the store and upstreams.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use uuid::Uuid;

use crate::{
  Error, UpstreamError,
  contact::{Contact, ContactPatch, NewContact, WriteOutcome},
  directory::{Directory, DirectoryConfig},
  store::ContactStore,
  upstream::{ApiKey, PhoneValidation, PhoneValidator, WorldClock},
};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryStore {
  rows:  Mutex<Vec<Contact>>,
  reads: AtomicUsize,
}

impl MemoryStore {
  fn phone_taken(rows: &[Contact], telefono: &str, except: Option<Uuid>) -> bool {
    rows
      .iter()
      .any(|c| c.telefono == telefono && Some(c.contact_id) != except)
  }
}

impl ContactStore for MemoryStore {
  type Error = Infallible;

  async fn list_contacts(&self) -> Result<Vec<Contact>, Infallible> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    Ok(self.rows.lock().unwrap().clone())
  }

  async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>, Infallible> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    let rows = self.rows.lock().unwrap();
    Ok(rows.iter().find(|c| c.contact_id == id).cloned())
  }

  async fn find_by_phone(&self, telefono: &str) -> Result<Option<Contact>, Infallible> {
    let rows = self.rows.lock().unwrap();
    Ok(rows.iter().find(|c| c.telefono == telefono).cloned())
  }

  async fn count_by_phone(&self, telefono: &str) -> Result<u64, Infallible> {
    let rows = self.rows.lock().unwrap();
    Ok(rows.iter().filter(|c| c.telefono == telefono).count() as u64)
  }

  async fn insert_contact(&self, input: NewContact) -> Result<WriteOutcome, Infallible> {
    let mut rows = self.rows.lock().unwrap();
    if Self::phone_taken(&rows, &input.telefono, None) {
      return Ok(WriteOutcome::PhoneTaken);
    }
    let contact = Contact {
      contact_id:  Uuid::new_v4(),
      nombre:      input.nombre,
      telefono:    input.telefono,
      pais:        input.pais,
      hora_actual: input.hora_actual,
    };
    rows.push(contact.clone());
    Ok(WriteOutcome::Written(contact))
  }

  async fn update_contact(
    &self,
    id: Uuid,
    patch: ContactPatch,
  ) -> Result<WriteOutcome, Infallible> {
    let mut rows = self.rows.lock().unwrap();
    if let Some(t) = &patch.telefono
      && Self::phone_taken(&rows, t, Some(id))
    {
      return Ok(WriteOutcome::PhoneTaken);
    }
    let Some(row) = rows.iter_mut().find(|c| c.contact_id == id) else {
      return Ok(WriteOutcome::Missing);
    };
    if let Some(v) = patch.nombre {
      row.nombre = v;
    }
    if let Some(v) = patch.telefono {
      row.telefono = v;
    }
    if let Some(v) = patch.pais {
      row.pais = v;
    }
    if let Some(v) = patch.hora_actual {
      row.hora_actual = v;
    }
    Ok(WriteOutcome::Written(row.clone()))
  }

  async fn delete_contact(&self, id: Uuid) -> Result<bool, Infallible> {
    let mut rows = self.rows.lock().unwrap();
    let before = rows.len();
    rows.retain(|c| c.contact_id != id);
    Ok(rows.len() != before)
  }
}

/// Passes every pre-check, then refuses the write with a fixed outcome, as a
/// store does when a concurrent writer got there first.
struct RacyStore {
  existing: Contact,
  outcome:  WriteOutcome,
}

impl RacyStore {
  fn new(outcome: WriteOutcome) -> Self {
    Self {
      existing: Contact {
        contact_id:  Uuid::new_v4(),
        nombre:      "Ana".into(),
        telefono:    FRANCE.into(),
        pais:        "France".into(),
        hora_actual: "2025-01-01 12:00:00 @ France".into(),
      },
      outcome,
    }
  }
}

impl ContactStore for RacyStore {
  type Error = Infallible;

  async fn list_contacts(&self) -> Result<Vec<Contact>, Infallible> {
    Ok(vec![self.existing.clone()])
  }

  async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>, Infallible> {
    Ok((id == self.existing.contact_id).then(|| self.existing.clone()))
  }

  async fn find_by_phone(&self, _telefono: &str) -> Result<Option<Contact>, Infallible> {
    Ok(None)
  }

  async fn count_by_phone(&self, _telefono: &str) -> Result<u64, Infallible> { Ok(0) }

  async fn insert_contact(&self, _input: NewContact) -> Result<WriteOutcome, Infallible> {
    Ok(self.outcome.clone())
  }

  async fn update_contact(
    &self,
    _id: Uuid,
    _patch: ContactPatch,
  ) -> Result<WriteOutcome, Infallible> {
    Ok(self.outcome.clone())
  }

  async fn delete_contact(&self, _id: Uuid) -> Result<bool, Infallible> { Ok(false) }
}

/// Upstream fake: known phones map to a country, every country has a clock.
#[derive(Default)]
struct FakeNinjas {
  phones:       HashMap<String, String>,
  clock_status: Option<u16>,
  validations:  AtomicUsize,
  time_lookups: AtomicUsize,
}

impl FakeNinjas {
  fn with_phones(pairs: &[(&str, &str)]) -> Self {
    Self {
      phones: pairs
        .iter()
        .map(|(p, c)| (p.to_string(), c.to_string()))
        .collect(),
      ..Self::default()
    }
  }

  fn calls(&self) -> usize {
    self.validations.load(Ordering::SeqCst) + self.time_lookups.load(Ordering::SeqCst)
  }
}

impl PhoneValidator for FakeNinjas {
  async fn validate_phone(
    &self,
    _api_key: &ApiKey,
    telefono: &str,
  ) -> Result<PhoneValidation, UpstreamError> {
    self.validations.fetch_add(1, Ordering::SeqCst);
    Ok(match self.phones.get(telefono) {
      Some(country) => PhoneValidation {
        is_valid:  true,
        country:   country.clone(),
        timezones: vec![format!("Europe/{country}")],
      },
      None => PhoneValidation { is_valid: false, country: String::new(), timezones: vec![] },
    })
  }
}

impl WorldClock for FakeNinjas {
  async fn current_time(&self, _api_key: &ApiKey, pais: &str) -> Result<String, UpstreamError> {
    self.time_lookups.fetch_add(1, Ordering::SeqCst);
    if let Some(status) = self.clock_status {
      return Err(UpstreamError::Status { service: "worldtime", status });
    }
    Ok(format!("2025-01-01 12:00:00 @ {pais}"))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

const SPAIN: &str = "+34645543345";
const FRANCE: &str = "+33612345678";

fn directory_with(ninjas: FakeNinjas) -> (Directory<MemoryStore, FakeNinjas>, Arc<FakeNinjas>) {
  let ninjas = Arc::new(ninjas);
  let config = DirectoryConfig { api_key: Some(ApiKey::new("test-key")) };
  let dir = Directory::new(Arc::new(MemoryStore::default()), Arc::clone(&ninjas), config);
  (dir, ninjas)
}

fn directory() -> (Directory<MemoryStore, FakeNinjas>, Arc<FakeNinjas>) {
  directory_with(FakeNinjas::with_phones(&[(SPAIN, "Spain"), (FRANCE, "France")]))
}

fn racy_directory(outcome: WriteOutcome) -> (Directory<RacyStore, FakeNinjas>, String) {
  let store = Arc::new(RacyStore::new(outcome));
  let id = store.existing.contact_id.to_string();
  let ninjas = FakeNinjas::with_phones(&[(SPAIN, "Spain"), (FRANCE, "France")]);
  let config = DirectoryConfig { api_key: Some(ApiKey::new("test-key")) };
  (Directory::new(store, Arc::new(ninjas), config), id)
}

// ─── Add ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_derives_country_and_time() {
  let (dir, _) = directory();

  let contact = dir.add("Alberto Romero Sanz".into(), SPAIN.into()).await.unwrap();
  assert_eq!(contact.pais, "Spain");
  assert_eq!(contact.hora_actual, "2025-01-01 12:00:00 @ Spain");

  let fetched = dir.get(&contact.contact_id.to_string()).await.unwrap();
  assert_eq!(fetched, contact);
}

#[tokio::test]
async fn add_duplicate_phone_is_rejected_before_upstream() {
  let (dir, ninjas) = directory();
  dir.add("First".into(), SPAIN.into()).await.unwrap();
  let calls_before = ninjas.calls();

  let err = dir.add("Second".into(), SPAIN.into()).await.unwrap_err();
  assert!(matches!(err, Error::PhoneRegistered(_)));
  assert!(err.to_string().contains("already registered"));
  assert_eq!(ninjas.calls(), calls_before);
  assert_eq!(dir.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn add_invalid_phone_fails_without_insert() {
  let (dir, ninjas) = directory();
  let err = dir.add("Nobody".into(), "+000".into()).await.unwrap_err();
  assert!(matches!(err, Error::InvalidPhone(_)));
  assert_eq!(ninjas.time_lookups.load(Ordering::SeqCst), 0);
  assert!(dir.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn add_without_api_key_is_a_configuration_error() {
  let store = Arc::new(MemoryStore::default());
  let dir = Directory::new(store, Arc::new(FakeNinjas::default()), DirectoryConfig::default());
  let err = dir.add("Ana".into(), SPAIN.into()).await.unwrap_err();
  assert!(matches!(err, Error::MissingApiKey));
}

#[tokio::test]
async fn add_surfaces_upstream_status() {
  let mut ninjas = FakeNinjas::with_phones(&[(SPAIN, "Spain")]);
  ninjas.clock_status = Some(502);
  let (dir, _) = directory_with(ninjas);

  let err = dir.add("Ana".into(), SPAIN.into()).await.unwrap_err();
  assert!(matches!(err, Error::Upstream(UpstreamError::Status { status: 502, .. })));
  assert!(dir.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn add_refused_by_phone_constraint_is_already_registered() {
  let (dir, _) = racy_directory(WriteOutcome::PhoneTaken);
  let err = dir.add("Eve".into(), SPAIN.into()).await.unwrap_err();
  assert!(matches!(err, Error::PhoneRegistered(ref t) if t == SPAIN));
  assert!(err.to_string().contains("already registered"));
}

// ─── Get ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_malformed_id_does_not_touch_store() {
  let (dir, _) = directory();
  let err = dir.get("zzz").await.unwrap_err();
  assert!(matches!(err, Error::InvalidId(_)));
  assert_eq!(dir.store().reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
  let (dir, _) = directory();
  let id = Uuid::new_v4();
  let err = dir.get(&id.to_string()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(missing) if missing == id));
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_with_nothing_fails_even_for_bad_id() {
  let (dir, _) = directory();
  let err = dir.update("garbage", None, None).await.unwrap_err();
  assert!(matches!(err, Error::NothingToUpdate));
  assert!(err.to_string().contains("must update at least one value"));

  let err = dir.update("garbage", Some(String::new()), None).await.unwrap_err();
  assert!(matches!(err, Error::NothingToUpdate));
}

#[tokio::test]
async fn update_name_only_skips_upstream() {
  let (dir, ninjas) = directory();
  let created = dir.add("Old".into(), SPAIN.into()).await.unwrap();
  let calls_before = ninjas.calls();

  let updated = dir
    .update(&created.contact_id.to_string(), Some("New".into()), None)
    .await
    .unwrap();

  assert_eq!(updated.nombre, "New");
  assert_eq!(updated.telefono, created.telefono);
  assert_eq!(updated.pais, created.pais);
  assert_eq!(updated.hora_actual, created.hora_actual);
  assert_eq!(ninjas.calls(), calls_before);
}

#[tokio::test]
async fn update_phone_rederives_and_keeps_name() {
  let (dir, _) = directory();
  let created = dir.add("Ana".into(), SPAIN.into()).await.unwrap();

  let updated = dir
    .update(&created.contact_id.to_string(), None, Some(FRANCE.into()))
    .await
    .unwrap();

  assert_eq!(updated.nombre, "Ana");
  assert_eq!(updated.telefono, FRANCE);
  assert_eq!(updated.pais, "France");
  assert_eq!(updated.hora_actual, "2025-01-01 12:00:00 @ France");
}

#[tokio::test]
async fn update_to_own_phone_is_allowed() {
  let (dir, _) = directory();
  let created = dir.add("Ana".into(), SPAIN.into()).await.unwrap();

  let updated = dir
    .update(&created.contact_id.to_string(), Some("Ana B".into()), Some(SPAIN.into()))
    .await
    .unwrap();
  assert_eq!(updated.nombre, "Ana B");
  assert_eq!(updated.telefono, SPAIN);
}

#[tokio::test]
async fn update_to_foreign_phone_fails_and_leaves_target() {
  let (dir, _) = directory();
  let spain = dir.add("Ana".into(), SPAIN.into()).await.unwrap();
  let france = dir.add("Luc".into(), FRANCE.into()).await.unwrap();

  let err = dir
    .update(&france.contact_id.to_string(), None, Some(SPAIN.into()))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PhoneExists(_)));
  assert!(err.to_string().contains("already exists"));

  let unchanged = dir.get(&france.contact_id.to_string()).await.unwrap();
  assert_eq!(unchanged, france);
  assert_ne!(unchanged.telefono, spain.telefono);
}

#[tokio::test]
async fn update_missing_contact_is_not_found() {
  let (dir, _) = directory();
  let err = dir
    .update(&Uuid::new_v4().to_string(), Some("X".into()), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn update_requires_api_key_even_for_name() {
  let store = Arc::new(MemoryStore::default());
  let dir = Directory::new(store, Arc::new(FakeNinjas::default()), DirectoryConfig::default());
  let err = dir
    .update(&Uuid::new_v4().to_string(), Some("X".into()), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingApiKey));
}

#[tokio::test]
async fn update_refused_by_phone_constraint_is_already_exists() {
  let (dir, id) = racy_directory(WriteOutcome::PhoneTaken);
  let err = dir.update(&id, None, Some(SPAIN.into())).await.unwrap_err();
  assert!(matches!(err, Error::PhoneExists(ref t) if t == SPAIN));
  assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn update_of_vanished_contact_is_not_found_after_update() {
  let (dir, id) = racy_directory(WriteOutcome::Missing);

  let err = dir.update(&id, Some("Ana B".into()), None).await.unwrap_err();
  assert!(matches!(err, Error::NotFoundAfterUpdate(missing) if missing.to_string() == id));

  let err = dir.update(&id, None, Some(SPAIN.into())).await.unwrap_err();
  assert!(matches!(err, Error::NotFoundAfterUpdate(_)));
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_existing_then_get_is_not_found() {
  let (dir, _) = directory();
  let created = dir.add("Ana".into(), SPAIN.into()).await.unwrap();
  let id = created.contact_id.to_string();

  assert!(dir.delete(&id).await.unwrap());
  assert!(matches!(dir.get(&id).await.unwrap_err(), Error::NotFound(_)));
  assert!(!dir.delete(&id).await.unwrap());
}

#[tokio::test]
async fn delete_malformed_id_errors() {
  let (dir, _) = directory();
  assert!(matches!(dir.delete("nope").await.unwrap_err(), Error::InvalidId(_)));
}
