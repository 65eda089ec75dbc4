//! The `Contact` type and the `Query` / `Mutation` roots.
//!
//! ```graphql
//! type Contact { id: ID!, nombre: String!, telefono: String!, pais: String!, horaActual: String! }
//! type Query {
//!   getContacts: [Contact!]!
//!   getContact(id: ID!): Contact!
//! }
//! type Mutation {
//!   addContact(nombre: String!, telefono: String!): Contact!
//!   updateContact(id: ID!, nombre: String, telefono: String): Contact!
//!   deleteContact(id: ID!): Boolean!
//! }
//! ```

use std::marker::PhantomData;

use agenda_core::{
  contact::Contact,
  directory::Directory,
  store::ContactStore,
  upstream::{PhoneValidator, WorldClock},
};
use async_graphql::{Context, ID, Object, Result, SimpleObject};

use crate::error::to_graphql;

// ─── Contact ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Contact")]
pub struct ContactNode {
  pub id:          ID,
  pub nombre:      String,
  pub telefono:    String,
  pub pais:        String,
  pub hora_actual: String,
}

impl From<Contact> for ContactNode {
  fn from(c: Contact) -> Self {
    Self {
      id:          ID(c.contact_id.to_string()),
      nombre:      c.nombre,
      telefono:    c.telefono,
      pais:        c.pais,
      hora_actual: c.hora_actual,
    }
  }
}

fn directory<'c, S, U>(ctx: &Context<'c>) -> Result<&'c Directory<S, U>>
where
  S: ContactStore + 'static,
  U: PhoneValidator + WorldClock + 'static,
{
  ctx.data::<Directory<S, U>>()
}

// ─── Query ───────────────────────────────────────────────────────────────────

pub struct Query<S, U>(PhantomData<fn() -> (S, U)>);

impl<S, U> Default for Query<S, U> {
  fn default() -> Self { Self(PhantomData) }
}

#[Object]
impl<S: ContactStore + 'static, U: PhoneValidator + WorldClock + 'static> Query<S, U> {
  // Every contact, in store order.
  async fn get_contacts(&self, ctx: &Context<'_>) -> Result<Vec<ContactNode>> {
    let contacts = directory::<S, U>(ctx)?.list().await.map_err(to_graphql)?;
    Ok(contacts.into_iter().map(ContactNode::from).collect())
  }

  async fn get_contact(&self, ctx: &Context<'_>, id: ID) -> Result<ContactNode> {
    let contact = directory::<S, U>(ctx)?.get(&id).await.map_err(to_graphql)?;
    Ok(contact.into())
  }
}

// ─── Mutation ────────────────────────────────────────────────────────────────

pub struct Mutation<S, U>(PhantomData<fn() -> (S, U)>);

impl<S, U> Default for Mutation<S, U> {
  fn default() -> Self { Self(PhantomData) }
}

#[Object]
impl<S: ContactStore + 'static, U: PhoneValidator + WorldClock + 'static> Mutation<S, U> {
  // `pais` and `horaActual` are derived from `telefono`.
  async fn add_contact(
    &self,
    ctx: &Context<'_>,
    nombre: String,
    telefono: String,
  ) -> Result<ContactNode> {
    let contact = directory::<S, U>(ctx)?
      .add(nombre, telefono)
      .await
      .map_err(to_graphql)?;
    Ok(contact.into())
  }

  async fn update_contact(
    &self,
    ctx: &Context<'_>,
    id: ID,
    nombre: Option<String>,
    telefono: Option<String>,
  ) -> Result<ContactNode> {
    let contact = directory::<S, U>(ctx)?
      .update(&id, nombre, telefono)
      .await
      .map_err(to_graphql)?;
    Ok(contact.into())
  }

  // `false` when no contact had this identifier.
  async fn delete_contact(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
    directory::<S, U>(ctx)?.delete(&id).await.map_err(to_graphql)
  }
}
