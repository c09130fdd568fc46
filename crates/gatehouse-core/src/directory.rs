//! Resident directory adapter.
//!
//! The directory owns user accounts. The core consumes a narrow slice of it:
//! recipient lookup by flat or audience, token patching, and read-only flat
//! membership. This wrapper turns the store's `Option`/`bool` answers into the
//! core error taxonomy.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  store::GateStore,
  user::{Audience, FlatMember, NewUser, Recipient, ResidentContact, Role, User},
};

pub struct Directory<S> {
  store: Arc<S>,
}

impl<S> Clone for Directory<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: GateStore> Directory<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Every resident account bound to `flat`. Empty, one, or many.
  pub async fn residents_by_flat(&self, flat: &str) -> Result<Vec<Recipient>> {
    self
      .store
      .residents_by_flat(flat)
      .await
      .map_err(Error::persistence)
  }

  pub async fn users_by_audience(&self, audience: Audience) -> Result<Vec<Recipient>> {
    self
      .store
      .users_by_audience(audience)
      .await
      .map_err(Error::persistence)
  }

  /// Register, refresh, or (with `None`) clear a user's device token.
  pub async fn set_push_token(&self, user_id: Uuid, token: Option<String>) -> Result<()> {
    if matches!(&token, Some(t) if t.trim().is_empty()) {
      return Err(Error::Validation("token must not be empty".into()));
    }
    let clearing = token.is_none();
    let found = self
      .store
      .set_push_token(user_id, token.map(|t| t.trim().to_owned()))
      .await
      .map_err(Error::persistence)?;
    if !found {
      return Err(Error::UserNotFound(user_id));
    }
    if clearing {
      tracing::info!(%user_id, "push token cleared");
    } else {
      tracing::info!(%user_id, "push token registered");
    }
    Ok(())
  }

  /// Accounts bound to `flat`. No notification side effect.
  pub async fn members_of_flat(&self, flat: &str) -> Result<Vec<FlatMember>> {
    let users = self
      .store
      .users_by_flat(flat)
      .await
      .map_err(Error::persistence)?;
    Ok(
      users
        .into_iter()
        .map(|u| FlatMember { id: u.id, name: u.name, role: u.role })
        .collect(),
    )
  }

  /// Phone and name of the longest-registered resident of `flat`.
  pub async fn contact_for_flat(&self, flat: &str) -> Result<ResidentContact> {
    self
      .store
      .users_by_flat(flat)
      .await
      .map_err(Error::persistence)?
      .into_iter()
      .find(|u| u.role == Role::Resident)
      .map(|u| ResidentContact { phone: u.phone, name: u.name })
      .ok_or_else(|| Error::FlatHasNoResidents(flat.to_owned()))
  }

  /// Provision a directory account. A phone already on file is a conflict.
  pub async fn add_user(&self, input: NewUser) -> Result<User> {
    let phone = input.phone.trim().to_owned();
    let name = input.name.trim().to_owned();
    if phone.is_empty() {
      return Err(Error::Validation("phone is required".into()));
    }
    if name.is_empty() {
      return Err(Error::Validation("name is required".into()));
    }
    let flat_number = input
      .flat_number
      .map(|f| f.trim().to_owned())
      .filter(|f| !f.is_empty());
    if input.role == Role::Resident && flat_number.is_none() {
      return Err(Error::Validation("residents need a flat number".into()));
    }

    if self
      .store
      .find_user_by_phone(&phone)
      .await
      .map_err(Error::persistence)?
      .is_some()
    {
      return Err(Error::Conflict(format!("phone {phone} is already registered")));
    }

    let user = self
      .store
      .insert_user(NewUser { phone, name, role: input.role, flat_number })
      .await
      .map_err(Error::persistence)?;
    tracing::info!(user_id = %user.id, role = %user.role, "directory account created");
    Ok(user)
  }
}
