//! Directory records and the projections the core reads from them.
//!
//! User accounts are owned by the resident directory. This crate reads them
//! and patches only their push tokens.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// The role a directory account plays at the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Guard,
  Resident,
  Admin,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Guard => "guard",
      Self::Resident => "resident",
      Self::Admin => "admin",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "guard" => Ok(Self::Guard),
      "resident" => Ok(Self::Resident),
      "admin" => Ok(Self::Admin),
      other => Err(Error::Validation(format!("unknown role {other:?}"))),
    }
  }
}

/// A directory account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:          Uuid,
  /// Unique across the directory.
  pub phone:       String,
  pub name:        String,
  pub role:        Role,
  /// Only meaningful for residents.
  pub flat_number: Option<String>,
  /// Opaque device handle; cleared on logout.
  pub push_token:  Option<String>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::GateStore::insert_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub phone:       String,
  pub name:        String,
  pub role:        Role,
  pub flat_number: Option<String>,
}

/// Who to notify: an account id and its device token, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
  pub id:         Uuid,
  pub push_token: Option<String>,
}

/// One account bound to a flat, as shown in a membership listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatMember {
  pub id:   Uuid,
  pub name: String,
  pub role: Role,
}

/// What a guard needs to call a flat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResidentContact {
  pub phone: String,
  pub name:  String,
}

// ─── Audience ────────────────────────────────────────────────────────────────

/// The population an announcement is addressed to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
  #[default]
  All,
  Resident,
  Guard,
}

impl Audience {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::All => "all",
      Self::Resident => "resident",
      Self::Guard => "guard",
    }
  }

  /// Parse a target, falling back to [`Audience::All`] for anything
  /// unrecognised.
  pub fn parse_or_all(s: &str) -> Self {
    match s.trim().to_ascii_lowercase().as_str() {
      "resident" => Self::Resident,
      "guard" => Self::Guard,
      _ => Self::All,
    }
  }

  /// The role filter this audience applies, if any.
  pub fn role(self) -> Option<Role> {
    match self {
      Self::All => None,
      Self::Resident => Some(Role::Resident),
      Self::Guard => Some(Role::Guard),
    }
  }
}

impl fmt::Display for Audience {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Body for registering or refreshing a device token.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushTokenRequest {
  pub user_id: Option<String>,
  pub token:   Option<String>,
}

/// Body for logging a device out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
  pub user_id: Option<String>,
}
