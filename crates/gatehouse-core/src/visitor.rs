//! Visitor types: one record per gate arrival.
//!
//! A visitor is created `Pending` by a guard and moved to `Approved` or
//! `Rejected` by a resident. `entry_time` is fixed at creation;
//! `approval_time` is stamped on every decision.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a visitor currently sits in the approval flow.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VisitorStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

impl VisitorStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
    }
  }

  /// `true` for `Approved` and `Rejected`.
  pub fn is_decided(self) -> bool { !matches!(self, Self::Pending) }
}

impl fmt::Display for VisitorStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A resident's decision: the only statuses a status update may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitorDecision {
  Approved,
  Rejected,
}

impl From<VisitorDecision> for VisitorStatus {
  fn from(d: VisitorDecision) -> Self {
    match d {
      VisitorDecision::Approved => Self::Approved,
      VisitorDecision::Rejected => Self::Rejected,
    }
  }
}

impl FromStr for VisitorDecision {
  type Err = Error;

  /// Case-insensitive; `pending` and anything else is rejected.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "approved" => Ok(Self::Approved),
      "rejected" => Ok(Self::Rejected),
      other => Err(Error::Validation(format!(
        "status must be \"approved\" or \"rejected\", got {other:?}"
      ))),
    }
  }
}

// ─── Visitor ─────────────────────────────────────────────────────────────────

/// A single gate-arrival record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
  pub id:            Uuid,
  pub name:          Option<String>,
  pub purpose:       Option<String>,
  pub mobile:        String,
  /// Destination flat; changes only through retargeting.
  pub target_flat:   String,
  /// Opaque reference to a stored photo.
  pub photo:         Option<String>,
  pub status:        VisitorStatus,
  /// Server-assigned at creation; never changes.
  pub entry_time:    DateTime<Utc>,
  /// `None` while pending; re-stamped on every decision.
  pub approval_time: Option<DateTime<Utc>>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Request body for a new visitor as submitted by a guard. Required fields are
/// optional here so that absence is reported as a validation error rather
/// than a decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVisitorRequest {
  pub name:        Option<String>,
  pub purpose:     Option<String>,
  pub target_flat: Option<String>,
  pub mobile:      Option<String>,
  pub photo:       Option<String>,
}

impl NewVisitorRequest {
  /// Check required fields and produce the validated store input.
  pub fn validate(self) -> Result<NewVisitor, Error> {
    let mobile = required(self.mobile, "mobile")?;
    let target_flat = required(self.target_flat, "targetFlat")?;
    Ok(NewVisitor {
      name: non_blank(self.name),
      purpose: non_blank(self.purpose),
      mobile,
      target_flat,
      photo: non_blank(self.photo),
    })
  }
}

/// Input to [`crate::store::GateStore::insert_visitor`].
/// `id`, `status`, and `entry_time` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewVisitor {
  pub name:        Option<String>,
  pub purpose:     Option<String>,
  pub mobile:      String,
  pub target_flat: String,
  pub photo:       Option<String>,
}

/// Request body for moving a visitor to a different flat.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetargetRequest {
  pub id:          Option<String>,
  pub target_flat: Option<String>,
  pub purpose:     Option<String>,
}

/// Request body for a resident's decision.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusRequest {
  pub id:     Option<String>,
  pub status: Option<String>,
}

// ─── Field helpers ───────────────────────────────────────────────────────────

pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, Error> {
  non_blank(value).ok_or_else(|| Error::Validation(format!("{field} is required")))
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

pub(crate) fn parse_id(value: Option<String>) -> Result<Uuid, Error> {
  let raw = required(value, "id")?;
  Uuid::parse_str(&raw).map_err(|_| Error::Validation(format!("invalid id {raw:?}")))
}
