//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond precision
//! and a `Z` suffix, so lexical order in SQL equals chronological order. UUIDs
//! are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use gatehouse_core::{
  announcement::Announcement,
  user::{Audience, Role, User},
  visitor::{Visitor, VisitorStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<VisitorStatus> {
  match s {
    "pending" => Ok(VisitorStatus::Pending),
    "approved" => Ok(VisitorStatus::Approved),
    "rejected" => Ok(VisitorStatus::Rejected),
    other => Err(unknown("status", other)),
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "guard" => Ok(Role::Guard),
    "resident" => Ok(Role::Resident),
    "admin" => Ok(Role::Admin),
    other => Err(unknown("role", other)),
  }
}

pub fn decode_audience(s: &str) -> Result<Audience> {
  match s {
    "all" => Ok(Audience::All),
    "resident" => Ok(Audience::Resident),
    "guard" => Ok(Audience::Guard),
    other => Err(unknown("target", other)),
  }
}

fn unknown(column: &'static str, value: &str) -> Error {
  Error::UnknownValue { column, value: value.to_owned() }
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const VISITOR_COLUMNS: &str = "visitor_id, name, purpose, mobile, target_flat, photo, \
                                   status, entry_time, approval_time";

/// Raw strings read directly from a `visitors` row.
pub struct RawVisitor {
  pub visitor_id:    String,
  pub name:          Option<String>,
  pub purpose:       Option<String>,
  pub mobile:        String,
  pub target_flat:   String,
  pub photo:         Option<String>,
  pub status:        String,
  pub entry_time:    String,
  pub approval_time: Option<String>,
}

impl RawVisitor {
  /// Map a row selected with [`VISITOR_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      visitor_id:    row.get(0)?,
      name:          row.get(1)?,
      purpose:       row.get(2)?,
      mobile:        row.get(3)?,
      target_flat:   row.get(4)?,
      photo:         row.get(5)?,
      status:        row.get(6)?,
      entry_time:    row.get(7)?,
      approval_time: row.get(8)?,
    })
  }

  pub fn into_visitor(self) -> Result<Visitor> {
    Ok(Visitor {
      id:            decode_uuid(&self.visitor_id)?,
      name:          self.name,
      purpose:       self.purpose,
      mobile:        self.mobile,
      target_flat:   self.target_flat,
      photo:         self.photo,
      status:        decode_status(&self.status)?,
      entry_time:    decode_dt(&self.entry_time)?,
      approval_time: self.approval_time.as_deref().map(decode_dt).transpose()?,
    })
  }
}

pub const USER_COLUMNS: &str =
  "user_id, phone, name, role, flat_number, push_token, created_at";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:     String,
  pub phone:       String,
  pub name:        String,
  pub role:        String,
  pub flat_number: Option<String>,
  pub push_token:  Option<String>,
  pub created_at:  String,
}

impl RawUser {
  /// Map a row selected with [`USER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:     row.get(0)?,
      phone:       row.get(1)?,
      name:        row.get(2)?,
      role:        row.get(3)?,
      flat_number: row.get(4)?,
      push_token:  row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:          decode_uuid(&self.user_id)?,
      phone:       self.phone,
      name:        self.name,
      role:        decode_role(&self.role)?,
      flat_number: self.flat_number,
      push_token:  self.push_token,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub const ANNOUNCEMENT_COLUMNS: &str = "announcement_id, title, message, target, created_at";

/// Raw strings read directly from an `announcements` row.
pub struct RawAnnouncement {
  pub announcement_id: String,
  pub title:           String,
  pub message:         String,
  pub target:          String,
  pub created_at:      String,
}

impl RawAnnouncement {
  /// Map a row selected with [`ANNOUNCEMENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      announcement_id: row.get(0)?,
      title:           row.get(1)?,
      message:         row.get(2)?,
      target:          row.get(3)?,
      created_at:      row.get(4)?,
    })
  }

  pub fn into_announcement(self) -> Result<Announcement> {
    Ok(Announcement {
      id:         decode_uuid(&self.announcement_id)?,
      title:      self.title,
      message:    self.message,
      target:     decode_audience(&self.target)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
