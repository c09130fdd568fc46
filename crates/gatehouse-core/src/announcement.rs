//! Announcements: admin-authored broadcasts. Immutable once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::Audience;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
  pub id:         Uuid,
  pub title:      String,
  pub message:    String,
  pub target:     Audience,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::GateStore::insert_announcement`].
/// `id` and `created_at` are set by the store.
#[derive(Debug, Clone)]
pub struct NewAnnouncement {
  pub title:   String,
  pub message: String,
  pub target:  Audience,
}

/// Request body for a new announcement. `target` is free text; anything
/// unrecognised means everyone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnouncementRequest {
  pub title:   Option<String>,
  pub message: Option<String>,
  pub target:  Option<String>,
}
