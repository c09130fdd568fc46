//! The `GateStore` trait: the single source of truth for visitors, directory
//! accounts, and announcements.
//!
//! The trait is implemented by storage backends (e.g. `gatehouse-store-sqlite`).
//! The registry, directory adapter, and broadcaster take the store handle at
//! construction and never reach for a global connection.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  announcement::{Announcement, NewAnnouncement},
  user::{Audience, NewUser, Recipient, User},
  visitor::{NewVisitor, Visitor, VisitorStatus},
};

/// Abstraction over a Gatehouse store backend.
///
/// Every operation is an independent single-record read-modify-write; nothing
/// here spans collections in a transaction.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait GateStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Visitors ──────────────────────────────────────────────────────────

  /// Persist a new visitor. The store assigns `id`, sets `entry_time` to
  /// now, `status` to `Pending`, and leaves `approval_time` unset.
  fn insert_visitor(
    &self,
    input: NewVisitor,
  ) -> impl Future<Output = Result<Visitor, Self::Error>> + Send + '_;

  /// Retrieve a visitor by id. Returns `None` if not found.
  fn get_visitor(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Visitor>, Self::Error>> + Send + '_;

  /// Point a visitor at a different flat. `purpose` replaces the stored one
  /// when `Some`. Status and timestamps are untouched. Returns `None` if the
  /// visitor does not exist.
  fn retarget_visitor(
    &self,
    id: Uuid,
    target_flat: String,
    purpose: Option<String>,
  ) -> impl Future<Output = Result<Option<Visitor>, Self::Error>> + Send + '_;

  /// Overwrite `status` and `approval_time`. Returns `None` if the visitor
  /// does not exist.
  fn set_visitor_status(
    &self,
    id: Uuid,
    status: VisitorStatus,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Visitor>, Self::Error>> + Send + '_;

  /// All visitors, or only those bound to `flat`, newest `entry_time` first.
  fn list_visitors<'a>(
    &'a self,
    flat: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Visitor>, Self::Error>> + Send + 'a;

  // ── Directory ─────────────────────────────────────────────────────────

  /// Persist a new directory account. The phone's uniqueness is enforced by
  /// the backend; callers check first with [`GateStore::find_user_by_phone`].
  fn insert_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user_by_phone<'a>(
    &'a self,
    phone: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Residents (role = resident) whose flat number equals `flat`.
  fn residents_by_flat<'a>(
    &'a self,
    flat: &'a str,
  ) -> impl Future<Output = Result<Vec<Recipient>, Self::Error>> + Send + 'a;

  /// Every account matched by `audience`'s role filter.
  fn users_by_audience(
    &self,
    audience: Audience,
  ) -> impl Future<Output = Result<Vec<Recipient>, Self::Error>> + Send + '_;

  /// Every account bound to `flat`, any role, oldest first.
  fn users_by_flat<'a>(
    &'a self,
    flat: &'a str,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;

  /// Set or clear a device token. Returns `false` if the user does not exist.
  fn set_push_token(
    &self,
    user_id: Uuid,
    token: Option<String>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Announcements ─────────────────────────────────────────────────────

  /// Persist an announcement; the store assigns `id` and `created_at`.
  fn insert_announcement(
    &self,
    input: NewAnnouncement,
  ) -> impl Future<Output = Result<Announcement, Self::Error>> + Send + '_;

  /// Announcements whose target is `role` or `all`, newest first.
  fn list_announcements<'a>(
    &'a self,
    role: &'a str,
  ) -> impl Future<Output = Result<Vec<Announcement>, Self::Error>> + Send + 'a;
}
