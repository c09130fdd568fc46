//! [`SqliteStore`]: the SQLite implementation of [`GateStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use gatehouse_core::{
  announcement::{Announcement, NewAnnouncement},
  store::GateStore,
  user::{Audience, NewUser, Recipient, Role, User},
  visitor::{NewVisitor, Visitor, VisitorStatus},
};

use crate::{
  Result,
  encode::{
    ANNOUNCEMENT_COLUMNS, RawAnnouncement, RawUser, RawVisitor, USER_COLUMNS,
    VISITOR_COLUMNS, decode_uuid, encode_dt, encode_uuid, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Gatehouse store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
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

  /// Open an in-memory store, useful for testing.
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

  async fn query_visitor(&self, id: Uuid) -> Result<Option<Visitor>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawVisitor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {VISITOR_COLUMNS} FROM visitors WHERE visitor_id = ?1"),
              rusqlite::params![id_str],
              RawVisitor::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawVisitor::into_visitor).transpose()
  }

  /// Run an `UPDATE visitors ...` statement and return the row as written.
  /// The update and the read happen in one statement, so a concurrent write
  /// cannot land in between.
  async fn update_visitor(
    &self,
    id: Uuid,
    sql: &'static str,
    params: Vec<Option<String>>,
  ) -> Result<Option<Visitor>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawVisitor> = self
      .conn
      .call(move |conn| {
        let mut bound: Vec<&dyn rusqlite::ToSql> = vec![&id_str];
        bound.extend(params.iter().map(|p| p as &dyn rusqlite::ToSql));
        Ok(
          conn
            .query_row(
              &format!("{sql} RETURNING {VISITOR_COLUMNS}"),
              bound.as_slice(),
              RawVisitor::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawVisitor::into_visitor).transpose()
  }

  async fn query_users(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn query_recipients(&self, sql: String, params: Vec<String>) -> Result<Vec<Recipient>> {
    let raws: Vec<(String, Option<String>)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(id, push_token)| Ok(Recipient { id: decode_uuid(&id)?, push_token }))
      .collect()
  }
}

// ─── GateStore impl ──────────────────────────────────────────────────────────

impl GateStore for SqliteStore {
  type Error = crate::Error;

  // ── Visitors ──────────────────────────────────────────────────────────────

  async fn insert_visitor(&self, input: NewVisitor) -> Result<Visitor> {
    let visitor = Visitor {
      id:            Uuid::new_v4(),
      name:          input.name,
      purpose:       input.purpose,
      mobile:        input.mobile,
      target_flat:   input.target_flat,
      photo:         input.photo,
      status:        VisitorStatus::Pending,
      entry_time:    now(),
      approval_time: None,
    };

    let id_str      = encode_uuid(visitor.id);
    let name        = visitor.name.clone();
    let purpose     = visitor.purpose.clone();
    let mobile      = visitor.mobile.clone();
    let target_flat = visitor.target_flat.clone();
    let photo       = visitor.photo.clone();
    let status_str  = visitor.status.as_str();
    let entry_str   = encode_dt(visitor.entry_time);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO visitors (
             visitor_id, name, purpose, mobile, target_flat, photo,
             status, entry_time, approval_time
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)",
          rusqlite::params![
            id_str,
            name,
            purpose,
            mobile,
            target_flat,
            photo,
            status_str,
            entry_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(visitor)
  }

  async fn get_visitor(&self, id: Uuid) -> Result<Option<Visitor>> {
    self.query_visitor(id).await
  }

  async fn retarget_visitor(
    &self,
    id:          Uuid,
    target_flat: String,
    purpose:     Option<String>,
  ) -> Result<Option<Visitor>> {
    self
      .update_visitor(
        id,
        "UPDATE visitors
            SET target_flat = ?2,
                purpose     = COALESCE(?3, purpose)
          WHERE visitor_id = ?1",
        vec![Some(target_flat), purpose],
      )
      .await
  }

  async fn set_visitor_status(
    &self,
    id:     Uuid,
    status: VisitorStatus,
    at:     DateTime<Utc>,
  ) -> Result<Option<Visitor>> {
    self
      .update_visitor(
        id,
        "UPDATE visitors
            SET status        = ?2,
                approval_time = ?3
          WHERE visitor_id = ?1",
        vec![Some(status.as_str().to_owned()), Some(encode_dt(at))],
      )
      .await
  }

  async fn list_visitors(&self, flat: Option<&str>) -> Result<Vec<Visitor>> {
    let flat = flat.map(str::to_owned);

    let raws: Vec<RawVisitor> = self
      .conn
      .call(move |conn| {
        // Ties on entry_time fall back to insertion order, newest first.
        let rows = if let Some(f) = flat {
          let mut stmt = conn.prepare(&format!(
            "SELECT {VISITOR_COLUMNS} FROM visitors
              WHERE target_flat = ?1
              ORDER BY entry_time DESC, rowid DESC"
          ))?;
          stmt
            .query_map(rusqlite::params![f], RawVisitor::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {VISITOR_COLUMNS} FROM visitors
              ORDER BY entry_time DESC, rowid DESC"
          ))?;
          stmt
            .query_map([], RawVisitor::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisitor::into_visitor).collect()
  }

  // ── Directory ─────────────────────────────────────────────────────────────

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      id:          Uuid::new_v4(),
      phone:       input.phone,
      name:        input.name,
      role:        input.role,
      flat_number: input.flat_number,
      push_token:  None,
      created_at:  now(),
    };

    let id_str   = encode_uuid(user.id);
    let phone    = user.phone.clone();
    let name     = user.name.clone();
    let role_str = user.role.as_str();
    let flat     = user.flat_number.clone();
    let at_str   = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, phone, name, role, flat_number, push_token, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6)",
          rusqlite::params![id_str, phone, name, role_str, flat, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let users = self
      .query_users(
        format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
        vec![encode_uuid(id)],
      )
      .await?;
    Ok(users.into_iter().next())
  }

  async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
    let users = self
      .query_users(
        format!("SELECT {USER_COLUMNS} FROM users WHERE phone = ?1"),
        vec![phone.to_owned()],
      )
      .await?;
    Ok(users.into_iter().next())
  }

  async fn residents_by_flat(&self, flat: &str) -> Result<Vec<Recipient>> {
    self
      .query_recipients(
        "SELECT user_id, push_token FROM users
          WHERE role = ?1 AND flat_number = ?2
          ORDER BY created_at, rowid"
          .to_owned(),
        vec![Role::Resident.as_str().to_owned(), flat.to_owned()],
      )
      .await
  }

  async fn users_by_audience(&self, audience: Audience) -> Result<Vec<Recipient>> {
    match audience.role() {
      Some(role) => {
        self
          .query_recipients(
            "SELECT user_id, push_token FROM users WHERE role = ?1 ORDER BY created_at, rowid"
              .to_owned(),
            vec![role.as_str().to_owned()],
          )
          .await
      }
      None => {
        self
          .query_recipients(
            "SELECT user_id, push_token FROM users ORDER BY created_at, rowid".to_owned(),
            vec![],
          )
          .await
      }
    }
  }

  async fn users_by_flat(&self, flat: &str) -> Result<Vec<User>> {
    self
      .query_users(
        format!(
          "SELECT {USER_COLUMNS} FROM users WHERE flat_number = ?1 ORDER BY created_at, rowid"
        ),
        vec![flat.to_owned()],
      )
      .await
  }

  async fn set_push_token(&self, user_id: Uuid, token: Option<String>) -> Result<bool> {
    let id_str = encode_uuid(user_id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET push_token = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, token],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── Announcements ─────────────────────────────────────────────────────────

  async fn insert_announcement(&self, input: NewAnnouncement) -> Result<Announcement> {
    let announcement = Announcement {
      id:         Uuid::new_v4(),
      title:      input.title,
      message:    input.message,
      target:     input.target,
      created_at: now(),
    };

    let id_str     = encode_uuid(announcement.id);
    let title      = announcement.title.clone();
    let message    = announcement.message.clone();
    let target_str = announcement.target.as_str();
    let at_str     = encode_dt(announcement.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO announcements (announcement_id, title, message, target, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, title, message, target_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(announcement)
  }

  async fn list_announcements(&self, role: &str) -> Result<Vec<Announcement>> {
    let role = role.to_owned();

    let raws: Vec<RawAnnouncement> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements
            WHERE target = ?1 OR target = 'all'
            ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![role], RawAnnouncement::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnnouncement::into_announcement).collect()
  }
}
