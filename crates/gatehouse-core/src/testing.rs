//! In-memory test doubles for the store and notifier seams.

use std::sync::{
  Mutex,
  atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  announcement::{Announcement, NewAnnouncement},
  notify::{Notifier, PushMessage},
  store::GateStore,
  user::{Audience, NewUser, Recipient, Role, User},
  visitor::{NewVisitor, Visitor, VisitorStatus},
};

#[derive(Debug, thiserror::Error)]
#[error("memory store unavailable")]
pub struct Unavailable;

#[derive(Default)]
pub struct MemStore {
  visitors:       Mutex<Vec<Visitor>>,
  users:          Mutex<Vec<User>>,
  announcements:  Mutex<Vec<Announcement>>,
  fail_writes:    AtomicBool,
  fail_directory: AtomicBool,
}

impl MemStore {
  pub fn fail_writes(&self, on: bool) { self.fail_writes.store(on, Ordering::SeqCst); }

  pub fn fail_directory_reads(&self, on: bool) {
    self.fail_directory.store(on, Ordering::SeqCst);
  }

  fn check_write(&self) -> Result<(), Unavailable> {
    if self.fail_writes.load(Ordering::SeqCst) { Err(Unavailable) } else { Ok(()) }
  }

  fn check_directory(&self) -> Result<(), Unavailable> {
    if self.fail_directory.load(Ordering::SeqCst) { Err(Unavailable) } else { Ok(()) }
  }

  fn recipients(&self, keep: impl Fn(&User) -> bool) -> Vec<Recipient> {
    self
      .users
      .lock()
      .unwrap()
      .iter()
      .filter(|u| keep(u))
      .map(|u| Recipient { id: u.id, push_token: u.push_token.clone() })
      .collect()
  }
}

/// Newest first; among equal timestamps, the later insertion wins.
fn newest_first<T: Clone>(items: &[T], key: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
  let mut out: Vec<T> = items.iter().rev().cloned().collect();
  out.sort_by_key(|item| std::cmp::Reverse(key(item)));
  out
}

impl GateStore for MemStore {
  type Error = Unavailable;

  async fn insert_visitor(&self, input: NewVisitor) -> Result<Visitor, Unavailable> {
    self.check_write()?;
    let visitor = Visitor {
      id:            Uuid::new_v4(),
      name:          input.name,
      purpose:       input.purpose,
      mobile:        input.mobile,
      target_flat:   input.target_flat,
      photo:         input.photo,
      status:        VisitorStatus::Pending,
      entry_time:    Utc::now(),
      approval_time: None,
    };
    self.visitors.lock().unwrap().push(visitor.clone());
    Ok(visitor)
  }

  async fn get_visitor(&self, id: Uuid) -> Result<Option<Visitor>, Unavailable> {
    Ok(self.visitors.lock().unwrap().iter().find(|v| v.id == id).cloned())
  }

  async fn retarget_visitor(
    &self,
    id: Uuid,
    target_flat: String,
    purpose: Option<String>,
  ) -> Result<Option<Visitor>, Unavailable> {
    self.check_write()?;
    let mut visitors = self.visitors.lock().unwrap();
    Ok(visitors.iter_mut().find(|v| v.id == id).map(|v| {
      v.target_flat = target_flat;
      if purpose.is_some() {
        v.purpose = purpose;
      }
      v.clone()
    }))
  }

  async fn set_visitor_status(
    &self,
    id: Uuid,
    status: VisitorStatus,
    at: DateTime<Utc>,
  ) -> Result<Option<Visitor>, Unavailable> {
    self.check_write()?;
    let mut visitors = self.visitors.lock().unwrap();
    Ok(visitors.iter_mut().find(|v| v.id == id).map(|v| {
      v.status = status;
      v.approval_time = Some(at);
      v.clone()
    }))
  }

  async fn list_visitors(&self, flat: Option<&str>) -> Result<Vec<Visitor>, Unavailable> {
    let visitors = self.visitors.lock().unwrap();
    let mut out = newest_first(&visitors, |v| v.entry_time);
    if let Some(flat) = flat {
      out.retain(|v| v.target_flat == flat);
    }
    Ok(out)
  }

  async fn insert_user(&self, input: NewUser) -> Result<User, Unavailable> {
    self.check_write()?;
    let user = User {
      id:          Uuid::new_v4(),
      phone:       input.phone,
      name:        input.name,
      role:        input.role,
      flat_number: input.flat_number,
      push_token:  None,
      created_at:  Utc::now(),
    };
    self.users.lock().unwrap().push(user.clone());
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>, Unavailable> {
    Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
  }

  async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, Unavailable> {
    Ok(self.users.lock().unwrap().iter().find(|u| u.phone == phone).cloned())
  }

  async fn residents_by_flat(&self, flat: &str) -> Result<Vec<Recipient>, Unavailable> {
    self.check_directory()?;
    Ok(self.recipients(|u| {
      u.role == Role::Resident && u.flat_number.as_deref() == Some(flat)
    }))
  }

  async fn users_by_audience(&self, audience: Audience) -> Result<Vec<Recipient>, Unavailable> {
    self.check_directory()?;
    let role = audience.role();
    Ok(self.recipients(|u| role.is_none_or(|r| u.role == r)))
  }

  async fn users_by_flat(&self, flat: &str) -> Result<Vec<User>, Unavailable> {
    self.check_directory()?;
    Ok(
      self
        .users
        .lock()
        .unwrap()
        .iter()
        .filter(|u| u.flat_number.as_deref() == Some(flat))
        .cloned()
        .collect(),
    )
  }

  async fn set_push_token(&self, user_id: Uuid, token: Option<String>) -> Result<bool, Unavailable> {
    self.check_write()?;
    let mut users = self.users.lock().unwrap();
    match users.iter_mut().find(|u| u.id == user_id) {
      Some(u) => {
        u.push_token = token;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn insert_announcement(&self, input: NewAnnouncement) -> Result<Announcement, Unavailable> {
    self.check_write()?;
    let announcement = Announcement {
      id:         Uuid::new_v4(),
      title:      input.title,
      message:    input.message,
      target:     input.target,
      created_at: Utc::now(),
    };
    self.announcements.lock().unwrap().push(announcement.clone());
    Ok(announcement)
  }

  async fn list_announcements(&self, role: &str) -> Result<Vec<Announcement>, Unavailable> {
    let announcements = self.announcements.lock().unwrap();
    let mut out = newest_first(&announcements, |a| a.created_at);
    out.retain(|a| a.target == Audience::All || a.target.as_str() == role);
    Ok(out)
  }
}

/// Records every dispatch instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
  calls: Mutex<Vec<(Vec<String>, PushMessage)>>,
}

impl RecordingNotifier {
  pub fn calls(&self) -> Vec<(Vec<String>, PushMessage)> { self.calls.lock().unwrap().clone() }
}

impl Notifier for RecordingNotifier {
  fn dispatch(&self, tokens: Vec<String>, message: PushMessage) {
    self.calls.lock().unwrap().push((tokens, message));
  }
}
