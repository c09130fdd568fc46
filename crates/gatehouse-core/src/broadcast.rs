//! Announcement broadcaster.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::{
  Error, Result,
  announcement::{Announcement, AnnouncementRequest, NewAnnouncement},
  directory::Directory,
  notify::{Notifier, PushMessage, tokens_of},
  store::GateStore,
  user::Audience,
  visitor::required,
};

/// Result of [`Broadcaster::create`].
#[derive(Debug, Clone, Serialize)]
pub struct Broadcast {
  pub announcement:   Announcement,
  /// Size of the resolved audience. Accounts without a device token are
  /// counted; this is not a delivery count.
  #[serde(rename = "count")]
  pub notified_count: usize,
}

pub struct Broadcaster<S, N> {
  store:     Arc<S>,
  directory: Directory<S>,
  notifier:  Arc<N>,
}

impl<S: GateStore, N: Notifier> Broadcaster<S, N> {
  pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
    Self { directory: Directory::new(store.clone()), store, notifier }
  }

  /// Persist an announcement and push it to its audience.
  pub async fn create(&self, request: AnnouncementRequest) -> Result<Broadcast> {
    let title = required(request.title, "title")?;
    let message = required(request.message, "message")?;
    let target = request
      .target
      .as_deref()
      .map(Audience::parse_or_all)
      .unwrap_or_default();

    let announcement = self
      .store
      .insert_announcement(NewAnnouncement { title, message, target })
      .await
      .map_err(Error::persistence)?;

    // Audience lookup failure after commit is not the caller's failure.
    let audience = match self.directory.users_by_audience(target).await {
      Ok(a) => a,
      Err(e) => {
        tracing::warn!(
          announcement_id = %announcement.id,
          %target,
          error = %e,
          "audience lookup failed; skipping notification"
        );
        return Ok(Broadcast { notified_count: 0, announcement });
      }
    };
    let tokens = tokens_of(&audience);

    tracing::info!(
      announcement_id = %announcement.id,
      %target,
      audience = audience.len(),
      tokens = tokens.len(),
      "announcement created"
    );

    if !tokens.is_empty() {
      let push = PushMessage::new(&announcement.title, &announcement.message).with_data(json!({
        "type": "announcement",
        "announcementId": announcement.id,
        "target": target,
      }));
      self.notifier.dispatch(tokens, push);
    }

    Ok(Broadcast { notified_count: audience.len(), announcement })
  }

  /// Announcements addressed to `role` or to everyone, newest first.
  pub async fn list_for_role(&self, role: &str) -> Result<Vec<Announcement>> {
    let role = role.trim().to_ascii_lowercase();
    self
      .store
      .list_announcements(&role)
      .await
      .map_err(Error::persistence)
  }
}
