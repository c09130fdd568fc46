//! Visitor registry: owns the visitor lifecycle.
//!
//! Every mutation is persist-then-notify: the store acknowledges the write,
//! then the residents of the (current) target flat are resolved and handed to
//! the [`Notifier`]. Nothing on the notification path can fail a call once
//! the write has landed.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
  Error, Result,
  directory::Directory,
  notify::{Notifier, PushMessage, tokens_of},
  store::GateStore,
  visitor::{
    NewVisitorRequest, RetargetRequest, StatusRequest, Visitor, VisitorDecision,
    VisitorStatus, parse_id, required,
  },
};

pub struct VisitorRegistry<S, N> {
  store:     Arc<S>,
  directory: Directory<S>,
  notifier:  Arc<N>,
}

impl<S: GateStore, N: Notifier> VisitorRegistry<S, N> {
  pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
    Self { directory: Directory::new(store.clone()), store, notifier }
  }

  /// Log a new arrival as `Pending` and alert the flat's residents.
  pub async fn create(&self, request: NewVisitorRequest) -> Result<Visitor> {
    let input = request.validate()?;
    let visitor = self
      .store
      .insert_visitor(input)
      .await
      .map_err(Error::persistence)?;

    tracing::info!(
      visitor_id = %visitor.id,
      flat = %visitor.target_flat,
      "visitor request created"
    );

    let message = PushMessage::new("Visitor at the gate", arrival_body(&visitor))
      .with_data(json!({
        "type": "visitor_request",
        "visitorId": visitor.id,
        "targetFlat": visitor.target_flat,
      }));
    self.fan_out(&visitor, message).await;

    Ok(visitor)
  }

  /// Send a visitor to a different flat. Only `target_flat` and `purpose`
  /// change; the new flat's residents are alerted, the old flat's are not.
  pub async fn retarget(&self, request: RetargetRequest) -> Result<Visitor> {
    let id = parse_id(request.id)?;
    let target_flat = required(request.target_flat, "targetFlat")?;
    let purpose = crate::visitor::non_blank(request.purpose);

    let visitor = self
      .store
      .retarget_visitor(id, target_flat, purpose)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::VisitorNotFound(id))?;

    tracing::info!(
      visitor_id = %visitor.id,
      flat = %visitor.target_flat,
      "visitor retargeted"
    );

    let message = PushMessage::new("Visitor redirected to your flat", arrival_body(&visitor))
      .with_data(json!({
        "type": "visitor_retargeted",
        "visitorId": visitor.id,
        "targetFlat": visitor.target_flat,
      }));
    self.fan_out(&visitor, message).await;

    Ok(visitor)
  }

  /// Record a resident's decision and stamp `approval_time`.
  ///
  /// A visitor that has already been decided can be decided again; the
  /// status is overwritten and the time re-stamped.
  pub async fn update_status(&self, request: StatusRequest) -> Result<Visitor> {
    let id = parse_id(request.id)?;
    let decision: VisitorDecision = required(request.status, "status")?.parse()?;
    self.decide(id, decision).await
  }

  pub async fn decide(&self, id: Uuid, decision: VisitorDecision) -> Result<Visitor> {
    let status = VisitorStatus::from(decision);
    let now = Utc::now();

    let visitor = self
      .store
      .set_visitor_status(id, status, now)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::VisitorNotFound(id))?;

    tracing::info!(visitor_id = %id, %status, "visitor decision recorded");
    Ok(visitor)
  }

  pub async fn get(&self, id: Uuid) -> Result<Visitor> {
    self
      .store
      .get_visitor(id)
      .await
      .map_err(Error::persistence)?
      .ok_or(Error::VisitorNotFound(id))
  }

  /// Every visitor, newest arrival first.
  pub async fn list_all(&self) -> Result<Vec<Visitor>> {
    self
      .store
      .list_visitors(None)
      .await
      .map_err(Error::persistence)
  }

  /// Visitors bound to `flat`, newest arrival first.
  pub async fn list_by_flat(&self, flat: &str) -> Result<Vec<Visitor>> {
    self
      .store
      .list_visitors(Some(flat))
      .await
      .map_err(Error::persistence)
  }

  /// Resolve the visitor's flat and hand the message to the notifier.
  /// Lookup failures are logged and absorbed.
  async fn fan_out(&self, visitor: &Visitor, message: PushMessage) {
    let recipients = match self.directory.residents_by_flat(&visitor.target_flat).await {
      Ok(r) => r,
      Err(e) => {
        tracing::warn!(
          visitor_id = %visitor.id,
          flat = %visitor.target_flat,
          error = %e,
          "resident lookup failed; skipping notification"
        );
        return;
      }
    };

    let tokens = tokens_of(&recipients);
    tracing::debug!(
      visitor_id = %visitor.id,
      residents = recipients.len(),
      tokens = tokens.len(),
      "notifying residents"
    );
    if !tokens.is_empty() {
      self.notifier.dispatch(tokens, message);
    }
  }
}

fn arrival_body(visitor: &Visitor) -> String {
  let who = visitor.name.as_deref().unwrap_or("A visitor");
  match visitor.purpose.as_deref() {
    Some(purpose) => format!("{who} is at the gate ({purpose})"),
    None => format!("{who} is at the gate"),
  }
}
