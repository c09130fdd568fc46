//! Integration tests for `SqliteStore` against an in-memory database.

use gatehouse_core::{
  announcement::NewAnnouncement,
  store::GateStore,
  user::{Audience, NewUser, Role},
  visitor::{NewVisitor, VisitorStatus},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn visitor(flat: &str) -> NewVisitor {
  NewVisitor {
    name:        Some("Alex".into()),
    purpose:     Some("delivery".into()),
    mobile:      "555-0100".into(),
    target_flat: flat.into(),
    photo:       None,
  }
}

fn user(phone: &str, role: Role, flat: Option<&str>) -> NewUser {
  NewUser {
    phone:       phone.into(),
    name:        format!("User {phone}"),
    role,
    flat_number: flat.map(Into::into),
  }
}

// ─── Visitors ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_visitor() {
  let s = store().await;

  let v = s.insert_visitor(visitor("12B")).await.unwrap();
  assert_eq!(v.status, VisitorStatus::Pending);
  assert!(v.approval_time.is_none());

  let fetched = s.get_visitor(v.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, v.id);
  assert_eq!(fetched.target_flat, "12B");
  assert_eq!(fetched.name.as_deref(), Some("Alex"));
  assert_eq!(fetched.entry_time, v.entry_time);
  assert!(fetched.approval_time.is_none());
}

#[tokio::test]
async fn get_visitor_missing_returns_none() {
  let s = store().await;
  assert!(s.get_visitor(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn status_update_stamps_and_restamps() {
  let s = store().await;
  let v = s.insert_visitor(visitor("12B")).await.unwrap();

  let t1 = crate::encode::now();
  let approved = s
    .set_visitor_status(v.id, VisitorStatus::Approved, t1)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(approved.status, VisitorStatus::Approved);
  assert_eq!(approved.approval_time, Some(t1));

  let t2 = crate::encode::now();
  let rejected = s
    .set_visitor_status(v.id, VisitorStatus::Rejected, t2)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(rejected.status, VisitorStatus::Rejected);
  assert_eq!(rejected.approval_time, Some(t2));
  assert_eq!(rejected.entry_time, v.entry_time);
}

#[tokio::test]
async fn status_update_on_missing_visitor_returns_none() {
  let s = store().await;
  let out = s
    .set_visitor_status(Uuid::new_v4(), VisitorStatus::Approved, crate::encode::now())
    .await
    .unwrap();
  assert!(out.is_none());
}

#[tokio::test]
async fn retarget_preserves_status_and_times() {
  let s = store().await;
  let v = s.insert_visitor(visitor("12B")).await.unwrap();
  let decided = s
    .set_visitor_status(v.id, VisitorStatus::Approved, crate::encode::now())
    .await
    .unwrap()
    .unwrap();

  let moved = s
    .retarget_visitor(v.id, "14C".into(), Some("parcel".into()))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(moved.target_flat, "14C");
  assert_eq!(moved.purpose.as_deref(), Some("parcel"));
  assert_eq!(moved.status, VisitorStatus::Approved);
  assert_eq!(moved.entry_time, decided.entry_time);
  assert_eq!(moved.approval_time, decided.approval_time);
}

#[tokio::test]
async fn retarget_without_purpose_keeps_existing() {
  let s = store().await;
  let v = s.insert_visitor(visitor("12B")).await.unwrap();
  let moved = s
    .retarget_visitor(v.id, "14C".into(), None)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(moved.purpose.as_deref(), Some("delivery"));
}

#[tokio::test]
async fn retarget_missing_visitor_returns_none() {
  let s = store().await;
  let out = s.retarget_visitor(Uuid::new_v4(), "14C".into(), None).await.unwrap();
  assert!(out.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_return_their_own_write() {
  let s = store().await;
  let v = s.insert_visitor(visitor("12B")).await.unwrap();

  let mut tasks = tokio::task::JoinSet::new();
  for i in 0..16 {
    let s = s.clone();
    tasks.spawn(async move {
      let flat = format!("F{i}");
      let moved = s.retarget_visitor(v.id, flat.clone(), None).await.unwrap().unwrap();
      (flat, moved.target_flat)
    });
  }
  for i in 0..16 {
    let s = s.clone();
    let status = if i % 2 == 0 { VisitorStatus::Approved } else { VisitorStatus::Rejected };
    tasks.spawn(async move {
      let decided = s
        .set_visitor_status(v.id, status, crate::encode::now())
        .await
        .unwrap()
        .unwrap();
      (status.to_string(), decided.status.to_string())
    });
  }

  while let Some(joined) = tasks.join_next().await {
    let (asked, got) = joined.unwrap();
    assert_eq!(asked, got);
  }
}

#[tokio::test]
async fn list_visitors_newest_first_and_by_flat() {
  let s = store().await;
  let mut ids = Vec::new();
  for flat in ["12B", "14C", "12B", "9A", "12B"] {
    ids.push(s.insert_visitor(visitor(flat)).await.unwrap().id);
  }

  let all = s.list_visitors(None).await.unwrap();
  assert_eq!(all.len(), 5);
  assert!(all.windows(2).all(|w| w[0].entry_time >= w[1].entry_time));
  // Same-microsecond inserts fall back to insertion order.
  assert_eq!(all[0].id, ids[4]);
  assert_eq!(all[4].id, ids[0]);

  let flat = s.list_visitors(Some("12B")).await.unwrap();
  let expected: Vec<Uuid> = all
    .iter()
    .filter(|v| v.target_flat == "12B")
    .map(|v| v.id)
    .collect();
  assert_eq!(flat.iter().map(|v| v.id).collect::<Vec<_>>(), expected);
  assert_eq!(flat.len(), 3);
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn residents_by_flat_filters_role_and_flat() {
  let s = store().await;
  let a = s.insert_user(user("555-0001", Role::Resident, Some("12B"))).await.unwrap();
  let b = s.insert_user(user("555-0002", Role::Resident, Some("12B"))).await.unwrap();
  s.insert_user(user("555-0003", Role::Resident, Some("14C"))).await.unwrap();
  s.insert_user(user("555-0004", Role::Guard, Some("12B"))).await.unwrap();

  let residents = s.residents_by_flat("12B").await.unwrap();
  let ids: Vec<Uuid> = residents.iter().map(|r| r.id).collect();
  assert_eq!(ids, vec![a.id, b.id]);
  assert!(residents.iter().all(|r| r.push_token.is_none()));

  assert!(s.residents_by_flat("99Z").await.unwrap().is_empty());
}

#[tokio::test]
async fn audience_resolution() {
  let s = store().await;
  s.insert_user(user("555-0001", Role::Resident, Some("12B"))).await.unwrap();
  s.insert_user(user("555-0002", Role::Resident, Some("14C"))).await.unwrap();
  s.insert_user(user("555-0003", Role::Guard, None)).await.unwrap();
  s.insert_user(user("555-0004", Role::Admin, None)).await.unwrap();

  assert_eq!(s.users_by_audience(Audience::All).await.unwrap().len(), 4);
  assert_eq!(s.users_by_audience(Audience::Resident).await.unwrap().len(), 2);
  assert_eq!(s.users_by_audience(Audience::Guard).await.unwrap().len(), 1);
}

#[tokio::test]
async fn push_token_set_and_clear() {
  let s = store().await;
  let u = s.insert_user(user("555-0001", Role::Resident, Some("12B"))).await.unwrap();

  assert!(s.set_push_token(u.id, Some("ExponentPushToken[abc]".into())).await.unwrap());
  let fetched = s.get_user(u.id).await.unwrap().unwrap();
  assert_eq!(fetched.push_token.as_deref(), Some("ExponentPushToken[abc]"));

  assert!(s.set_push_token(u.id, None).await.unwrap());
  let fetched = s.get_user(u.id).await.unwrap().unwrap();
  assert!(fetched.push_token.is_none());
}

#[tokio::test]
async fn push_token_on_missing_user_returns_false() {
  let s = store().await;
  assert!(!s.set_push_token(Uuid::new_v4(), Some("t".into())).await.unwrap());
}

#[tokio::test]
async fn duplicate_phone_is_rejected_by_schema() {
  let s = store().await;
  s.insert_user(user("555-0001", Role::Resident, Some("12B"))).await.unwrap();
  let err = s
    .insert_user(user("555-0001", Role::Guard, None))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));
}

#[tokio::test]
async fn find_user_by_phone() {
  let s = store().await;
  let u = s.insert_user(user("555-0001", Role::Admin, None)).await.unwrap();
  let found = s.find_user_by_phone("555-0001").await.unwrap().unwrap();
  assert_eq!(found.id, u.id);
  assert_eq!(found.role, Role::Admin);
  assert!(s.find_user_by_phone("555-9999").await.unwrap().is_none());
}

#[tokio::test]
async fn users_by_flat_lists_all_roles_oldest_first() {
  let s = store().await;
  let a = s.insert_user(user("555-0001", Role::Resident, Some("12B"))).await.unwrap();
  let b = s.insert_user(user("555-0002", Role::Guard, Some("12B"))).await.unwrap();
  s.insert_user(user("555-0003", Role::Resident, Some("14C"))).await.unwrap();

  let members = s.users_by_flat("12B").await.unwrap();
  assert_eq!(members.iter().map(|u| u.id).collect::<Vec<_>>(), vec![a.id, b.id]);
}

// ─── Announcements ───────────────────────────────────────────────────────────

#[tokio::test]
async fn announcements_for_role_include_all() {
  let s = store().await;
  for target in [Audience::All, Audience::Resident, Audience::Guard, Audience::Resident] {
    s.insert_announcement(NewAnnouncement {
      title:   "t".into(),
      message: "m".into(),
      target,
    })
    .await
    .unwrap();
  }

  let residents = s.list_announcements("resident").await.unwrap();
  assert_eq!(residents.len(), 3);
  assert!(residents.iter().all(|a| a.target != Audience::Guard));
  assert!(residents.windows(2).all(|w| w[0].created_at >= w[1].created_at));
  assert_eq!(residents[0].target, Audience::Resident);

  let guards = s.list_announcements("guard").await.unwrap();
  assert_eq!(guards.len(), 2);

  let admins = s.list_announcements("admin").await.unwrap();
  assert_eq!(admins.len(), 1);
  assert_eq!(admins[0].target, Audience::All);
}
