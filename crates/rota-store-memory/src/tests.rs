//! Store-level tests for `MemoryStore`.

use chrono::{NaiveDate, NaiveTime};
use rota_core::{
  Error,
  activity::NewActivity,
  department::{DepartmentPatch, NewDepartment},
  message::{MessageType, NewMessage, Priority},
  shift::{NewShift, ShiftPatch, ShiftQuery},
  store::RosterStore,
  time_off::{NewTimeOffRequest, TimeOffQuery, TimeOffStatus},
  user::{NewUser, Role, UserPatch},
};

use crate::MemoryStore;

fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

fn time(h: u32, m: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, m, 0).unwrap() }

fn employee(username: &str) -> NewUser {
  NewUser::new(username, "pw", "Test", "Employee", Role::Employee)
}

fn shift_for(user_id: i64, on: NaiveDate) -> NewShift {
  NewShift {
    user_id,
    date: on,
    start_time: time(9, 0),
    end_time: time(17, 0),
    department: "Cuisine".into(),
    notes: None,
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_returns_equal_user() {
  let s = MemoryStore::new();
  let created = s.create_user(employee("alex")).await.unwrap();
  let fetched = s.get_user(created.id).await.unwrap();
  assert_eq!(fetched, Some(created));
}

#[tokio::test]
async fn ids_are_strictly_increasing_and_never_reused() {
  let s = MemoryStore::new();
  let a = s.create_user(employee("a")).await.unwrap();
  let b = s.create_user(employee("b")).await.unwrap();
  assert!(b.id > a.id);

  assert!(s.delete_user(b.id).await.unwrap());
  let c = s.create_user(employee("c")).await.unwrap();
  assert!(c.id > b.id);
}

#[tokio::test]
async fn ids_are_counted_per_kind() {
  let s = MemoryStore::new();
  let user = s.create_user(employee("a")).await.unwrap();
  let department = s
    .create_department(NewDepartment::new("Bar", "blue"))
    .await
    .unwrap();
  assert_eq!(user.id, 1);
  assert_eq!(department.id, 1);
}

#[tokio::test]
async fn get_missing_user_returns_none() {
  let s = MemoryStore::new();
  assert_eq!(s.get_user(42).await.unwrap(), None);
}

#[tokio::test]
async fn delete_then_get_is_none_and_second_delete_is_false() {
  let s = MemoryStore::new();
  let user = s.create_user(employee("alex")).await.unwrap();

  assert!(s.delete_user(user.id).await.unwrap());
  assert_eq!(s.get_user(user.id).await.unwrap(), None);
  assert!(!s.delete_user(user.id).await.unwrap());
}

#[tokio::test]
async fn referenced_user_is_kept_until_references_go() {
  let s = MemoryStore::new();
  let alex = s.create_user(employee("alex")).await.unwrap();
  let shift = s.create_shift(shift_for(alex.id, date(2024, 6, 10))).await.unwrap();
  let request = s
    .create_time_off(NewTimeOffRequest {
      user_id:    alex.id,
      start_date: date(2024, 7, 1),
      end_date:   date(2024, 7, 2),
      reason:     None,
    })
    .await
    .unwrap();

  assert_eq!(s.delete_user(alex.id).await, Err(Error::UserHasReferences(alex.id)));
  assert!(s.delete_shift(shift.id).await.unwrap());
  assert_eq!(s.delete_user(alex.id).await, Err(Error::UserHasReferences(alex.id)));
  assert!(s.get_user(alex.id).await.unwrap().is_some());

  assert!(s.delete_time_off(request.id).await.unwrap());
  assert!(s.delete_user(alex.id).await.unwrap());
}

#[tokio::test]
async fn empty_update_leaves_user_unchanged() {
  let s = MemoryStore::new();
  let user = s.create_user(employee("alex")).await.unwrap();
  let updated = s.update_user(user.id, UserPatch::default()).await.unwrap();
  assert_eq!(updated, Some(user));
}

#[tokio::test]
async fn update_missing_user_returns_none() {
  let s = MemoryStore::new();
  let patch = UserPatch { first_name: Some("Nobody".into()), ..UserPatch::default() };
  assert_eq!(s.update_user(9, patch).await.unwrap(), None);
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = MemoryStore::new();
  s.create_user(employee("alex")).await.unwrap();
  let err = s.create_user(employee("alex")).await.unwrap_err();
  assert_eq!(err, Error::UsernameTaken("alex".into()));
}

#[tokio::test]
async fn renaming_onto_another_username_is_rejected() {
  let s = MemoryStore::new();
  s.create_user(employee("alex")).await.unwrap();
  let sam = s.create_user(employee("sam")).await.unwrap();

  let patch = UserPatch { username: Some("alex".into()), ..UserPatch::default() };
  assert!(matches!(
    s.update_user(sam.id, patch).await,
    Err(Error::UsernameTaken(_))
  ));

  // Keeping one's own username is not a conflict.
  let patch = UserPatch { username: Some("sam".into()), ..UserPatch::default() };
  assert!(s.update_user(sam.id, patch).await.unwrap().is_some());
}

#[tokio::test]
async fn lookup_by_username() {
  let s = MemoryStore::new();
  let alex = s.create_user(employee("alex")).await.unwrap();
  assert_eq!(s.get_user_by_username("alex".into()).await.unwrap(), Some(alex));
  assert_eq!(s.get_user_by_username("ghost".into()).await.unwrap(), None);
}

// ─── Departments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn department_crud() {
  let s = MemoryStore::new();
  let bar = s.create_department(NewDepartment::new("Bar", "blue")).await.unwrap();

  let patch = DepartmentPatch { color: Some("teal".into()), ..DepartmentPatch::default() };
  let updated = s.update_department(bar.id, patch).await.unwrap().unwrap();
  assert_eq!(updated.name, "Bar");
  assert_eq!(updated.color, "teal");

  assert_eq!(s.get_department_by_name("Bar".into()).await.unwrap(), Some(updated));
  assert!(s.delete_department(bar.id).await.unwrap());
  assert!(s.list_departments().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_department_name_is_rejected() {
  let s = MemoryStore::new();
  s.create_department(NewDepartment::new("Bar", "blue")).await.unwrap();
  assert_eq!(
    s.create_department(NewDepartment::new("Bar", "red")).await.unwrap_err(),
    Error::DepartmentNameTaken("Bar".into())
  );
}

// ─── Shifts ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn shifts_filter_by_user_and_inclusive_date_range() {
  let s = MemoryStore::new();
  s.create_shift(shift_for(1, date(2024, 6, 9))).await.unwrap();
  let first = s.create_shift(shift_for(1, date(2024, 6, 10))).await.unwrap();
  let last = s.create_shift(shift_for(2, date(2024, 6, 16))).await.unwrap();
  s.create_shift(shift_for(2, date(2024, 6, 17))).await.unwrap();

  let week = s
    .list_shifts(ShiftQuery::between(date(2024, 6, 10), date(2024, 6, 16)))
    .await
    .unwrap();
  assert_eq!(week, vec![first, last]);

  let mine = s.list_shifts(ShiftQuery::for_user(1)).await.unwrap();
  assert_eq!(mine.len(), 2);
  assert!(mine.iter().all(|shift| shift.user_id == 1));
}

#[tokio::test]
async fn shift_patch_merges_and_clears_notes() {
  let s = MemoryStore::new();
  let mut input = shift_for(1, date(2024, 6, 10));
  input.notes = Some("Inventory".into());
  let shift = s.create_shift(input).await.unwrap();

  let patch = ShiftPatch {
    end_time: Some(time(15, 0)),
    notes: Some(None),
    ..ShiftPatch::default()
  };
  let updated = s.update_shift(shift.id, patch).await.unwrap().unwrap();

  assert_eq!(updated.id, shift.id);
  assert_eq!(updated.start_time, time(9, 0));
  assert_eq!(updated.end_time, time(15, 0));
  assert_eq!(updated.notes, None);
}

// ─── Time off ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_time_off_request_is_pending_and_unreviewed() {
  let s = MemoryStore::new();
  let request = s
    .create_time_off(NewTimeOffRequest {
      user_id:    3,
      start_date: date(2024, 7, 1),
      end_date:   date(2024, 7, 5),
      reason:     None,
    })
    .await
    .unwrap();

  assert_eq!(request.status, TimeOffStatus::Pending);
  assert_eq!(request.reviewed_by, None);
  assert_eq!(request.reviewed_at, None);
}

#[tokio::test]
async fn time_off_filters_by_user_and_status() {
  let s = MemoryStore::new();
  for user_id in [1, 1, 2] {
    s.create_time_off(NewTimeOffRequest {
      user_id,
      start_date: date(2024, 7, 1),
      end_date: date(2024, 7, 2),
      reason: None,
    })
    .await
    .unwrap();
  }

  let pending = s
    .list_time_off(TimeOffQuery { status: Some(TimeOffStatus::Pending), ..TimeOffQuery::default() })
    .await
    .unwrap();
  assert_eq!(pending.len(), 3);

  let mine = s
    .list_time_off(TimeOffQuery { user_id: Some(1), ..TimeOffQuery::default() })
    .await
    .unwrap();
  assert_eq!(mine.len(), 2);

  let approved = s
    .list_time_off(TimeOffQuery { status: Some(TimeOffStatus::Approved), ..TimeOffQuery::default() })
    .await
    .unwrap();
  assert!(approved.is_empty());
}

// ─── Activities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn activity_limit_returns_newest_first() {
  let s = MemoryStore::new();
  for n in 1..=4 {
    s.create_activity(NewActivity::new("note", format!("entry {n}")))
      .await
      .unwrap();
  }

  let latest = s.list_activities(Some(2)).await.unwrap();
  assert_eq!(latest.len(), 2);
  assert_eq!(latest[0].description, "entry 4");
  assert_eq!(latest[1].description, "entry 3");

  let all = s.list_activities(None).await.unwrap();
  assert_eq!(all.len(), 4);
  assert!(all.windows(2).all(|w| w[0].id > w[1].id));
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unread_count_only_counts_unread_messages_received() {
  let s = MemoryStore::new();
  let u = 1;
  let a = s.create_message(NewMessage::new(Some(2), u, "one")).await.unwrap();
  s.create_message(NewMessage::new(Some(3), u, "two")).await.unwrap();
  s.create_message(NewMessage::new(None, u, "three")).await.unwrap();
  s.create_message(NewMessage::new(Some(u), 2, "outgoing")).await.unwrap();

  s.mark_message_read(a.id).await.unwrap();

  assert_eq!(s.unread_message_count(u).await.unwrap(), 2);
  assert_eq!(s.list_messages_for_user(u).await.unwrap().len(), 4);
  assert_eq!(s.list_messages_for_user(2).await.unwrap().len(), 2);
}

#[tokio::test]
async fn new_message_defaults() {
  let s = MemoryStore::new();
  let message = s.create_message(NewMessage::new(Some(1), 2, "hi")).await.unwrap();
  assert!(!message.is_read);
  assert_eq!(message.priority, Priority::Normal);
  assert_eq!(message.message_type, MessageType::Message);
}

#[tokio::test]
async fn mark_read_is_one_way_and_idempotent() {
  let s = MemoryStore::new();
  let message = s.create_message(NewMessage::new(None, 2, "hi")).await.unwrap();

  let once = s.mark_message_read(message.id).await.unwrap().unwrap();
  let twice = s.mark_message_read(message.id).await.unwrap().unwrap();
  assert!(once.is_read && twice.is_read);
  assert_eq!(s.mark_message_read(99).await.unwrap(), None);
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_distinct_ids() {
  let s = MemoryStore::new();
  let mut handles = Vec::new();
  for n in 0..32 {
    let s = s.clone();
    handles.push(tokio::spawn(async move {
      s.create_shift(shift_for(n, date(2024, 6, 10))).await.unwrap().id
    }));
  }

  let mut ids = Vec::new();
  for handle in handles {
    ids.push(handle.await.unwrap());
  }
  ids.sort_unstable();
  ids.dedup();
  assert_eq!(ids, (1..=32).collect::<Vec<_>>());
}
