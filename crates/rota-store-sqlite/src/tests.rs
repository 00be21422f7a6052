//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, NaiveTime};
use rota_core::{
  activity::NewActivity,
  department::{DepartmentPatch, NewDepartment},
  message::{MessageType, NewMessage, Priority},
  rules,
  shift::{NewShift, ShiftPatch, ShiftQuery},
  store::{RosterStore, StoreError},
  time_off::{NewTimeOffRequest, TimeOffQuery, TimeOffStatus},
  user::{NewUser, Role, UserPatch},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

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
async fn user_round_trips_through_the_database() {
  let s = store().await;
  let mut input = NewUser::new("alex", "secret", "Alex", "Doe", Role::Manager);
  input.position = Some("Chef".into());
  input.department = Some("Cuisine".into());

  let created = s.create_user(input).await.unwrap();
  let fetched = s.get_user(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
  assert_eq!(fetched.role, Role::Manager);
  assert_eq!(fetched.password, "secret");
  assert_eq!(fetched.profile_image, None);
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
  let s = store().await;
  let a = s.create_user(employee("a")).await.unwrap();
  let b = s.create_user(employee("b")).await.unwrap();
  assert!(b.id > a.id);

  assert!(s.delete_user(b.id).await.unwrap());
  assert!(!s.delete_user(b.id).await.unwrap());
  let c = s.create_user(employee("c")).await.unwrap();
  assert!(c.id > b.id);
}

#[tokio::test]
async fn referenced_user_cannot_be_deleted() {
  let s = store().await;
  let alex = s.create_user(employee("alex")).await.unwrap();
  let shift = s.create_shift(shift_for(alex.id, date(2024, 6, 10))).await.unwrap();

  let err = s.delete_user(alex.id).await.unwrap_err();
  assert_eq!(err.as_core(), Some(&rota_core::Error::UserHasReferences(alex.id)));
  assert!(s.get_user(alex.id).await.unwrap().is_some());

  s.create_time_off(NewTimeOffRequest {
    user_id:    alex.id,
    start_date: date(2024, 7, 1),
    end_date:   date(2024, 7, 2),
    reason:     None,
  })
  .await
  .unwrap();
  assert!(s.delete_shift(shift.id).await.unwrap());
  assert!(matches!(
    s.delete_user(alex.id).await,
    Err(Error::Core(rota_core::Error::UserHasReferences(_)))
  ));
}

#[tokio::test]
async fn duplicate_username_maps_to_core_error() {
  let s = store().await;
  s.create_user(employee("alex")).await.unwrap();

  let err = s.create_user(employee("alex")).await.unwrap_err();
  assert!(matches!(err, Error::Core(rota_core::Error::UsernameTaken(ref n)) if n == "alex"));
  assert!(err.as_core().is_some());
  assert_eq!(s.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn renaming_onto_taken_username_is_rejected_but_self_rename_is_fine() {
  let s = store().await;
  let alex = s.create_user(employee("alex")).await.unwrap();
  s.create_user(employee("sam")).await.unwrap();

  let clash = UserPatch { username: Some("sam".into()), ..Default::default() };
  assert!(matches!(
    s.update_user(alex.id, clash).await,
    Err(Error::Core(rota_core::Error::UsernameTaken(_)))
  ));

  let same = UserPatch { username: Some("alex".into()), ..Default::default() };
  let updated = s.update_user(alex.id, same).await.unwrap().unwrap();
  assert_eq!(updated.username, "alex");
}

#[tokio::test]
async fn user_patch_clears_nullable_fields() {
  let s = store().await;
  let mut input = employee("alex");
  input.position = Some("Waiter".into());
  let alex = s.create_user(input).await.unwrap();

  let patch = UserPatch {
    position: Some(None),
    role: Some(Role::Manager),
    ..Default::default()
  };
  let updated = s.update_user(alex.id, patch).await.unwrap().unwrap();
  assert_eq!(updated.position, None);
  assert_eq!(updated.role, Role::Manager);
  assert_eq!(s.get_user(alex.id).await.unwrap(), Some(updated));
}

#[tokio::test]
async fn update_missing_user_returns_none() {
  let s = store().await;
  assert_eq!(s.update_user(9, UserPatch::default()).await.unwrap(), None);
}

#[tokio::test]
async fn lookup_by_username_is_exact() {
  let s = store().await;
  s.create_user(employee("alex")).await.unwrap();
  assert!(s.get_user_by_username("alex".into()).await.unwrap().is_some());
  assert!(s.get_user_by_username("Alex".into()).await.unwrap().is_none());
}

// ─── Departments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn department_crud_and_uniqueness() {
  let s = store().await;
  let bar = s
    .create_department(NewDepartment::new("Bar", "blue"))
    .await
    .unwrap();
  s.create_department(NewDepartment::new("Cuisine", "red"))
    .await
    .unwrap();

  assert!(matches!(
    s.create_department(NewDepartment::new("Bar", "green")).await,
    Err(Error::Core(rota_core::Error::DepartmentNameTaken(_)))
  ));

  let patch = DepartmentPatch { color: Some("teal".into()), ..Default::default() };
  let updated = s.update_department(bar.id, patch).await.unwrap().unwrap();
  assert_eq!(updated.color, "teal");
  assert_eq!(
    s.get_department_by_name("Bar".into()).await.unwrap(),
    Some(updated)
  );

  assert!(s.delete_department(bar.id).await.unwrap());
  assert_eq!(s.list_departments().await.unwrap().len(), 1);
}

// ─── Shifts ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn shifts_filter_by_user_and_inclusive_date_range() {
  let s = store().await;
  s.create_shift(shift_for(1, date(2024, 3, 1))).await.unwrap();
  s.create_shift(shift_for(1, date(2024, 3, 5))).await.unwrap();
  s.create_shift(shift_for(1, date(2024, 3, 10))).await.unwrap();
  s.create_shift(shift_for(2, date(2024, 3, 5))).await.unwrap();

  let ranged = s
    .list_shifts(ShiftQuery::between(date(2024, 3, 1), date(2024, 3, 5)))
    .await
    .unwrap();
  assert_eq!(ranged.len(), 3);

  let mine = s.list_shifts(ShiftQuery::for_user(1)).await.unwrap();
  assert_eq!(mine.len(), 3);
  assert!(mine.windows(2).all(|w| w[0].id < w[1].id));

  let both = ShiftQuery { user_id: Some(2), ..ShiftQuery::between(date(2024, 3, 5), date(2024, 3, 5)) };
  assert_eq!(s.list_shifts(both).await.unwrap().len(), 1);
}

#[tokio::test]
async fn shift_times_and_notes_survive_patch() {
  let s = store().await;
  let mut input = shift_for(1, date(2024, 3, 1));
  input.notes = Some("bring apron".into());
  let shift = s.create_shift(input).await.unwrap();
  assert_eq!(s.get_shift(shift.id).await.unwrap(), Some(shift.clone()));

  let patch = ShiftPatch {
    end_time: Some(time(18, 30)),
    notes: Some(None),
    ..Default::default()
  };
  let updated = s.update_shift(shift.id, patch).await.unwrap().unwrap();
  assert_eq!(updated.start_time, time(9, 0));
  assert_eq!(updated.end_time, time(18, 30));
  assert_eq!(updated.notes, None);
  assert_eq!(s.get_shift(shift.id).await.unwrap(), Some(updated));
}

// ─── Time off ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn time_off_defaults_and_filters() {
  let s = store().await;
  let request = s
    .create_time_off(NewTimeOffRequest {
      user_id:    1,
      start_date: date(2024, 7, 1),
      end_date:   date(2024, 7, 14),
      reason:     Some("holiday".into()),
    })
    .await
    .unwrap();
  assert_eq!(request.status, TimeOffStatus::Pending);
  assert_eq!(request.reviewed_by, None);
  assert_eq!(s.get_time_off(request.id).await.unwrap(), Some(request.clone()));

  s.create_time_off(NewTimeOffRequest {
    user_id:    2,
    start_date: date(2024, 8, 1),
    end_date:   date(2024, 8, 2),
    reason:     None,
  })
  .await
  .unwrap();

  let pending = TimeOffQuery { status: Some(TimeOffStatus::Pending), ..Default::default() };
  assert_eq!(s.list_time_off(pending).await.unwrap().len(), 2);
  let mine = TimeOffQuery { user_id: Some(1), ..Default::default() };
  assert_eq!(s.list_time_off(mine).await.unwrap(), vec![request]);
}

#[tokio::test]
async fn approving_through_rules_persists_review() {
  let s = store().await;
  let boss = s
    .create_user(NewUser::new("boss", "pw", "Bo", "Ss", Role::Manager))
    .await
    .unwrap();
  let alex = s.create_user(employee("alex")).await.unwrap();
  let request = s
    .create_time_off(NewTimeOffRequest {
      user_id:    alex.id,
      start_date: date(2024, 7, 1),
      end_date:   date(2024, 7, 2),
      reason:     None,
    })
    .await
    .unwrap();

  let outcome = rules::approve_time_off(&s, request.id, boss.id)
    .await
    .unwrap()
    .unwrap();
  assert!(outcome.effects.activity);

  let stored = s.get_time_off(request.id).await.unwrap().unwrap();
  assert_eq!(stored.status, TimeOffStatus::Approved);
  assert_eq!(stored.reviewed_by, Some(boss.id));
  assert!(stored.reviewed_at.is_some_and(|at| at >= stored.created_at));

  let again = rules::deny_time_off(&s, request.id, boss.id).await;
  assert!(matches!(
    again,
    Err(Error::Core(rota_core::Error::AlreadyReviewed { .. }))
  ));
}

// ─── Activities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn activity_limit_returns_newest_first() {
  let s = store().await;
  for n in 0..5 {
    s.create_activity(NewActivity::new("note", format!("entry {n}")).by(Some(1)))
      .await
      .unwrap();
  }

  let recent = s.list_activities(Some(2)).await.unwrap();
  assert_eq!(recent.len(), 2);
  assert_eq!(recent[0].description, "entry 4");
  assert_eq!(recent[1].description, "entry 3");

  let all = s.list_activities(None).await.unwrap();
  assert_eq!(all.len(), 5);
  assert_eq!(s.get_activity(all[0].id).await.unwrap(), Some(all[0].clone()));
}

#[tokio::test]
async fn activities_with_equal_timestamps_fall_back_to_id() {
  let s = store().await;
  s.conn
    .call(|conn| {
      conn.execute_batch(
        "INSERT INTO activities (type, description, created_at) VALUES
           ('note', 'first', '2024-01-01T00:00:00.000000000Z'),
           ('note', 'second', '2024-01-01T00:00:00.000000000Z'),
           ('note', 'older', '2023-12-31T00:00:00.000000000Z');",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let all = s.list_activities(None).await.unwrap();
  let ids: Vec<_> = all.iter().map(|a| a.id).collect();
  assert_eq!(ids, [2, 1, 3]);
  assert_eq!(all[0].description, "second");

  let top = s.list_activities(Some(1)).await.unwrap();
  assert_eq!(top[0].id, 2);
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unread_count_and_mark_read() {
  let s = store().await;
  let first = s.create_message(NewMessage::new(Some(1), 2, "hi")).await.unwrap();
  s.create_message(NewMessage::new(Some(3), 2, "hello")).await.unwrap();
  s.create_message(NewMessage::new(Some(2), 1, "reply")).await.unwrap();

  assert!(!first.is_read);
  assert_eq!(first.priority, Priority::Normal);
  assert_eq!(first.message_type, MessageType::Message);
  assert_eq!(s.unread_message_count(2).await.unwrap(), 2);

  let read = s.mark_message_read(first.id).await.unwrap().unwrap();
  assert!(read.is_read);
  let again = s.mark_message_read(first.id).await.unwrap().unwrap();
  assert!(again.is_read);
  assert_eq!(s.unread_message_count(2).await.unwrap(), 1);

  assert_eq!(s.mark_message_read(99).await.unwrap(), None);
}

#[tokio::test]
async fn messages_for_user_include_sent_and_received() {
  let s = store().await;
  s.create_message(NewMessage::new(Some(1), 2, "a")).await.unwrap();
  s.create_message(NewMessage::new(Some(2), 1, "b")).await.unwrap();
  s.create_message(NewMessage::new(None, 3, "c")).await.unwrap();

  let mine = s.list_messages_for_user(1).await.unwrap();
  assert_eq!(mine.len(), 2);
  assert!(mine.iter().all(|m| m.involves(1)));

  let system = &s.list_messages_for_user(3).await.unwrap()[0];
  assert_eq!(system.sender_id, None);
  assert!(s.delete_message(system.id).await.unwrap());
  assert_eq!(s.get_message(system.id).await.unwrap(), None);
}
