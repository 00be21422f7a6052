//! [`SqliteStore`], the SQLite implementation of [`RosterStore`].
//!
//! Every operation runs inside a single `Connection::call` closure, so a
//! read-modify-write such as a patch or a uniqueness check plus insert is
//! never interleaved with another writer.

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params};
use tracing::debug;

use rota_core::{
  activity::{Activity, ActivityId, NewActivity},
  department::{Department, DepartmentId, DepartmentPatch, NewDepartment},
  message::{Message, MessageId, NewMessage},
  shift::{NewShift, Shift, ShiftId, ShiftPatch, ShiftQuery},
  store::RosterStore,
  time_off::{NewTimeOffRequest, TimeOffId, TimeOffPatch, TimeOffQuery, TimeOffRequest},
  user::{NewUser, User, UserId, UserPatch},
};

use crate::{
  Error, Result,
  encode::{
    ACTIVITY_COLUMNS, DEPARTMENT_COLUMNS, MESSAGE_COLUMNS, SHIFT_COLUMNS, TIME_OFF_COLUMNS,
    USER_COLUMNS, activity_from_row, department_from_row, encode_dt, message_from_row,
    shift_from_row, time_off_from_row, user_from_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rota entity store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, as used by the tests.
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
    debug!("sqlite schema ready");
    Ok(())
  }

  /// Delete one row by id from `table`.
  async fn delete_row(&self, table: &'static str, id: i64) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?)
      })
      .await?;
    Ok(removed > 0)
  }
}

// ─── Synchronous row helpers (run on the connection thread) ──────────────────

fn select_user(conn: &Connection, id: UserId) -> rusqlite::Result<Option<User>> {
  conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
      params![id],
      user_from_row,
    )
    .optional()
}

fn username_taken(conn: &Connection, username: &str, except: Option<UserId>) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM users WHERE username = ?1 AND (?2 IS NULL OR id != ?2)",
        params![username, except],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn select_department(conn: &Connection, id: DepartmentId) -> rusqlite::Result<Option<Department>> {
  conn
    .query_row(
      &format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = ?1"),
      params![id],
      department_from_row,
    )
    .optional()
}

fn department_name_taken(
  conn:   &Connection,
  name:   &str,
  except: Option<DepartmentId>,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM departments WHERE name = ?1 AND (?2 IS NULL OR id != ?2)",
        params![name, except],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn select_shift(conn: &Connection, id: ShiftId) -> rusqlite::Result<Option<Shift>> {
  conn
    .query_row(
      &format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?1"),
      params![id],
      shift_from_row,
    )
    .optional()
}

fn select_time_off(conn: &Connection, id: TimeOffId) -> rusqlite::Result<Option<TimeOffRequest>> {
  conn
    .query_row(
      &format!("SELECT {TIME_OFF_COLUMNS} FROM time_off_requests WHERE id = ?1"),
      params![id],
      time_off_from_row,
    )
    .optional()
}

fn select_message(conn: &Connection, id: MessageId) -> rusqlite::Result<Option<Message>> {
  conn
    .query_row(
      &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
      params![id],
      message_from_row,
    )
    .optional()
}

fn write_user(conn: &Connection, user: &User) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE users SET
       username = ?2, password = ?3, first_name = ?4, last_name = ?5,
       role = ?6, position = ?7, department = ?8, profile_image = ?9
     WHERE id = ?1",
    params![
      user.id,
      user.username,
      user.password,
      user.first_name,
      user.last_name,
      user.role.to_string(),
      user.position,
      user.department,
      user.profile_image,
    ],
  )?;
  Ok(())
}

fn write_shift(conn: &Connection, shift: &Shift) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE shifts SET
       user_id = ?2, date = ?3, start_time = ?4, end_time = ?5,
       department = ?6, notes = ?7
     WHERE id = ?1",
    params![
      shift.id,
      shift.user_id,
      shift.date.to_string(),
      shift.start_time.to_string(),
      shift.end_time.to_string(),
      shift.department,
      shift.notes,
    ],
  )?;
  Ok(())
}

fn write_time_off(conn: &Connection, request: &TimeOffRequest) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE time_off_requests SET
       start_date = ?2, end_date = ?3, reason = ?4, status = ?5,
       reviewed_by = ?6, reviewed_at = ?7
     WHERE id = ?1",
    params![
      request.id,
      request.start_date.to_string(),
      request.end_date.to_string(),
      request.reason,
      request.status.to_string(),
      request.reviewed_by,
      request.reviewed_at.map(encode_dt),
    ],
  )?;
  Ok(())
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    Ok(self.conn.call(move |conn| Ok(select_user(conn, id)?)).await?)
  }

  async fn get_user_by_username(&self, username: String) -> Result<Option<User>> {
    let user = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
              params![username],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(user)
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let users = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
        let rows = stmt
          .query_map([], user_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(users)
  }

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let created: std::result::Result<User, String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if username_taken(&tx, &input.username, None)? {
          return Ok(Err(input.username));
        }
        tx.execute(
          "INSERT INTO users (
             username, password, first_name, last_name,
             role, position, department, profile_image
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          params![
            input.username,
            input.password,
            input.first_name,
            input.last_name,
            input.role.to_string(),
            input.position,
            input.department,
            input.profile_image,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(input.into_user(id)))
      })
      .await?;
    created.map_err(|name| rota_core::Error::UsernameTaken(name).into())
  }

  async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<Option<User>> {
    let updated: std::result::Result<Option<User>, String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut user) = select_user(&tx, id)? else {
          return Ok(Ok(None));
        };
        if let Some(name) = &patch.username
          && username_taken(&tx, name, Some(id))?
        {
          return Ok(Err(name.clone()));
        }
        patch.apply(&mut user);
        write_user(&tx, &user)?;
        tx.commit()?;
        Ok(Ok(Some(user)))
      })
      .await?;
    updated.map_err(|name| rota_core::Error::UsernameTaken(name).into())
  }

  async fn delete_user(&self, id: UserId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if select_user(&tx, id)?.is_none() {
          return Ok(Ok(false));
        }
        let referenced: bool = tx.query_row(
          "SELECT EXISTS (SELECT 1 FROM shifts WHERE user_id = ?1)
               OR EXISTS (SELECT 1 FROM time_off_requests WHERE user_id = ?1)",
          params![id],
          |row| row.get(0),
        )?;
        if referenced {
          return Ok(Err(()));
        }
        tx.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(Ok(true))
      })
      .await?;
    removed.map_err(|()| rota_core::Error::UserHasReferences(id).into())
  }

  // ── Departments ───────────────────────────────────────────────────────────

  async fn get_department(&self, id: DepartmentId) -> Result<Option<Department>> {
    Ok(self.conn.call(move |conn| Ok(select_department(conn, id)?)).await?)
  }

  async fn get_department_by_name(&self, name: String) -> Result<Option<Department>> {
    let department = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE name = ?1"),
              params![name],
              department_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(department)
  }

  async fn list_departments(&self) -> Result<Vec<Department>> {
    let departments = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY id"))?;
        let rows = stmt
          .query_map([], department_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(departments)
  }

  async fn create_department(&self, input: NewDepartment) -> Result<Department> {
    let created: std::result::Result<Department, String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if department_name_taken(&tx, &input.name, None)? {
          return Ok(Err(input.name));
        }
        tx.execute(
          "INSERT INTO departments (name, color) VALUES (?1, ?2)",
          params![input.name, input.color],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(input.into_department(id)))
      })
      .await?;
    created.map_err(|name| rota_core::Error::DepartmentNameTaken(name).into())
  }

  async fn update_department(
    &self,
    id:    DepartmentId,
    patch: DepartmentPatch,
  ) -> Result<Option<Department>> {
    let updated: std::result::Result<Option<Department>, String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut department) = select_department(&tx, id)? else {
          return Ok(Ok(None));
        };
        if let Some(name) = &patch.name
          && department_name_taken(&tx, name, Some(id))?
        {
          return Ok(Err(name.clone()));
        }
        patch.apply(&mut department);
        tx.execute(
          "UPDATE departments SET name = ?2, color = ?3 WHERE id = ?1",
          params![department.id, department.name, department.color],
        )?;
        tx.commit()?;
        Ok(Ok(Some(department)))
      })
      .await?;
    updated.map_err(|name| rota_core::Error::DepartmentNameTaken(name).into())
  }

  async fn delete_department(&self, id: DepartmentId) -> Result<bool> {
    self.delete_row("departments", id).await
  }

  // ── Shifts ────────────────────────────────────────────────────────────────

  async fn get_shift(&self, id: ShiftId) -> Result<Option<Shift>> {
    Ok(self.conn.call(move |conn| Ok(select_shift(conn, id)?)).await?)
  }

  async fn list_shifts(&self, query: ShiftQuery) -> Result<Vec<Shift>> {
    let from = query.from.map(|d| d.to_string());
    let to = query.to.map(|d| d.to_string());

    let shifts = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SHIFT_COLUMNS} FROM shifts
           WHERE (?1 IS NULL OR user_id = ?1)
             AND (?2 IS NULL OR date >= ?2)
             AND (?3 IS NULL OR date <= ?3)
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(params![query.user_id, from, to], shift_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(shifts)
  }

  async fn create_shift(&self, input: NewShift) -> Result<Shift> {
    let shift = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO shifts (user_id, date, start_time, end_time, department, notes)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![
            input.user_id,
            input.date.to_string(),
            input.start_time.to_string(),
            input.end_time.to_string(),
            input.department,
            input.notes,
          ],
        )?;
        Ok(input.into_shift(conn.last_insert_rowid()))
      })
      .await?;
    Ok(shift)
  }

  async fn update_shift(&self, id: ShiftId, patch: ShiftPatch) -> Result<Option<Shift>> {
    let shift = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut shift) = select_shift(&tx, id)? else {
          return Ok(None);
        };
        patch.apply(&mut shift);
        write_shift(&tx, &shift)?;
        tx.commit()?;
        Ok(Some(shift))
      })
      .await?;
    Ok(shift)
  }

  async fn delete_shift(&self, id: ShiftId) -> Result<bool> { self.delete_row("shifts", id).await }

  // ── Time off ──────────────────────────────────────────────────────────────

  async fn get_time_off(&self, id: TimeOffId) -> Result<Option<TimeOffRequest>> {
    Ok(self.conn.call(move |conn| Ok(select_time_off(conn, id)?)).await?)
  }

  async fn list_time_off(&self, query: TimeOffQuery) -> Result<Vec<TimeOffRequest>> {
    let status = query.status.map(|s| s.to_string());

    let requests = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TIME_OFF_COLUMNS} FROM time_off_requests
           WHERE (?1 IS NULL OR user_id = ?1)
             AND (?2 IS NULL OR status = ?2)
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(params![query.user_id, status], time_off_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(requests)
  }

  async fn create_time_off(&self, input: NewTimeOffRequest) -> Result<TimeOffRequest> {
    let created_at = Utc::now();
    let request = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO time_off_requests (user_id, start_date, end_date, reason, status, created_at)
           VALUES (?1, ?2, ?3, ?4, 'pending', ?5)",
          params![
            input.user_id,
            input.start_date.to_string(),
            input.end_date.to_string(),
            input.reason,
            encode_dt(created_at),
          ],
        )?;
        Ok(input.into_request(conn.last_insert_rowid(), created_at))
      })
      .await?;
    Ok(request)
  }

  async fn update_time_off(
    &self,
    id:    TimeOffId,
    patch: TimeOffPatch,
  ) -> Result<Option<TimeOffRequest>> {
    let request = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut request) = select_time_off(&tx, id)? else {
          return Ok(None);
        };
        patch.apply(&mut request);
        write_time_off(&tx, &request)?;
        tx.commit()?;
        Ok(Some(request))
      })
      .await?;
    Ok(request)
  }

  async fn delete_time_off(&self, id: TimeOffId) -> Result<bool> {
    self.delete_row("time_off_requests", id).await
  }

  // ── Activities ────────────────────────────────────────────────────────────

  async fn get_activity(&self, id: ActivityId) -> Result<Option<Activity>> {
    let activity = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1"),
              params![id],
              activity_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(activity)
  }

  async fn list_activities(&self, limit: Option<usize>) -> Result<Vec<Activity>> {
    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));

    let activities = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ACTIVITY_COLUMNS} FROM activities
           ORDER BY created_at DESC, id DESC
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(params![limit], activity_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(activities)
  }

  async fn create_activity(&self, input: NewActivity) -> Result<Activity> {
    let created_at = Utc::now();
    let activity = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO activities (type, description, user_id, related_user_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![
            input.activity_type,
            input.description,
            input.user_id,
            input.related_user_id,
            encode_dt(created_at),
          ],
        )?;
        Ok(input.into_activity(conn.last_insert_rowid(), created_at))
      })
      .await?;
    Ok(activity)
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn get_message(&self, id: MessageId) -> Result<Option<Message>> {
    Ok(self.conn.call(move |conn| Ok(select_message(conn, id)?)).await?)
  }

  async fn list_messages_for_user(&self, user_id: UserId) -> Result<Vec<Message>> {
    let messages = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MESSAGE_COLUMNS} FROM messages
           WHERE sender_id = ?1 OR receiver_id = ?1
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(params![user_id], message_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(messages)
  }

  async fn create_message(&self, input: NewMessage) -> Result<Message> {
    let created_at = Utc::now();
    let message = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO messages (
             sender_id, receiver_id, subject, content, is_read,
             priority, message_type, created_at
           ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7)",
          params![
            input.sender_id,
            input.receiver_id,
            input.subject,
            input.content,
            input.priority.to_string(),
            input.message_type.to_string(),
            encode_dt(created_at),
          ],
        )?;
        Ok(input.into_message(conn.last_insert_rowid(), created_at))
      })
      .await?;
    Ok(message)
  }

  async fn mark_message_read(&self, id: MessageId) -> Result<Option<Message>> {
    let message = self
      .conn
      .call(move |conn| {
        conn.execute("UPDATE messages SET is_read = 1 WHERE id = ?1", params![id])?;
        Ok(select_message(conn, id)?)
      })
      .await?;
    Ok(message)
  }

  async fn delete_message(&self, id: MessageId) -> Result<bool> {
    self.delete_row("messages", id).await
  }

  async fn unread_message_count(&self, user_id: UserId) -> Result<usize> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM messages WHERE receiver_id = ?1 AND is_read = 0",
          params![user_id],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(usize::try_from(count).unwrap_or_default())
  }
}
