//! [`Table`]: one entity kind keyed by its integer id.

use std::collections::BTreeMap;

/// Rows of one entity kind plus that kind's id counter.
///
/// Ids start at 1, only ever increase, and are not handed out again after a
/// row is removed. Iteration follows id order, which is insertion order.
#[derive(Debug)]
pub struct Table<T> {
  rows:    BTreeMap<i64, T>,
  next_id: i64,
}

impl<T> Default for Table<T> {
  fn default() -> Self { Self { rows: BTreeMap::new(), next_id: 1 } }
}

impl<T: Clone> Table<T> {
  pub fn get(&self, id: i64) -> Option<T> { self.rows.get(&id).cloned() }

  pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
    self.rows.values().find(|row| pred(row)).cloned()
  }

  pub fn any(&self, mut pred: impl FnMut(&i64, &T) -> bool) -> bool {
    self.rows.iter().any(|(id, row)| pred(id, row))
  }

  pub fn filter(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
    self.rows.values().filter(|row| pred(row)).cloned().collect()
  }

  pub fn count(&self, mut pred: impl FnMut(&T) -> bool) -> usize {
    self.rows.values().filter(|row| pred(row)).count()
  }

  /// Build a row with the next id and store it.
  pub fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
    let id = self.next_id;
    self.next_id += 1;
    let row = build(id);
    self.rows.insert(id, row.clone());
    row
  }

  /// Mutate a row in place and return the result.
  pub fn modify(&mut self, id: i64, change: impl FnOnce(&mut T)) -> Option<T> {
    let row = self.rows.get_mut(&id)?;
    change(row);
    Some(row.clone())
  }

  pub fn remove(&mut self, id: i64) -> bool { self.rows.remove(&id).is_some() }
}
