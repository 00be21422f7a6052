//! Shallow-merge helpers shared by the `*Patch` input types.
//!
//! A patch field left as `None` keeps the stored value. Nullable columns use
//! `Option<Option<T>>` so that an explicit JSON `null` can clear them.

use serde::{Deserialize, Deserializer};

/// Deserialise a nullable patch field.
///
/// Pair with `#[serde(default, deserialize_with = "crate::patch::nullable")]`:
/// an absent key stays `None`, `null` becomes `Some(None)`, and a value
/// becomes `Some(Some(v))`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

/// Overwrite `slot` when the patch carries a value.
pub fn merge<T>(slot: &mut T, value: Option<T>) {
  if let Some(v) = value {
    *slot = v;
  }
}
