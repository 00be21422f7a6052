//! Departments: named, colour-coded groupings used by the schedule view.

use serde::{Deserialize, Serialize};

use crate::patch::merge;

pub type DepartmentId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
  pub id:    DepartmentId,
  pub name:  String,
  /// Display token, e.g. `"#f97316"` or `"orange"`.
  pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDepartment {
  pub name:  String,
  pub color: String,
}

impl NewDepartment {
  pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
    Self { name: name.into(), color: color.into() }
  }

  pub fn into_department(self, id: DepartmentId) -> Department {
    Department { id, name: self.name, color: self.color }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPatch {
  pub name:  Option<String>,
  pub color: Option<String>,
}

impl DepartmentPatch {
  pub fn apply(self, department: &mut Department) {
    merge(&mut department.name, self.name);
    merge(&mut department.color, self.color);
  }
}
