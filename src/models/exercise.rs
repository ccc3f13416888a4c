use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "strength";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Exercise {
  pub id: i64,
  pub name: String,
  pub muscle_group: String,
  pub category: String,
  pub created_at: Option<NaiveDateTime>,
}

/// For inserting or updating exercises
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExercise {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub muscle_group: String,
  #[serde(default)]
  pub category: Option<String>,
}

impl NewExercise {
  pub fn category_or_default(&self) -> &str {
    self
      .category
      .as_deref()
      .filter(|c| !c.trim().is_empty())
      .unwrap_or(DEFAULT_CATEGORY)
  }
}
