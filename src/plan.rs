//! Weekly training plan storage and its per-muscle-group summary

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{AppError, AppResult};
use crate::models::WeeklyPlan;

/// Recommended weekly hard sets and sessions per muscle group
pub const OPTIMAL_RANGES: &[(&str, &str, &str)] = &[
  ("Chest", "12-20", "1.5-3x"),
  ("Anterior deltoid", "6-8", "2-4x"),
  ("Triceps", "10-14", "2-4x"),
  ("Bicep", "14-20", "2-6x"),
  ("Lateral deltoid", "16-22", "2-6x"),
  ("Quad", "12-18", "1.5-3x"),
  ("Calf", "12-16", "2-6x"),
  ("Glutes", "4-12", "2-3x"),
  ("Back", "14-22", "2-6x"),
  ("Hamstring", "10-16", "2-3x"),
  ("Trapezius", "12-20", "2-4x"),
  ("Abs", "10-14", "2-4x"),
  ("Posterior deltoid", "16-22", "2-6x"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPlan {
  pub id: i64,
  pub user_id: i64,
  pub plan_json: Value,
  pub updated_at: Option<String>,
}

/// Planned weekly load for one muscle group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleGroupPlan {
  pub muscle_group: String,
  pub weekly_sets: i64,
  /// Sessions in the week that train this group at least once
  pub frequency_days: i64,
  pub optimal_sets: Option<String>,
  pub optimal_frequency: Option<String>,
}

fn optimal_range(muscle_group: &str) -> Option<(&'static str, &'static str)> {
  OPTIMAL_RANGES
    .iter()
    .find(|(group, _, _)| *group == muscle_group)
    .map(|&(_, sets, freq)| (sets, freq))
}

/// Stored text back to JSON; text that is not JSON is returned as a string
fn decode_plan(raw: String) -> Value {
  serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

/// Strings are stored verbatim, anything else serialized
fn encode_plan(plan: &Value) -> AppResult<String> {
  match plan {
    Value::String(s) => Ok(s.clone()),
    other => serde_json::to_string(other).map_err(|e| AppError::Internal(format!("Failed to encode plan: {}", e))),
  }
}

pub async fn get_plan(pool: &SqlitePool, user_id: i64) -> AppResult<Value> {
  let raw: Option<String> = sqlx::query_scalar("SELECT plan_json FROM plans WHERE user_id = ?1")
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

  raw
    .map(decode_plan)
    .ok_or_else(|| AppError::NotFound("No plan found for user".into()))
}

/// Null, false, zero and empty strings count as no plan at all
fn is_blank(plan: &Value) -> bool {
  match plan {
    Value::Null | Value::Bool(false) => true,
    Value::String(s) => s.is_empty(),
    Value::Number(n) => n.as_f64() == Some(0.0),
    _ => false,
  }
}

/// Insert or replace the user's plan
pub async fn save_plan(pool: &SqlitePool, user_id: i64, plan: Option<&Value>) -> AppResult<SavedPlan> {
  let plan = match plan {
    Some(plan) if !is_blank(plan) => plan,
    _ => return Err(AppError::BadRequest("plan_json is required".into())),
  };
  let encoded = encode_plan(plan)?;

  let (id, user_id, plan_json, updated_at): (i64, i64, String, Option<String>) = sqlx::query_as(
    r#"
    INSERT INTO plans (user_id, plan_json, updated_at)
    VALUES (?1, ?2, CURRENT_TIMESTAMP)
    ON CONFLICT(user_id) DO UPDATE SET plan_json = excluded.plan_json, updated_at = CURRENT_TIMESTAMP
    RETURNING id, user_id, plan_json, updated_at
    "#,
  )
  .bind(user_id)
  .bind(&encoded)
  .fetch_one(pool)
  .await?;

  tracing::info!(user_id, plan_id = id, "Saved weekly plan");

  Ok(SavedPlan {
    id,
    user_id,
    plan_json: decode_plan(plan_json),
    updated_at,
  })
}

/// Weekly sets and training days per muscle group in a plan.
///
/// Entries whose exercise is blank or unknown are ignored. A group counts
/// once per session no matter how many of its exercises appear there.
pub fn summarize_plan(plan: &WeeklyPlan, muscle_groups: &HashMap<String, String>) -> Vec<MuscleGroupPlan> {
  let mut weekly_sets: BTreeMap<&str, i64> = BTreeMap::new();
  let mut frequency: BTreeMap<&str, i64> = BTreeMap::new();

  for session in plan.values() {
    let mut trained_today = BTreeSet::new();
    for entry in session.entries() {
      if entry.exercise.is_empty() {
        continue;
      }
      let Some(group) = muscle_groups.get(&entry.exercise) else {
        continue;
      };
      *weekly_sets.entry(group.as_str()).or_insert(0) += entry.set_count();
      trained_today.insert(group.as_str());
    }
    for group in trained_today {
      *frequency.entry(group).or_insert(0) += 1;
    }
  }

  weekly_sets
    .into_iter()
    .map(|(group, sets)| {
      let range = optimal_range(group);
      MuscleGroupPlan {
        muscle_group: group.to_string(),
        weekly_sets: sets,
        frequency_days: frequency.get(group).copied().unwrap_or(0),
        optimal_sets: range.map(|(s, _)| s.to_string()),
        optimal_frequency: range.map(|(_, f)| f.to_string()),
      }
    })
    .collect()
}

/// Summary of the stored plan, resolving exercise names against the library
pub async fn plan_summary(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<MuscleGroupPlan>> {
  let stored = get_plan(pool, user_id).await?;
  let plan: WeeklyPlan = serde_json::from_value(stored)
    .map_err(|e| AppError::BadRequest(format!("Stored plan is not a weekly plan: {}", e)))?;

  let rows: Vec<(String, String)> = sqlx::query_as("SELECT name, muscle_group FROM exercises")
    .fetch_all(pool)
    .await?;
  let muscle_groups: HashMap<String, String> = rows.into_iter().collect();

  Ok(summarize_plan(&plan, &muscle_groups))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{seed_test_exercise, setup_test_db, teardown_test_db};
  use serde_json::json;

  fn library() -> HashMap<String, String> {
    [
      ("Barbell bench press", "Chest"),
      ("Cable flies", "Chest"),
      ("Low bar squat", "Quad"),
      ("Forearm curl", "Forearm"),
    ]
    .into_iter()
    .map(|(n, g)| (n.to_string(), g.to_string()))
    .collect()
  }

  #[test]
  fn test_summarize_plan_counts_sets_and_days() {
    let plan: WeeklyPlan = serde_json::from_value(json!({
      "Monday AM": [
        { "exercise": "Barbell bench press", "sets": 3 },
        { "exercise": "Cable flies", "sets": "4" },
        { "exercise": "", "sets": 3 }
      ],
      "Tuesday AM": [
        { "exercise": "Low bar squat", "sets": 5 },
        { "exercise": "Unknown lift", "sets": 3 }
      ],
      "Thursday AM": [
        { "exercise": "Barbell bench press", "sets": 3 },
        { "exercise": "Forearm curl", "sets": 2 }
      ]
    }))
    .unwrap();

    let summary = summarize_plan(&plan, &library());

    assert_eq!(summary.len(), 3);
    let chest = summary.iter().find(|m| m.muscle_group == "Chest").unwrap();
    assert_eq!(chest.weekly_sets, 10);
    assert_eq!(chest.frequency_days, 2);
    assert_eq!(chest.optimal_sets.as_deref(), Some("12-20"));
    assert_eq!(chest.optimal_frequency.as_deref(), Some("1.5-3x"));

    let forearm = summary.iter().find(|m| m.muscle_group == "Forearm").unwrap();
    assert_eq!(forearm.frequency_days, 1);
    assert_eq!(forearm.optimal_sets, None);
  }

  #[test]
  fn test_summarize_plan_skips_null_entries() {
    let plan: WeeklyPlan = serde_json::from_value(json!({
      "Monday AM": [null, { "exercise": "Barbell bench press", "sets": 3 }],
      "Tuesday AM": [null]
    }))
    .unwrap();

    let summary = summarize_plan(&plan, &library());

    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].muscle_group, "Chest");
    assert_eq!(summary[0].weekly_sets, 3);
    assert_eq!(summary[0].frequency_days, 1);
  }

  #[test]
  fn test_decode_plan_falls_back_to_string() {
    assert_eq!(decode_plan(r#"{"a":[]}"#.into()), json!({ "a": [] }));
    assert_eq!(decode_plan("not json".into()), json!("not json"));
  }

  #[tokio::test]
  async fn test_save_and_get_plan_upserts() {
    let pool = setup_test_db().await;

    assert!(matches!(get_plan(&pool, 1).await, Err(AppError::NotFound(_))));
    assert!(matches!(save_plan(&pool, 1, None).await, Err(AppError::BadRequest(_))));
    for blank in [Value::Null, json!(""), json!(0), json!(false)] {
      assert!(matches!(save_plan(&pool, 1, Some(&blank)).await, Err(AppError::BadRequest(_))));
    }

    let first = save_plan(&pool, 1, Some(&json!({ "Monday AM": [] }))).await.unwrap();
    let second = save_plan(&pool, 1, Some(&json!({ "Friday AM": [] }))).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.plan_json, json!({ "Friday AM": [] }));

    assert_eq!(get_plan(&pool, 1).await.unwrap(), json!({ "Friday AM": [] }));
    assert!(matches!(get_plan(&pool, 2).await, Err(AppError::NotFound(_))));

    // A pre-serialized plan string is stored as-is
    save_plan(&pool, 2, Some(&json!(r#"{"Monday AM":[]}"#))).await.unwrap();
    assert_eq!(get_plan(&pool, 2).await.unwrap(), json!({ "Monday AM": [] }));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_plan_summary_uses_exercise_library() {
    let pool = setup_test_db().await;
    seed_test_exercise(&pool, "Neck curl", "Neck").await;

    save_plan(
      &pool,
      1,
      Some(&json!({
        "Monday AM": [null, { "exercise": "Barbell row", "sets": 3 }, { "exercise": "Pull-ups", "sets": 3 }],
        "Friday AM": [{ "exercise": "Pull-ups", "sets": 4 }, { "exercise": "Neck curl", "sets": 2 }]
      })),
    )
    .await
    .unwrap();

    // Barbell row and Pull-ups come from the default library
    let summary = plan_summary(&pool, 1).await.unwrap();
    assert_eq!(
      summary,
      vec![
        MuscleGroupPlan {
          muscle_group: "Back".into(),
          weekly_sets: 10,
          frequency_days: 2,
          optimal_sets: Some("14-22".into()),
          optimal_frequency: Some("2-6x".into()),
        },
        MuscleGroupPlan {
          muscle_group: "Neck".into(),
          weekly_sets: 2,
          frequency_days: 1,
          optimal_sets: None,
          optimal_frequency: None,
        },
      ]
    );

    teardown_test_db(pool).await;
  }
}
