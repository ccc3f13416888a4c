//! Exercise library shared by all users

use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::{Exercise, NewExercise};

const EXERCISE_NOT_FOUND: &str = "Exercise not found";
const DUPLICATE_EXERCISE: &str = "Exercise with this name already exists";

/// Optional filters for listing; both combine with AND
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ExerciseFilter {
  pub muscle_group: Option<String>,
  pub category: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn validate(new: &NewExercise) -> AppResult<()> {
  if new.name.trim().is_empty() || new.muscle_group.trim().is_empty() {
    return Err(AppError::BadRequest("Name and muscle_group are required".into()));
  }
  Ok(())
}

pub async fn list_exercises(pool: &SqlitePool, filter: &ExerciseFilter) -> AppResult<Vec<Exercise>> {
  let exercises = sqlx::query_as::<_, Exercise>(
    r#"
    SELECT id, name, muscle_group, category, created_at
    FROM exercises
    WHERE (?1 IS NULL OR muscle_group = ?1)
      AND (?2 IS NULL OR category = ?2)
    ORDER BY name
    "#,
  )
  .bind(non_blank(&filter.muscle_group))
  .bind(non_blank(&filter.category))
  .fetch_all(pool)
  .await?;

  Ok(exercises)
}

pub async fn get_exercise(pool: &SqlitePool, id: i64) -> AppResult<Exercise> {
  sqlx::query_as::<_, Exercise>("SELECT id, name, muscle_group, category, created_at FROM exercises WHERE id = ?1")
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(EXERCISE_NOT_FOUND.into()))
}

pub async fn create_exercise(pool: &SqlitePool, new: &NewExercise) -> AppResult<Exercise> {
  validate(new)?;

  let exercise = sqlx::query_as::<_, Exercise>(
    r#"
    INSERT INTO exercises (name, muscle_group, category)
    VALUES (?1, ?2, ?3)
    RETURNING id, name, muscle_group, category, created_at
    "#,
  )
  .bind(new.name.trim())
  .bind(new.muscle_group.trim())
  .bind(new.category_or_default())
  .fetch_one(pool)
  .await
  .map_err(|e| AppError::from_insert(e, DUPLICATE_EXERCISE))?;

  tracing::info!(exercise_id = exercise.id, name = %exercise.name, "Created exercise");
  Ok(exercise)
}

pub async fn update_exercise(pool: &SqlitePool, id: i64, update: &NewExercise) -> AppResult<Exercise> {
  validate(update)?;

  sqlx::query_as::<_, Exercise>(
    r#"
    UPDATE exercises SET name = ?1, muscle_group = ?2, category = ?3
    WHERE id = ?4
    RETURNING id, name, muscle_group, category, created_at
    "#,
  )
  .bind(update.name.trim())
  .bind(update.muscle_group.trim())
  .bind(update.category_or_default())
  .bind(id)
  .fetch_optional(pool)
  .await
  .map_err(|e| AppError::from_insert(e, DUPLICATE_EXERCISE))?
  .ok_or_else(|| AppError::NotFound(EXERCISE_NOT_FOUND.into()))
}

/// Delete an exercise along with every set logged against it
pub async fn delete_exercise(pool: &SqlitePool, id: i64) -> AppResult<()> {
  let result = sqlx::query("DELETE FROM exercises WHERE id = ?1")
    .bind(id)
    .execute(pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound(EXERCISE_NOT_FOUND.into()));
  }
  tracing::info!(exercise_id = id, "Deleted exercise");
  Ok(())
}

/// Distinct muscle groups, alphabetical
pub async fn muscle_groups(pool: &SqlitePool) -> AppResult<Vec<String>> {
  let groups = sqlx::query_scalar::<_, String>("SELECT DISTINCT muscle_group FROM exercises ORDER BY muscle_group")
    .fetch_all(pool)
    .await?;
  Ok(groups)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::exercise::DEFAULT_CATEGORY;
  use crate::test_utils::{
    seed_test_exercise, seed_test_set, seed_test_workout, setup_test_db, teardown_test_db, DEFAULT_EXERCISE_COUNT,
  };

  fn new_exercise(name: &str, muscle_group: &str, category: Option<&str>) -> NewExercise {
    NewExercise {
      name: name.to_string(),
      muscle_group: muscle_group.to_string(),
      category: category.map(str::to_string),
    }
  }

  #[tokio::test]
  async fn test_create_defaults_category_and_rejects_duplicates() {
    let pool = setup_test_db().await;

    let created = create_exercise(&pool, &new_exercise("Bench press", "Chest", None)).await.unwrap();
    assert_eq!(created.category, DEFAULT_CATEGORY);
    assert_eq!(get_exercise(&pool, created.id).await.unwrap().name, "Bench press");

    let duplicate = create_exercise(&pool, &new_exercise("Bench press", "Chest", None)).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let missing = create_exercise(&pool, &new_exercise("", "Chest", None)).await;
    assert!(matches!(missing, Err(AppError::BadRequest(_))));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_list_filters_and_muscle_groups() {
    let pool = setup_test_db().await;
    create_exercise(&pool, &new_exercise("Wrist curl", "Forearm", None)).await.unwrap();
    create_exercise(&pool, &new_exercise("Reverse curl", "Forearm", Some("isolation"))).await.unwrap();
    create_exercise(&pool, &new_exercise("Neck curl", "Neck", None)).await.unwrap();

    let all = list_exercises(&pool, &ExerciseFilter::default()).await.unwrap();
    assert_eq!(all.len() as i64, DEFAULT_EXERCISE_COUNT + 3);
    assert!(all.windows(2).all(|w| w[0].name <= w[1].name));

    let forearm = ExerciseFilter {
      muscle_group: Some("Forearm".into()),
      category: None,
    };
    assert_eq!(list_exercises(&pool, &forearm).await.unwrap().len(), 2);

    let forearm_isolation = ExerciseFilter {
      muscle_group: Some("Forearm".into()),
      category: Some("isolation".into()),
    };
    let found = list_exercises(&pool, &forearm_isolation).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Reverse curl");

    let blank = ExerciseFilter {
      muscle_group: Some("".into()),
      category: Some("  ".into()),
    };
    assert_eq!(list_exercises(&pool, &blank).await.unwrap().len(), all.len());

    let groups = muscle_groups(&pool).await.unwrap();
    assert!(groups.windows(2).all(|w| w[0] < w[1]));
    for group in ["Back", "Chest", "Forearm", "Neck"] {
      assert!(groups.iter().any(|g| g == group), "{}", group);
    }

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_update_and_delete() {
    let pool = setup_test_db().await;
    let bench = seed_test_exercise(&pool, "Bench press", "Chest").await;
    seed_test_exercise(&pool, "Back squat", "Quad").await;

    let renamed = update_exercise(&pool, bench, &new_exercise("Flat bench press", "Chest", Some("compound")))
      .await
      .unwrap();
    assert_eq!(renamed.name, "Flat bench press");
    assert_eq!(renamed.category, "compound");

    let clash = update_exercise(&pool, bench, &new_exercise("Back squat", "Quad", None)).await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));

    let missing = update_exercise(&pool, bench + 100, &new_exercise("Row", "Back", None)).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let workout = seed_test_workout(&pool, 1, "2024-01-01").await;
    seed_test_set(&pool, 1, workout, bench, 100.0, 5, 1).await;

    delete_exercise(&pool, bench).await.unwrap();
    assert!(matches!(get_exercise(&pool, bench).await, Err(AppError::NotFound(_))));
    assert!(matches!(delete_exercise(&pool, bench).await, Err(AppError::NotFound(_))));

    let orphaned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_sets")
      .fetch_one(&pool)
      .await
      .unwrap();
    assert_eq!(orphaned, 0);

    teardown_test_db(pool).await;
  }
}
