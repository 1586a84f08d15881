//! `PostgreSQL` implementation of the read-only exercise catalog.
//!
//! The catalog tables are owned by the content side of the application;
//! the engine only looks exercises up for challenge selection, answer
//! checking, and module completion.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use praxis_engine::store::Catalog;
use praxis_engine::EngineError;
use praxis_types::{Difficulty, Exercise, ExerciseId, ModuleId};

use crate::error::DbError;
use crate::postgres::PostgresPool;

fn pg(err: sqlx::Error) -> EngineError {
    DbError::Postgres(err).into()
}

/// Exercise and module lookups backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Create a catalog over a connected pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn exercise(&self, id: ExerciseId) -> Result<Option<Exercise>, EngineError> {
        let row = sqlx::query_as::<_, ExerciseRow>(
            r"SELECT id, module_id, prompt, correct_answer, difficulty::TEXT AS difficulty
              FROM exercises WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(pg)?;

        row.map(ExerciseRow::into_domain).transpose()
    }

    async fn all_exercise_ids(&self) -> Result<Vec<ExerciseId>, EngineError> {
        let ids = sqlx::query_scalar::<_, Uuid>(r"SELECT id FROM exercises ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(pg)?;

        Ok(ids.into_iter().map(ExerciseId::from).collect())
    }

    async fn module_exercises(
        &self,
        id: ModuleId,
    ) -> Result<Option<Vec<ExerciseId>>, EngineError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"SELECT EXISTS(SELECT 1 FROM modules WHERE id = $1)",
        )
        .bind(id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(pg)?;
        if !exists {
            return Ok(None);
        }

        let ids = sqlx::query_scalar::<_, Uuid>(
            r"SELECT id FROM exercises WHERE module_id = $1 ORDER BY id",
        )
        .bind(id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        Ok(Some(ids.into_iter().map(ExerciseId::from).collect()))
    }
}

#[derive(sqlx::FromRow)]
struct ExerciseRow {
    id: Uuid,
    module_id: Option<Uuid>,
    prompt: String,
    correct_answer: String,
    difficulty: String,
}

impl ExerciseRow {
    fn into_domain(self) -> Result<Exercise, EngineError> {
        Ok(Exercise {
            id: ExerciseId::from(self.id),
            module_id: self.module_id.map(ModuleId::from),
            prompt: self.prompt,
            correct_answer: self.correct_answer,
            difficulty: difficulty_from_db(&self.difficulty)?,
        })
    }
}

/// Parse a stored difficulty string back into its domain enum.
fn difficulty_from_db(value: &str) -> Result<Difficulty, EngineError> {
    match value {
        "easy" => Ok(Difficulty::Easy),
        "moderate" => Ok(Difficulty::Moderate),
        "hard" => Ok(Difficulty::Hard),
        other => Err(DbError::CorruptRow(format!("unknown difficulty: {other}")).into()),
    }
}

/// Convert a [`Difficulty`] to its `PostgreSQL` enum string.
pub(crate) const fn difficulty_to_db(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Moderate => "moderate",
        Difficulty::Hard => "hard",
    }
}

/// Write helpers used to seed catalog content in integration tests and
/// local tooling.
impl PgCatalog {
    /// Insert or replace a module row.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the write fails.
    pub async fn upsert_module(&self, id: ModuleId, title: &str) -> Result<(), EngineError> {
        sqlx::query(
            r"INSERT INTO modules (id, title) VALUES ($1, $2)
              ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title",
        )
        .bind(id.into_inner())
        .bind(title)
        .execute(&self.pool)
        .await
        .map_err(pg)?;
        Ok(())
    }

    /// Insert or replace an exercise row.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the write fails.
    pub async fn upsert_exercise(&self, exercise: &Exercise) -> Result<(), EngineError> {
        sqlx::query(
            r"INSERT INTO exercises (id, module_id, prompt, correct_answer, difficulty)
              VALUES ($1, $2, $3, $4, $5::exercise_difficulty)
              ON CONFLICT (id) DO UPDATE SET
                module_id = EXCLUDED.module_id,
                prompt = EXCLUDED.prompt,
                correct_answer = EXCLUDED.correct_answer,
                difficulty = EXCLUDED.difficulty",
        )
        .bind(exercise.id.into_inner())
        .bind(exercise.module_id.map(ModuleId::into_inner))
        .bind(&exercise.prompt)
        .bind(&exercise.correct_answer)
        .bind(difficulty_to_db(exercise.difficulty))
        .execute(&self.pool)
        .await
        .map_err(pg)?;
        Ok(())
    }
}
