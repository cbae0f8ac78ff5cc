use crate::errors::{AppError, ResultExt};
use crate::filter::{FilterSpec, FilterValue};
use crate::models::{Person, PersonFields};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

const SELECT_PEOPLE: &str =
    "SELECT id, name, surname, patronymic, age, gender, nationality FROM people";

/// Persistence operations on person records.
///
/// Implemented by [`PersonStorage`] for Postgres; tests substitute an
/// in-memory store.
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Inserts a person and returns the id assigned by storage.
    ///
    /// Fails with `PersonExists` when the (name, surname) pair is taken.
    async fn create_person(&self, person: &PersonFields) -> Result<i32, AppError>;

    /// Deletes by id. Deleting an id that does not exist is not an error.
    async fn delete_person(&self, id: i32) -> Result<(), AppError>;

    /// Replaces all six mutable fields of the person with `id`.
    async fn update_person(&self, id: i32, person: &PersonFields) -> Result<(), AppError>;

    /// Returns people matching every populated filter, ordered by id.
    async fn query_people(&self, filter: &FilterSpec) -> Result<Vec<Person>, AppError>;
}

/// Postgres-backed person storage.
#[derive(Clone)]
pub struct PersonStorage {
    pool: PgPool,
}

impl PersonStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonStore for PersonStorage {
    #[tracing::instrument(skip(self, person), fields(op = "storage.create_person"))]
    async fn create_person(&self, person: &PersonFields) -> Result<i32, AppError> {
        let result = sqlx::query_scalar::<_, i32>(
            "INSERT INTO people (name, surname, patronymic, age, gender, nationality)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(&person.name)
        .bind(&person.surname)
        .bind(&person.patronymic)
        .bind(person.age)
        .bind(&person.gender)
        .bind(&person.nationality)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::info!(
                    name = %person.name,
                    surname = %person.surname,
                    "person already exists"
                );
                Err(AppError::PersonExists)
            }
            Err(e) => Err::<i32, _>(e).context("storage.create_person"),
        }
    }

    #[tracing::instrument(skip(self), fields(op = "storage.delete_person"))]
    async fn delete_person(&self, id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM people WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("storage.delete_person")?;

        if result.rows_affected() == 0 {
            tracing::debug!("no person with id {} to delete", id);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, person), fields(op = "storage.update_person"))]
    async fn update_person(&self, id: i32, person: &PersonFields) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE people
             SET name = $2, surname = $3, patronymic = $4, age = $5, gender = $6, nationality = $7
             WHERE id = $1",
        )
        .bind(id)
        .bind(&person.name)
        .bind(&person.surname)
        .bind(&person.patronymic)
        .bind(person.age)
        .bind(&person.gender)
        .bind(&person.nationality)
        .execute(&self.pool)
        .await
        .context("storage.update_person")?;

        if result.rows_affected() == 0 {
            tracing::debug!("no person with id {} to update", id);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(op = "storage.query_people"))]
    async fn query_people(&self, filter: &FilterSpec) -> Result<Vec<Person>, AppError> {
        let mut query = build_people_query(filter);
        tracing::debug!("query: {}", query.sql());

        let people = query
            .build_query_as::<Person>()
            .fetch_all(&self.pool)
            .await
            .context("storage.query_people")?;

        Ok(people)
    }
}

/// Builds the `SELECT` for `filter`.
///
/// One equality predicate per applicable key, ANDed in column order, every
/// value bound as a parameter. Results are ordered by id so pagination is
/// stable.
pub fn build_people_query(filter: &FilterSpec) -> QueryBuilder<'_, Postgres> {
    let mut query = QueryBuilder::<Postgres>::new(SELECT_PEOPLE);

    for (i, (key, value)) in filter.applicable().enumerate() {
        query
            .push(if i == 0 { " WHERE " } else { " AND " })
            .push(key.column())
            .push(" = ");
        match value {
            FilterValue::Text(text) => query.push_bind(text),
            FilterValue::Integer(n) => query.push_bind(n),
        };
    }

    query.push(" ORDER BY id");

    if let Some(limit) = filter.limit {
        query.push(" LIMIT ").push_bind(limit);
    }
    if let Some(offset) = filter.offset {
        query.push(" OFFSET ").push_bind(offset);
    }

    query
}
