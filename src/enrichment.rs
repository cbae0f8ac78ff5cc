//! Person workflows on top of storage and the enrichment services.
//!
//! Creating a person:
//! 1. Build a draft from the name parts
//! 2. Ask the age, gender and nationality services concurrently
//! 3. Keep whatever they answered; a failed lookup only leaves its field empty
//! 4. Store the record

use crate::cancel::cancellable;
use crate::db_storage::PersonStore;
use crate::errors::AppError;
use crate::filter::FilterSpec;
use crate::models::{Person, PersonFields};
use crate::services::Lookup;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Orchestrates person operations; the single entry point of the HTTP layer.
#[derive(Clone)]
pub struct PeopleService {
    store: Arc<dyn PersonStore>,
    age: Arc<dyn Lookup<i32>>,
    gender: Arc<dyn Lookup<String>>,
    nationality: Arc<dyn Lookup<String>>,
}

impl PeopleService {
    pub fn new(
        store: Arc<dyn PersonStore>,
        age: Arc<dyn Lookup<i32>>,
        gender: Arc<dyn Lookup<String>>,
        nationality: Arc<dyn Lookup<String>>,
    ) -> Self {
        Self {
            store,
            age,
            gender,
            nationality,
        }
    }

    /// Creates an enriched person and returns its id.
    ///
    /// Enrichment failures are logged and absorbed: the person is stored even
    /// when every service is down. Only `PersonExists`, `StorageError` and
    /// `Cancelled` reach the caller.
    #[tracing::instrument(skip(self, cancel), fields(op = "people.create"))]
    pub async fn create(
        &self,
        name: &str,
        surname: &str,
        patronymic: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<i32, AppError> {
        let mut person = PersonFields::draft(name, surname, patronymic);

        cancellable(cancel, async {
            self.enrich(&mut person).await;
            Ok(())
        })
        .await?;

        let id = cancellable(cancel, self.store.create_person(&person)).await?;

        tracing::info!(
            id,
            age = person.age,
            gender = %person.gender,
            nationality = %person.nationality,
            "person added"
        );
        Ok(id)
    }

    /// Fills the derived fields of `person` from the enrichment services.
    async fn enrich(&self, person: &mut PersonFields) {
        let name = person.name.as_str();
        let (age, gender, nationality) = tokio::join!(
            self.age.lookup(name),
            self.gender.lookup(name),
            self.nationality.lookup(name),
        );

        match age {
            Ok(age) => person.age = age,
            Err(e) => tracing::warn!("failed to get age: {}", e),
        }
        match gender {
            Ok(gender) => person.gender = gender,
            Err(e) => tracing::warn!("failed to get gender: {}", e),
        }
        match nationality {
            Ok(nationality) => person.nationality = nationality,
            Err(e) => tracing::warn!("failed to get nationality: {}", e),
        }
    }

    /// People matching `filter`, ordered by id.
    #[tracing::instrument(skip(self, cancel), fields(op = "people.list"))]
    pub async fn list(
        &self,
        filter: &FilterSpec,
        cancel: &CancellationToken,
    ) -> Result<Vec<Person>, AppError> {
        let people = cancellable(cancel, self.store.query_people(filter)).await?;
        tracing::debug!("found {} people", people.len());
        Ok(people)
    }

    /// Replaces every mutable field of the person with `id`.
    #[tracing::instrument(skip(self, person, cancel), fields(op = "people.update"))]
    pub async fn update(
        &self,
        id: i32,
        person: &PersonFields,
        cancel: &CancellationToken,
    ) -> Result<(), AppError> {
        cancellable(cancel, self.store.update_person(id, person)).await?;
        tracing::info!(id, "person updated");
        Ok(())
    }

    #[tracing::instrument(skip(self, cancel), fields(op = "people.delete"))]
    pub async fn delete(&self, id: i32, cancel: &CancellationToken) -> Result<(), AppError> {
        cancellable(cancel, self.store.delete_person(id)).await?;
        tracing::info!(id, "person deleted");
        Ok(())
    }
}
