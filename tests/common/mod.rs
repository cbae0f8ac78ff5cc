//! In-memory doubles shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use people_service::db_storage::PersonStore;
use people_service::enrichment::PeopleService;
use people_service::errors::AppError;
use people_service::filter::{FilterKey, FilterSpec, FilterValue};
use people_service::models::{Person, PersonFields};
use people_service::services::Lookup;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Person store kept in a vector, mirroring the Postgres semantics.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Person>>,
    next_id: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rows(&self) -> Vec<Person> {
        self.rows.lock().unwrap().clone()
    }
}

fn matches(person: &Person, key: FilterKey, value: FilterValue<'_>) -> bool {
    match (key, value) {
        (FilterKey::Id, FilterValue::Integer(n)) => person.id == n,
        (FilterKey::Age, FilterValue::Integer(n)) => person.age == n,
        (FilterKey::Name, FilterValue::Text(v)) => person.name == v,
        (FilterKey::Surname, FilterValue::Text(v)) => person.surname == v,
        (FilterKey::Patronymic, FilterValue::Text(v)) => person.patronymic == v,
        (FilterKey::Gender, FilterValue::Text(v)) => person.gender == v,
        (FilterKey::Nationality, FilterValue::Text(v)) => person.nationality == v,
        _ => false,
    }
}

#[async_trait]
impl PersonStore for MemoryStore {
    async fn create_person(&self, person: &PersonFields) -> Result<i32, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|p| p.name == person.name && p.surname == person.surname)
        {
            return Err(AppError::PersonExists);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
        rows.push(person.clone().with_id(id));
        Ok(id)
    }

    async fn delete_person(&self, id: i32) -> Result<(), AppError> {
        self.rows.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn update_person(&self, id: i32, person: &PersonFields) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|p| p.id == id) {
            *row = person.clone().with_id(id);
        }
        Ok(())
    }

    async fn query_people(&self, filter: &FilterSpec) -> Result<Vec<Person>, AppError> {
        let rows = self.rows.lock().unwrap();
        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(rows
            .iter()
            .filter(|p| filter.applicable().all(|(key, value)| matches(p, key, value)))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Canned enrichment answer.
pub enum Stub<V> {
    Answer(V),
    Fail,
    /// Never answers.
    Hang,
}

pub struct StubLookup<V> {
    behavior: Stub<V>,
    calls: AtomicUsize,
}

impl<V> StubLookup<V> {
    pub fn new(behavior: Stub<V>) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> Lookup<V> for StubLookup<V> {
    async fn lookup(&self, _name: &str) -> Result<V, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Stub::Answer(v) => Ok(v.clone()),
            Stub::Fail => Err(AppError::LookupFailed {
                service: "stub",
                reason: "service down".to_string(),
            }),
            Stub::Hang => std::future::pending().await,
        }
    }
}

/// Service whose lookups all answer like the Alisa fixture.
pub fn answering_service(store: Arc<MemoryStore>) -> PeopleService {
    PeopleService::new(
        store,
        StubLookup::<i32>::new(Stub::Answer(30)),
        StubLookup::new(Stub::Answer("female".to_string())),
        StubLookup::new(Stub::Answer("RU".to_string())),
    )
}

/// Service whose lookups all fail.
pub fn failing_service(store: Arc<MemoryStore>) -> PeopleService {
    PeopleService::new(
        store,
        StubLookup::<i32>::new(Stub::Fail),
        StubLookup::<String>::new(Stub::Fail),
        StubLookup::<String>::new(Stub::Fail),
    )
}
