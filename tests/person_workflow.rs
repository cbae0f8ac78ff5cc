/// Tests of the create/list/update/delete workflows against an in-memory store.
mod common;

use common::{answering_service, failing_service, MemoryStore, Stub, StubLookup};
use people_service::enrichment::PeopleService;
use people_service::errors::ErrorKind;
use people_service::filter::{FilterKey, FilterSpec};
use people_service::models::PersonFields;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn create_stores_enriched_person() {
    let store = MemoryStore::new();
    let service = answering_service(store.clone());
    let token = CancellationToken::new();

    let id = service
        .create("Alisa", "Ivanova", None, &token)
        .await
        .unwrap();

    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    let alisa = &rows[0];
    assert_eq!(alisa.id, id);
    assert_eq!(alisa.age, 30);
    assert_eq!(alisa.gender, "female");
    assert_eq!(alisa.nationality, "RU");
    assert_eq!(alisa.patronymic, "");

    let found = service
        .list(&FilterSpec::new().with(FilterKey::Name, "Alisa"), &token)
        .await
        .unwrap();
    assert_eq!(found, rows);
}

#[tokio::test]
async fn create_succeeds_when_every_lookup_fails() {
    let store = MemoryStore::new();
    let service = failing_service(store.clone());

    let id = service
        .create("Ivan", "Petrov", Some("Sergeevich"), &CancellationToken::new())
        .await
        .unwrap();

    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].patronymic, "Sergeevich");
    assert_eq!(rows[0].age, 0);
    assert_eq!(rows[0].gender, "");
    assert_eq!(rows[0].nationality, "");
}

#[tokio::test]
async fn one_failing_lookup_does_not_affect_the_others() {
    let store = MemoryStore::new();
    let age = StubLookup::<i32>::new(Stub::Answer(41));
    let gender = StubLookup::<String>::new(Stub::Fail);
    let nationality = StubLookup::<String>::new(Stub::Answer("UA".to_string()));
    let service = PeopleService::new(
        store.clone(),
        age.clone(),
        gender.clone(),
        nationality.clone(),
    );

    service
        .create("Oksana", "Shevchenko", None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(age.calls(), 1);
    assert_eq!(gender.calls(), 1);
    assert_eq!(nationality.calls(), 1);

    let person = &store.rows()[0];
    assert_eq!(person.age, 41);
    assert_eq!(person.gender, "");
    assert_eq!(person.nationality, "UA");
}

#[tokio::test]
async fn duplicate_create_is_person_exists() {
    let store = MemoryStore::new();
    let service = answering_service(store.clone());
    let token = CancellationToken::new();

    service.create("Alisa", "Ivanova", None, &token).await.unwrap();
    let err = service
        .create("Alisa", "Ivanova", Some("Petrovna"), &token)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PersonExists);
    assert_eq!(store.rows().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn hanging_lookup_is_cancelled() {
    let store = MemoryStore::new();
    let service = PeopleService::new(
        store.clone(),
        StubLookup::<i32>::new(Stub::Hang),
        StubLookup::<String>::new(Stub::Answer("male".to_string())),
        StubLookup::<String>::new(Stub::Answer("RU".to_string())),
    );
    let token = CancellationToken::new();
    let _deadline = people_service::cancel::arm_deadline(&token, Duration::from_secs(2));

    let err = service
        .create("Dmitriy", "Sokolov", None, &token)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn cancelled_token_aborts_every_operation() {
    let store = MemoryStore::new();
    let service = answering_service(store.clone());
    let token = CancellationToken::new();
    token.cancel();

    let err = service.create("A", "B", None, &token).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    let err = service.list(&FilterSpec::new(), &token).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    let err = service.delete(1, &token).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[tokio::test]
async fn update_replaces_all_fields() {
    let store = MemoryStore::new();
    let service = answering_service(store.clone());
    let token = CancellationToken::new();
    let id = service.create("Alisa", "Ivanova", None, &token).await.unwrap();

    let replacement = PersonFields {
        name: "Alisa".to_string(),
        surname: "Smirnova".to_string(),
        patronymic: "Olegovna".to_string(),
        age: 31,
        gender: "female".to_string(),
        nationality: "BY".to_string(),
    };
    service.update(id, &replacement, &token).await.unwrap();

    let found = service
        .list(&FilterSpec::new().with(FilterKey::Id, id.to_string()), &token)
        .await
        .unwrap();
    assert_eq!(found, vec![replacement.with_id(id)]);
}

#[tokio::test]
async fn update_with_omitted_fields_zeroes_them() {
    let store = MemoryStore::new();
    let service = answering_service(store.clone());
    let token = CancellationToken::new();
    let id = service.create("Alisa", "Ivanova", None, &token).await.unwrap();

    let partial: PersonFields =
        serde_json::from_str(r#"{"name": "Alisa", "surname": "Ivanova"}"#).unwrap();
    service.update(id, &partial, &token).await.unwrap();

    let person = &store.rows()[0];
    assert_eq!(person.age, 0);
    assert_eq!(person.nationality, "");
}

#[tokio::test]
async fn delete_missing_id_is_not_an_error() {
    let store = MemoryStore::new();
    let service = answering_service(store.clone());
    let token = CancellationToken::new();
    let id = service.create("Alisa", "Ivanova", None, &token).await.unwrap();

    service.delete(id + 100, &token).await.unwrap();
    assert_eq!(store.rows().len(), 1);

    service.delete(id, &token).await.unwrap();
    assert!(store.rows().is_empty());
}
