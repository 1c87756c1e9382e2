use super::*;
use axum::http::Method;
use reqwest::Client;
use serde_json::json;
use shared::domain::{Room, RoomId};

use crate::{
    api::{ApiConnection, HttpResource},
    test_backend::{spawn_backend, TestBackend},
};

fn room_store(backend: &TestBackend) -> EntityStore<Room> {
    let connection = ApiConnection::new(Client::new(), backend.url.clone(), None);
    EntityStore::new(Arc::new(HttpResource::<Room>::new(connection)))
}

fn room(name: &str, capacity: i32) -> Room {
    Room {
        id: None,
        name: Some(name.into()),
        capacity: Some(capacity),
    }
}

#[tokio::test]
async fn list_fetch_mirrors_response() {
    let backend = spawn_backend().await;
    backend
        .seed("rooms", json!({ "name": "Saal 1", "capacity": 120 }))
        .await;
    backend
        .seed("rooms", json!({ "name": "Saal 2", "capacity": 80 }))
        .await;
    let mut store = room_store(&backend);

    store
        .fetch_list(&ListQuery::unpaged())
        .await
        .expect("fetch rooms");

    let state = store.state();
    assert!(!state.loading);
    assert_eq!(state.total_items, 2);
    let names: Vec<_> = state
        .entities
        .iter()
        .filter_map(|room| room.name.as_deref())
        .collect();
    assert_eq!(names, ["Saal 1", "Saal 2"]);
}

#[tokio::test]
async fn create_refetches_list_exactly_once() {
    let backend = spawn_backend().await;
    let mut store = room_store(&backend);

    let created = store
        .create(room("achtens vielmals", 32349))
        .await
        .expect("create room");

    let requests = backend.requests().await;
    let calls: Vec<_> = requests
        .iter()
        .map(|request| (request.method.clone(), request.path.as_str()))
        .collect();
    assert_eq!(
        calls,
        [(Method::POST, "/api/rooms"), (Method::GET, "/api/rooms")]
    );

    let state = store.state();
    assert!(state.update_success);
    assert!(!state.updating);
    assert!(!state.loading);
    assert_eq!(state.entity, created);
    assert_eq!(state.entities, vec![created.clone()]);
    assert_eq!(state.total_items, 1);
}

#[tokio::test]
async fn failed_list_fetch_keeps_previous_entities() {
    let backend = spawn_backend().await;
    backend.seed("rooms", json!({ "name": "Saal 1" })).await;
    let mut store = room_store(&backend);
    store
        .fetch_list(&ListQuery::unpaged())
        .await
        .expect("first fetch");

    backend.fail_lists("rooms").await;
    let err = store
        .fetch_list(&ListQuery::unpaged())
        .await
        .expect_err("second fetch fails");

    let state = store.state();
    assert_eq!(err.code(), shared::error::ErrorCode::Internal);
    assert_eq!(state.entities.len(), 1);
    assert!(!state.loading);
    assert_eq!(
        state.error_message.as_deref(),
        Some("request failed with status code 500: Internal Server Error")
    );
}

#[tokio::test]
async fn fetch_one_failure_leaves_entity_untouched() {
    let backend = spawn_backend().await;
    let id = backend.seed("rooms", json!({ "name": "Saal 1" })).await;
    let mut store = room_store(&backend);
    store.fetch_one(id).await.expect("fetch room");

    assert!(store.fetch_one(id + 100).await.is_err());

    let state = store.state();
    assert_eq!(state.entity.id, Some(RoomId(id)));
    assert!(state.error_message.is_some());
}

#[tokio::test]
async fn delete_succeeds_even_when_refetch_fails() {
    let backend = spawn_backend().await;
    let id = backend.seed("rooms", json!({ "name": "Saal 1" })).await;
    let mut store = room_store(&backend);
    store.fetch_one(id).await.expect("fetch room");
    backend.fail_lists("rooms").await;
    backend.clear_requests().await;

    store.delete(id).await.expect("delete room");

    let requests = backend.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, Method::DELETE);
    assert_eq!(requests[1].method, Method::GET);

    // the failed refetch is the last transition the container saw
    let state = store.state();
    assert!(!state.update_success);
    assert_eq!(state.entity, Room::default());
    assert!(state.error_message.is_some());
}

#[tokio::test]
async fn failed_save_records_message_without_refetch() {
    let backend = spawn_backend().await;
    let mut store = room_store(&backend);
    let with_id = Room {
        id: Some(RoomId(5)),
        ..room("Saal 1", 10)
    };

    // the backend refuses new records that already carry an id
    assert!(store.create(with_id).await.is_err());

    let state = store.state();
    assert!(!state.updating);
    assert!(!state.update_success);
    assert_eq!(
        state.error_message.as_deref(),
        Some("request failed with status code 400: A new entity cannot already have an ID")
    );
    assert_eq!(backend.requests().await.len(), 1);
}

#[tokio::test]
async fn partial_update_merges_on_the_backend() {
    let backend = spawn_backend().await;
    let id = backend
        .seed("rooms", json!({ "name": "Saal 1", "capacity": 10 }))
        .await;
    let mut store = room_store(&backend);

    let saved = store
        .partial_update(Room {
            id: Some(RoomId(id)),
            name: None,
            capacity: Some(11),
        })
        .await
        .expect("patch room");

    assert_eq!(saved.name.as_deref(), Some("Saal 1"));
    assert_eq!(store.state().entities, vec![saved]);
}

#[tokio::test]
async fn update_and_partial_update_each_refetch_once() {
    let backend = spawn_backend().await;
    let id = backend
        .seed("rooms", json!({ "name": "Saal 1", "capacity": 10 }))
        .await;
    let mut store = room_store(&backend);

    store
        .update(Room {
            id: Some(RoomId(id)),
            ..room("Saal A", 20)
        })
        .await
        .expect("update room");
    store
        .partial_update(Room {
            id: Some(RoomId(id)),
            name: None,
            capacity: Some(30),
        })
        .await
        .expect("patch room");

    let path = format!("/api/rooms/{id}");
    let calls: Vec<_> = backend
        .requests()
        .await
        .into_iter()
        .map(|request| (request.method, request.path))
        .collect();
    assert_eq!(
        calls,
        [
            (Method::PUT, path.clone()),
            (Method::GET, "/api/rooms".to_string()),
            (Method::PATCH, path),
            (Method::GET, "/api/rooms".to_string()),
        ]
    );
    let state = store.state();
    assert!(state.update_success);
    assert_eq!(state.entities[0].name.as_deref(), Some("Saal A"));
    assert_eq!(state.entities[0].capacity, Some(30));
}

#[tokio::test]
async fn reset_restores_empty_container() {
    let backend = spawn_backend().await;
    let id = backend.seed("rooms", json!({ "name": "Saal 1" })).await;
    let mut store = room_store(&backend);
    store.fetch_one(id).await.expect("fetch room");

    store.reset();

    assert_eq!(store.state(), &EntityState::default());
}
