use super::*;
use axum::http::Method as HttpMethod;
use serde_json::json;
use shared::{
    domain::{Room, RoomId, Talk, TalkId},
    error::ErrorCode,
    protocol::{Order, Sort},
};

use crate::test_backend::{spawn_backend, TestBackend};

fn connection(backend: &TestBackend, token: Option<&str>) -> ApiConnection {
    ApiConnection::new(Client::new(), backend.url.clone(), token.map(str::to_string))
}

#[tokio::test]
async fn list_sends_paging_params_and_reads_total_count() {
    let backend = spawn_backend().await;
    backend
        .seed("rooms", json!({ "name": "Saal 1", "capacity": 120 }))
        .await;
    backend.seed("rooms", json!({ "name": "Saal 2" })).await;
    let rooms = HttpResource::<Room>::new(connection(&backend, None));

    let page = rooms
        .list(&ListQuery::paged(1, 20, Sort::new("name", Order::Desc)))
        .await
        .expect("list rooms");

    assert_eq!(page.total_items, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].name.as_deref(), Some("Saal 1"));
    assert_eq!(page.items[0].capacity, Some(120));

    let requests = backend
        .requests_matching(HttpMethod::GET, "/api/rooms")
        .await;
    assert_eq!(requests.len(), 1);
    let query = &requests[0].query;
    assert_eq!(query.get("page").map(String::as_str), Some("1"));
    assert_eq!(query.get("size").map(String::as_str), Some("20"));
    assert_eq!(query.get("sort").map(String::as_str), Some("name,desc"));
    assert!(query.contains_key("cacheBuster"));
    assert_eq!(requests[0].authorization, None);
}

#[tokio::test]
async fn unpaged_list_only_sends_cache_buster() {
    let backend = spawn_backend().await;
    let rooms = HttpResource::<Room>::new(connection(&backend, None));

    let page = rooms.list(&ListQuery::unpaged()).await.expect("list rooms");
    assert!(page.items.is_empty());
    assert_eq!(page.total_items, 0);

    let requests = backend.requests().await;
    let keys: Vec<_> = requests[0].query.keys().cloned().collect();
    assert_eq!(keys, vec!["cacheBuster".to_string()]);
}

#[tokio::test]
async fn missing_count_header_falls_back_to_body_length() {
    let backend = spawn_backend().await;
    backend.seed("rooms", json!({ "name": "Saal 1" })).await;
    backend.omit_total_count().await;
    let rooms = HttpResource::<Room>::new(connection(&backend, None));

    let page = rooms.list(&ListQuery::unpaged()).await.expect("list rooms");
    assert_eq!(page.total_items, 1);
}

#[tokio::test]
async fn unparsable_count_header_is_an_error() {
    let backend = spawn_backend().await;
    backend.seed("rooms", json!({ "name": "Saal 1" })).await;
    backend.total_count_header("lots").await;
    let rooms = HttpResource::<Room>::new(connection(&backend, None));

    let err = rooms
        .list(&ListQuery::unpaged())
        .await
        .expect_err("bad count header");

    assert!(matches!(&err, ClientError::InvalidTotalCount(raw) if raw == "lots"));
    assert_eq!(err.to_string(), "invalid x-total-count header: \"lots\"");
}

#[tokio::test]
async fn create_posts_cleaned_body_with_bearer_token() {
    let backend = spawn_backend().await;
    let talks = HttpResource::<Talk>::new(connection(&backend, Some("s3cret")));
    let talk = Talk {
        title: Some("Lifetimes".into()),
        speaker: Some("Ferris".into()),
        abstract_text: Some("borrowing".into()),
        room: Some(Room {
            name: Some("unsaved".into()),
            ..Room::default()
        }),
        ..Talk::default()
    };

    let created = talks.create(&talk).await.expect("create talk");
    assert_eq!(created.id, Some(TalkId(1)));
    assert_eq!(created.title.as_deref(), Some("Lifetimes"));

    let posts = backend
        .requests_matching(HttpMethod::POST, "/api/talks")
        .await;
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].body,
        Some(json!({ "title": "Lifetimes", "speaker": "Ferris", "abstractText": "borrowing" }))
    );
    assert_eq!(posts[0].authorization.as_deref(), Some("Bearer s3cret"));
}

#[tokio::test]
async fn patch_uses_merge_patch_content_type() {
    let backend = spawn_backend().await;
    let id = backend
        .seed("rooms", json!({ "name": "Saal 1", "capacity": 10 }))
        .await;
    let rooms = HttpResource::<Room>::new(connection(&backend, None));

    let patched = rooms
        .partial_update(&Room {
            id: Some(RoomId(id)),
            capacity: Some(99),
            ..Room::default()
        })
        .await
        .expect("patch room");

    assert_eq!(patched.name.as_deref(), Some("Saal 1"));
    assert_eq!(patched.capacity, Some(99));
    let patches = backend
        .requests_matching(HttpMethod::PATCH, &format!("/api/rooms/{id}"))
        .await;
    assert_eq!(
        patches[0].content_type.as_deref(),
        Some("application/merge-patch+json")
    );
}

#[tokio::test]
async fn update_and_delete_hit_item_urls() {
    let backend = spawn_backend().await;
    let id = backend.seed("rooms", json!({ "name": "Saal 1" })).await;
    let rooms = HttpResource::<Room>::new(connection(&backend, None));

    let updated = rooms
        .update(&Room {
            id: Some(RoomId(id)),
            name: Some("Saal A".into()),
            capacity: None,
        })
        .await
        .expect("update room");
    assert_eq!(updated.name.as_deref(), Some("Saal A"));

    rooms.delete(id).await.expect("delete room");
    assert!(backend.records("rooms").await.is_empty());
}

#[tokio::test]
async fn update_without_id_fails_before_sending() {
    let backend = spawn_backend().await;
    let rooms = HttpResource::<Room>::new(connection(&backend, None));

    let err = rooms
        .update(&Room::default())
        .await
        .expect_err("missing id");
    assert!(matches!(err, ClientError::MissingId(_)));
    assert!(backend.requests().await.is_empty());
}

#[tokio::test]
async fn error_status_keeps_problem_details() {
    let backend = spawn_backend().await;
    let rooms = HttpResource::<Room>::new(connection(&backend, None));

    let err = rooms.get(404).await.expect_err("missing room");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.to_string(), "request failed with status code 404: Not Found");
    match err {
        ClientError::Status { status, problem, .. } => {
            assert_eq!(status, 404);
            assert_eq!(problem.and_then(|p| p.status), Some(404));
        }
        other => panic!("unexpected error {other:?}"),
    }
}
