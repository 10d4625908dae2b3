use serde_json::{json, Value};

use crate::helpers::{email, TestApp};

#[tokio::test]
async fn create_returns_201_with_the_new_id() {
    let app = TestApp::spawn_app().await;

    let response = app.post_create(&json!({ "email": "reader@test.com" })).await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let entry = app.store.get(&email("reader@test.com")).await.unwrap();
    assert_eq!(body["id"], entry.id);
}

#[tokio::test]
async fn create_returns_409_for_a_known_email() {
    let app = TestApp::spawn_app().await;
    let body = json!({ "email": "reader@test.com" });

    app.post_create(&body).await;
    let response = app.post_create(&body).await;

    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn create_returns_400_when_body_is_not_valid() {
    let app = TestApp::spawn_app().await;

    // This is a common practice and it is called table-driven tests. In this case, it simulates different kind of possible request bodies
    // where API should return 400.
    let test_cases = vec![
        (json!({}), "missing email parameter"),
        (json!({ "email": "" }), "empty email"),
        (json!({ "email": "test.com" }), "invalid email parameter"),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = app.post_create(&invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
        let body: Value = response.json().await.unwrap();
        assert!(
            body["error"].is_string(),
            "The API did not answer with a JSON error when payload was {}",
            error_message
        );
    }
}

#[tokio::test]
async fn get_returns_the_entry_as_json() {
    let app = TestApp::spawn_app().await;
    app.post_create(&json!({ "email": "reader@test.com" })).await;

    let response = app.get_entry("reader@test.com").await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "reader@test.com");
    assert!(body["confirmed_at"].is_null());
    assert_eq!(body["opt_out"], false);
}

#[tokio::test]
async fn get_returns_404_for_an_unknown_email() {
    let app = TestApp::spawn_app().await;

    let response = app.get_entry("nobody@test.com").await;

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn update_confirms_and_returns_the_stored_entry() {
    let app = TestApp::spawn_app().await;
    app.post_create(&json!({ "email": "reader@test.com" })).await;

    let response = app
        .put_update(&json!({
            "email": "reader@test.com",
            "confirmed_at": "2023-11-14T22:13:20Z",
            "opt_out": false
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["confirmed_at"], "2023-11-14T22:13:20Z");
    assert_eq!(body["opt_out"], false);
}

#[tokio::test]
async fn update_inserts_an_unseen_email() {
    let app = TestApp::spawn_app().await;

    let response = app
        .put_update(&json!({ "email": "reader@test.com", "opt_out": false }))
        .await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(200, app.get_entry("reader@test.com").await.status().as_u16());
}

#[tokio::test]
async fn delete_opts_out_and_hides_from_batches() {
    let app = TestApp::spawn_app().await;
    app.post_create(&json!({ "email": "reader@test.com" })).await;

    let response = app.post_delete(&json!({ "email": "reader@test.com" })).await;

    assert_eq!(200, response.status().as_u16());
    let entry: Value = app.get_entry("reader@test.com").await.json().await.unwrap();
    assert_eq!(entry["opt_out"], true);
    let batch: Vec<Value> = app.get_batch("1", "10").await.json().await.unwrap();
    assert!(batch.is_empty());
}

#[tokio::test]
async fn delete_returns_404_for_an_unknown_email() {
    let app = TestApp::spawn_app().await;

    let response = app.post_delete(&json!({ "email": "nobody@test.com" })).await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn get_batch_returns_pages_in_creation_order() {
    let app = TestApp::spawn_app().await;
    for address in ["a@test.com", "b@test.com", "c@test.com"] {
        app.post_create(&json!({ "email": address })).await;
    }

    let first: Vec<Value> = app.get_batch("1", "2").await.json().await.unwrap();
    let second: Vec<Value> = app.get_batch("2", "2").await.json().await.unwrap();

    let emails = |page: &[Value]| {
        page.iter()
            .map(|entry| entry["email"].as_str().unwrap().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(emails(&first), vec!["a@test.com", "b@test.com"]);
    assert_eq!(emails(&second), vec!["c@test.com"]);
}

#[tokio::test]
async fn get_batch_returns_400_for_invalid_parameters() {
    let app = TestApp::spawn_app().await;

    let test_cases = vec![
        ("0", "2", "page zero"),
        ("1", "0", "count zero"),
        ("one", "2", "non numeric page"),
    ];

    for (page, count, error_message) in test_cases {
        let response = app.get_batch(page, count).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when query had {}",
            error_message
        );
        let body: Value = response.json().await.unwrap();
        assert!(
            body["error"].is_string(),
            "The API did not answer with a JSON error when query had {}",
            error_message
        );
    }
}
