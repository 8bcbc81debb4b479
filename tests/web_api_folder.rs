//! Web API Folder Tests
//!
//! Integration tests for the folder hierarchy endpoints.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{json, Value};

use common::{bearer, TestContext};

#[tokio::test]
async fn test_create_folder_paths() {
    let ctx = TestContext::new().await;
    let token = ctx.signed_in_user("ada@example.com").await;

    let response = ctx
        .server
        .post("/api/folders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "Docs" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Docs");
    assert_eq!(body["data"]["path"], "/Docs");
    assert!(body["data"]["parentFolder"].is_null());

    let docs_id = body["data"]["id"].as_i64().unwrap();
    let response = ctx
        .server
        .post("/api/folders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "2024", "parentFolder": docs_id }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["path"], "/Docs/2024");
    assert_eq!(body["data"]["parentFolder"], docs_id);
}

#[tokio::test]
async fn test_create_folder_parent_as_string() {
    let ctx = TestContext::new().await;
    let token = ctx.signed_in_user("ada@example.com").await;

    // Empty string means the root, as in form fields and query strings
    let response = ctx
        .server
        .post("/api/folders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "Docs", "parentFolder": "" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["path"], "/Docs");
    assert!(body["data"]["parentFolder"].is_null());

    let docs_id = body["data"]["id"].as_i64().unwrap();
    let response = ctx
        .server
        .post("/api/folders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "2024", "parentFolder": docs_id.to_string() }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["path"], "/Docs/2024");
    assert_eq!(body["data"]["parentFolder"], docs_id);

    let response = ctx
        .server
        .post("/api/folders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "Other", "parentFolder": "not-an-id" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "Folder not found");
}

#[tokio::test]
async fn test_create_folder_duplicate_name() {
    let ctx = TestContext::new().await;
    let token = ctx.signed_in_user("ada@example.com").await;
    let docs = ctx.create_folder(&token, "Docs", None).await;

    let response = ctx
        .server
        .post("/api/folders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "Docs" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Folder with this name already exists");
    assert_eq!(body["code"], "DUPLICATE_NAME");

    // Same name under another parent is allowed
    ctx.create_folder(&token, "Docs", Some(docs)).await;
}

#[tokio::test]
async fn test_create_folder_validation() {
    let ctx = TestContext::new().await;
    let token = ctx.signed_in_user("ada@example.com").await;

    let response = ctx
        .server
        .post("/api/folders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = ctx
        .server
        .post("/api/folders")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "Docs", "parentFolder": 9999 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "Folder not found");
}

#[tokio::test]
async fn test_folder_routes_require_auth() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/api/folders")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    ctx.server
        .post("/api/folders")
        .json(&json!({ "name": "Docs" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_folders_by_parent() {
    let ctx = TestContext::new().await;
    let token = ctx.signed_in_user("ada@example.com").await;

    let a = ctx.create_folder(&token, "A", None).await;
    let b = ctx.create_folder(&token, "B", None).await;
    let inner = ctx.create_folder(&token, "Inner", Some(a)).await;

    let response = ctx
        .server
        .get("/api/folders")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["count"], 2);
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![b, a]);

    let response = ctx
        .server
        .get("/api/folders")
        .add_query_param("parent", a)
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], inner);
}

#[tokio::test]
async fn test_folder_contents() {
    let ctx = TestContext::new().await;
    let token = ctx.signed_in_user("ada@example.com").await;
    let docs = ctx.create_folder(&token, "Docs", None).await;
    ctx.create_folder(&token, "Inner", Some(docs)).await;

    let form = MultipartForm::new()
        .add_text("parentFolder", docs.to_string())
        .add_part(
            "file",
            Part::bytes(b"hello".to_vec())
                .file_name("hello.txt")
                .mime_type("text/plain"),
        );
    ctx.server
        .post("/api/files/upload")
        .add_header(AUTHORIZATION, bearer(&token))
        .multipart(form)
        .await
        .assert_status(StatusCode::CREATED);

    let response = ctx
        .server
        .get(&format!("/api/folders/{docs}/contents"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["data"]["folder"]["id"], docs);
    assert_eq!(body["data"]["subfolders"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["subfolders"][0]["path"], "/Docs/Inner");
    assert_eq!(body["data"]["files"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["files"][0]["name"], "hello.txt");
}

#[tokio::test]
async fn test_delete_folder_must_be_empty() {
    let ctx = TestContext::new().await;
    let token = ctx.signed_in_user("ada@example.com").await;
    let docs = ctx.create_folder(&token, "Docs", None).await;
    let inner = ctx.create_folder(&token, "Inner", Some(docs)).await;

    let response = ctx
        .server
        .delete(&format!("/api/folders/{docs}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Folder is not empty. Delete contents first."
    );

    let response = ctx
        .server
        .delete(&format!("/api/folders/{inner}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "success": true, "data": {} }));

    ctx.server
        .delete(&format!("/api/folders/{docs}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    ctx.server
        .get(&format!("/api/folders/{docs}/contents"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_folders_are_private() {
    let ctx = TestContext::new().await;
    let ada = ctx.signed_in_user("ada@example.com").await;
    let bob = ctx.signed_in_user("bob@example.com").await;
    let docs = ctx.create_folder(&ada, "Docs", None).await;

    ctx.server
        .get(&format!("/api/folders/{docs}/contents"))
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.server
        .delete(&format!("/api/folders/{docs}"))
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Bob cannot nest into Ada's folder either
    let response = ctx
        .server
        .post("/api/folders")
        .add_header(AUTHORIZATION, bearer(&bob))
        .json(&json!({ "name": "Sneaky", "parentFolder": docs }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = ctx
        .server
        .get("/api/folders")
        .add_header(AUTHORIZATION, bearer(&bob))
        .await;
    assert_eq!(response.json::<Value>()["count"], 0);
}

#[tokio::test]
async fn test_malformed_folder_id_is_not_found() {
    let ctx = TestContext::new().await;
    let token = ctx.signed_in_user("ada@example.com").await;

    let response = ctx
        .server
        .get("/api/folders/not-a-number/contents")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "Folder not found");
}
