//! Upload endpoint tests.

use actix_web::http::StatusCode;
use actix_web::test;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use folio_lib::config::payload_limit;
use serde_json::json;

use crate::helpers::{
    FakeStore, PNG_B64, TEST_MAX_UPLOAD_SIZE, as_admin, assert_error, assert_ok, create_test_app,
    create_test_pool, create_uploader, post_json,
};

fn upload_body(filename: &str, file: &str) -> serde_json::Value {
    as_admin(json!({"action": "upload", "filename": filename, "file": file}))
}

#[actix_rt::test]
async fn test_non_image_never_reaches_storage() {
    let pool = create_test_pool().await;
    let store = FakeStore::working();
    let app = create_test_app(&pool, create_uploader(Some(store.clone()))).await;

    let body = post_json(&app, "/upload", upload_body("setup.exe", PNG_B64)).await;
    assert_error(&body, "只允许上传图片文件");
    assert_eq!(store.put_count(), 0);

    let body = assert_ok(post_json(&app, "/upload", as_admin(json!({"action": "list"}))).await);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_upload_requires_file_and_name() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let body = post_json(&app, "/upload", as_admin(json!({"action": "upload", "file": PNG_B64})))
        .await;
    assert_error(&body, "文件内容和文件名不能为空");

    let body = post_json(&app, "/upload", upload_body("a.png", "%%%not base64%%%")).await;
    assert_error(&body, "文件内容不是合法的Base64");
}

#[actix_rt::test]
async fn test_oversized_upload_is_rejected() {
    let pool = create_test_pool().await;
    let store = FakeStore::working();
    let app = create_test_app(&pool, create_uploader(Some(store.clone()))).await;

    let big = STANDARD.encode(vec![0u8; TEST_MAX_UPLOAD_SIZE + 1]);
    let body = post_json(&app, "/upload", upload_body("big.png", &big)).await;

    assert_error(&body, "文件过大");
    assert_eq!(store.put_count(), 0);
}

#[actix_rt::test]
async fn test_upload_to_cloud() {
    let pool = create_test_pool().await;
    let store = FakeStore::working();
    let app = create_test_app(&pool, create_uploader(Some(store.clone()))).await;

    let body = assert_ok(post_json(&app, "/upload", upload_body("Photo.PNG", PNG_B64)).await);
    assert_eq!(body["msg"], "上传成功");
    assert_eq!(body["data"]["storageType"], "cloud");

    let path = body["data"]["path"].as_str().unwrap();
    assert!(path.starts_with("images/"));
    assert!(path.ends_with(".png"));
    assert_eq!(body["data"]["url"], format!("https://cdn.test/{}", path));
    assert_eq!(store.put_count(), 1);
}

#[actix_rt::test]
async fn test_upload_falls_back_to_memory() {
    let pool = create_test_pool().await;
    let store = FakeStore::failing();
    let app = create_test_app(&pool, create_uploader(Some(store.clone()))).await;

    let body = assert_ok(
        post_json(
            &app,
            "/upload",
            upload_body("cat.png", &format!("data:image/png;base64,{}", PNG_B64)),
        )
        .await,
    );
    assert_eq!(body["data"]["storageType"], "memory");
    assert_eq!(
        body["data"]["url"],
        format!("data:image/png;base64,{}", PNG_B64)
    );
    assert_eq!(store.put_count(), 1);

    let body = assert_ok(post_json(&app, "/upload", as_admin(json!({"action": "list"}))).await);
    let records = body["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["originalName"], "cat.png");
    assert_eq!(records[0]["storageType"], "memory");
    assert_eq!(records[0]["size"], 8);
}

#[actix_rt::test]
async fn test_delete_upload() {
    let pool = create_test_pool().await;
    let store = FakeStore::working();
    let uploader = create_uploader(Some(store.clone()));
    let app = create_test_app(&pool, uploader).await;

    assert_ok(post_json(&app, "/upload", upload_body("a.png", PNG_B64)).await);
    let body = assert_ok(post_json(&app, "/upload", as_admin(json!({"action": "list"}))).await);
    let id = body["data"][0]["id"].as_str().unwrap().to_string();

    let body = assert_ok(
        post_json(&app, "/upload", as_admin(json!({"action": "delete", "id": id}))).await,
    );
    assert_eq!(body["msg"], "文件删除成功");
    assert_eq!(store.delete_count(), 1);

    let body = post_json(&app, "/upload", as_admin(json!({"action": "delete", "id": id}))).await;
    assert_error(&body, "文件不存在");
}

#[actix_rt::test]
async fn test_upload_actions_need_credential() {
    let pool = create_test_pool().await;
    let store = FakeStore::working();
    let app = create_test_app(&pool, create_uploader(Some(store.clone()))).await;

    let body = post_json(
        &app,
        "/upload",
        json!({"action": "upload", "filename": "a.png", "file": PNG_B64}),
    )
    .await;
    assert_error(&body, "管理员密码错误");

    let body = post_json(&app, "/upload", json!({"action": "list", "password": "nope"})).await;
    assert_error(&body, "管理员密码错误");

    assert_eq!(store.put_count(), 0);
}

#[actix_rt::test]
async fn test_body_over_limit_is_an_envelope() {
    let pool = create_test_pool().await;
    let store = FakeStore::working();
    let app = create_test_app(&pool, create_uploader(Some(store.clone()))).await;

    let big = "A".repeat(payload_limit(TEST_MAX_UPLOAD_SIZE) * 2);
    let req = test::TestRequest::post()
        .uri("/upload")
        .set_json(upload_body("huge.png", &big))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_error(&body, "文件过大");
    assert_eq!(store.put_count(), 0);
}

#[actix_rt::test]
async fn test_bad_credential_wins_over_field_errors() {
    let pool = create_test_pool().await;
    let store = FakeStore::working();
    let app = create_test_app(&pool, create_uploader(Some(store.clone()))).await;

    let body = post_json(
        &app,
        "/upload",
        json!({"action": "upload", "file": 1, "filename": ["a.png"], "password": "wrong"}),
    )
    .await;
    assert_error(&body, "管理员密码错误");
    assert!(body.get("detail").is_none());

    let body = post_json(&app, "/upload", json!({"action": "delete", "id": 7})).await;
    assert_error(&body, "管理员密码错误");
    assert_eq!(store.put_count(), 0);
}
