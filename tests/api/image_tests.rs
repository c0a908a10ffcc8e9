//! Cached image serving tests.

use actix_web::http::StatusCode;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::test;
use serde_json::{Value, json};

use crate::helpers::{
    FakeStore, PNG_B64, as_admin, assert_error, assert_ok, create_test_app, create_test_pool,
    create_uploader, post_json,
};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Upload through a failing store so the bytes land in the cache; returns the cache key.
async fn upload_to_cache<S, B>(app: &S) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let body = post_json(
        app,
        "/upload",
        as_admin(json!({"action": "upload", "filename": "dot.png", "file": PNG_B64})),
    )
    .await;
    let body = assert_ok(body);
    assert_eq!(body["data"]["storageType"], "memory");
    format!("/uploads/{}", body["data"]["path"].as_str().unwrap())
}

#[actix_rt::test]
async fn test_get_image_bytes() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(Some(FakeStore::failing()))).await;
    let key = upload_to_cache(&app).await;

    let req = test::TestRequest::get()
        .uri(&format!("/get-image?key={}", key))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(CONTENT_TYPE).unwrap(), "image/png");
    assert!(resp.headers().contains_key(CACHE_CONTROL));
    let bytes = test::read_body(resp).await;
    assert_eq!(bytes.as_ref(), PNG_SIGNATURE);
}

#[actix_rt::test]
async fn test_get_image_as_json() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    let key = upload_to_cache(&app).await;

    let req = test::TestRequest::get()
        .uri(&format!("/get-image?key={}", key))
        .insert_header(("Accept", "application/json"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let body = assert_ok(body);
    assert_eq!(body["data"]["content"], PNG_B64);
    assert_eq!(body["data"]["mime"], "image/png");
    assert!(body["data"]["html"].as_str().unwrap().starts_with("<img"));
}

#[actix_rt::test]
async fn test_get_image_errors() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let req = test::TestRequest::get().uri("/get-image").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_error(&body, "缺少图片标识符");

    let req = test::TestRequest::get()
        .uri("/get-image?key=/uploads/images/missing.png")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_error(&body, "图片不存在或已过期");
}

#[actix_rt::test]
async fn test_deleted_upload_leaves_cache() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    let key = upload_to_cache(&app).await;

    let body = assert_ok(post_json(&app, "/upload", as_admin(json!({"action": "list"}))).await);
    let id = body["data"][0]["id"].as_str().unwrap().to_string();
    assert_ok(post_json(&app, "/upload", as_admin(json!({"action": "delete", "id": id}))).await);

    let req = test::TestRequest::get()
        .uri(&format!("/get-image?key={}", key))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_error(&body, "图片不存在或已过期");
}
