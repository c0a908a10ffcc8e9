//! Article endpoint tests.

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

use crate::helpers::{
    TEST_ADMIN_PASSWORD, as_admin, assert_error, assert_ok, create_article, create_test_app,
    create_test_pool, create_uploader, post_json,
};

#[actix_rt::test]
async fn test_preflight_returns_no_content() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/article")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn test_malformed_body_is_rejected() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let req = test::TestRequest::post()
        .uri("/article")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_error(&body, "请求体格式错误");
}

#[actix_rt::test]
async fn test_missing_and_unknown_action() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let body = post_json(&app, "/article", json!({"id": "x"})).await;
    assert_error(&body, "缺少action参数");

    let body = post_json(&app, "/article", json!({"action": "publish"})).await;
    assert_error(&body, "未知操作类型");
}

#[actix_rt::test]
async fn test_add_then_get_counts_views() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let id = create_article(&app, "Hello", Some("tech"), &["rust", "web"]).await;

    let body = assert_ok(post_json(&app, "/article", json!({"action": "get", "id": id})).await);
    assert_eq!(body["data"]["title"], "Hello");
    assert_eq!(body["data"]["tags"], json!(["rust", "web"]));
    assert_eq!(body["data"]["views"], 1);

    let body = assert_ok(post_json(&app, "/article", json!({"action": "get", "id": id})).await);
    assert_eq!(body["data"]["views"], 2);
}

#[actix_rt::test]
async fn test_get_unknown_article() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let body = post_json(
        &app,
        "/article",
        json!({"action": "get", "id": uuid::Uuid::new_v4().to_string()}),
    )
    .await;
    assert_error(&body, "文章不存在");

    let body = post_json(&app, "/article", json!({"action": "get", "id": "not-a-uuid"})).await;
    assert_error(&body, "文章不存在");

    let body = post_json(&app, "/article", json!({"action": "get"})).await;
    assert_error(&body, "文章ID不能为空");
}

#[actix_rt::test]
async fn test_list_pagination() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    for i in 0..5 {
        create_article(&app, &format!("Post {}", i), None, &[]).await;
    }

    let body = assert_ok(
        post_json(&app, "/article", json!({"action": "list", "page": 1, "size": 2})).await,
    );
    let pagination = &body["data"]["pagination"];
    assert_eq!(pagination["total"], 5);
    assert_eq!(pagination["size"], 2);
    assert_eq!(pagination["pages"], 3);
    assert_eq!(body["data"]["list"].as_array().unwrap().len(), 2);
    // Newest first
    assert_eq!(body["data"]["list"][0]["title"], "Post 4");

    let body = assert_ok(
        post_json(&app, "/article", json!({"action": "list", "page": 3, "size": 2})).await,
    );
    assert_eq!(body["data"]["list"].as_array().unwrap().len(), 1);

    let body = assert_ok(
        post_json(&app, "/article", json!({"action": "list", "page": 9, "size": 2})).await,
    );
    assert!(body["data"]["list"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_list_filters_by_category_and_tag() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    create_article(&app, "Rust notes", Some("tech"), &["rust"]).await;
    create_article(&app, "Travel", Some("life"), &["photo"]).await;
    create_article(&app, "Async Rust", Some("tech"), &["rust", "async"]).await;

    let body = assert_ok(
        post_json(&app, "/article", json!({"action": "list", "category": "tech"})).await,
    );
    assert_eq!(body["data"]["pagination"]["total"], 2);

    let body =
        assert_ok(post_json(&app, "/article", json!({"action": "list", "tag": "photo"})).await);
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["list"][0]["title"], "Travel");
}

#[actix_rt::test]
async fn test_list_shows_excerpts() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let long = "x".repeat(500);
    let body = post_json(
        &app,
        "/article",
        as_admin(json!({"action": "add", "article": {"title": "Long", "content": long}})),
    )
    .await;
    let id = assert_ok(body)["data"]["id"].as_str().unwrap().to_string();

    let body = assert_ok(post_json(&app, "/article", json!({"action": "list"})).await);
    let excerpt = body["data"]["list"][0]["content"].as_str().unwrap();
    assert!(excerpt.ends_with("..."));
    assert!(excerpt.len() < 500);

    let body = assert_ok(post_json(&app, "/article", json!({"action": "get", "id": id})).await);
    assert_eq!(body["data"]["content"].as_str().unwrap().len(), 500);
}

#[actix_rt::test]
async fn test_add_requires_title_and_content() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let body = post_json(
        &app,
        "/article",
        as_admin(json!({"action": "add", "article": {"title": "Only title"}})),
    )
    .await;
    assert_error(&body, "标题和内容不能为空");
}

#[actix_rt::test]
async fn test_admin_actions_need_credential() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    let id = create_article(&app, "Keep me", None, &[]).await;

    let body = post_json(
        &app,
        "/article",
        json!({"action": "add", "password": "wrong", "article": {"title": "T", "content": "C"}}),
    )
    .await;
    assert_error(&body, "管理员密码错误");

    let body = post_json(
        &app,
        "/article",
        json!({"action": "update", "id": id, "article": {"title": "Changed"}}),
    )
    .await;
    assert_error(&body, "管理员密码错误");

    let body = post_json(
        &app,
        "/article",
        json!({"action": "delete", "id": id, "password": "wrong"}),
    )
    .await;
    assert_error(&body, "管理员密码错误");

    // Nothing changed
    let body = assert_ok(post_json(&app, "/article", json!({"action": "list"})).await);
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["list"][0]["title"], "Keep me");
}

#[actix_rt::test]
async fn test_admin_key_header_is_accepted() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let req = test::TestRequest::post()
        .uri("/article")
        .insert_header(("X-Admin-Key", TEST_ADMIN_PASSWORD))
        .set_json(json!({"action": "add", "article": {"title": "T", "content": "C"}}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_ok(body);
}

#[actix_rt::test]
async fn test_update_article() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    let id = create_article(&app, "Draft", Some("tech"), &["a", "b"]).await;

    let body = post_json(
        &app,
        "/article",
        as_admin(json!({
            "action": "update",
            "id": id,
            "article": {"title": "Final", "tags": ["c"]}
        })),
    )
    .await;
    let body = assert_ok(body);
    assert_eq!(body["msg"], "文章更新成功");
    assert_eq!(body["data"]["title"], "Final");
    assert_eq!(body["data"]["content"], "Body of Draft");
    assert_eq!(body["data"]["category"], "tech");
    assert_eq!(body["data"]["tags"], json!(["c"]));

    // A patch without title or content is refused
    let body = post_json(
        &app,
        "/article",
        as_admin(json!({"action": "update", "id": id, "article": {"category": "life"}})),
    )
    .await;
    assert_error(&body, "更新内容不能为空");

    let body = post_json(
        &app,
        "/article",
        as_admin(json!({
            "action": "update",
            "id": uuid::Uuid::new_v4().to_string(),
            "article": {"title": "Ghost"}
        })),
    )
    .await;
    assert_error(&body, "文章不存在");
}

#[actix_rt::test]
async fn test_delete_article() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    let id = create_article(&app, "Short lived", None, &["tmp"]).await;

    let body = post_json(&app, "/article", as_admin(json!({"action": "delete", "id": id}))).await;
    assert_eq!(assert_ok(body)["msg"], "文章删除成功");

    let body = post_json(&app, "/article", json!({"action": "get", "id": id})).await;
    assert_error(&body, "文章不存在");

    let body = post_json(&app, "/article", as_admin(json!({"action": "delete", "id": id}))).await;
    assert_error(&body, "文章不存在");

    let body =
        assert_ok(post_json(&app, "/article", json!({"action": "list", "tag": "tmp"})).await);
    assert_eq!(body["data"]["pagination"]["total"], 0);
}

#[actix_rt::test]
async fn test_list_with_huge_page_is_empty() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    create_article(&app, "Only", None, &[]).await;

    let body = assert_ok(
        post_json(&app, "/article", json!({"action": "list", "page": i64::MAX, "size": 100}))
            .await,
    );
    assert!(body["data"]["list"].as_array().unwrap().is_empty());
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let body = assert_ok(
        post_json(
            &app,
            "/article",
            json!({"action": "list", "page": 100_000_000_000_000_000_i64, "size": 100}),
        )
        .await,
    );
    assert!(body["data"]["list"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_bad_credential_wins_over_field_errors() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let body = post_json(
        &app,
        "/article",
        json!({"action": "update", "id": 5, "password": "wrong"}),
    )
    .await;
    assert_error(&body, "管理员密码错误");
    assert!(body.get("detail").is_none());

    let body = post_json(
        &app,
        "/article",
        json!({"action": "add", "article": "not an object"}),
    )
    .await;
    assert_error(&body, "管理员密码错误");

    // With the right credential the field error surfaces
    let body = post_json(&app, "/article", as_admin(json!({"action": "update", "id": 5}))).await;
    assert_error(&body, "请求参数错误");
}

#[actix_rt::test]
async fn test_oversized_body_is_an_envelope() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let limit = folio_lib::config::payload_limit(crate::helpers::TEST_MAX_UPLOAD_SIZE);
    let title = "x".repeat(limit * 2);
    let req = test::TestRequest::post()
        .uri("/article")
        .set_json(as_admin(json!({
            "action": "add",
            "article": {"title": title, "content": "c"}
        })))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_error(&body, "文件过大");

    let body = assert_ok(post_json(&app, "/article", json!({"action": "list"})).await);
    assert_eq!(body["data"]["pagination"]["total"], 0);
}
