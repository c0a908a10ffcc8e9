//! Guestbook and moderation endpoint tests.

use actix_web::test;
use serde_json::{Value, json};

use crate::helpers::{
    as_admin, assert_error, assert_ok, create_article, create_message, create_test_app,
    create_test_pool, create_uploader, post_json,
};

#[actix_rt::test]
async fn test_connectivity_action() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let body = assert_ok(post_json(&app, "/message", json!({"action": "test"})).await);
    assert_eq!(body["msg"], "API连接成功");
    assert!(body["data"]["time"].is_string());
}

#[actix_rt::test]
async fn test_submitted_message_is_pending() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    // A client-supplied status is ignored
    let req = test::TestRequest::post()
        .uri("/message")
        .insert_header(("X-Real-IP", "203.0.113.7"))
        .set_json(json!({
            "action": "add",
            "content": "  Nice blog!  ",
            "nickname": "amy",
            "status": 1,
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let body = assert_ok(body);
    assert_eq!(body["msg"], "留言提交成功，等待审核！");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let body = assert_ok(
        post_json(&app, "/message-admin", as_admin(json!({"action": "detail", "id": id}))).await,
    );
    assert_eq!(body["data"]["status"], 0);
    assert_eq!(body["data"]["content"], "Nice blog!");
    assert_eq!(body["data"]["ip"], "203.0.113.7");
    assert_eq!(body["data"]["email"], "");
}

#[actix_rt::test]
async fn test_submission_requires_content_and_nickname() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let body = post_json(
        &app,
        "/message",
        json!({"action": "add", "content": "   ", "nickname": "amy"}),
    )
    .await;
    assert_error(&body, "留言内容不能为空");

    let body = post_json(&app, "/message", json!({"action": "add", "content": "hi"})).await;
    assert_error(&body, "昵称不能为空");
}

#[actix_rt::test]
async fn test_malformed_article_reference_is_dropped() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let body = post_json(
        &app,
        "/message",
        json!({"action": "add", "content": "hi", "nickname": "amy", "articleId": "nope"}),
    )
    .await;
    let id = assert_ok(body)["data"]["id"].as_str().unwrap().to_string();

    let body = assert_ok(
        post_json(&app, "/message-admin", as_admin(json!({"action": "detail", "id": id}))).await,
    );
    assert!(body["data"]["articleId"].is_null());
}

#[actix_rt::test]
async fn test_public_list_hides_private_fields() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    create_message(&app, "first").await;
    create_message(&app, "second").await;

    let body = assert_ok(post_json(&app, "/message", json!({"action": "list"})).await);
    let list = body["data"]["list"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    for item in list {
        assert!(item.get("email").is_none(), "email leaked: {}", item);
        assert!(item.get("ip").is_none(), "ip leaked: {}", item);
        assert_eq!(item["nickname"], "visitor");
    }
    assert_eq!(body["data"]["pagination"]["pages"], 1);

    // The admin list carries them
    let body =
        assert_ok(post_json(&app, "/message-admin", as_admin(json!({"action": "list"}))).await);
    assert_eq!(body["data"]["list"][0]["email"], "visitor@example.com");
}

#[actix_rt::test]
async fn test_list_filters() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    let article = create_article(&app, "Post", None, &[]).await;

    let body = post_json(
        &app,
        "/message",
        json!({"action": "add", "content": "on post", "nickname": "amy", "articleId": article}),
    )
    .await;
    let on_post = assert_ok(body)["data"]["id"].as_str().unwrap().to_string();
    create_message(&app, "general").await;

    post_json(
        &app,
        "/message-admin",
        as_admin(json!({"action": "approve", "id": on_post})),
    )
    .await;

    let body = assert_ok(
        post_json(&app, "/message", json!({"action": "list", "articleId": article})).await,
    );
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["list"][0]["content"], "on post");

    let body =
        assert_ok(post_json(&app, "/message", json!({"action": "list", "status": 1})).await);
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let body =
        assert_ok(post_json(&app, "/message", json!({"action": "list", "status": 0})).await);
    assert_eq!(body["data"]["list"][0]["content"], "general");

    let body = post_json(&app, "/message", json!({"action": "list", "status": 9})).await;
    assert_error(&body, "状态参数错误");
}

#[actix_rt::test]
async fn test_approve_and_reject() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    let approved = create_message(&app, "good").await;
    let rejected = create_message(&app, "spam").await;

    let body = assert_ok(
        post_json(
            &app,
            "/message-admin",
            as_admin(json!({"action": "approve", "id": approved})),
        )
        .await,
    );
    assert_eq!(body["msg"], "审核通过成功");
    assert_eq!(body["data"]["status"], 1);
    assert!(body["data"]["approvedAt"].is_string());

    let body = assert_ok(
        post_json(
            &app,
            "/message-admin",
            as_admin(json!({"action": "reject", "id": rejected})),
        )
        .await,
    );
    assert_eq!(body["data"]["status"], 2);
    assert!(body["data"]["rejectedAt"].is_string());

    // Decisions are final for approve and reject
    let body = post_json(
        &app,
        "/message-admin",
        as_admin(json!({"action": "approve", "id": rejected})),
    )
    .await;
    assert_error(&body, "留言已被处理");

    let body = post_json(
        &app,
        "/message-admin",
        as_admin(json!({"action": "reject", "id": approved})),
    )
    .await;
    assert_error(&body, "留言已被处理");
}

#[actix_rt::test]
async fn test_reply_publishes_rejected_message() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    let id = create_message(&app, "question").await;

    post_json(&app, "/message-admin", as_admin(json!({"action": "reject", "id": id}))).await;

    let body = post_json(
        &app,
        "/message-admin",
        as_admin(json!({"action": "reply", "id": id, "replyContent": "   "})),
    )
    .await;
    assert_error(&body, "回复内容不能为空");

    let body = assert_ok(
        post_json(
            &app,
            "/message-admin",
            as_admin(json!({"action": "reply", "id": id, "replyContent": "Thanks!"})),
        )
        .await,
    );
    assert_eq!(body["msg"], "回复留言成功");
    assert_eq!(body["data"]["status"], 1);
    assert_eq!(body["data"]["replyContent"], "Thanks!");
    assert!(body["data"]["replyTime"].is_string());

    let body =
        assert_ok(post_json(&app, "/message", json!({"action": "list", "status": 1})).await);
    assert_eq!(body["data"]["list"][0]["replyContent"], "Thanks!");
}

#[actix_rt::test]
async fn test_moderation_needs_credential() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    let id = create_message(&app, "pending").await;

    for action in ["approve", "reject", "delete", "list", "detail"] {
        let body = post_json(
            &app,
            "/message-admin",
            json!({"action": action, "id": id, "password": "wrong"}),
        )
        .await;
        assert_error(&body, "管理员密码错误");
    }

    let body = post_json(
        &app,
        "/message-admin",
        json!({"action": "reply", "id": id, "replyContent": "hi"}),
    )
    .await;
    assert_error(&body, "管理员密码错误");

    let body = assert_ok(
        post_json(&app, "/message-admin", as_admin(json!({"action": "detail", "id": id}))).await,
    );
    assert_eq!(body["data"]["status"], 0);
    assert!(body["data"]["replyContent"].is_null());
}

#[actix_rt::test]
async fn test_moderating_unknown_message() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;

    let ghost = uuid::Uuid::new_v4().to_string();
    let body = post_json(
        &app,
        "/message-admin",
        as_admin(json!({"action": "approve", "id": ghost})),
    )
    .await;
    assert_error(&body, "留言不存在");

    let body = post_json(&app, "/message-admin", as_admin(json!({"action": "approve"}))).await;
    assert_error(&body, "留言ID不能为空");
}

#[actix_rt::test]
async fn test_delete_message() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    let id = create_message(&app, "bye").await;

    let body = assert_ok(
        post_json(&app, "/message-admin", as_admin(json!({"action": "delete", "id": id}))).await,
    );
    assert_eq!(body["msg"], "删除留言成功");

    let body =
        post_json(&app, "/message-admin", as_admin(json!({"action": "detail", "id": id}))).await;
    assert_error(&body, "留言不存在");
}

#[actix_rt::test]
async fn test_list_with_huge_page_is_empty() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    create_message(&app, "hello").await;

    let body = assert_ok(
        post_json(&app, "/message", json!({"action": "list", "page": i64::MAX})).await,
    );
    assert!(body["data"]["list"].as_array().unwrap().is_empty());
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let body = assert_ok(
        post_json(
            &app,
            "/message-admin",
            as_admin(json!({"action": "list", "page": i64::MAX, "size": 100})),
        )
        .await,
    );
    assert!(body["data"]["list"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_bad_credential_wins_over_field_errors() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, create_uploader(None)).await;
    let id = create_message(&app, "pending").await;

    for body in [
        json!({"action": "approve", "id": 5, "password": "wrong"}),
        json!({"action": "reply", "id": id, "replyContent": 42, "password": "wrong"}),
        json!({"action": "list", "status": "pending"}),
    ] {
        let envelope = post_json(&app, "/message-admin", body).await;
        assert_error(&envelope, "管理员密码错误");
        assert!(envelope.get("detail").is_none());
    }

    let body = assert_ok(
        post_json(&app, "/message-admin", as_admin(json!({"action": "detail", "id": id}))).await,
    );
    assert_eq!(body["data"]["status"], 0);
}
