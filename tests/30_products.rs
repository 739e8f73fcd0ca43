mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::with_session;

async fn create(server: &common::TestServer, cookie: &str, body: Value) -> Result<Value> {
    let res = with_session(server.post("/products"), cookie).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(common::json_body(res, true).await?["data"].clone())
}

#[tokio::test]
async fn create_applies_defaults() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;

    let product = create(&server, &cookie, json!({ "name": "Mug", "price_cents": 12900 })).await?;
    assert_eq!(product["name"], "Mug");
    assert_eq!(product["price_cents"], 12900);
    assert_eq!(product["stock"], 0);
    assert_eq!(product["is_active"], 1);
    assert!(product["description"].is_null());

    let id = product["id"].as_str().expect("id");
    let res = server.get(&format!("/products/{}", id)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::json_body(res, true).await?["data"], product);
    Ok(())
}

#[tokio::test]
async fn writes_require_a_session() -> Result<()> {
    let server = common::spawn().await?;

    let res = server.post("/products").json(&json!({ "name": "Mug", "price_cents": 1 })).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    common::json_body(res, false).await?;

    let res = server.get("/products").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn active_filter_hides_inactive_products() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;

    create(&server, &cookie, json!({ "name": "Zeta", "price_cents": 100 })).await?;
    create(&server, &cookie, json!({ "name": "Alpha", "price_cents": 100 })).await?;
    create(&server, &cookie, json!({ "name": "Hidden", "price_cents": 100, "is_active": 0 })).await?;

    let all = common::json_body(server.get("/products").send().await?, true).await?;
    assert_eq!(all["data"].as_array().map(Vec::len), Some(3));

    let active = common::json_body(server.get("/products?active=true").send().await?, true).await?;
    let names: Vec<&str> = active["data"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Alpha", "Zeta"]);
    Ok(())
}

#[tokio::test]
async fn invalid_bodies_are_rejected() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;

    for body in [
        json!({ "name": "", "price_cents": 100 }),
        json!({ "name": "Mug", "price_cents": -1 }),
        json!({ "name": "Mug", "price_cents": 12.5 }),
        json!({ "name": "Mug", "price_cents": 100, "is_active": 2 }),
        json!({ "price_cents": 100 }),
    ] {
        let res = with_session(server.post("/products"), &cookie).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {}", body);
        common::json_body(res, false).await?;
    }

    let res = with_session(server.post("/products"), &cookie)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let oversized = json!({ "name": "Mug", "price_cents": 1, "description": "x".repeat(20 * 1024) });
    let res = with_session(server.post("/products"), &cookie).json(&oversized).send().await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    common::json_body(res, false).await?;
    Ok(())
}

#[tokio::test]
async fn body_past_the_framework_limit_keeps_the_envelope() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;

    // larger than the default body limit, so buffering itself fails
    let huge = json!({ "name": "Mug", "price_cents": 1, "description": "x".repeat(3 * 1024 * 1024) });
    let res = with_session(server.post("/products"), &cookie).json(&huge).send().await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = common::json_body(res, false).await?;
    assert!(body["error"].is_string());

    let res = with_session(server.put("/settings"), &cookie).json(&huge).send().await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    common::json_body(res, false).await?;
    Ok(())
}

#[tokio::test]
async fn update_patches_only_given_fields() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;
    let product = create(
        &server,
        &cookie,
        json!({ "name": "Mug", "description": "Blue", "price_cents": 100, "stock": 4 }),
    )
    .await?;
    let path = format!("/products/{}", product["id"].as_str().expect("id"));

    let res = with_session(server.put(&path), &cookie).json(&json!({ "stock": 9 })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = common::json_body(res, true).await?["data"].clone();
    assert_eq!(updated["stock"], 9);
    assert_eq!(updated["name"], "Mug");
    assert_eq!(updated["description"], "Blue");

    let res = with_session(server.put(&path), &cookie).json(&json!({ "description": null })).send().await?;
    let updated = common::json_body(res, true).await?["data"].clone();
    assert!(updated["description"].is_null());

    let res = with_session(server.put(&path), &cookie).json(&json!({ "name": null })).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unknown_and_malformed_ids() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;
    let missing = "123e4567-e89b-12d3-a456-426614174000";

    let res = server.get(&format!("/products/{}", missing)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.get("/products/not-a-uuid").send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = with_session(server.put(&format!("/products/{}", missing)), &cookie)
        .json(&json!({ "stock": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = with_session(server.delete(&format!("/products/{}", missing)), &cookie).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_returns_a_message() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;
    let product = create(&server, &cookie, json!({ "name": "Mug", "price_cents": 100 })).await?;
    let path = format!("/products/{}", product["id"].as_str().expect("id"));

    let res = with_session(server.delete(&path), &cookie).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::json_body(res, true).await?;
    assert!(body["message"].is_string());

    let res = server.get(&path).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
