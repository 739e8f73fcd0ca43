mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::with_session;

#[tokio::test]
async fn branch_lifecycle() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;

    let res = with_session(server.post("/api/branches"), &cookie)
        .json(&json!({ "name": "Centro", "address": "Av. Juárez 1", "phone": "+52 55 1234 5678" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let branch = common::json_body(res, true).await?["data"].clone();
    assert_eq!(branch["is_active"], 1);
    let path = format!("/branches/{}", branch["id"].as_str().expect("id"));

    let res = with_session(server.put(&path), &cookie).json(&json!({ "is_active": 0 })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = common::json_body(res, true).await?["data"].clone();
    assert_eq!(updated["is_active"], 0);
    assert_eq!(updated["address"], "Av. Juárez 1");

    let active = common::json_body(server.get("/branches?active=true").send().await?, true).await?;
    assert_eq!(active["data"].as_array().map(Vec::len), Some(0));
    let all = common::json_body(server.get("/branches").send().await?, true).await?;
    assert_eq!(all["data"].as_array().map(Vec::len), Some(1));

    let res = with_session(server.delete(&path), &cookie).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let res = server.get(&path).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn phone_and_name_are_checked() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;

    let res = with_session(server.post("/branches"), &cookie)
        .json(&json!({ "name": "Centro", "phone": "not a phone" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = with_session(server.post("/branches"), &cookie).json(&json!({ "name": "" })).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.post("/branches").json(&json!({ "name": "Centro" })).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
