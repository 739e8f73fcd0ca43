mod common;

use std::time::Duration;

use anyhow::Result;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{with_session, TestServer};

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn png(len: usize) -> Vec<u8> {
    let mut bytes = PNG_MAGIC.to_vec();
    bytes.resize(len.max(PNG_MAGIC.len()), 0xAB);
    bytes
}

fn file_form(bytes: Vec<u8>, mime: &str) -> Result<Form> {
    let part = Part::bytes(bytes).file_name("upload.bin").mime_str(mime)?;
    Ok(Form::new().part("file", part))
}

async fn product(server: &TestServer, cookie: &str) -> Result<String> {
    let res = with_session(server.post("/products"), cookie)
        .json(&json!({ "name": "Mug", "price_cents": 100 }))
        .send()
        .await?;
    let body = common::json_body(res, true).await?;
    Ok(body["data"]["id"].as_str().expect("id").to_string())
}

#[tokio::test]
async fn png_round_trip() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;
    let id = product(&server, &cookie).await?;
    let path = format!("/products/{}/image", id);
    let bytes = png(4096);

    let res = with_session(server.post(&path), &cookie)
        .multipart(file_form(bytes.clone(), "image/png")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let meta = common::json_body(res, true).await?["data"].clone();
    assert_eq!(meta["product_id"], id);
    assert_eq!(meta["bytes_size"], 4096);
    assert_eq!(meta["content_type"], "image/png");

    let res = server.get(&path).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "image/png");
    assert_eq!(res.headers()["content-length"], "4096");
    assert_eq!(res.bytes().await?.as_ref(), bytes.as_slice());
    Ok(())
}

#[tokio::test]
async fn upload_replaces_previous_image() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;
    let id = product(&server, &cookie).await?;
    let path = format!("/products/{}/image", id);

    let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    for form in [file_form(png(64), "image/png")?, file_form(jpeg.clone(), "image/jpeg")?] {
        let res = with_session(server.post(&path), &cookie).multipart(form).send().await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = server.get(&path).send().await?;
    assert_eq!(res.headers()["content-type"], "image/jpeg");
    assert_eq!(res.bytes().await?.as_ref(), jpeg.as_slice());
    Ok(())
}

#[tokio::test]
async fn oversized_upload_is_413_and_stores_nothing() -> Result<()> {
    let mut config = common::test_config();
    config.api.max_image_bytes = 1024;
    let server = common::spawn_with(config, None).await?;
    let cookie = server.admin_session().await?;
    let id = product(&server, &cookie).await?;
    let path = format!("/products/{}/image", id);

    let res = with_session(server.post(&path), &cookie)
        .multipart(file_form(png(2048), "image/png")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    common::json_body(res, false).await?;

    let res = server.get(&path).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn bad_uploads_are_rejected() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;
    let id = product(&server, &cookie).await?;
    let path = format!("/products/{}/image", id);

    // declared type must be an image
    let res = with_session(server.post(&path), &cookie)
        .multipart(file_form(b"hello".to_vec(), "text/plain")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // no file field
    let form = Form::new().text("caption", "mug");
    let res = with_session(server.post(&path), &cookie).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // empty file
    let res = with_session(server.post(&path), &cookie)
        .multipart(file_form(Vec::new(), "image/png")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // unknown product
    let res = with_session(server.post("/products/123e4567-e89b-12d3-a456-426614174000/image"), &cookie)
        .multipart(file_form(png(64), "image/png")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // no session
    let res = server.post(&path).multipart(file_form(png(64), "image/png")?).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn non_multipart_body_keeps_the_envelope() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;
    let id = product(&server, &cookie).await?;
    let path = format!("/products/{}/image", id);

    let res = with_session(server.post(&path), &cookie)
        .json(&json!({ "file": "not an upload" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::json_body(res, false).await?;
    assert!(body["error"].is_string());

    assert!(server.db.product_images().get(Uuid::parse_str(&id)?).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn slow_upload_times_out_and_stores_nothing() -> Result<()> {
    let mut config = common::test_config();
    config.api.upload_timeout_secs = 1;
    let server = common::spawn_with(config, None).await?;
    let cookie = server.admin_session().await?;
    let id = product(&server, &cookie).await?;
    let path = format!("/products/{}/image", id);

    let boundary = "storefront-slow-upload";
    let file = png(4096);
    let mut head = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"slow.png\"\r\nContent-Type: image/png\r\n\r\n",
        b = boundary
    )
    .into_bytes();
    head.extend_from_slice(&file[..1024]);
    let mut tail = file[1024..].to_vec();
    tail.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    // the second chunk arrives well after the upload budget
    let chunks = vec![(Duration::ZERO, head), (Duration::from_secs(2), tail)];
    let stream = futures::stream::iter(chunks).then(|(delay, chunk)| async move {
        tokio::time::sleep(delay).await;
        Ok::<_, std::io::Error>(chunk)
    });

    let res = with_session(server.post(&path), &cookie)
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(reqwest::Body::wrap_stream(stream))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = common::json_body(res, false).await?;
    assert!(body["error"].is_string());

    assert!(server.db.product_images().get(Uuid::parse_str(&id)?).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn delete_image_and_cascade() -> Result<()> {
    let server = common::spawn().await?;
    let cookie = server.admin_session().await?;
    let id = product(&server, &cookie).await?;
    let path = format!("/products/{}/image", id);

    let res = with_session(server.delete(&path), &cookie).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    with_session(server.post(&path), &cookie)
        .multipart(file_form(png(64), "image/png")?)
        .send()
        .await?;
    let res = with_session(server.delete(&path), &cookie).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(server.get(&path).send().await?.status(), StatusCode::NOT_FOUND);

    with_session(server.post(&path), &cookie)
        .multipart(file_form(png(64), "image/png")?)
        .send()
        .await?;
    with_session(server.delete(&format!("/products/{}", id)), &cookie).send().await?;
    assert_eq!(server.get(&path).send().await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}
