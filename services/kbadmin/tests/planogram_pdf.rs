mod common;

use axum::http::{StatusCode, header};
use common::{TestApp, UPLOAD_LIMIT, app, login, read_bytes, read_json};
use http_helpers::{get_request, multipart_body, multipart_request};
use serde_json::Value;
use tower::ServiceExt;

fn fake_pdf(seed: u8, len: usize) -> Vec<u8> {
    let mut bytes = b"%PDF-1.4\n".to_vec();
    bytes.extend((0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)));
    bytes.extend_from_slice(b"\n%%EOF");
    bytes
}

async fn upload(app: &TestApp, cookie: &str, name: &str, pdf: &[u8]) -> (StatusCode, Value) {
    let body = multipart_body(&[("planogramName", name)], Some(pdf));
    let response = app
        .clone()
        .oneshot(multipart_request(cookie, body))
        .await
        .expect("upload");
    let status = response.status();
    (status, read_json(response).await)
}

#[tokio::test]
async fn uploaded_pdf_streams_back_byte_identical() {
    let app = app();
    let cookie = login(&app).await;
    let pdf = fake_pdf(3, 4096);

    let (status, body) = upload(&app, &cookie, "Soda aisle", &pdf).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["planogram"]["dbStatus"], 1);
    let planogram_id = body["planogram"]["dbKey"].as_i64().expect("planogram id");
    let pdf_id = body["pdfId"].as_i64().expect("pdf id");

    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/dsplanogram/view_pdf/{pdf_id}"),
            &cookie,
        ))
        .await
        .expect("view");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).expect("type"),
        "application/pdf"
    );
    assert!(
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .expect("disposition")
            .starts_with("inline")
    );
    assert_eq!(read_bytes(response).await, pdf);

    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/dsplanogram/pdf_for/{planogram_id}"),
            &cookie,
        ))
        .await
        .expect("pdf for");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_bytes(response).await, pdf);

    let listing = app
        .clone()
        .oneshot(get_request("/dsplanogram", &cookie))
        .await
        .expect("list");
    let listing = read_json(listing).await;
    assert_eq!(listing["planograms"][0]["pdfId"], pdf_id);
}

#[tokio::test]
async fn concurrent_uploads_keep_their_own_pdf() {
    let app = app();
    let cookie = login(&app).await;

    let uploads = (0..6u8)
        .map(|seed| {
            let app = app.clone();
            let cookie = cookie.clone();
            tokio::spawn(async move {
                let pdf = fake_pdf(seed, 512 + seed as usize);
                let (status, body) = upload(&app, &cookie, &format!("Plan {seed}"), &pdf).await;
                assert_eq!(status, StatusCode::CREATED);
                let planogram_id = body["planogram"]["dbKey"].as_i64().expect("id");
                (planogram_id, pdf)
            })
        })
        .collect::<Vec<_>>();

    for handle in uploads {
        let (planogram_id, pdf) = handle.await.expect("join");
        let response = app
            .clone()
            .oneshot(get_request(
                &format!("/dsplanogram/pdf_for/{planogram_id}"),
                &cookie,
            ))
            .await
            .expect("pdf for");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_bytes(response).await, pdf);
    }
}

#[tokio::test]
async fn upload_without_a_file_is_rejected() {
    let app = app();
    let cookie = login(&app).await;

    let (status, body) = upload(&app, &cookie, "Empty", b"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Planogram name and PDF file are required");

    let body = multipart_body(&[("planogramName", "No file")], None);
    let response = app
        .clone()
        .oneshot(multipart_request(&cookie, body))
        .await
        .expect("upload");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let listing = app
        .clone()
        .oneshot(get_request("/dsplanogram", &cookie))
        .await
        .expect("list");
    let listing = read_json(listing).await;
    assert!(listing["planograms"].as_array().expect("list").is_empty());
}

#[tokio::test]
async fn oversize_upload_is_payload_too_large() {
    let app = app();
    let cookie = login(&app).await;
    let pdf = fake_pdf(1, UPLOAD_LIMIT * 2);

    let (status, body) = upload(&app, &cookie, "Huge", &pdf).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn deleting_a_planogram_removes_its_pdf() {
    let app = app();
    let cookie = login(&app).await;
    let (_, body) = upload(&app, &cookie, "Short lived", &fake_pdf(9, 64)).await;
    let planogram_id = body["planogram"]["dbKey"].as_i64().expect("id");
    let pdf_id = body["pdfId"].as_i64().expect("pdf id");

    let response = app
        .clone()
        .oneshot(http_helpers::json_request(
            "POST",
            "/dsplanogram/delete_planogram",
            &cookie,
            serde_json::json!({ "planogramId": planogram_id }),
        ))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/dsplanogram/view_pdf/{pdf_id}"),
            &cookie,
        ))
        .await
        .expect("view");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["message"], "PDF not found");
}

#[tokio::test]
async fn non_numeric_pdf_id_is_a_validation_error() {
    let app = app();
    let cookie = login(&app).await;
    let response = app
        .clone()
        .oneshot(get_request("/dsplanogram/view_pdf/abc", &cookie))
        .await
        .expect("view");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
