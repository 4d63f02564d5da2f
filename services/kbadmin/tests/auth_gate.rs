mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{CountingStore, app, login, memory_store, read_json, state_with_store};
use http_helpers::{get_request, json_request, multipart_body, multipart_request};
use kbadmin::app::build_router;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

const PROTECTED_GETS: &[&str] = &[
    "/dsstore",
    "/get_store?storeId=1",
    "/dsproduct",
    "/get_product?upc=1",
    "/dsplanogram",
    "/get_planogram?planogramId=1",
    "/dsplanogram/view_pdf/1",
    "/dsplanogram/pdf_for/1",
    "/dsfloorplan",
    "/get_floor_plan?floorPlanId=1",
    "/dsposition",
    "/get_position?positionId=1",
    "/dscluster",
    "/get_cluster?clusterId=1",
    "/dsperformance",
    "/get_performance?performanceId=1",
    "/clstore?clusterId=1",
    "/stfloorplan?storeId=1",
    "/flplanogram?floorplanId=1",
    "/plproduct?planogramId=1",
];

const PROTECTED_POSTS: &[&str] = &[
    "/dsstore/add",
    "/dsstore/update_store",
    "/dsstore/delete_store",
    "/dsproduct/add",
    "/dsproduct/update_product",
    "/dsproduct/delete_product",
    "/dsplanogram/update_planogram",
    "/dsplanogram/delete_planogram",
    "/dsfloorplan/add",
    "/dsfloorplan/update_floor_plan",
    "/dsfloorplan/delete_floor_plan",
    "/dsposition/add",
    "/dsposition/update_position",
    "/dsposition/delete_position",
    "/dscluster/add",
    "/dscluster/update_cluster",
    "/dscluster/delete_cluster",
    "/dsperformance/add",
    "/dsperformance/update_performance",
    "/dsperformance/delete_performance",
    "/clstore/add_store",
    "/clstore/remove_store",
    "/stfloorplan/add_floorplan",
    "/stfloorplan/remove_floorplan",
    "/flplanogram/add_planogram",
    "/flplanogram/remove_planogram",
    "/plproduct/add_product",
    "/plproduct/remove_product",
];

fn login_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn protected_routes_reject_requests_without_a_session() {
    let store = Arc::new(CountingStore::new(memory_store()));
    let app = build_router(state_with_store(store.clone()));

    for uri in PROTECTED_GETS {
        let request = Request::builder()
            .uri(*uri)
            .body(Body::empty())
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("get");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body = read_json(response).await;
        assert_eq!(body["message"], "Missing credentials");
    }

    for uri in PROTECTED_POSTS {
        let request = Request::builder()
            .method("POST")
            .uri(*uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "storeId": 1, "clusterId": 1, "upc": "1" }).to_string(),
            ))
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("post");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let upload = multipart_body(&[("planogramName", "Soda")], Some(b"%PDF-1.4"));
    let response = app
        .clone()
        .oneshot(multipart_request("", upload))
        .await
        .expect("upload");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn forged_session_cookie_is_rejected() {
    let app = app();
    let response = app
        .clone()
        .oneshot(get_request(
            "/dsstore",
            "ckb_session=00112233445566778899aabbccddeeff",
        ))
        .await
        .expect("get");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_sets_http_only_cookie_and_redirects_home() {
    let app = app();
    let response = app
        .clone()
        .oneshot(login_request("username=analyst&password=secret"))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/dsstore"
    );
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("set-cookie")
        .to_string();
    assert!(set_cookie.starts_with("ckb_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(!set_cookie.contains("secret"));
}

#[tokio::test]
async fn rejected_credentials_do_not_start_a_session() {
    let app = app();
    let response = app
        .clone()
        .oneshot(login_request("username=analyst&password=wrong"))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = read_json(response).await;
    assert_eq!(body["code"], "login_failed");
}

#[tokio::test]
async fn blank_login_fields_are_a_validation_error() {
    let store = Arc::new(CountingStore::new(memory_store()));
    let app = build_router(state_with_store(store.clone()));
    let response = app
        .clone()
        .oneshot(login_request("username=analyst&password="))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let app = app();
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(get_request("/dsstore", &cookie))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/logout", &cookie))
        .await
        .expect("logout");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/login"
    );

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/dscluster/add",
            &cookie,
            json!({ "clusterName": "North" }),
        ))
        .await
        .expect("add after logout");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
