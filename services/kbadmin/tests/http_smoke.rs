mod common;

use axum::http::StatusCode;
use common::{app, login, read_json};
use http_helpers::{get_request, json_request};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn store_crud_round_trip() {
    let app = app();
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/dsstore/add",
            &cookie,
            json!({
                "storeName": "Downtown",
                "address": "1 Main St",
                "city": "Springfield",
                "state": "IL",
                "dbStatus": 1
            }),
        ))
        .await
        .expect("add");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    let store_id = body["store"]["storeId"].as_i64().expect("store id");

    let response = app
        .clone()
        .oneshot(get_request(&format!("/get_store?storeId={store_id}"), &cookie))
        .await
        .expect("get");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["store"]["storeName"], "Downtown");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/dsstore/update_store",
            &cookie,
            json!({
                "storeId": store_id,
                "storeName": "Uptown",
                "address": "2 Main St",
                "city": "Springfield",
                "state": "IL",
                "dbStatus": "0"
            }),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["store"]["storeName"], "Uptown");
    assert_eq!(body["store"]["dbStatus"], 0);

    let response = app
        .clone()
        .oneshot(get_request("/dsstore", &cookie))
        .await
        .expect("list");
    let body = read_json(response).await;
    assert_eq!(body["stores"].as_array().expect("stores").len(), 1);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/dsstore/delete_store",
            &cookie,
            json!({ "storeId": store_id }),
        ))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/get_store?storeId={store_id}"), &cookie))
        .await
        .expect("get deleted");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_fields_are_rejected_before_any_write() {
    let app = app();
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/dsstore/add",
            &cookie,
            json!({ "storeName": "Half", "address": "  " }),
        ))
        .await
        .expect("add");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "All fields are required");

    let response = app
        .clone()
        .oneshot(get_request("/dsstore", &cookie))
        .await
        .expect("list");
    let body = read_json(response).await;
    assert!(body["stores"].as_array().expect("stores").is_empty());
}

#[tokio::test]
async fn get_without_id_is_a_validation_error() {
    let app = app();
    let cookie = login(&app).await;
    for (uri, message) in [
        ("/get_store", "Store ID is required"),
        ("/get_cluster", "Cluster ID is required"),
        ("/get_position", "Position ID is required"),
        ("/get_performance", "Performance ID is required"),
    ] {
        let response = app
            .clone()
            .oneshot(get_request(uri, &cookie))
            .await
            .expect("get");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = read_json(response).await;
        assert_eq!(body["message"], message);
    }
}

#[tokio::test]
async fn update_and_delete_of_missing_rows_are_not_found() {
    let app = app();
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/dscluster/update_cluster",
            &cookie,
            json!({ "clusterId": 999, "clusterName": "Ghost" }),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/dsfloorplan/delete_floor_plan",
            &cookie,
            json!({ "floorPlanId": 999 }),
        ))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn products_are_addressed_by_upc() {
    let app = app();
    let cookie = login(&app).await;
    let product = json!({
        "upc": "012345678905",
        "productName": "Cola 12oz",
        "category": "Beverages",
        "subcategory": "Soda",
        "dimensions": "2x2x5",
        "weight": "0.4",
        "dbstatus": 1
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/dsproduct/add", &cookie, product.clone()))
        .await
        .expect("add");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert!(body["product"]["price"].is_null());

    let response = app
        .clone()
        .oneshot(json_request("POST", "/dsproduct/add", &cookie, product))
        .await
        .expect("duplicate");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["code"], "already_exists");

    let response = app
        .clone()
        .oneshot(get_request("/get_product?upc=012345678905", &cookie))
        .await
        .expect("get");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["product"]["productName"], "Cola 12oz");

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            "/dsproduct/delete_product",
            &cookie,
            json!({ "upc": "012345678905" }),
        ))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/get_product?upc=012345678905", &cookie))
        .await
        .expect("get deleted");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn zero_is_a_present_value_for_positions() {
    let app = app();
    let cookie = login(&app).await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/dsposition/add",
            &cookie,
            json!({
                "dbProductParentKey": 3,
                "dbPlanogramParentKey": 4,
                "dbFixtureParentKey": 0,
                "hFacing": 0,
                "vFacing": 1,
                "dFacing": 2
            }),
        ))
        .await
        .expect("add");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["position"]["hFacing"], 0);
}

#[tokio::test]
async fn performance_dates_are_validated() {
    let app = app();
    let cookie = login(&app).await;
    let mut record = json!({
        "positionId": 1,
        "salesVolume": 10,
        "salesRevenue": 19.5,
        "stockLevel": 4,
        "restockFrequency": 7,
        "date": "2024-13-40"
    });

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/dsperformance/add",
            &cookie,
            record.clone(),
        ))
        .await
        .expect("bad date");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "date must be formatted YYYY-MM-DD");

    record["date"] = json!("2024-03-01");
    let response = app
        .clone()
        .oneshot(json_request("POST", "/dsperformance/add", &cookie, record))
        .await
        .expect("add");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["performance"]["date"], "2024-03-01");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app();
    let cookie = login(&app).await;
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/dscluster/add")
        .header("content-type", "application/json")
        .header("cookie", &cookie)
        .body(axum::body::Body::from("{not json"))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("add");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn undecodable_bodies_share_one_validation_error() {
    let app = app();
    let cookie = login(&app).await;

    let without_content_type = axum::http::Request::builder()
        .method("POST")
        .uri("/dscluster/add")
        .header("cookie", &cookie)
        .body(axum::body::Body::from(r#"{"clusterName": "Urban"}"#))
        .expect("request");
    let wrong_shape = json_request(
        "POST",
        "/dscluster/add",
        &cookie,
        json!({ "clusterName": ["Urban"] }),
    );
    let empty = axum::http::Request::builder()
        .method("POST")
        .uri("/dsstore/delete_store")
        .header("content-type", "application/json")
        .header("cookie", &cookie)
        .body(axum::body::Body::empty())
        .expect("request");

    for request in [without_content_type, wrong_shape, empty] {
        let response = app.clone().oneshot(request).await.expect("post");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid request body");
    }

    let response = app
        .clone()
        .oneshot(get_request("/dscluster", &cookie))
        .await
        .expect("list");
    let body = read_json(response).await;
    assert!(body["clusters"].as_array().expect("clusters").is_empty());
}

#[tokio::test]
async fn health_and_openapi_need_no_session() {
    let app = app();
    let request = axum::http::Request::builder()
        .uri("/system/health")
        .body(axum::body::Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("health");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");

    let request = axum::http::Request::builder()
        .uri("/openapi.json")
        .body(axum::body::Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("openapi");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["paths"]["/dsstore"].is_object());
}
