//! Product API handlers.
//!
//! Products are addressed by UPC on these routes; the surrogate key is only
//! used by planogram links.
use crate::api::error::{ApiError, api_conflict, api_internal, api_validation_error, store_error};
use crate::api::types::{AckResponse, ProductListResponse, ProductRequest, ProductResponse};
use crate::api::{ALL_FIELDS_REQUIRED, json_body};
use crate::app::AppState;
use crate::auth::gate::CurrentUser;
use crate::model::ProductFields;
use crate::store::StoreError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use std::collections::HashMap;

const UPC_REQUIRED: &str = "UPC is required";
const NOT_FOUND: &str = "Product not found";

impl ProductRequest {
    fn into_fields(self) -> Result<ProductFields, ApiError> {
        let (
            Some(upc),
            Some(product_name),
            Some(category),
            Some(subcategory),
            Some(dimensions),
            Some(weight),
            Some(db_status),
        ) = (
            self.upc,
            self.product_name,
            self.category,
            self.subcategory,
            self.dimensions,
            self.weight,
            self.db_status,
        )
        else {
            return Err(api_validation_error(ALL_FIELDS_REQUIRED));
        };
        Ok(ProductFields {
            upc,
            product_name,
            category,
            subcategory,
            dimensions,
            weight,
            price: self.price,
            db_status,
        })
    }
}

#[utoipa::path(
    get,
    path = "/dsproduct",
    tag = "products",
    responses(
        (status = 200, description = "List products", body = ProductListResponse)
    )
)]
pub(crate) async fn list_products(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state
        .store
        .list_products()
        .await
        .map_err(|err| api_internal("Failed to load products", &err))?;
    Ok(Json(ProductListResponse {
        success: true,
        products,
    }))
}

#[utoipa::path(
    get,
    path = "/get_product",
    tag = "products",
    params(
        ("upc" = String, Query, description = "Product UPC")
    ),
    responses(
        (status = 200, description = "Product record", body = ProductResponse),
        (status = 400, description = "UPC missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_product(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ProductResponse>, ApiError> {
    let upc = params
        .get("upc")
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| api_validation_error(UPC_REQUIRED))?;
    let product = state
        .store
        .get_product_by_upc(upc)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to load product"))?;
    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

#[utoipa::path(
    post,
    path = "/dsproduct/add",
    tag = "products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing fields", body = crate::api::types::ErrorResponse),
        (status = 409, description = "UPC already exists", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn add_product(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let fields = json_body(payload)?.into_fields()?;
    match state.store.create_product(fields).await {
        Ok(product) => Ok((
            StatusCode::CREATED,
            Json(ProductResponse {
                success: true,
                product,
            }),
        )),
        Err(StoreError::Conflict(_)) => Err(api_conflict(
            "already_exists",
            "A product with this UPC already exists",
        )),
        Err(err) => Err(api_internal("Failed to create product", &err)),
    }
}

#[utoipa::path(
    post,
    path = "/dsproduct/update_product",
    tag = "products",
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Missing fields", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_product(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<ProductResponse>, ApiError> {
    let fields = json_body(payload)?.into_fields()?;
    let product = state
        .store
        .update_product(fields)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to update product"))?;
    Ok(Json(ProductResponse {
        success: true,
        product,
    }))
}

#[utoipa::path(
    post,
    path = "/dsproduct/delete_product",
    tag = "products",
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product deleted", body = AckResponse),
        (status = 400, description = "UPC missing", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_product(
    _user: CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    let upc = json_body(payload)?
        .upc
        .ok_or_else(|| api_validation_error(UPC_REQUIRED))?;
    state
        .store
        .delete_product(&upc)
        .await
        .map_err(|err| store_error(err, NOT_FOUND, "Failed to delete product"))?;
    Ok(Json(AckResponse::with_message("Product deleted")))
}
