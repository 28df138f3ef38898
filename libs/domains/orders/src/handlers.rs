//! HTTP handlers for the orders API

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_helpers::{
    IdPath, ValidatedQuery,
    errors::responses::{
        BadRequestIdResponse, BadRequestValidationResponse, InsufficientStockResponse,
        InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::OrderResult;
use crate::models::{
    AddProductQuery, CreateOrderQuery, Order, OrderLine, OrderStatus, OrderStatusQuery,
    OrderSummary, ProductSnapshot,
};
use crate::repository::OrderRepository;
use crate::service::OrderService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_orders,
        create_order,
        get_order,
        add_product_to_order,
        set_order_status,
    ),
    components(
        schemas(Order, OrderLine, OrderStatus, OrderSummary, ProductSnapshot),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            InsufficientStockResponse,
            InternalServerErrorResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = "Orders", description = "Orders and stock reservations")
    )
)]
pub struct ApiDoc;

pub fn router<R: OrderRepository + 'static>(service: OrderService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{id}", get(get_order))
        .route("/{id}/product", post(add_product_to_order))
        .route("/{id}/status", patch(set_order_status))
        .with_state(shared_service)
}

/// List orders, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Orders",
    responses(
        (status = 200, description = "Orders with their lines", body = Vec<Order>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_orders<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
) -> OrderResult<Json<Vec<Order>>> {
    let orders = service.list_orders().await?;
    Ok(Json(orders))
}

/// Create an order reserving stock of one product
#[utoipa::path(
    post,
    path = "",
    tag = "Orders",
    params(CreateOrderQuery),
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = InsufficientStockResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn create_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    ValidatedQuery(query): ValidatedQuery<CreateOrderQuery>,
) -> OrderResult<impl IntoResponse> {
    let order = service
        .create_order(query.product_id, query.product_count, query.order_status)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Orders",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    IdPath(id): IdPath,
) -> OrderResult<Json<Order>> {
    let order = service.get_order(id).await?;
    Ok(Json(order))
}

/// Reserve stock of a product for an existing order
///
/// Adding a product already in the order increases that line's count.
#[utoipa::path(
    post,
    path = "/{id}/product",
    tag = "Orders",
    params(
        ("id" = i32, Path, description = "Order ID"),
        AddProductQuery
    ),
    responses(
        (status = 201, description = "Order updated", body = Order),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = InsufficientStockResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn add_product_to_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    IdPath(id): IdPath,
    ValidatedQuery(query): ValidatedQuery<AddProductQuery>,
) -> OrderResult<impl IntoResponse> {
    let order = service
        .add_product_to_order(id, query.product_id, query.product_count)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Set the order status
#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = "Orders",
    params(
        ("id" = i32, Path, description = "Order ID"),
        OrderStatusQuery
    ),
    responses(
        (status = 200, description = "Status changed", body = OrderSummary),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn set_order_status<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    IdPath(id): IdPath,
    ValidatedQuery(query): ValidatedQuery<OrderStatusQuery>,
) -> OrderResult<Json<OrderSummary>> {
    let summary = service.set_order_status(id, query.order_status).await?;
    Ok(Json(summary))
}
