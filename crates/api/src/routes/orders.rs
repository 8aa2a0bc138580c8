//! Order creation and retrieval endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use clients::{AccountService, CatalogService};
use domain::{AccountId, CreateOrder, Order, OrderedProduct, RequestedItem};
use order_store::OrderRepository;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub account_id: String,
    #[serde(default)]
    pub products: Vec<OrderedProductRequest>,
}

#[derive(Deserialize)]
pub struct OrderedProductRequest {
    pub product_id: String,
    pub quantity: i64,
}

impl From<CreateOrderRequest> for CreateOrder {
    fn from(req: CreateOrderRequest) -> Self {
        let items = req
            .products
            .into_iter()
            .map(|p| RequestedItem::new(p.product_id, p.quantity))
            .collect();
        CreateOrder::new(req.account_id, items)
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub account_id: String,
    pub total_price: f64,
    pub products: Vec<OrderedProductResponse>,
}

#[derive(Serialize)]
pub struct OrderedProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: u32,
}

impl From<&OrderedProduct> for OrderedProductResponse {
    fn from(product: &OrderedProduct) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.as_decimal(),
            quantity: product.quantity,
        }
    }
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            created_at: order.created_at(),
            account_id: order.account_id().to_string(),
            total_price: order.total_price().as_decimal(),
            products: order.products().iter().map(Into::into).collect(),
        }
    }
}

// -- Handlers --

/// POST /orders: validate, price and persist a new order.
#[tracing::instrument(skip(state, req), fields(account_id = %req.account_id))]
pub async fn create<R, A, C>(
    State(state): State<Arc<AppState<R, A, C>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    R: OrderRepository,
    A: AccountService,
    C: CatalogService,
{
    let order = state.order_service.create_order(req.into()).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// GET /accounts/{account_id}/orders: all orders of an account, hydrated.
#[tracing::instrument(skip(state))]
pub async fn list_for_account<R, A, C>(
    State(state): State<Arc<AppState<R, A, C>>>,
    Path(account_id): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    R: OrderRepository,
    A: AccountService,
    C: CatalogService,
{
    let orders = state
        .order_service
        .get_orders_for_account(&AccountId::new(account_id))
        .await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}
