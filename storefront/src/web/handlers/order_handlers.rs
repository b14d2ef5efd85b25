// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use toolcart::{CartItem, CustomerInfo, NewOrder};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
  pub customer_info: Option<CustomerInfo>,
  pub cart_items: Option<Vec<CartItem>>,
  pub user_id: Option<Uuid>,
}

#[instrument(name = "handler::create_order", skip(app_state, payload))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let customer = payload
    .customer_info
    .ok_or_else(|| AppError::Validation("Missing required field: customerInfo".to_string()))?;
  let items = payload
    .cart_items
    .ok_or_else(|| AppError::Validation("Missing required field: cartItems".to_string()))?;

  let order = NewOrder::prepare(customer, items, payload.user_id)?;
  info!(
    order_number = %order.order_number,
    items = order.items.len(),
    total = order.totals.total,
    "Placing order."
  );

  let receipt = app_state.orders.create_order(&order).await.map_err(|e| {
    warn!(order_number = %order.order_number, error = %e, "Order creation failed.");
    AppError::from(e)
  })?;

  Ok(HttpResponse::Created().json(json!({
      "orderId": receipt.order_id,
      "orderNumber": receipt.order_number
  })))
}

#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_number = %path.as_str()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order_number = path.into_inner();

  match app_state.orders.find_order(&order_number).await? {
    Some(order) => Ok(HttpResponse::Ok().json(json!({ "order": order }))),
    None => {
      warn!("Order {} not found.", order_number);
      Err(AppError::NotFound(format!("Order {} not found", order_number)))
    }
  }
}
