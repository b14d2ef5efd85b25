// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use toolcart::{Cart, CartDelta, CartItem};
use tracing::{info, instrument};

use super::require_user_id;
use crate::errors::AppError;
use crate::state::AppState;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartQuery {
  pub user_id: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SaveCartPayload {
  pub user_id: Option<String>,
  pub cart_items: Option<Vec<CartItem>>,
}

/// Body of `PUT /cart`. Which optional fields are required depends on `action`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartPayload {
  pub user_id: Option<String>,
  pub action: Option<String>,
  pub item: Option<CartItem>,
  pub product_id: Option<String>,
  pub quantity: Option<i32>,
}

impl UpdateCartPayload {
  fn into_delta(self) -> Result<CartDelta, AppError> {
    let action = self
      .action
      .as_deref()
      .ok_or_else(|| AppError::Validation("Missing required field: action".to_string()))?;
    let missing = |field: &str| {
      AppError::Validation(format!("Missing required field for '{}': {}", action, field))
    };

    let delta = match action {
      "add" => {
        let item = self.item.clone().ok_or_else(|| missing("item"))?;
        validate_item(&item)?;
        CartDelta::Add { item }
      }
      "update" => CartDelta::Update {
        product_id: self.product_id.clone().ok_or_else(|| missing("productId"))?,
        quantity: self.quantity.ok_or_else(|| missing("quantity"))?,
      },
      "remove" => CartDelta::Remove {
        product_id: self.product_id.clone().ok_or_else(|| missing("productId"))?,
      },
      "clear" => CartDelta::Clear,
      other => return Err(AppError::Validation(format!("Invalid action '{}'", other))),
    };
    Ok(delta)
  }
}

fn validate_item(item: &CartItem) -> Result<(), AppError> {
  if item.product_id.trim().is_empty() {
    return Err(AppError::Validation("Cart item is missing productId".to_string()));
  }
  if item.quantity < 1 {
    return Err(AppError::Validation(format!(
      "Quantity for '{}' must be at least 1",
      item.product_id
    )));
  }
  if item.price < 0.0 || item.sale_price.is_some_and(|p| p < 0.0) {
    return Err(AppError::Validation(format!(
      "Price for '{}' must not be negative",
      item.product_id
    )));
  }
  Ok(())
}

// --- Handler Implementations ---

#[instrument(name = "handler::get_cart", skip(app_state, query))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CartQuery>,
) -> Result<HttpResponse, AppError> {
  let user_id = require_user_id(query.user_id.as_deref())?;

  let cart_items = app_state.carts.load(user_id).await?;
  info!(%user_id, items = cart_items.len(), "Cart fetched.");

  Ok(HttpResponse::Ok().json(json!({ "cartItems": cart_items })))
}

#[instrument(name = "handler::save_cart", skip(app_state, payload))]
pub async fn save_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<SaveCartPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let user_id = require_user_id(payload.user_id.as_deref())?;
  let items = payload
    .cart_items
    .ok_or_else(|| AppError::Validation("Missing required field: cartItems".to_string()))?;
  for item in &items {
    validate_item(item)?;
  }

  // Duplicate product lines collapse into one, as they would in a local cart.
  let items = Cart::from_items(items).into_items();
  app_state.carts.save_full(user_id, &items).await?;
  info!(%user_id, items = items.len(), "Cart replaced.");

  Ok(HttpResponse::Ok().json(json!({
      "message": "Cart synced successfully.",
      "itemCount": items.len()
  })))
}

#[instrument(name = "handler::update_cart", skip(app_state, payload))]
pub async fn update_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<UpdateCartPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let user_id = require_user_id(payload.user_id.as_deref())?;
  let delta = payload.into_delta()?;

  let outcome = app_state.carts.apply_delta(user_id, &delta).await?;
  info!(%user_id, action = delta.action(), ?outcome, "Cart updated.");

  Ok(HttpResponse::Ok().json(json!({
      "message": "Cart updated successfully.",
      "outcome": outcome
  })))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn payload(action: &str) -> UpdateCartPayload {
    UpdateCartPayload {
      user_id: None,
      action: Some(action.to_string()),
      item: None,
      product_id: None,
      quantity: None,
    }
  }

  #[test]
  fn update_requires_product_and_quantity() {
    let err = payload("update").into_delta().unwrap_err();
    assert!(err.to_string().contains("productId"));

    let mut with_product = payload("update");
    with_product.product_id = Some("saw".into());
    let err = with_product.into_delta().unwrap_err();
    assert!(err.to_string().contains("quantity"));
  }

  #[test]
  fn clear_needs_nothing_else() {
    assert_eq!(payload("clear").into_delta().unwrap(), CartDelta::Clear);
  }

  #[test]
  fn unknown_action_is_rejected() {
    assert!(matches!(payload("merge").into_delta(), Err(AppError::Validation(_))));
  }

  #[test]
  fn add_rejects_zero_quantity() {
    let mut p = payload("add");
    p.item = Some(CartItem::new("saw", "Saw", 10.0, 0));
    assert!(matches!(p.into_delta(), Err(AppError::Validation(_))));
  }
}
