// storefront/src/web/handlers/mod.rs

pub mod cart_handlers;
pub mod order_handlers;

use crate::errors::AppError;
use uuid::Uuid;

/// Parses a required `userId` value, rejecting missing or malformed ids.
pub(crate) fn require_user_id(raw: Option<&str>) -> Result<Uuid, AppError> {
  let raw = raw
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| AppError::Validation("Missing required field: userId".to_string()))?;
  Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid userId '{}'", raw)))
}
