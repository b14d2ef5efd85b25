// storefront/src/web/routes.rs

use actix_web::{web, HttpResponse};

use super::handlers::{cart_handlers, order_handlers};
use crate::errors::AppError;

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Malformed bodies and query strings get the same `{ "error": ... }` envelope as handler errors.
fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
  web::QueryConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(json_config())
    .app_data(query_config())
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::resource("/cart")
        .route(web::get().to(cart_handlers::get_cart_handler))
        .route(web::post().to(cart_handlers::save_cart_handler))
        .route(web::put().to(cart_handlers::update_cart_handler)),
    )
    .service(
      web::scope("/orders")
        .route("", web::post().to(order_handlers::create_order_handler))
        .route("/{order_number}", web::get().to(order_handlers::get_order_handler)),
    );
}
