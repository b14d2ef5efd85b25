// storefront/src/lib.rs

//! HTTP backend for toolcart: the authoritative cart store and order intake.
//!
//! Routes live in [`web`], Postgres persistence in [`db`]. Handlers only see the
//! [`toolcart::CartGateway`] and [`toolcart::OrderStore`] traits through
//! [`state::AppState`], so tests can run the whole surface on in-memory stores.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod state;
pub mod web;

pub use config::{AppConfig, LogFormat};
pub use errors::AppError;
pub use state::AppState;
pub use web::configure_app_routes;
