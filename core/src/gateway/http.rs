// core/src/gateway/http.rs

use super::{CartDelta, CartGateway, DeltaOutcome};
use crate::cart::CartItem;
use crate::error::GatewayError;
use crate::order::{CustomerInfo, OrderReceipt};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Storefront origin, e.g. `http://127.0.0.1:8080`. No trailing slash needed.
  pub base_url: String,
  pub timeout: Duration,
}

impl ClientConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      timeout: Duration::from_secs(10),
    }
  }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
  pub customer_info: CustomerInfo,
  pub cart_items: Vec<CartItem>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartItemsBody {
  cart_items: Vec<CartItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveFullBody<'a> {
  user_id: Uuid,
  cart_items: &'a [CartItem],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeltaBody<'a> {
  user_id: Uuid,
  #[serde(flatten)]
  delta: &'a CartDelta,
}

#[derive(Deserialize)]
struct DeltaResponse {
  outcome: DeltaOutcome,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Gateway speaking the storefront's `/cart` and `/orders` routes.
#[derive(Debug, Clone)]
pub struct HttpCartGateway {
  client: Client,
  base_url: String,
}

impl HttpCartGateway {
  pub fn new(config: ClientConfig) -> Result<Self, GatewayError> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(GatewayError::transport)?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_string(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// Places an order. Failures are returned as-is: checkout must stop on them.
  #[instrument(name = "http_gateway::create_order", skip(self, request), fields(items = request.cart_items.len()), err(Display))]
  pub async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt, GatewayError> {
    let response = self
      .client
      .post(self.url("/orders"))
      .json(request)
      .send()
      .await
      .map_err(GatewayError::transport)?;
    let response = check_status(response).await?;
    response.json().await.map_err(GatewayError::transport)
  }
}

/// Maps non-2xx statuses onto the gateway error taxonomy.
async fn check_status(response: Response) -> Result<Response, GatewayError> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }
  let message = match response.json::<ErrorBody>().await {
    Ok(body) => body.error,
    Err(_) => status.to_string(),
  };
  debug!(%status, %message, "Storefront returned an error response.");
  Err(match status {
    StatusCode::NOT_FOUND => GatewayError::CartNotFound,
    StatusCode::BAD_REQUEST => GatewayError::Rejected(message),
    _ => GatewayError::transport(anyhow::anyhow!("HTTP {}: {}", status, message)),
  })
}

#[async_trait]
impl CartGateway for HttpCartGateway {
  #[instrument(name = "http_gateway::load", skip(self), err(Display))]
  async fn load(&self, user_id: Uuid) -> Result<Vec<CartItem>, GatewayError> {
    let response = self
      .client
      .get(self.url("/cart"))
      .query(&[("userId", user_id.to_string())])
      .send()
      .await
      .map_err(GatewayError::transport)?;
    let body: CartItemsBody = check_status(response)
      .await?
      .json()
      .await
      .map_err(GatewayError::transport)?;
    Ok(body.cart_items)
  }

  #[instrument(name = "http_gateway::save_full", skip(self, items), fields(items = items.len()), err(Display))]
  async fn save_full(&self, user_id: Uuid, items: &[CartItem]) -> Result<(), GatewayError> {
    let response = self
      .client
      .post(self.url("/cart"))
      .json(&SaveFullBody {
        user_id,
        cart_items: items,
      })
      .send()
      .await
      .map_err(GatewayError::transport)?;
    check_status(response).await?;
    Ok(())
  }

  #[instrument(name = "http_gateway::apply_delta", skip(self, delta), fields(action = delta.action()), err(Display))]
  async fn apply_delta(&self, user_id: Uuid, delta: &CartDelta) -> Result<DeltaOutcome, GatewayError> {
    let response = self
      .client
      .put(self.url("/cart"))
      .json(&DeltaBody { user_id, delta })
      .send()
      .await
      .map_err(GatewayError::transport)?;
    let body: DeltaResponse = check_status(response)
      .await?
      .json()
      .await
      .map_err(GatewayError::transport)?;
    Ok(body.outcome)
  }
}
