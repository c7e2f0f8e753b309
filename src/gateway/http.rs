//! HTTP client for the storefront's cart endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::{
    csrf::{self, CsrfToken},
    gateway::{AddToCartResponse, CartGateway, GatewayError, RemoveResponse, UpdateResponse},
    lines::LineId,
    products::ProductId,
};

/// Configuration for connecting to the storefront.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Storefront base address, e.g. `"https://shop.example.com/shop"`.
    pub base_url: String,

    /// Anti-forgery token sent with every request.
    pub csrf_token: Option<CsrfToken>,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// HTTP client for the storefront's cart endpoints.
#[derive(Debug, Clone)]
pub struct HttpCartGateway {
    config: HttpGatewayConfig,
    http: Client,
}

impl HttpCartGateway {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));

        let request = self
            .http
            .post(url)
            .header("X-Requested-With", "XMLHttpRequest");

        match &self.config.csrf_token {
            Some(token) => request.header(csrf::HEADER_NAME, token.as_str()),
            None => request,
        }
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, GatewayError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(GatewayError::UnexpectedResponse(format!(
                "request failed with status {status}: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CartGateway for HttpCartGateway {
    async fn update_quantity(
        &self,
        line: &LineId,
        quantity: u32,
    ) -> Result<UpdateResponse, GatewayError> {
        let path = format!("/cart/update/{}/", urlencoding::encode(line.as_str()));

        debug!(%line, quantity, "posting quantity update");

        self.send(self.post(&path).json(&json!({ "quantity": quantity })))
            .await
    }

    async fn remove_line(&self, line: &LineId) -> Result<RemoveResponse, GatewayError> {
        let path = format!("/cart/remove/{}/", urlencoding::encode(line.as_str()));

        debug!(%line, "posting line removal");

        self.send(self.post(&path)).await
    }

    async fn add_to_cart(
        &self,
        product: &ProductId,
        quantity: u32,
    ) -> Result<AddToCartResponse, GatewayError> {
        debug!(%product, quantity, "posting add to cart");

        let body = json!({ "product_id": product, "quantity": quantity });

        self.send(self.post("/add-to-cart/").json(&body)).await
    }
}
