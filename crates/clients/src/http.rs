//! HTTP implementations of the upstream service traits.
//!
//! Wire contracts:
//! - account directory: `GET {base}/accounts/{id}` → `{ "id", "name" }`, 404 when unknown
//! - catalog: `GET {base}/products?ids=a,b,c` → `[{ "id", "name", "description", "price" }]`
//!   with `price` as a decimal number of currency units

use std::time::Duration;

use async_trait::async_trait;
use common::{AccountId, Money, ProductId};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::account::{Account, AccountService};
use crate::catalog::{CatalogService, Product};
use crate::error::{ClientError, Result};

fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl(base_url.to_string()));
    }
    Ok(url)
}

fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Account directory client.
#[derive(Debug, Clone)]
pub struct HttpAccountService {
    client: Client,
    base_url: Url,
}

impl HttpAccountService {
    /// Creates a client for the account directory at `base_url`.
    ///
    /// `timeout` bounds every request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: parse_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl AccountService for HttpAccountService {
    #[tracing::instrument(skip(self))]
    async fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>> {
        let url = endpoint(&self.base_url, &["accounts", account_id.as_str()])?;
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }
}

#[derive(Deserialize)]
struct ProductDto {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    price: f64,
}

impl TryFrom<ProductDto> for Product {
    type Error = ClientError;

    fn try_from(dto: ProductDto) -> Result<Self> {
        let price = Money::from_decimal(dto.price)
            .filter(|m| !m.is_negative())
            .ok_or_else(|| {
                ClientError::Decode(format!("product {} has invalid price {}", dto.id, dto.price))
            })?;
        Ok(Product::new(dto.id, dto.name, dto.description, price))
    }
}

/// Product catalog client.
#[derive(Debug, Clone)]
pub struct HttpCatalogService {
    client: Client,
    base_url: Url,
}

impl HttpCatalogService {
    /// Creates a client for the catalog at `base_url`.
    ///
    /// `timeout` bounds every request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: parse_base_url(base_url)?,
        })
    }
}

/// One `ids` pair per product id, so ids may contain any character.
fn ids_query(ids: &[ProductId]) -> Vec<(&'static str, &str)> {
    ids.iter().map(|id| ("ids", id.as_str())).collect()
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    #[tracing::instrument(skip(self), fields(count = ids.len()))]
    async fn get_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = endpoint(&self.base_url, &["products"])?;
        let response = self
            .client
            .get(url)
            .query(&ids_query(ids))
            .send()
            .await?;

        let products: Vec<ProductDto> = read_json(response).await?;
        products.into_iter().map(Product::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_segments() {
        let base = parse_base_url("http://catalog:8080/api/").unwrap();
        let url = endpoint(&base, &["products"]).unwrap();
        assert_eq!(url.as_str(), "http://catalog:8080/api/products");
    }

    #[test]
    fn endpoint_escapes_ids() {
        let base = parse_base_url("http://accounts:8080").unwrap();
        let url = endpoint(&base, &["accounts", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://accounts:8080/accounts/a%2Fb%20c");
    }

    #[test]
    fn product_ids_are_sent_as_repeated_pairs() {
        let ids = [ProductId::new("a,b"), ProductId::new("c")];
        let request = Client::new()
            .get("http://catalog:8080/products")
            .query(&ids_query(&ids))
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("ids=a%2Cb&ids=c"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(parse_base_url("mailto:orders@example.com").is_err());
    }

    #[test]
    fn product_price_is_converted_to_cents() {
        let dto = ProductDto {
            id: "P2".to_string(),
            name: "Gadget".to_string(),
            description: String::new(),
            price: 2.5,
        };
        let product = Product::try_from(dto).unwrap();
        assert_eq!(product.price, Money::from_cents(250));
    }

    #[test]
    fn negative_price_is_rejected() {
        let dto = ProductDto {
            id: "P2".to_string(),
            name: "Gadget".to_string(),
            description: String::new(),
            price: -1.0,
        };
        assert!(matches!(
            Product::try_from(dto),
            Err(ClientError::Decode(_))
        ));
    }
}
