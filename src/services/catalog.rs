//! Product catalog of the commerce backend.
//!
//! The backend answers either a page object (`{"content": [...]}`) or a bare
//! list, and its product shape has drifted over time, so fields are read
//! leniently from JSON values.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{check_status, ServiceError};
use crate::corpus::Category;

/// Reply when no product matched.
pub const NO_PRODUCTS_REPLY: &str = "I couldn't find matching products right now. Try again later.";

/// A simplified catalog product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    pub id: Option<String>,
    pub title: Option<String>,
    pub price: Option<f64>,
    pub seller: Option<String>,
    pub category: Option<String>,
}

impl Product {
    /// Read a product from the backend's JSON.
    pub fn from_json(value: &Value) -> Self {
        let id = match value.get("id") {
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
        let title = first_str(value, &["title", "name"]);
        let price = ["sellingPrice", "currentPrice", "selling_price"]
            .iter()
            .find_map(|k| value.get(*k).and_then(Value::as_f64));
        let seller = value
            .get("seller")
            .and_then(|s| s.get("fullName"))
            .and_then(Value::as_str)
            .map(String::from);
        let category = match value.get("category") {
            Some(Value::Object(c)) => c.get("name").and_then(Value::as_str).map(String::from),
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        Self {
            id,
            title,
            price,
            seller,
            category,
        }
    }
}

fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// Products from a backend body: a page object with `content` or a list.
fn products_from_body(body: &Value, limit: usize) -> Result<Vec<Product>, ServiceError> {
    let list = match body {
        Value::Array(items) => items,
        Value::Object(page) => match page.get("content") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ServiceError::InvalidResponse(
                    "product page without content list".into(),
                ))
            }
        },
        _ => return Err(ServiceError::InvalidResponse("unexpected product payload".into())),
    };
    Ok(list.iter().take(limit).map(Product::from_json).collect())
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Products, optionally restricted to one category. Empty means no match.
    async fn list_products(
        &self,
        category: Option<Category>,
        limit: usize,
    ) -> Result<Vec<Product>, ServiceError>;

    /// Products matching a free-text query. Empty means no match.
    async fn search_products(&self, query: &str, limit: usize)
        -> Result<Vec<Product>, ServiceError>;
}

/// HTTP client for the backend's `/api/products` endpoints.
#[derive(Debug, Clone)]
pub struct BackendCatalog {
    http: Client,
    base_url: String,
}

impl BackendCatalog {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(
        &self,
        path: &str,
        params: &[(&str, &str)],
        limit: usize,
    ) -> Result<Vec<Product>, ServiceError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.get(&url).query(params).send().await?;
        let body: Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(format!("product payload: {e}")))?;
        products_from_body(&body, limit)
    }
}

#[async_trait]
impl ProductCatalog for BackendCatalog {
    async fn list_products(
        &self,
        category: Option<Category>,
        limit: usize,
    ) -> Result<Vec<Product>, ServiceError> {
        match category {
            Some(c) => {
                self.fetch("/api/products", &[("category", c.as_str())], limit)
                    .await
            }
            None => self.fetch("/api/products", &[], limit).await,
        }
    }

    async fn search_products(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Product>, ServiceError> {
        self.fetch("/api/products/search", &[("query", query)], limit)
            .await
    }
}

/// Bulleted product list with prices and storefront links.
pub fn format_recommendations(products: &[Product], frontend_base: &str) -> String {
    if products.is_empty() {
        return NO_PRODUCTS_REPLY.to_string();
    }
    let base = frontend_base.trim_end_matches('/');
    let lines: Vec<String> = products
        .iter()
        .map(|p| {
            let title = p.title.as_deref().unwrap_or("Unnamed Product");
            let price = p.price.map(|v| format!(" - ₹{v}")).unwrap_or_default();
            let link = match &p.id {
                Some(id) => format!("{base}/product/{id}"),
                None => base.to_string(),
            };
            format!("• {title}{price} — {link}")
        })
        .collect();
    format!(
        "Here are some products you might consider:\n{}",
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn product_reads_primary_fields() {
        let p = Product::from_json(&json!({
            "id": 12,
            "title": "Neem Oil 500ml",
            "sellingPrice": 349,
            "seller": {"fullName": "Green Agro"},
            "category": {"name": "Pesticides"}
        }));
        assert_eq!(p.id.as_deref(), Some("12"));
        assert_eq!(p.title.as_deref(), Some("Neem Oil 500ml"));
        assert_eq!(p.price, Some(349.0));
        assert_eq!(p.seller.as_deref(), Some("Green Agro"));
        assert_eq!(p.category.as_deref(), Some("Pesticides"));
    }

    #[test]
    fn product_reads_fallback_fields() {
        let p = Product::from_json(&json!({
            "name": "Tomato Seeds",
            "currentPrice": 99.5,
            "seller": "not-an-object",
            "category": "Vegetables"
        }));
        assert!(p.id.is_none());
        assert_eq!(p.title.as_deref(), Some("Tomato Seeds"));
        assert_eq!(p.price, Some(99.5));
        assert!(p.seller.is_none());
        assert_eq!(p.category.as_deref(), Some("Vegetables"));
    }

    #[test]
    fn body_accepts_page_or_list() {
        let page = json!({"content": [{"id": 1}, {"id": 2}, {"id": 3}], "totalPages": 1});
        assert_eq!(products_from_body(&page, 2).unwrap().len(), 2);

        let list = json!([{"id": 1}]);
        assert_eq!(products_from_body(&list, 5).unwrap().len(), 1);

        assert!(products_from_body(&json!({"error": "x"}), 5).is_err());
        assert!(products_from_body(&json!("nope"), 5).is_err());
    }

    #[test]
    fn format_lists_products_with_links() {
        let products = vec![
            Product {
                id: Some("7".into()),
                title: Some("Rose Fungicide".into()),
                price: Some(250.0),
                ..Product::default()
            },
            Product::default(),
        ];
        let text = format_recommendations(&products, "http://localhost:3000/");
        assert_eq!(
            text,
            "Here are some products you might consider:\n\
             • Rose Fungicide - ₹250 — http://localhost:3000/product/7\n\
             • Unnamed Product — http://localhost:3000"
        );
    }

    #[test]
    fn format_empty_is_fixed_reply() {
        assert_eq!(format_recommendations(&[], "http://x"), NO_PRODUCTS_REPLY);
    }

    #[tokio::test]
    async fn unreachable_backend_is_error() {
        let http = crate::services::http_client(Duration::from_secs(1)).unwrap();
        let catalog = BackendCatalog::new(http, "http://127.0.0.1:1");
        let result = catalog.search_products("tomato", 5).await;
        assert!(matches!(result, Err(ServiceError::Http(_))));
    }
}
