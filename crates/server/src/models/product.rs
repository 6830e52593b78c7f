//! Product catalogue types.
//!
//! Products are only read by the widget's search box; the chat pipeline
//! touches them when product context is enabled.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storechat_core::{Price, ProductId};

/// A catalogue product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Option<Price>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether `needle` (already lowercased) occurs in any searchable field.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        std::iter::once(Some(self.name.as_str()))
            .chain([
                self.description.as_deref(),
                self.category.as_deref(),
                self.brand.as_deref(),
            ])
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Fields needed to insert a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Option<Price>,
    pub in_stock: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new(),
            name: "Trail Runner".to_string(),
            description: Some("Lightweight running SHOE".to_string()),
            category: Some("Footwear".to_string()),
            brand: None,
            price: None,
            in_stock: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_matches_any_field_case_insensitively() {
        let p = product();
        assert!(p.matches("shoe"));
        assert!(p.matches("trail"));
        assert!(p.matches("footwear"));
        assert!(!p.matches("laptop"));
    }

    #[test]
    fn test_serializes_in_stock_camel_case() {
        let json = serde_json::to_value(product()).unwrap_or_default();
        assert_eq!(json["inStock"], true);
        assert!(json["brand"].is_null());
    }
}
