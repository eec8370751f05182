//! Product domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercata_core::{ProductId, UserId};

/// A catalog product.
///
/// `code` is unique across the catalog; the store enforces this and the
/// service surfaces a violation as a conflict rather than pre-checking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Merchant-facing product code, unique across the catalog.
    pub code: String,
    pub price: Decimal,
    pub stock: u32,
    #[serde(default)]
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// The admin who created the product, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<UserId>,
}

/// Client-supplied product attributes for create and update.
///
/// `stock` and `quantity`-like fields are unsigned so negative input is
/// rejected during deserialization; the remaining rules live in
/// [`ProductInput::validate`].
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
    pub price: Decimal,
    pub stock: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl ProductInput {
    /// Check the field-level rules: non-empty title and code, non-negative
    /// price.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of the first failing rule.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_owned());
        }
        if self.code.trim().is_empty() {
            return Err("code must not be empty".to_owned());
        }
        if self.price < Decimal::ZERO {
            return Err("price must not be negative".to_owned());
        }
        Ok(())
    }

    /// Materialize a new [`Product`] from this input.
    #[must_use]
    pub fn into_product(self, owner_id: Option<UserId>) -> Product {
        Product {
            id: ProductId::generate(),
            title: self.title,
            description: self.description,
            code: self.code,
            price: self.price,
            stock: self.stock,
            category: self.category,
            thumbnail: self.thumbnail,
            owner_id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_input() -> ProductInput {
        ProductInput {
            title: "Keyboard".to_owned(),
            description: "Mechanical, clicky".to_owned(),
            code: "KB-01".to_owned(),
            price: Decimal::new(4999, 2),
            stock: 12,
            category: "peripherals".to_owned(),
            thumbnail: None,
        }
    }

    #[test]
    fn test_validate_accepts_valid_input() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let mut input = valid_input();
        input.title = "   ".to_owned();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_code() {
        let mut input = valid_input();
        input.code = String::new();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let mut input = valid_input();
        input.price = Decimal::new(-1, 0);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_deserialize_rejects_negative_stock() {
        let result: Result<ProductInput, _> = serde_json::from_value(serde_json::json!({
            "title": "T",
            "code": "C1",
            "price": 10,
            "stock": -5,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_product_serializes_id_as_underscore_id() {
        let product = valid_input().into_product(None);
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["_id"], product.id.to_string());
        assert!(json.get("id").is_none());
        assert!(json.get("owner_id").is_none());
    }
}
