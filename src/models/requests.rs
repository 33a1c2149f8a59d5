//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies. Validation happens
//! here, before any cache or store access.

use serde::Deserialize;

/// Longest accepted product name, in bytes.
pub const MAX_NAME_LENGTH: usize = 256;

/// Request body for PUT /products/:id
///
/// Both fields are optional, but at least one must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProductRequest {
    /// New display name
    #[serde(default)]
    pub name: Option<String>,
    /// New price in cents
    #[serde(default)]
    pub price_cents: Option<i64>,
}

impl UpdateProductRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.is_none() && self.price_cents.is_none() {
            return Some("No fields to update".to_string());
        }
        if let Some(name) = &self.name {
            if name.is_empty() {
                return Some("Name cannot be empty".to_string());
            }
            if name.len() > MAX_NAME_LENGTH {
                return Some(format!(
                    "Name exceeds maximum length of {} bytes",
                    MAX_NAME_LENGTH
                ));
            }
        }
        if let Some(price) = self.price_cents {
            if price < 0 {
                return Some("Price cannot be negative".to_string());
            }
        }
        None
    }
}

/// Request body for POST /products
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    /// Display name
    pub name: String,
    /// Price in cents
    pub price_cents: i64,
}

impl CreateProductRequest {
    /// Validates the request data.
    pub fn validate(&self) -> Option<String> {
        if self.name.is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if self.name.len() > MAX_NAME_LENGTH {
            return Some(format!(
                "Name exceeds maximum length of {} bytes",
                MAX_NAME_LENGTH
            ));
        }
        if self.price_cents < 0 {
            return Some("Price cannot be negative".to_string());
        }
        None
    }
}

/// Request body for POST /admin/reattach
#[derive(Debug, Clone, Deserialize)]
pub struct ReattachRequest {
    /// DSN of the fresh read-only node
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_deserialize() {
        let json = r#"{"price_cents": 999}"#;
        let req: UpdateProductRequest = serde_json::from_str(json).unwrap();
        assert!(req.name.is_none());
        assert_eq!(req.price_cents, Some(999));
    }

    #[test]
    fn test_update_request_no_fields_rejected() {
        let req = UpdateProductRequest {
            name: None,
            price_cents: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_update_request_negative_price_rejected() {
        let req = UpdateProductRequest {
            name: None,
            price_cents: Some(-1),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_update_request_valid() {
        let req = UpdateProductRequest {
            name: Some("press".to_string()),
            price_cents: Some(100),
        };
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_create_request_empty_name_rejected() {
        let req = CreateProductRequest {
            name: String::new(),
            price_cents: 100,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_create_request_valid() {
        let req = CreateProductRequest {
            name: "jug".to_string(),
            price_cents: 500,
        };
        assert!(req.validate().is_none());
    }
}
