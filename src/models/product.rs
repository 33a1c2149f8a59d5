//! Product record
//!
//! The single versioned record type served by the gateway. The relational
//! store owns the record; `updated_at` is assigned by the store on every
//! write. The same JSON form is used for HTTP responses and cache entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product row as stored in the relational store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Row identity
    pub id: i64,
    /// Display name
    pub name: String,
    /// Price in cents, never negative
    pub price_cents: i64,
    /// Set by the store (`now()`) on every insert/update
    pub updated_at: DateTime<Utc>,
}
