//! Request and Response models for the gateway API
//!
//! This module defines the product record plus the DTOs (Data Transfer
//! Objects) used for serializing/deserializing HTTP request and response
//! bodies.

pub mod product;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use product::Product;
pub use requests::{CreateProductRequest, ReattachRequest, UpdateProductRequest};
pub use responses::{
    EndpointSummary, ErrorResponse, HealthResponse, PromoteResponse, StatusResponse,
    TopologySummary,
};
