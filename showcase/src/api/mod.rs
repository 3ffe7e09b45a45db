//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Cats** (`/cats/*`): greeting endpoints
//! - **Users** (`/users/*`): typical answers and an image upload
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa` annotations. Interactive documentation is served at
//! `/api/docs` (configurable) and the raw document at `/api/docs/openapi.json`.

pub mod handlers;
pub mod models;
