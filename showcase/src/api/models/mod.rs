//! API request and response data models.
//!
//! These are plain DTOs: they carry no behaviour and exist so requests can be deserialized and so
//! `utoipa` can describe them in the generated OpenAPI document.
//!
//! - [`cats`]: the greeting payload
//! - [`users`]: the "what" payload, the upload form and the upload response

pub mod cats;
pub mod users;
