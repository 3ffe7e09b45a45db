//! HTTP request handlers for all API endpoints.
//!
//! - [`cats`]: cat greetings
//! - [`users`]: typical answers and the image upload
//!
//! # Error Handling
//!
//! The upload and greeting extractors reject with [`crate::errors::Error`], which converts to the
//! matching HTTP status code and a plain-text message. Other rejections are axum's own.

pub mod cats;
pub mod users;
