use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What the user wants. Accepted as JSON, multipart or URL-encoded form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct WhatRequest {
    #[serde(default)]
    #[schema(example = "One latte, please.")]
    pub what: Option<String>,
}

/// Just enum param
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WhyChoice {
    First,
    Second,
    Third,
}

/// Multipart body of the image upload. Documentation only: the file is read by the
/// [`ImageUpload`](crate::uploads::ImageUpload) extractor.
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct ImageUploadForm {
    /// A photo of an insanely delicious latte
    #[schema(format = Binary)]
    pub image: String,
}

/// Result of an image upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"type": "image/png", "result": "Just a typical answer."}))]
pub struct CheeseResponse {
    /// MIME type of the uploaded file, or "No file provided"
    #[serde(rename = "type")]
    pub file_type: String,
    pub result: String,
}

impl CheeseResponse {
    pub const NO_FILE: &'static str = "No file provided";
}
