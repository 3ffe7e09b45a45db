use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Greeting sent to the cats
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HelloRequest {
    /// Hello message
    #[schema(example = "Hello, cats!")]
    pub hello_message: String,
}
