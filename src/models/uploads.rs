// src/models/uploads.rs

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[schema(example = "/uploads/9b2f3c1e-4a7d-4f0e-9c55-2d8f1a6b7c90.png")]
    pub url: String,
    #[schema(example = "foto.png")]
    pub original_name: Option<String>,
    #[schema(example = "image/png")]
    pub content_type: String,
    #[schema(example = 48213)]
    pub size: u64,
}
