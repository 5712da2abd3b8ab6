//! Request DTOs for the Web API.

use utoipa::ToSchema;

/// Multipart form accepted by `POST /upload`.
///
/// Only used to describe the request in the OpenAPI document; the handler
/// reads the parts directly.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// The file to store.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
