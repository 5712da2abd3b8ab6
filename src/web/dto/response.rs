//! Response DTOs for the Web API.

use serde::Serialize;
use utoipa::ToSchema;

/// Response to a successful upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Confirmation message.
    pub message: String,
    /// Identifier of the new file record.
    pub file_id: String,
    /// SHA-256 of the uploaded bytes, lowercase hex.
    pub hash: String,
}

impl UploadResponse {
    /// Create an upload response for a stored file.
    pub fn new(file_id: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            message: "File uploaded successfully".to_string(),
            file_id: file_id.into(),
            hash: hash.into(),
        }
    }
}

/// Plain confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Confirmation message.
    pub message: String,
}

impl MessageResponse {
    /// Create a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_keys() {
        let json = serde_json::to_value(UploadResponse::new("abc", "ff00")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "File uploaded successfully",
                "fileId": "abc",
                "hash": "ff00",
            })
        );
    }

    #[test]
    fn test_message_response() {
        let json = serde_json::to_value(MessageResponse::new("File deleted successfully")).unwrap();
        assert_eq!(json["message"], "File deleted successfully");
    }
}
