//! Types returned by image hosts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The host's record of an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Host-assigned identifier.
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub uploaded: Option<DateTime<Utc>>,
    /// Delivery URLs, one per configured variant.
    #[serde(default)]
    pub variants: Vec<String>,
}

/// Cloudflare API response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

impl ApiMessage {
    pub(crate) fn render(&self) -> String {
        format!("{} ({})", self.message, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_envelope() {
        let body = r#"{
            "result": {
                "id": "2cdc28f0-017a-49c4-9ed7-87056c83901",
                "filename": "cedar-01.jpg",
                "uploaded": "2024-03-01T12:00:00Z",
                "requireSignedURLs": false,
                "variants": ["https://imagedelivery.net/hash/2cdc28f0/public"]
            },
            "success": true,
            "errors": [],
            "messages": []
        }"#;
        let envelope: Envelope<UploadedImage> = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        let image = envelope.result.unwrap();
        assert_eq!(image.filename, "cedar-01.jpg");
        assert_eq!(image.variants.len(), 1);
    }

    #[test]
    fn test_parse_error_envelope() {
        let body = r#"{
            "result": null,
            "success": false,
            "errors": [{"code": 5400, "message": "Bad request"}],
            "messages": []
        }"#;
        let envelope: Envelope<UploadedImage> = serde_json::from_str(body).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.errors[0].render(), "Bad request (5400)");
    }
}
