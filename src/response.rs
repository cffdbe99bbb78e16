//! Success response envelope.
//!
//! Every successful payload is wrapped as `{success, data, message}` so
//! clients read one shape for both outcomes; the error side of the
//! envelope lives in [`crate::error`].

use serde::Serialize;

/// The standard success envelope.
///
/// ```json
/// {
///   "success": true,
///   "data": { ... },
///   "message": "Found 5 funds"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let envelope = ApiResponse::ok(vec![1, 2, 3], "three numbers");
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["message"], "three numbers");
    }
}
