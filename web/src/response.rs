//! Success envelope shared by all JSON endpoints.

use serde::Serialize;

/// `{success, data, total?, message?}`, the shape the dashboard consumes.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true`; errors use [`crate::AppError`].
    pub success: bool,
    /// Payload.
    pub data: T,
    /// Number of items, for list payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    /// Human-readable outcome, for actions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Wrap a payload.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            total: None,
            message: None,
        }
    }

    /// Attach a message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Wrap a list, setting `total` to its length.
    pub fn list(data: Vec<T>) -> Self {
        Self {
            success: true,
            total: Some(data.len()),
            data,
            message: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted() {
        let body = serde_json::to_value(ApiResponse::ok(1)).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "data": 1}));
    }

    #[test]
    fn list_sets_total() {
        let body =
            serde_json::to_value(ApiResponse::list(vec!["a", "b"]).with_message("ok")).unwrap();
        assert_eq!(body["total"], 2);
        assert_eq!(body["message"], "ok");
    }
}
