use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Response envelope used by every handler: `{message, data?}`.
///
/// `data` is omitted from the body entirely when absent (delete responses,
/// error-free acknowledgements).
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub data: Option<T>,
    pub status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with a data payload
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            status: StatusCode::OK,
        }
    }

    /// 201 Created with a data payload
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            status: StatusCode::CREATED,
        }
    }

    /// 200 OK, message only
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = json!({ "message": self.message });

        if let Some(data) = self.data {
            match serde_json::to_value(&data) {
                Ok(value) => {
                    envelope["data"] = value;
                }
                Err(e) => {
                    tracing::error!("failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "message": "Failed to serialize response data" })),
                    )
                        .into_response();
                }
            }
        }

        (self.status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_defaults_to_200() {
        let res = ApiResponse::success("All products", vec![1, 2, 3]);
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.data, Some(vec![1, 2, 3]));
    }

    #[test]
    fn created_sets_201() {
        let res = ApiResponse::created("Created successfully", json!({"id": 1}));
        assert_eq!(res.status, StatusCode::CREATED);
    }

    #[test]
    fn message_only_has_no_data() {
        let res = ApiResponse::<()>::message("Product deleted successfully");
        assert!(res.data.is_none());
        assert_eq!(res.status, StatusCode::OK);
    }
}
