use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope of the persisted-store endpoints and of every error response.
///
/// The region and aggregate searches answer with their own
/// `{status, results}` shape instead.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    /// Number of items in `data`
    pub total: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    /// Success carrying `data` and its item count
    pub fn with_total(data: T, total: usize) -> Self {
        Self::success(
            Some(data),
            None,
            Some(Meta {
                total: i64::try_from(total).unwrap_or(i64::MAX),
            }),
        )
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}
