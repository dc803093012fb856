//! JSON envelopes: `{"ok": true, "data": ..}` / `{"ok": false, "error": ..}`.

use crate::errors::AppError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, info};

#[derive(Serialize)]
pub struct OkResponse<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Serialize)]
pub struct ErrResponse {
    pub ok: bool,
    pub error: String,
}

pub fn ok<T: Serialize>(data: T) -> Response {
    Json(OkResponse {
        ok: true,
        data: Some(data),
    })
    .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::AuthFailure | AppError::Unauthenticated => {
                info!(error = %self, "request rejected");
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            e if e.is_client_error() => (StatusCode::BAD_REQUEST, self.to_string()),
            _ => {
                // details stay in the log
                error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrResponse {
                ok: false,
                error: message,
            }),
        )
            .into_response()
    }
}
