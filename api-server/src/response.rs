use actix_web::{error::InternalError, error::JsonPayloadError, http::StatusCode, HttpResponse};
use zigzagzog_core::LedgerError;

pub(crate) fn json_error_with_code(
    status: StatusCode,
    message: impl Into<String>,
    error_code: Option<&str>,
) -> HttpResponse {
    let mut body = serde_json::json!({
        "success": false,
        "error": message.into(),
    });
    if let Some(code) = error_code {
        body["error_code"] = serde_json::Value::String(code.to_string());
    }
    HttpResponse::build(status).json(body)
}

/// Keeps malformed bodies on the same JSON error shape as everything else.
pub(crate) fn json_payload_error(
    err: JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    let response = json_error_with_code(
        StatusCode::BAD_REQUEST,
        format!("invalid request body: {err}"),
        Some("invalid_json"),
    );
    InternalError::from_response(err, response).into()
}

pub(crate) fn ledger_error(err: &LedgerError) -> HttpResponse {
    match err {
        LedgerError::GameNotFound { .. } => {
            json_error_with_code(StatusCode::NOT_FOUND, err.to_string(), Some("game_not_found"))
        }
        LedgerError::NoCurrentGame => {
            json_error_with_code(StatusCode::NOT_FOUND, err.to_string(), Some("no_current_game"))
        }
        LedgerError::Backend { .. } => {
            tracing::error!("ledger read failed: {err}");
            json_error_with_code(StatusCode::BAD_GATEWAY, err.to_string(), Some("ledger_error"))
        }
    }
}
