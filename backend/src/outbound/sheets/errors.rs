//! Transport and status mapping into [`SpreadsheetError`].

use reqwest::StatusCode;

use super::dto::ApiErrorEnvelope;
use crate::domain::ports::SpreadsheetError;

pub(super) fn map_transport_error(error: reqwest::Error) -> SpreadsheetError {
    if error.is_timeout() {
        SpreadsheetError::timeout(error.to_string())
    } else if error.is_connect() {
        SpreadsheetError::unreachable(error.to_string())
    } else if error.is_decode() {
        SpreadsheetError::decode(error.to_string())
    } else {
        SpreadsheetError::transport(error.to_string())
    }
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> SpreadsheetError {
    let detail = error_detail(body);
    let message = if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {detail}", status.as_u16())
    };

    match status {
        StatusCode::UNAUTHORIZED => SpreadsheetError::credentials(message),
        StatusCode::FORBIDDEN => SpreadsheetError::permission_denied(message),
        StatusCode::NOT_FOUND => SpreadsheetError::not_found(message),
        StatusCode::TOO_MANY_REQUESTS => SpreadsheetError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            SpreadsheetError::timeout(message)
        }
        _ if status.is_client_error() => SpreadsheetError::rejected(message),
        _ => SpreadsheetError::transport(message),
    }
}

/// Token endpoint failures other than throttling mean the key was refused.
pub(super) fn map_token_status_error(status: StatusCode, body: &[u8]) -> SpreadsheetError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SpreadsheetError::credentials(format!(
                "token request refused with status {}: {}",
                status.as_u16(),
                error_detail(body)
            ))
        }
        _ => map_status_error(status, body),
    }
}

fn error_detail(body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<ApiErrorEnvelope>(body) {
        return match envelope.error.status {
            Some(code) if !code.is_empty() => format!("{code}: {}", envelope.error.message),
            _ => envelope.error.message,
        };
    }
    body_preview(body)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, "Credentials")]
    #[case::forbidden(StatusCode::FORBIDDEN, "PermissionDenied")]
    #[case::missing(StatusCode::NOT_FOUND, "NotFound")]
    #[case::throttled(StatusCode::TOO_MANY_REQUESTS, "RateLimited")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::bad_range(StatusCode::BAD_REQUEST, "Rejected")]
    #[case::server_error(StatusCode::BAD_GATEWAY, "Transport")]
    fn maps_api_statuses(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, b"");
        let matched = match expected {
            "Credentials" => matches!(error, SpreadsheetError::Credentials { .. }),
            "PermissionDenied" => matches!(error, SpreadsheetError::PermissionDenied { .. }),
            "NotFound" => matches!(error, SpreadsheetError::NotFound { .. }),
            "RateLimited" => matches!(error, SpreadsheetError::RateLimited { .. }),
            "Timeout" => matches!(error, SpreadsheetError::Timeout { .. }),
            "Rejected" => matches!(error, SpreadsheetError::Rejected { .. }),
            "Transport" => matches!(error, SpreadsheetError::Transport { .. }),
            _ => panic!("unsupported expectation: {expected}"),
        };
        assert!(matched, "{status} should map to {expected}, got {error:?}");
    }

    #[test]
    fn extracts_google_error_message() {
        let body = br#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
        let error = map_status_error(StatusCode::FORBIDDEN, body);
        assert_eq!(
            error,
            SpreadsheetError::permission_denied(
                "status 403: PERMISSION_DENIED: The caller does not have permission"
            )
        );
    }

    #[test]
    fn token_refusal_is_a_credentials_error() {
        let error = map_token_status_error(StatusCode::BAD_REQUEST, b"{\"error\":\"invalid_grant\"}");
        assert!(matches!(error, SpreadsheetError::Credentials { .. }));
    }

    #[test]
    fn truncates_long_bodies() {
        let body = "x ".repeat(400);
        let error = map_status_error(StatusCode::BAD_GATEWAY, body.as_bytes());
        assert!(error.to_string().ends_with("..."));
    }
}
