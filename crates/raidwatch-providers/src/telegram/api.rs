//! Bot API envelopes and error classification.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, ProviderResult};

pub(crate) const PROVIDER_NAME: &str = "telegram";

static RETRY_AFTER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)retry after (\d+)").expect("Invalid retry-after regex"));

/// The response envelope shared by every Bot API method.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<u16>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

/// The subset of a Bot API `Message` the transport needs.
#[derive(Debug, Deserialize)]
pub(crate) struct SentMessage {
    pub message_id: i64,
}

/// The bot account, as returned by `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    /// Numeric user id of the bot.
    pub id: i64,
    /// Display name.
    pub first_name: String,
    /// `@username` without the leading `@`.
    pub username: Option<String>,
}

/// Maps a failed Bot API call onto a typed error.
///
/// `error_code` is the envelope's `error_code` (or the HTTP status when the
/// body could not be parsed); `retry_after` is `parameters.retry_after` when
/// present. For rate limits without that field the delay is read from the
/// description ("Too Many Requests: retry after N").
pub fn classify_api_error(
    error_code: u16,
    description: &str,
    retry_after: Option<u64>,
) -> ProviderError {
    let lowered = description.to_lowercase();
    let err = match error_code {
        429 => {
            let delay = retry_after.or_else(|| {
                RETRY_AFTER_REGEX
                    .captures(description)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse().ok())
            });
            let err = ProviderError::rate_limited(description);
            match delay {
                Some(secs) => err.with_retry_after(Duration::from_secs(secs)),
                None => err,
            }
        }
        400 if lowered.contains("message is not modified") => {
            ProviderError::not_modified(description)
        }
        400 if lowered.contains("not found") => ProviderError::not_found(description),
        401 => ProviderError::authentication(description),
        403 => ProviderError::authorization(description),
        500..=599 => ProviderError::server(description),
        _ => ProviderError::bad_request(description),
    };
    err.with_provider(PROVIDER_NAME)
}

/// Decodes a Bot API response body.
///
/// `status` is only used when the body is not a valid envelope (e.g. an HTML
/// error page from a proxy).
pub(crate) fn decode_response<T: DeserializeOwned>(
    status: reqwest::StatusCode,
    body: &str,
) -> ProviderResult<T> {
    let envelope: ApiResponse<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => {
            return Err(ProviderError::invalid_response(format!(
                "failed to parse response: {}",
                e
            ))
            .with_provider(PROVIDER_NAME)
            .with_source(e));
        }
        Err(_) => {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            return Err(classify_api_error(status.as_u16(), reason, None));
        }
    };

    if !envelope.ok {
        let code = envelope.error_code.unwrap_or(status.as_u16());
        let description = envelope.description.unwrap_or_default();
        let retry_after = envelope.parameters.and_then(|p| p.retry_after);
        return Err(classify_api_error(code, &description, retry_after));
    }

    envelope.result.ok_or_else(|| {
        ProviderError::invalid_response("response has no result").with_provider(PROVIDER_NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use reqwest::StatusCode;

    #[test]
    fn classify_rate_limit_from_parameters() {
        let err = classify_api_error(429, "Too Many Requests: retry after 9", Some(12));
        assert_eq!(err.code(), ProviderErrorCode::RateLimited);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(12)));
        assert_eq!(err.provider(), Some("telegram"));
    }

    #[test]
    fn classify_rate_limit_from_description() {
        let err = classify_api_error(429, "Too Many Requests: retry after 9", None);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(9)));

        let err = classify_api_error(429, "Too Many Requests", None);
        assert_eq!(err.code(), ProviderErrorCode::RateLimited);
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn classify_not_modified() {
        let err = classify_api_error(
            400,
            "Bad Request: message is not modified: specified new message content and reply markup are exactly the same",
            None,
        );
        assert_eq!(err.code(), ProviderErrorCode::NotModified);
    }

    #[test]
    fn classify_not_found() {
        for description in [
            "Bad Request: message to edit not found",
            "Bad Request: message to pin not found",
        ] {
            let err = classify_api_error(400, description, None);
            assert_eq!(err.code(), ProviderErrorCode::NotFound, "{}", description);
        }
    }

    #[test]
    fn classify_status_codes() {
        let cases = [
            (400, "Bad Request: chat not specified", ProviderErrorCode::BadRequest),
            (401, "Unauthorized", ProviderErrorCode::AuthenticationFailed),
            (403, "Forbidden: bot was kicked", ProviderErrorCode::AuthorizationFailed),
            (409, "Conflict", ProviderErrorCode::BadRequest),
            (502, "Bad Gateway", ProviderErrorCode::ServerError),
        ];
        for (code, description, expected) in cases {
            assert_eq!(classify_api_error(code, description, None).code(), expected);
        }
    }

    #[test]
    fn decode_ok_result() {
        let body = r#"{"ok":true,"result":{"message_id":42,"chat":{"id":1}}}"#;
        let msg: SentMessage = decode_response(StatusCode::OK, body).unwrap();
        assert_eq!(msg.message_id, 42);
    }

    #[test]
    fn decode_error_envelope() {
        let body = r#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 3","parameters":{"retry_after":3}}"#;
        let err = decode_response::<SentMessage>(StatusCode::TOO_MANY_REQUESTS, body).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::RateLimited);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn decode_non_json_error_uses_status() {
        let err =
            decode_response::<SentMessage>(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")
                .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ServerError);
    }

    #[test]
    fn decode_malformed_success_is_invalid_response() {
        let err = decode_response::<SentMessage>(StatusCode::OK, "not json").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);

        let err = decode_response::<SentMessage>(StatusCode::OK, r#"{"ok":true}"#).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }

    #[test]
    fn decode_bot_user() {
        let body = r#"{"ok":true,"result":{"id":7,"is_bot":true,"first_name":"Raids","username":"raids_bot"}}"#;
        let me: BotUser = decode_response(StatusCode::OK, body).unwrap();
        assert_eq!(me.id, 7);
        assert_eq!(me.username.as_deref(), Some("raids_bot"));
    }
}
