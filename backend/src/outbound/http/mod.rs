//! Shared reqwest plumbing for upstream HTTP adapters.
//!
//! Both upstream services fail in the same ways at the HTTP level,
//! so classification lives here and each adapter maps [`UpstreamFailure`]
//! into its own port error.

use reqwest::StatusCode;

/// Upstream failure category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UpstreamFailure {
    Transport(String),
    Timeout(String),
    RateLimited(String),
    InvalidRequest(String),
}

/// Classify a reqwest send/read error.
pub(crate) fn transport_failure(error: &reqwest::Error) -> UpstreamFailure {
    if error.is_timeout() {
        UpstreamFailure::Timeout(error.to_string())
    } else {
        UpstreamFailure::Transport(error.to_string())
    }
}

/// Classify a non-success status, keeping a short body preview for logs.
pub(crate) fn status_failure(status: StatusCode, body: &[u8]) -> UpstreamFailure {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => UpstreamFailure::RateLimited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            UpstreamFailure::Timeout(message)
        }
        _ if status.is_client_error() => UpstreamFailure::InvalidRequest(message),
        _ => UpstreamFailure::Transport(message),
    }
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
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "rate_limited")]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, "timeout")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "timeout")]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, "invalid_request")]
    #[case::server_error(StatusCode::BAD_GATEWAY, "transport")]
    fn statuses_map_to_categories(#[case] status: StatusCode, #[case] expected: &str) {
        let category = match status_failure(status, b"{}") {
            UpstreamFailure::RateLimited(_) => "rate_limited",
            UpstreamFailure::Timeout(_) => "timeout",
            UpstreamFailure::InvalidRequest(_) => "invalid_request",
            UpstreamFailure::Transport(_) => "transport",
        };
        assert_eq!(category, expected);
    }

    #[rstest]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(400);
        let UpstreamFailure::Transport(message) =
            status_failure(StatusCode::INTERNAL_SERVER_ERROR, body.as_bytes())
        else {
            panic!("expected transport failure");
        };
        assert!(message.ends_with("..."));
        assert!(message.len() < 200);
    }

    #[rstest]
    fn empty_bodies_only_report_status() {
        assert_eq!(
            status_failure(StatusCode::BAD_REQUEST, b"  "),
            UpstreamFailure::InvalidRequest("status 400".to_owned())
        );
    }
}
