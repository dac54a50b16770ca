use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data.
    /// The cut happens on a char boundary - error bodies are arbitrary
    /// server output and may be non-ASCII.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }

        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        )
    }

    /// Build an error from a non-2xx response.
    /// Every non-success status is a failure - 4xx and 5xx alike get no
    /// special-casing at this layer.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Status {
            status,
            body: Self::truncate_body(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_truncates_long_bodies() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body);
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert!(body.len() < 600);
                assert!(body.contains("truncated"));
            }
            other => panic!("unexpected error variant: {:?}", other),
        }
    }

    #[test]
    fn test_from_status_truncates_multibyte_bodies_on_char_boundary() {
        // 200 euro signs = 600 bytes, with a character straddling byte 500
        let body = "€".repeat(200);
        let err = ApiError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body);
        match err {
            ApiError::Status { body, .. } => {
                assert!(body.contains("truncated, 600 total bytes"));
                assert!(body.starts_with('€'));
            }
            other => panic!("unexpected error variant: {:?}", other),
        }
    }

    #[test]
    fn test_from_status_keeps_short_bodies() {
        let err = ApiError::from_status(reqwest::StatusCode::NOT_FOUND, "no such feed");
        match err {
            ApiError::Status { body, .. } => assert_eq!(body, "no such feed"),
            other => panic!("unexpected error variant: {:?}", other),
        }
    }
}
