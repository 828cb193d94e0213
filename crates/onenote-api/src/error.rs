//! Error taxonomy for the OneNote API client.

/// Errors surfaced by [`OneNoteApi`](crate::OneNoteApi) operations.
///
/// Callers are expected to check login state before calling and to present
/// remaining failures to the end user as "could not save/fetch notebook
/// page"; none of these are fatal to the host's own save flows.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// No live access token for the current user.
    #[error("not logged in to a Microsoft account")]
    Auth,

    /// The referenced assignment context is unknown to the host.
    #[error("assignment context {0} not found")]
    NotFound(u64),

    /// The remote service answered with a non-2xx status.
    #[error("OneNote request failed ({status}): {body}")]
    Remote {
        /// HTTP status code of the failed response.
        status: u16,
        /// Body snippet returned with the failure.
        body: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages_name_the_failure() {
        assert_eq!(
            ApiError::Auth.to_string(),
            "not logged in to a Microsoft account"
        );
        assert_eq!(
            ApiError::NotFound(42).to_string(),
            "assignment context 42 not found"
        );
        assert_eq!(
            ApiError::Remote {
                status: 503,
                body: "throttled".to_string(),
            }
            .to_string(),
            "OneNote request failed (503): throttled"
        );
    }
}
