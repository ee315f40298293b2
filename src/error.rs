//! Error type shared by the library and player ports

use std::time::Duration;

/// Failure reported by a [`LibraryPort`](crate::library::LibraryPort) or
/// [`PlayerPort`](crate::player::PlayerPort) call.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("player error: {0}")]
    Engine(String),

    #[error("{0} is not available")]
    Unavailable(&'static str),
}

impl PortError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PortError::Timeout(_))
    }
}

impl From<serde_json::Error> for PortError {
    fn from(err: serde_json::Error) -> Self {
        PortError::Decode(err.to_string())
    }
}

/// Race `fut` against a timer. The first result wins; a losing port call is
/// dropped and its late side effects must be harmless.
pub async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, PortError>
where
    F: std::future::Future<Output = Result<T, PortError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(PortError::Timeout(limit)),
    }
}
