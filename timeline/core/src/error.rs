use thiserror::Error;

/// Status line shown when the timeline asset cannot be downloaded.
pub const DOWNLOAD_FAILED: &str = "Download of asset failed.";

/// Hint appended when the request never produced a usable status,
/// which in practice means the remote host did not send CORS headers.
pub const CORS_HINT: &str = "CORS headers likely not applied.";

/// Failure of a single asset download.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never completed, so no status is known.
    #[error("request never completed (status unknown): {reason}")]
    Transport { reason: String },

    /// The request completed with a status other than 200 or 304.
    #[error("request completed with status {status}: {reason}")]
    HttpStatus { status: u16, reason: String },
}

impl FetchError {
    pub fn transport(reason: impl Into<String>) -> Self {
        FetchError::Transport {
            reason: reason.into(),
        }
    }

    /// Final response status, `None` when the transfer never completed.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport { .. } => None,
            FetchError::HttpStatus { status, .. } => Some(*status),
        }
    }

    pub fn is_status_unknown(&self) -> bool {
        self.status().is_none()
    }

    /// Text for the viewer's status line.
    pub fn user_message(&self) -> String {
        if self.is_status_unknown() {
            format!("{DOWNLOAD_FAILED} {CORS_HINT}")
        } else {
            DOWNLOAD_FAILED.to_string()
        }
    }
}

/// Errors surfaced by the loader facade.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid url: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("asset download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("native loader failed: {0}")]
    NativeLoader(String),

    #[error("panel unavailable: {0}")]
    PanelUnavailable(String),

    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, LoadError>;
