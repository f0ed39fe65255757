use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Invalid image data: {0}")]
    InvalidImageFormat(String),

    #[error("Inference request failed: {message}")]
    RequestFailed {
        /// HTTP status, when the failure carries one.
        status: Option<u16>,
        message: String,
        /// Fragments accumulated before a mid-stream failure.
        partial: Option<String>,
    },
}

impl VisionError {
    pub(crate) fn request_failed(message: impl Into<String>) -> Self {
        VisionError::RequestFailed {
            status: None,
            message: message.into(),
            partial: None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            VisionError::RequestFailed { status, .. } => *status,
            VisionError::InvalidImageFormat(_) => None,
        }
    }

    /// True when the caller can recover by supplying corrected input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, VisionError::InvalidImageFormat(_))
    }
}

impl From<reqwest::Error> for VisionError {
    fn from(e: reqwest::Error) -> Self {
        VisionError::RequestFailed {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
            partial: None,
        }
    }
}
