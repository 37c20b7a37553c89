use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} failed (HTTP {status}): {message}")]
    Status {
        endpoint: &'static str,
        status: u16,
        message: String,
    },

    #[error("{message}")]
    Rejected { message: String },

    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} request was interrupted")]
    Interrupted { endpoint: &'static str },
}

impl ApiError {
    /// Text shown to the user next to the control that triggered the request.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { message } => message.clone(),
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}
