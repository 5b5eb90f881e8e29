use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingInput {
    Endpoint,
    Message,
    Channel,
}

impl std::fmt::Display for MissingInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingInput::Endpoint => write!(f, "URL is required"),
            MissingInput::Message => write!(f, "Message is required"),
            MissingInput::Channel => {
                write!(f, "Channel is required for sending message using a token")
            }
        }
    }
}

/// Which payload was being delivered when sending failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Raw,
    Structured,
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("Failed to send HTTP request: {0}")]
    Transport(String),

    #[error("Error on message: {status}")]
    Delivery { status: String },

    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Unable to read upload file {}: {source}", .path.display())]
    UploadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for SendError {
    fn from(error: reqwest::Error) -> Self {
        SendError::Transport(error.to_string())
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{0}")]
    MissingInput(MissingInput),

    #[error("Invalid message mode: {0}")]
    UnsupportedMode(String),

    #[error("Error sending message: {source}")]
    Send {
        payload: PayloadKind,
        #[source]
        source: SendError,
    },
}

impl NotifyError {
    pub fn exit_code(&self) -> i32 {
        match self {
            NotifyError::MissingInput(MissingInput::Channel) => 1,
            NotifyError::MissingInput(MissingInput::Endpoint) => 2,
            NotifyError::MissingInput(MissingInput::Message) => 3,
            NotifyError::Send {
                payload: PayloadKind::Raw,
                ..
            } => 5,
            NotifyError::UnsupportedMode(_) => 6,
            NotifyError::Send {
                payload: PayloadKind::Structured,
                ..
            } => 7,
        }
    }
}
