#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request to fetchd failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("fetchd returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("invalid fetchd base URL: {0}")]
    InvalidUrl(#[from] url::ParseError)
}

impl Error {
    pub fn backend_status(&self) -> Option<u16> {
        match self {
            Error::Backend { status, .. } => Some(*status),
            _ => None
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
