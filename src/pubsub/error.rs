use crate::discovery::DispatchError;
use crate::gcp::auth::AuthError;
use crate::gcp::http::{HttpError, TransportError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(#[source] HttpError),
    #[error("already exists: {0}")]
    AlreadyExists(#[source] HttpError),
    #[error("acknowledge failed: {0}")]
    Acknowledge(#[source] HttpError),
    #[error("invalid message payload: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("unexpected response: {0}")]
    InvalidResponse(#[source] serde_json::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Dispatch(DispatchError),
}

impl Error {
    /// Only not-found, already-exists and token failures are singled out;
    /// everything else stays a [`DispatchError`].
    pub(crate) fn classify(err: DispatchError) -> Self {
        let err = match err {
            DispatchError::Transport(TransportError::Auth(e)) => return Self::Auth(e),
            err => err,
        };
        let Some(http) = err.http_error() else {
            return Self::Dispatch(err);
        };

        match http.status_code() {
            404 if http.mentions("not found") => Self::NotFound(http.clone()),
            409 if http.mentions("already exists") => Self::AlreadyExists(http.clone()),
            _ => Self::Dispatch(err),
        }
    }

    pub fn http_error(&self) -> Option<&HttpError> {
        match self {
            Self::NotFound(e) | Self::AlreadyExists(e) | Self::Acknowledge(e) => Some(e),
            Self::Dispatch(e) => e.http_error(),
            _ => None,
        }
    }
}

impl From<DispatchError> for Error {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}
