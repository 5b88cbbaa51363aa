use {
    ironbox_protocol::{BlockId, ConfigurationError},
    reqwest::StatusCode,
    std::{io, path::PathBuf},
    thiserror::Error,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure classes of the upload pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid input, detected before any I/O.
    Configuration,
    /// Local file absent or failed to read or write.
    LocalIo,
    /// The service or the storage answered with a non-success status, or could not be reached.
    RemoteTransport,
    /// A success response carried an unusable payload.
    ProtocolData,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("invalid request URL `{url}`")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("file does not exist at path {0:?}")]
    FileNotFound(PathBuf),
    #[error("unable to encrypt local copy of file")]
    Encrypt(#[source] io::Error),
    #[error("unable to read block {index} of the encrypted file")]
    ReadBlock {
        index: usize,
        #[source]
        source: io::Error,
    },
    #[error("file size {size} exceeds the maximum blob size of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },
    #[error("local I/O failed")]
    Io(#[from] io::Error),
    #[error("unable to upload file block {block_id} (status {status})")]
    BlockUpload { block_id: BlockId, status: StatusCode },
    #[error("unable to upload blob (status {status})")]
    CommitBlockList { status: StatusCode },
    #[error("{endpoint} request failed with status {status}")]
    ServiceUnavailable {
        endpoint: &'static str,
        status: StatusCode,
    },
    #[error("request failed")]
    Transport(#[from] reqwest::Error),
    #[error("{endpoint} call returned invalid data: {reason}")]
    InvalidResponse {
        endpoint: &'static str,
        reason: String,
    },
}

impl Error {
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::InvalidUrl { .. } => ErrorKind::Configuration,
            Self::FileNotFound(_)
            | Self::Encrypt(_)
            | Self::ReadBlock { .. }
            | Self::FileTooLarge { .. }
            | Self::Io(_) => ErrorKind::LocalIo,
            Self::BlockUpload { .. }
            | Self::CommitBlockList { .. }
            | Self::ServiceUnavailable { .. }
            | Self::Transport(_) => ErrorKind::RemoteTransport,
            Self::InvalidResponse { .. } => ErrorKind::ProtocolData,
        }
    }

    /// True if the request never got a response, so sending it again may succeed.
    #[must_use]
    #[inline]
    pub fn is_transport_failure(&self) -> bool {
        if let Self::Transport(err) = self {
            err.is_connect() || err.is_timeout() || err.is_request()
        } else {
            false
        }
    }
}
