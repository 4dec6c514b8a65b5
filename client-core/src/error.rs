use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("union {0} is not in the caller's membership set")]
    UnknownUnion(String),

    #[error("no timeline entry with the given id")]
    UnknownEntry,

    #[error("entry is not in a failed state")]
    NotFailed,

    #[error("membership fetch failed: {0}")]
    Directory(String),
}
