use std::io;
use thiserror::Error;

pub type CourierResult<T> = Result<T, CourierError>;

#[derive(Debug, Error)]
pub enum CourierError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    #[error("connection closed in the middle of the {0}")]
    Truncated(&'static str),

    #[error("short write while sending the {0}")]
    ShortWrite(&'static str),

    #[error("unrecognized opcode: {0}")]
    UnknownOpcode(i32),

    #[error("invalid {field} length: {len}")]
    InvalidLength { field: &'static str, len: i64 },

    #[error("{field} of {len} bytes does not fit its length field")]
    TooLong { field: &'static str, len: usize },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing argument for {0}")]
    MissingArgument(&'static str),

    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
}

impl CourierError {
    /// Text input mistakes are typos; everything else leaves the stream in an
    /// unknown state.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CourierError::UnknownCommand(_)
                | CourierError::MissingArgument(_)
                | CourierError::InvalidNumber(_)
        )
    }

    pub(crate) fn truncated(err: io::Error, field: &'static str) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => CourierError::Truncated(field),
            _ => CourierError::Io(err),
        }
    }

    pub(crate) fn short_write(err: io::Error, what: &'static str) -> Self {
        match err.kind() {
            io::ErrorKind::WriteZero => CourierError::ShortWrite(what),
            _ => CourierError::Io(err),
        }
    }
}
