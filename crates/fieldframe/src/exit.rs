use std::fmt;
use std::io;

use fieldframe_frame::FrameError;
use fieldframe_schema::SchemaError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    let code = match err {
        FrameError::StreamIdMismatch { .. }
        | FrameError::Truncated { .. }
        | FrameError::FieldOutOfBounds { .. } => DATA_INVALID,
        FrameError::UnknownField(_)
        | FrameError::FieldType { .. }
        | FrameError::ValueTooLong { .. } => USAGE,
        FrameError::RecordSizeMismatch { .. } | FrameError::BufferTooSmall { .. } => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}
