use fieldframe_schema::FieldType;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame was produced for a different stream.
    #[error("stream id mismatch (expected {expected}, found {found})")]
    StreamIdMismatch { expected: u32, found: u32 },

    /// The frame ends before its header or metadata table does.
    #[error("frame truncated ({available} bytes, need {needed})")]
    Truncated { needed: usize, available: usize },

    /// An incoming descriptor points outside the frame's raw data section.
    #[error(
        "field {id} reads past raw data (offset {offset}, length {len}, raw data {available} bytes)"
    )]
    FieldOutOfBounds {
        id: u32,
        offset: usize,
        len: usize,
        available: usize,
    },

    /// The record image does not match the schema's record size.
    #[error("record image is {actual} bytes, schema expects {expected}")]
    RecordSizeMismatch { expected: usize, actual: usize },

    /// The destination buffer cannot hold the encoded frame.
    #[error("buffer too small ({available} bytes, need {needed})")]
    BufferTooSmall { needed: usize, available: usize },

    /// The schema has no field with this name.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A typed access does not match the field's declared type.
    #[error("field '{name}' is {declared}, not {requested}")]
    FieldType {
        name: String,
        declared: FieldType,
        requested: FieldType,
    },

    /// A byte value is longer than the field that should hold it.
    #[error("value for field '{name}' is {len} bytes, field holds {capacity}")]
    ValueTooLong {
        name: String,
        len: usize,
        capacity: usize,
    },
}

impl FrameError {
    /// Status code of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameError::StreamIdMismatch { .. } => ErrorKind::StreamIdMismatch,
            FrameError::Truncated { .. } => ErrorKind::Truncated,
            FrameError::FieldOutOfBounds { .. } => ErrorKind::FieldOutOfBounds,
            FrameError::RecordSizeMismatch { .. } => ErrorKind::RecordSizeMismatch,
            FrameError::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            FrameError::UnknownField(_)
            | FrameError::FieldType { .. }
            | FrameError::ValueTooLong { .. } => ErrorKind::InvalidField,
        }
    }
}

/// Numeric decode status, stable across releases.
///
/// `None` and `StreamIdMismatch` are the protocol's original statuses; the
/// remaining kinds report conditions the decoder refuses instead of reading
/// or writing out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorKind {
    None = 0,
    StreamIdMismatch = 1,
    Truncated = 2,
    FieldOutOfBounds = 3,
    RecordSizeMismatch = 4,
    BufferTooSmall = 5,
    InvalidField = 6,
}

impl ErrorKind {
    /// Status of an operation's result.
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => ErrorKind::None,
            Err(err) => err.kind(),
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_status_codes() {
        assert_eq!(ErrorKind::None.code(), 0);
        assert_eq!(ErrorKind::StreamIdMismatch.code(), 1);
    }

    #[test]
    fn kind_of_result() {
        let ok: Result<()> = Ok(());
        assert_eq!(ErrorKind::of(&ok), ErrorKind::None);

        let err: Result<()> = Err(FrameError::StreamIdMismatch {
            expected: 1,
            found: 2,
        });
        assert_eq!(ErrorKind::of(&err), ErrorKind::StreamIdMismatch);

        let err: Result<()> = Err(FrameError::UnknownField("x".into()));
        assert_eq!(ErrorKind::of(&err), ErrorKind::InvalidField);
    }
}
