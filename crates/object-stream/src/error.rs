//! Object stream decoder error type.

use lstasko_buffers::BufferError;
use thiserror::Error;

use crate::types::Handle;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectStreamError {
    #[error("unexpected end of stream: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEndOfStream { needed: usize, remaining: usize },
    #[error("bad stream magic {0:#06x}")]
    BadMagic(u16),
    #[error("unsupported stream version {0}")]
    UnsupportedVersion(u16),
    #[error("unexpected type code {tag:#04x} at offset {offset}")]
    UnexpectedTag { tag: u8, offset: usize },
    #[error("unresolved handle {0}")]
    UnresolvedHandle(Handle),
    #[error("handle {handle} does not refer to a {expected}")]
    HandleKind {
        handle: Handle,
        expected: &'static str,
    },
    #[error("invalid field type code {0:#04x}")]
    InvalidFieldType(u8),
    #[error("invalid UTF-8 in stream")]
    InvalidUtf8,
    #[error("unsupported stream construct: {0}")]
    Unsupported(&'static str),
    #[error("content nesting deeper than {0}")]
    DepthExceeded(usize),
    #[error("stream assigns more than {0} handles")]
    TooManyHandles(usize),
}

impl From<BufferError> for ObjectStreamError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::UnexpectedEndOfStream { needed, remaining } => {
                ObjectStreamError::UnexpectedEndOfStream { needed, remaining }
            }
            BufferError::InvalidUtf8 => ObjectStreamError::InvalidUtf8,
            BufferError::SeekOutOfBounds(position) => ObjectStreamError::UnexpectedEndOfStream {
                needed: position,
                remaining: 0,
            },
        }
    }
}
