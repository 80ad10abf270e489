//! Binary buffer utilities for lstasko.
//!
//! This crate provides the bounds-checked byte cursor the object-stream
//! decoders are built on, plus a small writer used to assemble fixtures.
//!
//! # Overview
//!
//! - [`Reader`] - Reads big-endian data from a byte slice with cursor tracking
//! - [`Writer`] - Writes big-endian data to an auto-growing buffer
//! - [`print_octets`] - Hex formatting for diagnostics
//!
//! # Example
//!
//! ```
//! use lstasko_buffers::{Reader, Writer};
//!
//! // Write some data
//! let mut writer = Writer::new();
//! writer.u8(0x01);
//! writer.u16(0x0203);
//! writer.utf8("hello");
//! let data = writer.flush();
//!
//! // Read it back
//! let mut reader = Reader::new(&data);
//! assert_eq!(reader.u8().unwrap(), 0x01);
//! assert_eq!(reader.u16().unwrap(), 0x0203);
//! assert_eq!(reader.utf8(5).unwrap(), "hello");
//! assert!(reader.u8().is_err());
//! ```

mod print_octets;
mod reader;
mod writer;

pub use print_octets::print_octets;
pub use reader::Reader;
pub use writer::Writer;

use thiserror::Error;

/// Error type for buffer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the end of the buffer.
    #[error("unexpected end of stream: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEndOfStream { needed: usize, remaining: usize },
    /// Invalid UTF-8 sequence.
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    /// Seek target lies outside the buffer.
    #[error("seek to {0} is out of bounds")]
    SeekOutOfBounds(usize),
}
