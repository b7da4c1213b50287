//! The `error` module defines the [`HexError`] enum that describes the errors that
//! can occur when parsing Intel HEX text into a [`MemoryImage`](crate::MemoryImage)
//! or when creating records from raw bytes.
//! It carries three pieces of information:
//! 1. When the error occurs, e.g., during parsing or creating the record.
//! 2. What kind of error was encountered (via [`HexErrorKind`]).
//! 3. What is the line number (if applicable), e.g., at which line the parsing failed.

use crate::record::RecordType;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    #[error("malformed record at line #{line}: {kind}")]
    MalformedRecord { kind: HexErrorKind, line: usize },
    #[error("cannot create hex record: {0}")]
    CreateRecord(HexErrorKind),
    #[error("cannot update memory image: {0}")]
    Update(HexErrorKind),
}

impl HexError {
    /// Line number the error points at, if it came from parsing.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedRecord { line, .. } => Some(*line),
            _ => None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &HexErrorKind {
        match self {
            Self::MalformedRecord { kind, .. } | Self::CreateRecord(kind) | Self::Update(kind) => {
                kind
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexErrorKind {
    /// Record does not begin with a ':'
    #[error("missing start code ':'")]
    MissingStartCode,
    /// Record contains non-hexadecimal characters
    #[error("record contains invalid character(s)")]
    ContainsInvalidCharacters,
    #[error("record too short")]
    RecordTooShort,
    #[error("record too long")]
    RecordTooLong,
    #[error("record with uneven length")]
    RecordNotEvenLength,
    /// Record's payload length does not match the record type
    #[error("for record type {0:?} expected data length is {1} bytes, found {2}")]
    RecordLengthInvalidForType(RecordType, usize, usize),
    /// Record's address does not match the record type
    #[error("for record type {0:?} expected address is 0x{1:X}, found 0x{2:X}")]
    RecordAddressInvalidForType(RecordType, usize, usize),
    /// Checksum mismatch (expected, found)
    #[error("invalid record checksum - expected: 0x{0:02X}, found: 0x{1:02X}")]
    RecordChecksumMismatch(u8, u8),
    #[error("payload (data bytes) size differs from record's length")]
    RecordInvalidPayloadLength,
    #[error("invalid record type")]
    InvalidRecordType,
    /// Encountered address that already contains data
    #[error("encountered duplicate address: 0x{0:X}")]
    AddressOverlap(usize),
    /// Address does not fit the target address space
    #[error("address out of range: 0x{0:X}")]
    AddressOutOfRange(usize),
}
