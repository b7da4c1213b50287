//! The `error` module defines [`PackError`], the failure taxonomy of the packaging
//! pipeline. Every stage fails fast and hands its error to the caller unchanged.

use hexrecord::HexError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    /// The input could not be decoded as Intel HEX records
    #[error(transparent)]
    MalformedRecord(#[from] HexError),
    /// The input defines no byte at all
    #[error("firmware image is empty: no data records found")]
    EmptyFirmware,
    /// A defined byte lies in the bootloader region
    #[error(
        "firmware overlaps the bootloader: byte at 0x{address:04X}, bootloader starts at 0x{boundary:04X}"
    )]
    BoundaryExceeded { address: usize, boundary: usize },
    /// The linear image ran out of lines before the last page was complete
    #[error("linear image truncated: page {page} is incomplete")]
    TruncatedImage { page: usize },
    /// The padded image does not fit the 16-bit record address space
    #[error("firmware ending at 0x{last_addr:X} is too large to package")]
    ImageTooLarge { last_addr: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}
