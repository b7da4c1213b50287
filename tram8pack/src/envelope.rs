//! The `envelope` module wraps the linear hex image into the TRAM8 firmware SysEx
//! message.
//!
//! Layout of the message:
//! 1. Header: SysEx start `F0`, manufacturer id `00 29 7F`, tag `T8FW`, version `00`.
//! 2. For every page: a timing gap of [`TIMING_GAP_LEN`] zero bytes, then
//!    [`LINES_PER_PAGE`] record lines copied verbatim from the linear image.
//! 3. A final timing gap.
//! 4. Trailer: the end-of-file record, CRLF and SysEx end `F7`.
//!
//! Record lines are never decoded here. The bootloader parses them itself, so they
//! are forwarded byte for byte, terminators included.

use crate::error::PackError;
use crate::geometry::LINES_PER_PAGE;
use std::io::{BufRead, Write};
use tracing::debug;

pub const SYSEX_START: u8 = 0xF0;
pub const MANUFACTURER_ID: [u8; 3] = [0x00, 0x29, 0x7F];
pub const FIRMWARE_TAG: [u8; 4] = *b"T8FW";
pub const FIRMWARE_VERSION: u8 = 0x00;

/// Header written before the first page.
pub const HEADER: [u8; 9] = [
    SYSEX_START,
    MANUFACTURER_ID[0],
    MANUFACTURER_ID[1],
    MANUFACTURER_ID[2],
    FIRMWARE_TAG[0],
    FIRMWARE_TAG[1],
    FIRMWARE_TAG[2],
    FIRMWARE_TAG[3],
    FIRMWARE_VERSION,
];

/// Zero bytes sent before each page so the device can finish the previous flash write.
pub const TIMING_GAP_LEN: usize = 451;

/// End-of-file record, CRLF and SysEx end.
pub const TRAILER: &[u8] = b":00000001FF\r\n\xF7";

const TIMING_GAP: [u8; TIMING_GAP_LEN] = [0; TIMING_GAP_LEN];

/// Size of an envelope carrying `num_pages` pages of `line_len`-byte record lines.
///
/// # Example
/// ```
/// use tram8pack::envelope::envelope_len;
///
/// assert_eq!(envelope_len(1, 45), 9 + 451 + 4 * 45 + 451 + 14);
/// ```
#[must_use]
pub const fn envelope_len(num_pages: usize, line_len: usize) -> usize {
    HEADER.len()
        + num_pages * (TIMING_GAP_LEN + LINES_PER_PAGE * line_len)
        + TIMING_GAP_LEN
        + TRAILER.len()
}

/// Streams `num_pages` pages worth of record lines from `linear` into `writer`,
/// framed as described in the module docs. Returns the number of bytes written.
///
/// Lines beyond the last page (the linear image's end-of-file record) are left
/// unread.
///
/// # Errors
/// - [`PackError::TruncatedImage`] with the index of the page that could not be
///   completed if `linear` runs out of lines.
/// - [`PackError::Io`] if reading or writing fails.
pub fn encode<R: BufRead, W: Write>(
    mut linear: R,
    mut writer: W,
    num_pages: usize,
) -> Result<usize, PackError> {
    let mut line = Vec::new();

    writer.write_all(&HEADER)?;
    let mut written = HEADER.len();

    for page in 0..num_pages {
        writer.write_all(&TIMING_GAP)?;
        written += TIMING_GAP_LEN;

        for _ in 0..LINES_PER_PAGE {
            line.clear();
            if linear.read_until(b'\n', &mut line)? == 0 {
                return Err(PackError::TruncatedImage { page });
            }
            writer.write_all(&line)?;
            written += line.len();
        }
    }

    writer.write_all(&TIMING_GAP)?;
    writer.write_all(TRAILER)?;
    writer.flush()?;
    written += TIMING_GAP_LEN + TRAILER.len();

    debug!(num_pages, bytes = written, "encoded sysex envelope");
    Ok(written)
}
