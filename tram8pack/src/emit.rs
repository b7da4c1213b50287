//! Serialization of the padded image into the linear hex artifact.

use crate::align::PaddedImage;
use crate::error::PackError;
use crate::geometry::{BYTES_PER_LINE, LINE_LEN, RECORD_ADDRESS_SPACE};
use hexrecord::{HexError, LINE_TERMINATOR, Record, RecordType};
use std::io::Write;
use tracing::debug;

/// Writes `image` as fixed-width data records followed by the end-of-file record,
/// every line terminated with CRLF. Returns the number of data records written.
///
/// # Errors
/// - [`PackError::ImageTooLarge`] if the image does not fit 16-bit record addresses.
/// - [`PackError::Io`] if writing fails.
pub fn emit_linear<W: Write>(image: &PaddedImage, mut writer: W) -> Result<usize, PackError> {
    if image.len() > RECORD_ADDRESS_SPACE {
        return Err(PackError::ImageTooLarge {
            last_addr: image.len() - 1,
        });
    }

    let mut lines = 0;
    for (idx, chunk) in image.as_bytes().chunks(BYTES_PER_LINE).enumerate() {
        let address = u16::try_from(idx * BYTES_PER_LINE).map_err(|_| PackError::ImageTooLarge {
            last_addr: image.len() - 1,
        })?;
        let record =
            Record::create(address, RecordType::Data, chunk).map_err(HexError::CreateRecord)?;
        write!(writer, "{record}")?;
        writer.write_all(LINE_TERMINATOR)?;
        lines += 1;
    }

    write!(writer, "{}", Record::end_of_file())?;
    writer.write_all(LINE_TERMINATOR)?;
    writer.flush()?;

    debug!(lines, "emitted linear records");
    Ok(lines)
}

/// In-memory variant of [`emit_linear`].
///
/// # Errors
/// Same as [`emit_linear`].
pub fn linear_bytes(image: &PaddedImage) -> Result<Vec<u8>, PackError> {
    let mut buf = Vec::with_capacity(image.len() / BYTES_PER_LINE * LINE_LEN + 16);
    emit_linear(image, &mut buf)?;
    Ok(buf)
}
