//! The `pipeline` module runs the packaging stages in order:
//! parse → validate → align → emit (linear hex) → encode (SysEx).
//!
//! [`pack_bytes`] works purely in memory. [`package_firmware`] does the same against
//! the filesystem: the linear file is written first and then read back as the
//! input of the envelope encoder. Nothing is created on disk until the image has
//! passed validation; a failure while writing leaves partial files behind and the
//! caller is expected to discard them.

use crate::align::{self, PageLayout, PaddedImage};
use crate::boundary;
use crate::config::PackOptions;
use crate::emit;
use crate::envelope;
use crate::error::PackError;
use crate::geometry::{LINE_LEN, LINES_PER_PAGE};
use hexrecord::MemoryImage;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of an in-memory packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Highest address defined by the source image
    pub last_addr: usize,
    pub layout: PageLayout,
    /// Dense Intel HEX image, 16-byte records, CRLF terminated
    pub linear: Vec<u8>,
    /// SysEx message ready to be sent to the device
    pub envelope: Vec<u8>,
}

/// Files written by [`package_firmware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub linear_path: PathBuf,
    pub sysex_path: PathBuf,
    pub last_addr: usize,
    pub layout: PageLayout,
    /// Size of the SysEx file in bytes
    pub sysex_len: usize,
}

/// Parse, validate and align. Shared by the in-memory and the file based runs.
fn prepare(
    raw_hex: &[u8],
    options: &PackOptions,
) -> Result<(usize, PageLayout, PaddedImage), PackError> {
    let image = MemoryImage::parse(raw_hex)?;
    let last_addr = boundary::validate(&image, options.boundary)?;

    let mut layout = PageLayout::from_last_addr(last_addr)?;
    if options.spare_page {
        match layout.with_spare_page(options.boundary) {
            Some(grown) => layout = grown,
            None => warn!(
                num_pages = layout.num_pages,
                boundary = options.boundary,
                "no room for a spare page below the bootloader"
            ),
        }
    }

    let padded = align::pad(&image, &layout);
    Ok((last_addr, layout, padded))
}

/// Packages the raw contents of an Intel HEX file in memory.
///
/// # Errors
/// Returns the first error raised by any stage, see [`PackError`].
///
/// # Example
/// ```
/// use tram8pack::{PackOptions, pack_bytes};
///
/// let package = pack_bytes(b":01000000AA55\r\n:00000001FF\r\n", &PackOptions::default()).unwrap();
///
/// assert_eq!(package.layout.num_pages, 1);
/// assert_eq!(package.envelope[0], 0xF0);
/// assert_eq!(package.envelope.last(), Some(&0xF7));
/// ```
pub fn pack_bytes(raw_hex: &[u8], options: &PackOptions) -> Result<Package, PackError> {
    let (last_addr, layout, padded) = prepare(raw_hex, options)?;

    let linear = emit::linear_bytes(&padded)?;

    let mut sysex = Vec::with_capacity(envelope::envelope_len(layout.num_pages, LINE_LEN));
    envelope::encode(linear.as_slice(), &mut sysex, layout.num_pages)?;

    Ok(Package {
        last_addr,
        layout,
        linear,
        envelope: sysex,
    })
}

/// Packages the Intel HEX file at `hex_path` into `<stem>_linear.hex` and
/// `<stem>_firmware.syx` (see [`PackOptions::output_paths`]).
///
/// The output directory must exist.
///
/// # Errors
/// Returns the first error raised by any stage, see [`PackError`].
pub fn package_firmware(hex_path: &Path, options: &PackOptions) -> Result<Artifacts, PackError> {
    let raw_hex = std::fs::read(hex_path)?;
    let (last_addr, layout, padded) = prepare(&raw_hex, options)?;
    let (linear_path, sysex_path) = options.output_paths(hex_path);

    // Emit the linear image
    let lines = emit::emit_linear(&padded, BufWriter::new(File::create(&linear_path)?))?;
    if lines != layout.data_lines() {
        return Err(PackError::TruncatedImage {
            page: lines / LINES_PER_PAGE,
        });
    }

    // Read it back into the envelope
    let linear = BufReader::new(File::open(&linear_path)?);
    let sysex = BufWriter::new(File::create(&sysex_path)?);
    let sysex_len = envelope::encode(linear, sysex, layout.num_pages)?;

    info!(
        input = %hex_path.display(),
        sysex = %sysex_path.display(),
        last_addr,
        num_pages = layout.num_pages,
        sysex_len,
        "packaged firmware"
    );

    Ok(Artifacts {
        linear_path,
        sysex_path,
        last_addr,
        layout,
        sysex_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PAGE_SIZE;

    #[test]
    fn test_pack_bytes_single_byte() {
        // Act
        let package = pack_bytes(b":01000000AA55\n", &PackOptions::default()).unwrap();

        // Assert
        assert_eq!(package.last_addr, 0);
        assert_eq!(package.layout.total_length, PAGE_SIZE);
        assert_eq!(package.linear.len(), 4 * LINE_LEN + ":00000001FF\r\n".len());
        assert_eq!(
            package.envelope.len(),
            envelope::envelope_len(1, LINE_LEN)
        );
    }

    #[test]
    fn test_pack_bytes_spare_page() {
        // Arrange
        let options = PackOptions::default().with_spare_page(true);

        // Act
        let package = pack_bytes(b":01000000AA55\n", &options).unwrap();

        // Assert
        assert_eq!(package.layout.num_pages, 2);
        let image = MemoryImage::parse(&package.linear).unwrap();
        assert_eq!(image.max_addr(), Some(2 * PAGE_SIZE - 1));
        assert_eq!(image.get(0x40), Some(0xFF));
    }

    #[test]
    fn test_pack_bytes_spare_page_without_room() {
        // Arrange: the firmware ends on the last page below a tight boundary
        let options = PackOptions::default()
            .with_boundary(0x40)
            .with_spare_page(true);

        // Act
        let package = pack_bytes(b":01003F00AA16\n", &options).unwrap();

        // Assert
        assert_eq!(package.layout.num_pages, 1);
    }

    #[test]
    fn test_pack_bytes_errors() {
        let options = PackOptions::default();

        assert!(matches!(
            pack_bytes(b"", &options),
            Err(PackError::EmptyFirmware)
        ));
        assert!(matches!(
            pack_bytes(b":01000000AA00\n", &options),
            Err(PackError::MalformedRecord(_))
        ));
        assert!(matches!(
            pack_bytes(b":011C0000AA39\n", &options),
            Err(PackError::BoundaryExceeded {
                address: 0x1C00,
                boundary: 0x1C00
            })
        ));
    }
}
