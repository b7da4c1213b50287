//! Gate that keeps the firmware out of the bootloader region.

use crate::error::PackError;
use hexrecord::MemoryImage;
use tracing::debug;

/// Checks that every defined byte lies below `boundary` and returns the highest
/// defined address.
///
/// # Errors
/// - [`PackError::EmptyFirmware`] if the image defines no byte.
/// - [`PackError::BoundaryExceeded`] with the first defined address at or above
///   `boundary`.
///
/// # Example
/// ```
/// use hexrecord::MemoryImage;
/// use tram8pack::boundary;
///
/// let mut image = MemoryImage::new();
/// image.insert_slice(0x00, &[0xAA; 16]).unwrap();
///
/// assert_eq!(boundary::validate(&image, 0x1C00).unwrap(), 0x0F);
/// ```
pub fn validate(image: &MemoryImage, boundary: usize) -> Result<usize, PackError> {
    if let Some(address) = image.first_defined_at_or_above(boundary) {
        return Err(PackError::BoundaryExceeded { address, boundary });
    }
    let last_addr = image.max_addr().ok_or(PackError::EmptyFirmware)?;

    debug!(last_addr, boundary, "firmware fits below bootloader");
    Ok(last_addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BOOTLOADER_START;

    #[test]
    fn test_validate_returns_last_addr() {
        // Arrange
        let mut image = MemoryImage::new();
        image.insert_slice(0x100, &[0; 8]).unwrap();
        image.insert(0x20, 0).unwrap();

        // Act
        let res = validate(&image, BOOTLOADER_START);

        // Assert
        assert_eq!(res.unwrap(), 0x107);
    }

    #[test]
    fn test_validate_last_byte_below_boundary() {
        let mut image = MemoryImage::new();
        image.insert(BOOTLOADER_START - 1, 0).unwrap();

        assert_eq!(validate(&image, BOOTLOADER_START).unwrap(), 0x1BFF);
    }

    #[test]
    fn test_validate_byte_on_boundary() {
        // Arrange
        let mut image = MemoryImage::new();
        image.insert_slice(0, &[1, 2, 3]).unwrap();
        image.insert(0x1C00, 0).unwrap();

        // Act
        let res = validate(&image, 0x1C00);

        // Assert
        assert!(matches!(
            res,
            Err(PackError::BoundaryExceeded {
                address: 0x1C00,
                boundary: 0x1C00
            })
        ));
    }

    #[test]
    fn test_validate_reports_first_offending_address() {
        // Arrange
        let mut image = MemoryImage::new();
        image.insert_slice(0x1BF0, &[0; 0x20]).unwrap();
        image.insert(0x8000, 0).unwrap();

        // Act
        let res = validate(&image, 0x1C00);

        // Assert
        assert!(matches!(
            res,
            Err(PackError::BoundaryExceeded { address: 0x1C00, .. })
        ));
    }

    #[test]
    fn test_validate_empty_image() {
        let res = validate(&MemoryImage::new(), BOOTLOADER_START);
        assert!(matches!(res, Err(PackError::EmptyFirmware)));
    }
}
