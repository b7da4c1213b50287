//! Page alignment: turns the sparse source image into a dense image covering a
//! whole number of flash pages.

use crate::error::PackError;
use crate::geometry::{LINES_PER_PAGE, PAD_BYTE, PAGE_SIZE};
use hexrecord::MemoryImage;
use tracing::debug;

/// Number of pages and padded length derived from the last defined address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub num_pages: usize,
    pub total_length: usize,
}

impl PageLayout {
    /// `num_pages = ceil((last_addr + 1) / PAGE_SIZE)`, `total_length = num_pages * PAGE_SIZE`.
    ///
    /// # Errors
    /// Returns [`PackError::ImageTooLarge`] if the arithmetic overflows.
    ///
    /// # Example
    /// ```
    /// use tram8pack::PageLayout;
    ///
    /// let layout = PageLayout::from_last_addr(0x40).unwrap();
    /// assert_eq!(layout.num_pages, 2);
    /// assert_eq!(layout.total_length, 128);
    /// ```
    pub fn from_last_addr(last_addr: usize) -> Result<Self, PackError> {
        let too_large = PackError::ImageTooLarge { last_addr };
        let Some(used) = last_addr.checked_add(1) else {
            return Err(too_large);
        };
        let num_pages = used.div_ceil(PAGE_SIZE);
        let Some(total_length) = num_pages.checked_mul(PAGE_SIZE) else {
            return Err(too_large);
        };

        Ok(Self {
            num_pages,
            total_length,
        })
    }

    /// Data records needed to carry the padded image.
    #[must_use]
    pub const fn data_lines(&self) -> usize {
        self.num_pages * LINES_PER_PAGE
    }

    /// Layout grown by one blank page, if that page still ends at or below `boundary`.
    #[must_use]
    pub fn with_spare_page(self, boundary: usize) -> Option<Self> {
        let total_length = self.total_length.checked_add(PAGE_SIZE)?;
        (total_length <= boundary).then_some(Self {
            num_pages: self.num_pages + 1,
            total_length,
        })
    }
}

/// Dense image starting at address 0 whose length is a multiple of [`PAGE_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedImage {
    bytes: Vec<u8>,
}

impl PaddedImage {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pages in load order.
    pub fn pages(&self) -> std::slice::ChunksExact<'_, u8> {
        self.bytes.chunks_exact(PAGE_SIZE)
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Copies the source image into `[0, layout.total_length)`, filling every
/// undefined address with [`PAD_BYTE`].
#[must_use]
pub fn pad(image: &MemoryImage, layout: &PageLayout) -> PaddedImage {
    let bytes = image.to_dense(0..layout.total_length, PAD_BYTE);
    debug!(
        num_pages = layout.num_pages,
        total_length = layout.total_length,
        defined = image.len(),
        "padded firmware image"
    );
    PaddedImage { bytes }
}
