//! # `hexrecord`
//!
//! `hexrecord` parses Intel HEX text into a sparse memory image and creates
//! Intel HEX records from raw bytes.
//!
//! The library provides:
//! - Record codec (via [`Record`] and [`RecordType`]).
//! - Sparse address → byte map (via [`MemoryImage`]).
//! - Error handling with [`HexError`].
//!
//! ## Example
//!
//! ```
//! use hexrecord::{MemoryImage, Record, RecordType};
//!
//! let image = MemoryImage::parse(b":02000000AABB99\r\n:00000001FF\r\n").unwrap();
//! assert_eq!(image.max_addr(), Some(1));
//!
//! let record = Record::create(0, RecordType::Data, &[0xAA, 0xBB]).unwrap();
//! assert_eq!(record.to_string(), ":02000000AABB99");
//! ```

mod error;
mod image;
mod record;

// Public APIs
pub use error::{HexError, HexErrorKind};
pub use image::MemoryImage;
pub use record::{LINE_TERMINATOR, Record, RecordType};
