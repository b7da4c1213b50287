//! # `tram8pack`
//!
//! `tram8pack` packages Intel HEX firmware for the TRAM8 module into the SysEx
//! message understood by its MIDI bootloader.
//!
//! The firmware is padded with `0xFF` to whole 64-byte flash pages, written back as
//! a dense Intel HEX file with 16-byte records (the *linear* image), and the record
//! lines of that file are framed page by page into the SysEx message, separated by
//! timing gaps that give the device time to write each page.
//!
//! ## Example
//!
//! ```
//! use tram8pack::{PackOptions, pack_bytes};
//!
//! let hex = b":10000000AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA50\r\n:00000001FF\r\n";
//! let package = pack_bytes(hex, &PackOptions::default()).unwrap();
//!
//! assert_eq!(package.layout.num_pages, 1);
//! assert_eq!(package.layout.total_length, 64);
//! ```

pub mod align;
pub mod boundary;
mod config;
pub mod emit;
pub mod envelope;
mod error;
mod geometry;
mod pipeline;

// Public APIs
pub use align::{PageLayout, PaddedImage};
pub use config::PackOptions;
pub use error::PackError;
pub use geometry::{
    BOOTLOADER_START, BYTES_PER_LINE, LINE_LEN, LINES_PER_PAGE, PAD_BYTE, PAGE_SIZE,
};
pub use pipeline::{Artifacts, Package, pack_bytes, package_firmware};
