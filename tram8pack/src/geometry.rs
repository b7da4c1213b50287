//! Page geometry and memory layout of the TRAM8 target (ATmega8, 1 KiB bootloader).

use hexrecord::{LINE_TERMINATOR, Record};

/// Payload bytes carried by every data record of the linear image.
pub const BYTES_PER_LINE: usize = 16;

/// Data records sent per flash page.
pub const LINES_PER_PAGE: usize = 4;

/// Flash page size of the target.
pub const PAGE_SIZE: usize = LINES_PER_PAGE * BYTES_PER_LINE;

/// First address reserved for the bootloader.
pub const BOOTLOADER_START: usize = 0x1C00;

/// Value of erased flash, used for every undefined byte of the padded image.
pub const PAD_BYTE: u8 = 0xFF;

/// Serialized length of one data record of the linear image, terminator included.
pub const LINE_LEN: usize = Record::text_len(BYTES_PER_LINE) + LINE_TERMINATOR.len();

/// Highest address (exclusive) reachable by a record without extended address records.
pub const RECORD_ADDRESS_SPACE: usize = 0x1_0000;
