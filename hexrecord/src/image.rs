//! The `image` module provides the [`MemoryImage`] struct, a sparse address → byte
//! map built from Intel HEX records.
//!
//! Data is kept as a `BTreeMap` of contiguous runs (start address → bytes).
//! Adjacent runs are merged on insertion, so a typical firmware image collapses
//! into a handful of entries and scans over it are linear in the number of runs.

use crate::error::{HexError, HexErrorKind};
use crate::record::{Record, RecordType};
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::{debug, trace};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryImage {
    /// Contiguous runs of defined bytes keyed by their start address
    segments: BTreeMap<usize, Vec<u8>>,
    /// Number of defined bytes
    size: usize,
}

impl MemoryImage {
    /// Creates an empty `MemoryImage`.
    ///
    /// # Examples
    /// ```
    /// use hexrecord::MemoryImage;
    ///
    /// let image = MemoryImage::new();
    /// assert!(image.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            segments: BTreeMap::new(),
            size: 0,
        }
    }

    /// Parses the raw contents of an Intel HEX file.
    ///
    /// Data, end-of-file and extended (segment / linear) address records are
    /// honored. Start address records are accepted and ignored. Anything after
    /// the end-of-file record is ignored.
    ///
    /// # Errors
    /// Returns [`HexError::MalformedRecord`] with the 1-based line number if a
    /// record is corrupted or defines an address twice.
    ///
    /// # Examples
    /// ```
    /// use hexrecord::MemoryImage;
    ///
    /// let image = MemoryImage::parse(b":0400100001020304E2\r\n:00000001FF\r\n").unwrap();
    /// assert_eq!(image.len(), 4);
    /// assert_eq!(image.get(0x12), Some(0x03));
    /// ```
    pub fn parse(raw_bytes: &[u8]) -> Result<Self, HexError> {
        let mut image = Self::new();
        let mut offset: usize = 0;
        let mut records: usize = 0;

        for (idx, line) in raw_bytes.split(|&b| b == b'\n').enumerate() {
            let line_no = idx + 1;
            let line = line.trim_ascii_end();

            if line.is_empty() {
                continue;
            }

            let malformed = |kind| HexError::MalformedRecord {
                kind,
                line: line_no,
            };

            let record = Record::parse(line).map_err(malformed)?;
            records += 1;

            match record.rtype {
                RecordType::Data => {
                    let address = offset + record.address as usize;
                    image
                        .insert_slice(address, &record.data)
                        .map_err(malformed)?;
                }
                RecordType::EndOfFile => break,
                RecordType::ExtendedSegmentAddress => {
                    let word = record.address_word().unwrap_or_default();
                    offset = (word as usize) << 4;
                    trace!(line = line_no, offset, "extended segment address");
                }
                RecordType::ExtendedLinearAddress => {
                    let word = record.address_word().unwrap_or_default();
                    offset = (word as usize) << 16;
                    trace!(line = line_no, offset, "extended linear address");
                }
                RecordType::StartSegmentAddress | RecordType::StartLinearAddress => {
                    trace!(line = line_no, "start address record ignored");
                }
            }
        }

        debug!(records, bytes = image.len(), "parsed hex records");
        Ok(image)
    }

    /// Number of defined bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Defines a single byte.
    ///
    /// # Errors
    /// Returns [`HexErrorKind::AddressOverlap`] if the address already holds data.
    pub fn insert(&mut self, address: usize, value: u8) -> Result<(), HexErrorKind> {
        self.insert_slice(address, &[value])
    }

    /// Defines a run of bytes starting at `address`.
    ///
    /// Nothing is inserted if any address of the run already holds data.
    ///
    /// # Errors
    /// Returns [`HexErrorKind::AddressOverlap`] with the first already defined
    /// address, or [`HexErrorKind::AddressOutOfRange`] if the run overflows `usize`.
    pub fn insert_slice(&mut self, address: usize, data: &[u8]) -> Result<(), HexErrorKind> {
        if data.is_empty() {
            return Ok(());
        }
        let end = address
            .checked_add(data.len())
            .ok_or(HexErrorKind::AddressOutOfRange(address))?;

        // Overlap with the run starting at or before `address`
        let prev = self
            .segments
            .range(..=address)
            .next_back()
            .map(|(start, bytes)| (*start, start + bytes.len()));
        if let Some((_, prev_end)) = prev
            && prev_end > address
        {
            return Err(HexErrorKind::AddressOverlap(address));
        }

        // Overlap with a run starting inside the new one
        if let Some((start, _)) = self.segments.range(address + 1..end).next() {
            return Err(HexErrorKind::AddressOverlap(*start));
        }

        // Append to the previous run if it ends right here
        let start = match prev {
            Some((prev_start, prev_end)) if prev_end == address => {
                if let Some(run) = self.segments.get_mut(&prev_start) {
                    run.extend_from_slice(data);
                }
                prev_start
            }
            _ => {
                self.segments.insert(address, data.to_vec());
                address
            }
        };

        // Swallow the following run if it starts right after the new bytes
        if let Some(next) = self.segments.remove(&end)
            && let Some(run) = self.segments.get_mut(&start)
        {
            run.extend_from_slice(&next);
        }

        self.size += data.len();
        Ok(())
    }

    /// Gets the byte at the provided address.
    ///
    /// # Examples
    /// ```
    /// use hexrecord::MemoryImage;
    ///
    /// let mut image = MemoryImage::new();
    /// image.insert(0x10, 0xAB).unwrap();
    ///
    /// assert_eq!(image.get(0x10), Some(0xAB));
    /// assert_eq!(image.get(0x11), None);
    /// ```
    #[must_use]
    pub fn get(&self, address: usize) -> Option<u8> {
        let (start, run) = self.segments.range(..=address).next_back()?;
        run.get(address - start).copied()
    }

    #[must_use]
    pub fn is_defined(&self, address: usize) -> bool {
        self.get(address).is_some()
    }

    /// Smallest defined address.
    #[must_use]
    pub fn min_addr(&self) -> Option<usize> {
        self.segments.first_key_value().map(|(start, _)| *start)
    }

    /// Highest defined address.
    #[must_use]
    pub fn max_addr(&self) -> Option<usize> {
        self.segments
            .last_key_value()
            .map(|(start, run)| start + run.len() - 1)
    }

    /// First defined address that is greater than or equal to `bound`.
    ///
    /// # Examples
    /// ```
    /// use hexrecord::MemoryImage;
    ///
    /// let mut image = MemoryImage::new();
    /// image.insert_slice(0x100, &[1, 2, 3, 4]).unwrap();
    ///
    /// assert_eq!(image.first_defined_at_or_above(0x102), Some(0x102));
    /// assert_eq!(image.first_defined_at_or_above(0x080), Some(0x100));
    /// assert_eq!(image.first_defined_at_or_above(0x104), None);
    /// ```
    #[must_use]
    pub fn first_defined_at_or_above(&self, bound: usize) -> Option<usize> {
        if self.is_defined(bound) {
            return Some(bound);
        }
        self.segments.range(bound..).next().map(|(start, _)| *start)
    }

    /// Iterates over contiguous runs as `(start address, bytes)`, in address order.
    pub fn segments(&self) -> impl Iterator<Item = (usize, &[u8])> {
        self.segments
            .iter()
            .map(|(start, run)| (*start, run.as_slice()))
    }

    /// Iterates over every defined `(address, byte)` pair, in address order.
    pub fn bytes(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.segments().flat_map(|(start, run)| {
            run.iter()
                .enumerate()
                .map(move |(i, byte)| (start + i, *byte))
        })
    }

    /// Copies `range` into a dense buffer, filling undefined addresses with `fill`.
    ///
    /// # Examples
    /// ```
    /// use hexrecord::MemoryImage;
    ///
    /// let mut image = MemoryImage::new();
    /// image.insert_slice(2, &[0xAA, 0xBB]).unwrap();
    ///
    /// assert_eq!(image.to_dense(0..6, 0xFF), vec![0xFF, 0xFF, 0xAA, 0xBB, 0xFF, 0xFF]);
    /// ```
    #[must_use]
    pub fn to_dense(&self, range: Range<usize>, fill: u8) -> Vec<u8> {
        let mut dense = vec![fill; range.len()];
        if range.is_empty() {
            return dense;
        }

        // The run covering `range.start` may begin before it
        let first = self
            .segments
            .range(..=range.start)
            .next_back()
            .map_or(range.start, |(start, _)| *start);

        for (start, run) in self.segments.range(first..range.end) {
            let run_end = start + run.len();
            let lo = (*start).max(range.start);
            let hi = run_end.min(range.end);
            if lo >= hi {
                continue;
            }
            dense[lo - range.start..hi - range.start]
                .copy_from_slice(&run[lo - start..hi - start]);
        }
        dense
    }
}
