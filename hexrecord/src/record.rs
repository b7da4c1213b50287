//! The `record` module defines the [`Record`] and [`RecordType`] which are used for parsing
//! (and generating) Intel HEX records.

use crate::error::HexErrorKind;
use std::fmt;

/// Line terminator used when serializing records.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

mod sizes {
    pub const BYTE_CHAR_LEN: usize = 2;
    pub const HEADER_BYTES: usize = 1 + 2 + 1; // len + addr + rtype
    pub const SMALLEST_RECORD: usize = (HEADER_BYTES + 1) * BYTE_CHAR_LEN; // + checksum
    pub const LARGEST_RECORD: usize = SMALLEST_RECORD + 255 * BYTE_CHAR_LEN;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordType {
    Data = 0x0,
    EndOfFile = 0x1,
    ExtendedSegmentAddress = 0x2,
    StartSegmentAddress = 0x3,
    ExtendedLinearAddress = 0x4,
    StartLinearAddress = 0x5,
}

impl TryFrom<u8> for RecordType {
    type Error = HexErrorKind;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Data),
            0x01 => Ok(Self::EndOfFile),
            0x02 => Ok(Self::ExtendedSegmentAddress),
            0x03 => Ok(Self::StartSegmentAddress),
            0x04 => Ok(Self::ExtendedLinearAddress),
            0x05 => Ok(Self::StartLinearAddress),
            _ => Err(HexErrorKind::InvalidRecordType),
        }
    }
}

impl RecordType {
    /// Payload length required by the record type, `None` for data records.
    const fn required_length(self) -> Option<usize> {
        match self {
            Self::Data => None,
            Self::EndOfFile => Some(0),
            Self::ExtendedSegmentAddress | Self::ExtendedLinearAddress => Some(2),
            Self::StartSegmentAddress | Self::StartLinearAddress => Some(4),
        }
    }
}

/// A single Intel HEX record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub address: u16,
    pub rtype: RecordType,
    pub data: Vec<u8>,
    pub checksum: u8,
}

impl Record {
    /// Length in characters of a serialized record with `payload_len` data bytes,
    /// excluding the line terminator.
    #[must_use]
    pub const fn text_len(payload_len: usize) -> usize {
        1 + (sizes::HEADER_BYTES + payload_len + 1) * sizes::BYTE_CHAR_LEN
    }

    /// Two's complement checksum of the provided bytes.
    #[must_use]
    pub fn calculate_checksum(bytes: &[u8]) -> u8 {
        let sum = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        (!sum).wrapping_add(1)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn checksum_of(address: u16, rtype: RecordType, data: &[u8]) -> u8 {
        let [addr_high, addr_low] = address.to_be_bytes();
        let header = [data.len() as u8, addr_high, addr_low, rtype as u8];
        let sum = header
            .iter()
            .chain(data)
            .fold(0u8, |acc, b| acc.wrapping_add(*b));
        (!sum).wrapping_add(1)
    }

    /// Create a record from address, type and payload.
    ///
    /// # Errors
    /// Returns an error if the payload is longer than 255 bytes or if the payload
    /// length / address do not match the record type.
    pub fn create(address: u16, rtype: RecordType, data: &[u8]) -> Result<Self, HexErrorKind> {
        let length = data.len();
        if length > u8::MAX as usize {
            return Err(HexErrorKind::RecordTooLong);
        }
        if let Some(expected) = rtype.required_length()
            && expected != length
        {
            return Err(HexErrorKind::RecordLengthInvalidForType(rtype, expected, length));
        }
        if rtype != RecordType::Data && address != 0 {
            return Err(HexErrorKind::RecordAddressInvalidForType(
                rtype,
                0,
                address as usize,
            ));
        }

        Ok(Self {
            address,
            rtype,
            data: data.to_vec(),
            checksum: Self::checksum_of(address, rtype, data),
        })
    }

    /// The end-of-file record, `:00000001FF`.
    #[must_use]
    pub const fn end_of_file() -> Self {
        Self {
            address: 0,
            rtype: RecordType::EndOfFile,
            data: Vec::new(),
            checksum: 0xFF,
        }
    }

    /// Parse a single record line (without line terminator).
    ///
    /// # Errors
    /// Returns the kind of defect found in the record.
    pub fn parse(line: &[u8]) -> Result<Self, HexErrorKind> {
        // Check for start code
        let Some((&b':', digits)) = line.split_first() else {
            return Err(HexErrorKind::MissingStartCode);
        };

        // Validate all characters are hexadecimal
        if !digits.iter().all(u8::is_ascii_hexdigit) {
            return Err(HexErrorKind::ContainsInvalidCharacters);
        }

        // Validate record's size
        if digits.len() < sizes::SMALLEST_RECORD {
            return Err(HexErrorKind::RecordTooShort);
        } else if digits.len() > sizes::LARGEST_RECORD {
            return Err(HexErrorKind::RecordTooLong);
        } else if digits.len() % sizes::BYTE_CHAR_LEN != 0 {
            return Err(HexErrorKind::RecordNotEvenLength);
        }

        let bytes: Vec<u8> = digits
            .chunks_exact(sizes::BYTE_CHAR_LEN)
            .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
            .collect();

        // Length byte must agree with the actual payload
        let length = bytes[0] as usize;
        if bytes.len() != sizes::HEADER_BYTES + length + 1 {
            return Err(HexErrorKind::RecordInvalidPayloadLength);
        }

        let rtype = RecordType::try_from(bytes[3])?;
        let address = u16::from_be_bytes([bytes[1], bytes[2]]);

        // More sanity checks (for length and address)
        if let Some(expected) = rtype.required_length()
            && expected != length
        {
            return Err(HexErrorKind::RecordLengthInvalidForType(rtype, expected, length));
        }
        if rtype != RecordType::Data && address != 0 {
            return Err(HexErrorKind::RecordAddressInvalidForType(
                rtype,
                0,
                address as usize,
            ));
        }

        let (body, checksum) = bytes.split_at(bytes.len() - 1);
        let checksum = checksum[0];
        let calc_checksum = Self::calculate_checksum(body);
        if calc_checksum != checksum {
            return Err(HexErrorKind::RecordChecksumMismatch(calc_checksum, checksum));
        }

        Ok(Self {
            address,
            rtype,
            data: body[sizes::HEADER_BYTES..].to_vec(),
            checksum,
        })
    }

    /// Value carried by an extended address record, as a 16-bit big-endian word.
    #[must_use]
    pub fn address_word(&self) -> Option<u16> {
        match self.data.as_slice() {
            [high, low] => Some(u16::from_be_bytes([*high, *low])),
            _ => None,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ":{:02X}{:04X}{:02X}",
            self.data.len(),
            self.address,
            self.rtype as u8
        )?;
        for b in &self.data {
            write!(f, "{b:02X}")?;
        }
        write!(f, "{:02X}", self.checksum)
    }
}

/// Value of a single ASCII hex digit. Callers validate the digit beforehand.
const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns valid instances of Record
    fn get_valid_struct_records() -> [Record; 5] {
        [
            Record {
                address: 0x0100,
                rtype: RecordType::Data,
                data: vec![
                    0x21, 0x46, 0x01, 0x36, 0x01, 0x21, 0x47, 0x01, 0x36, 0x00, 0x7E, 0xFE, 0x09,
                    0xD2, 0x19, 0x01,
                ],
                checksum: 0x40,
            },
            Record {
                address: 0x0110,
                rtype: RecordType::Data,
                data: vec![
                    0x21, 0x46, 0x01, 0x7E, 0x17, 0xC2, 0x00, 0x01, 0xFF, 0x5F, 0x16, 0x00, 0x21,
                    0x48, 0x01, 0x19,
                ],
                checksum: 0x28,
            },
            Record::end_of_file(),
            Record {
                address: 0x0000,
                rtype: RecordType::ExtendedSegmentAddress,
                data: vec![0x12, 0x00],
                checksum: 0xEA,
            },
            Record {
                address: 0x0000,
                rtype: RecordType::ExtendedLinearAddress,
                data: vec![0x00, 0x03],
                checksum: 0xF7,
            },
        ]
    }

    /// Returns valid record strings
    fn get_valid_str_records() -> [&'static str; 5] {
        [
            ":10010000214601360121470136007EFE09D2190140",
            ":100110002146017E17C20001FF5F16002148011928",
            ":00000001FF",
            ":020000021200EA",
            ":020000040003F7",
        ]
    }

    /// Returns invalid record strings and corresponding errors
    fn get_invalid_str_records() -> [(&'static str, HexErrorKind); 10] {
        [
            // Removed ':' from record str
            ("00000001FF", HexErrorKind::MissingStartCode),
            // Payload shorter that record length byte
            (":100000000000FF", HexErrorKind::RecordInvalidPayloadLength),
            // Payload longer that record length byte
            (":02000000000000FF", HexErrorKind::RecordInvalidPayloadLength),
            // EOF record with fewer chars
            (":0000FF", HexErrorKind::RecordTooShort),
            // EOF record with extra '0' added
            (":000000001FF", HexErrorKind::RecordNotEvenLength),
            // Char 'Z' is not a hex digit
            (":0000000ZFF", HexErrorKind::ContainsInvalidCharacters),
            // Record type 0x06 does not exist
            (":00000006FA", HexErrorKind::InvalidRecordType),
            // Checksum wrong - should be 0xF0
            (
                ":1000000000000000000000000000000000000000AA",
                HexErrorKind::RecordChecksumMismatch(0xF0, 0xAA),
            ),
            // Address non-zero for extended segment addr record
            (
                ":020100021200EA",
                HexErrorKind::RecordAddressInvalidForType(
                    RecordType::ExtendedSegmentAddress,
                    0,
                    0x0100,
                ),
            ),
            // EOF record carrying data
            (
                ":01000001AA54",
                HexErrorKind::RecordLengthInvalidForType(RecordType::EndOfFile, 0, 1),
            ),
        ]
    }

    #[test]
    fn test_record_type_from_byte() {
        assert_eq!(RecordType::try_from(0x00), Ok(RecordType::Data));
        assert_eq!(RecordType::try_from(0x01), Ok(RecordType::EndOfFile));
        assert_eq!(RecordType::try_from(0x04), Ok(RecordType::ExtendedLinearAddress));
        assert_eq!(RecordType::try_from(0x05), Ok(RecordType::StartLinearAddress));
        assert_eq!(RecordType::try_from(0x06), Err(HexErrorKind::InvalidRecordType));
        assert_eq!(RecordType::try_from(0xFF), Err(HexErrorKind::InvalidRecordType));
    }

    #[test]
    fn test_calculate_checksum() {
        // Each tuple = (record line, expected checksum)
        let cases = [
            (":10010000214601360121470136007EFE09D2190140", 0x40),
            (":100110002146017E17C20001FF5F16002148011928", 0x28),
            (":00000001FF", 0xFF),
            (":020000021200EA", 0xEA),
            (":020000040003F7", 0xF7),
        ];

        for (record, expected_checksum) in cases {
            // Strip information not used for checksum calculation
            let trimmed_record = &record[1..record.len() - 2];

            let bytes: Vec<u8> = (0..trimmed_record.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&trimmed_record[i..i + 2], 16).unwrap())
                .collect();

            assert_eq!(expected_checksum, Record::calculate_checksum(&bytes));
        }
    }

    #[test]
    fn test_parse_valid_records() {
        let records = get_valid_str_records();
        let expected_records = get_valid_struct_records();
        for (rec_str, rec) in records.iter().zip(expected_records.iter()) {
            assert_eq!(Record::parse(rec_str.as_bytes()).unwrap(), *rec);
        }
    }

    #[test]
    fn test_parse_lowercase_digits() {
        let rec = Record::parse(b":020000040003f7").unwrap();
        assert_eq!(rec.rtype, RecordType::ExtendedLinearAddress);
        assert_eq!(rec.address_word(), Some(0x0003));
    }

    #[test]
    fn test_parse_invalid_records() {
        for (record, expected_error) in get_invalid_str_records() {
            assert_eq!(
                Record::parse(record.as_bytes()).unwrap_err(),
                expected_error,
                "record: {record}"
            );
        }
    }

    #[test]
    fn test_create_and_display_matches_source() {
        for (rec_str, rec) in get_valid_str_records()
            .iter()
            .zip(get_valid_struct_records().iter())
        {
            let created = Record::create(rec.address, rec.rtype, &rec.data).unwrap();
            assert_eq!(&created, rec);
            assert_eq!(created.to_string(), *rec_str);
        }
    }

    #[test]
    fn test_create_invalid() {
        assert_eq!(
            Record::create(0, RecordType::Data, &[0u8; 256]),
            Err(HexErrorKind::RecordTooLong)
        );
        assert_eq!(
            Record::create(0x10, RecordType::ExtendedLinearAddress, &[0, 1]),
            Err(HexErrorKind::RecordAddressInvalidForType(
                RecordType::ExtendedLinearAddress,
                0,
                0x10
            ))
        );
        assert_eq!(
            Record::create(0, RecordType::StartLinearAddress, &[0, 1]),
            Err(HexErrorKind::RecordLengthInvalidForType(
                RecordType::StartLinearAddress,
                4,
                2
            ))
        );
    }

    #[test]
    fn test_text_len() {
        assert_eq!(Record::text_len(0), ":00000001FF".len());
        assert_eq!(
            Record::text_len(16),
            ":10010000214601360121470136007EFE09D2190140".len()
        );
    }
}
