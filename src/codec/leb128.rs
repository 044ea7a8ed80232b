//! Unsigned LEB128 over 32-bit values: little-endian 7-bit groups, high
//! bit as continuation flag, at most 5 bytes per value.

use super::reader::ByteReader;
use super::CodecError;

/// Maximum encoded size of one value.
pub const MAX_LEN: usize = 5;

pub fn write(out: &mut Vec<u8>, mut value: u32) {
    while value >= 128 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Read one value.
///
/// The reader consumes at most [`MAX_LEN`] groups and stops there even
/// if the fifth byte carries a continuation flag; bits past the 32-bit
/// range are discarded.
pub fn read(reader: &mut ByteReader<'_>) -> Result<u32, CodecError> {
    let mut value: u32 = 0;
    for shift in (0..32).step_by(7) {
        let byte = reader.read_u8()?;
        value |= u32::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            break;
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: u32) -> u32 {
        let mut buffer = Vec::new();
        write(&mut buffer, value);
        assert!(buffer.len() <= MAX_LEN);
        let mut reader = ByteReader::new(&buffer);
        let decoded = read(&mut reader).unwrap();
        assert!(reader.is_at_end());
        decoded
    }

    #[test]
    fn round_trip_group_boundaries() {
        for value in [
            0,
            1,
            127,
            128,
            16_383,
            16_384,
            2_097_151,
            2_097_152,
            268_435_455,
            268_435_456,
            u32::MAX - 1,
            u32::MAX,
        ] {
            assert_eq!(round_trip(value), value);
        }
    }

    #[test]
    fn round_trip_sweep() {
        let mut value: u32 = 0;
        loop {
            assert_eq!(round_trip(value), value);
            match value.checked_add(0x01_0F_43) {
                Some(next) => value = next,
                None => break,
            }
        }
    }

    #[test]
    fn known_encodings() {
        let mut buffer = Vec::new();
        write(&mut buffer, 624_485);
        assert_eq!(buffer, vec![0xe5, 0x8e, 0x26]);

        buffer.clear();
        write(&mut buffer, u32::MAX);
        assert_eq!(buffer, vec![0xff, 0xff, 0xff, 0xff, 0x0f]);
    }

    #[test]
    fn reader_stops_after_five_groups() {
        // a sixth continuation byte is left in the stream as the start
        // of the next value
        let bytes = [0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(read(&mut reader).unwrap(), u32::MAX);
        assert_eq!(read(&mut reader).unwrap(), 1);
    }

    #[test]
    fn truncated_value_is_an_error() {
        let bytes = [0xff, 0xff];
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            read(&mut reader),
            Err(CodecError::UnexpectedEnd { .. })
        ));
    }
}
