use bytes::{BufMut, BytesMut};

use crate::errors::ConvertError;
use crate::schema::column::FitsType;

/// STRING cell: 4-byte big-endian length, then the (optionally trimmed)
/// raw bytes. FITS already stores strings as ASCII so no byte-swap is
/// needed.
pub fn encode_string(raw: &[u8], strip: bool, out: &mut BytesMut) {
    if strip {
        let text = String::from_utf8_lossy(raw);
        let trimmed = text.trim().as_bytes().to_vec();
        out.put_i32(trimmed.len() as i32);
        out.put_slice(&trimmed);
    } else {
        out.put_i32(raw.len() as i32);
        out.put_slice(raw);
    }
}

/// Numeric cell, scalar or packed array. FITS is already big-endian on
/// disk, which is exactly what the wire format wants, so non-LOGICAL
/// scalars pass through unchanged behind a single length prefix
/// (`width` for one element, `width * n_elements` for a packed array).
/// LOGICAL widens each on-disk byte to the 2-byte big-endian 0/1 the
/// wire format requires.
pub fn encode_cell(
    cell_type: &FitsType,
    raw: &[u8],
    width: usize,
    n_elements: usize,
    out: &mut BytesMut,
) -> Result<(), ConvertError> {
    match cell_type {
        FitsType::Logical => {
            out.put_i32((n_elements * 2) as i32);
            for i in 0..n_elements {
                let byte = raw[i * width];
                let value: u16 = if byte == b'T' || byte == b't' { 1 } else { 0 };
                out.put_u16(value);
            }
            Ok(())
        }
        FitsType::String => unreachable!("strings are encoded by encode_string"),
        FitsType::Unsupported(code) => Err(ConvertError::UnsupportedCell(code.clone())),
        _ => {
            let total = width * n_elements;
            out.put_i32(total as i32);
            out.put_slice(&raw[..total]);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_length_prefix_matches_trimmed_bytes() {
        let mut out = BytesMut::new();
        encode_string(b"  hi", true, &mut out);
        assert_eq!(&out[..], [0, 0, 0, 2, b'h', b'i']);
    }

    #[test]
    fn int_cell_passes_through_big_endian() {
        let mut out = BytesMut::new();
        let raw = 42i32.to_be_bytes();
        encode_cell(&FitsType::Int, &raw, 4, 1, &mut out).unwrap();
        assert_eq!(&out[..], [0, 0, 0, 4, 0, 0, 0, 42]);
    }

    #[test]
    fn negative_int_cell_matches_scenario_2() {
        let mut out = BytesMut::new();
        let raw = (-7i32).to_be_bytes();
        encode_cell(&FitsType::Int, &raw, 4, 1, &mut out).unwrap();
        assert_eq!(&out[..], [0, 0, 0, 4, 0xFF, 0xFF, 0xFF, 0xF9]);
    }

    #[test]
    fn logical_widens_to_two_bytes() {
        let mut out = BytesMut::new();
        encode_cell(&FitsType::Logical, b"T", 1, 1, &mut out).unwrap();
        assert_eq!(&out[..], [0, 0, 0, 2, 0, 1]);
    }

    #[test]
    fn unsupported_type_errors() {
        let mut out = BytesMut::new();
        let raw = [0u8; 4];
        let err = encode_cell(&FitsType::Unsupported("X".into()), &raw, 4, 1, &mut out);
        assert!(err.is_err());
    }
}
