//! Host/FITS endianness detection and in-place byte-group swaps.
//!
//! FITS stores multi-byte scalars big-endian on disk. Text output needs
//! scalars in host order before formatting; PG-binary output needs them
//! big-endian on the wire regardless of host order. Both paths go through
//! the swap helpers here rather than duplicating byte-twiddling per type.

/// True when the host stores multi-byte scalars in the opposite order to
/// FITS's on-disk big-endian layout.
pub fn host_is_little_endian() -> bool {
    1u16.to_ne_bytes()[0] == 1
}

/// Swap each contiguous pair of bytes in place. Any trailing odd byte is
/// left untouched.
pub fn swap2(buf: &mut [u8]) {
    let mut chunks = buf.chunks_exact_mut(2);
    for pair in &mut chunks {
        pair.swap(0, 1);
    }
}

/// Swap each contiguous group of 4 bytes in place. Trailing bytes that
/// don't fill a group are left untouched.
pub fn swap4(buf: &mut [u8]) {
    let mut chunks = buf.chunks_exact_mut(4);
    for group in &mut chunks {
        group.swap(0, 3);
        group.swap(1, 2);
    }
}

/// Swap each contiguous group of 8 bytes in place. Trailing bytes that
/// don't fill a group are left untouched.
pub fn swap8(buf: &mut [u8]) {
    let mut chunks = buf.chunks_exact_mut(8);
    for group in &mut chunks {
        group.swap(0, 7);
        group.swap(1, 6);
        group.swap(2, 5);
        group.swap(3, 4);
    }
}

/// Swap a byte group of the given scalar width (1, 2, 4, or 8 bytes).
/// Width 1 is a no-op since single bytes have no order.
pub fn swap_width(buf: &mut [u8], width: usize) {
    match width {
        1 => {}
        2 => swap2(buf),
        4 => swap4(buf),
        8 => swap8(buf),
        _ => {
            for chunk in buf.chunks_mut(width) {
                chunk.reverse();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap2_pairs() {
        let mut buf = [0x00, 0x2a, 0xff, 0x01];
        swap2(&mut buf);
        assert_eq!(buf, [0x2a, 0x00, 0x01, 0xff]);
    }

    #[test]
    fn swap4_reverses_group() {
        let mut buf = [0x00, 0x00, 0x00, 0x2a];
        swap4(&mut buf);
        assert_eq!(buf, [0x2a, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn swap8_reverses_group() {
        let mut buf = [1, 2, 3, 4, 5, 6, 7, 8];
        swap8(&mut buf);
        assert_eq!(buf, [8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn swap_width_one_is_noop() {
        let mut buf = [0x42];
        swap_width(&mut buf, 1);
        assert_eq!(buf, [0x42]);
    }

    #[test]
    fn odd_trailing_byte_untouched() {
        let mut buf = [0x01, 0x02, 0x03];
        swap2(&mut buf);
        assert_eq!(buf, [0x02, 0x01, 0x03]);
    }
}
