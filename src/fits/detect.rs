/// gzip magic number: `0x1F 0x8B`.
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// A FITS primary header's first card is `SIMPLE  = T` by convention, but
/// §6 asks us to accept any 80-byte card in the header block containing
/// the keyword `SIMPLE` with value `T`, not just the first one.
pub fn is_fits_header(bytes: &[u8]) -> bool {
    bytes.chunks(80).take(36).any(|card| {
        card.len() >= 30
            && card.starts_with(b"SIMPLE")
            && card[8..10].iter().any(|b| *b == b'=')
            && card[10..30].iter().any(|b| *b == b'T')
    })
}

pub fn is_gzip_magic(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0..2] == GZIP_MAGIC
}

/// Sniff result for §4.7's skip-non-FITS-and-non-gzip check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sniff {
    Fits,
    Gzip,
    Unrecognized,
}

pub fn sniff(bytes: &[u8]) -> Sniff {
    if is_gzip_magic(bytes) {
        Sniff::Gzip
    } else if is_fits_header(bytes) {
        Sniff::Fits
    } else {
        Sniff::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_simple_card() {
        let mut header = vec![b' '; 2880];
        let card = b"SIMPLE  =                    T / file conforms to FITS standard";
        header[..card.len()].copy_from_slice(card);
        assert!(is_fits_header(&header));
    }

    #[test]
    fn recognizes_gzip_magic() {
        assert!(is_gzip_magic(&[0x1F, 0x8B, 0x08, 0x00]));
        assert!(!is_gzip_magic(&[0x00, 0x00]));
    }

    #[test]
    fn rejects_unrelated_bytes() {
        assert_eq!(sniff(b"not a fits file at all"), Sniff::Unrecognized);
    }
}
