use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};

use super::source::HduSource;

const BLOCK: usize = 2880;
const CARD: usize = 80;

/// One parsed header: raw cards plus the byte offset of the data that
/// follows it.
struct Header {
    cards: HashMap<String, String>,
    data_offset: u64,
    is_bintable: bool,
    extname: Option<String>,
}

fn parse_value(card: &[u8]) -> Option<String> {
    if card.len() < 10 || card[8] != b'=' {
        return None;
    }
    let rest = &card[10..];
    let text = String::from_utf8_lossy(rest);
    let value_part = text.split('/').next().unwrap_or("").trim();
    let value = value_part.trim_matches('\'').trim().to_string();
    Some(value)
}

fn read_header<R: Read>(reader: &mut R, start: u64) -> std::io::Result<Header> {
    let mut cards = HashMap::new();
    let mut bytes_read: u64 = 0;
    let mut block = vec![0u8; BLOCK];
    loop {
        reader.read_exact(&mut block)?;
        bytes_read += BLOCK as u64;
        let mut ended = false;
        for card in block.chunks(CARD) {
            let keyword = String::from_utf8_lossy(&card[0..8]).trim().to_string();
            if keyword == "END" {
                ended = true;
                continue;
            }
            if keyword.is_empty() {
                continue;
            }
            if let Some(value) = parse_value(card) {
                cards.insert(keyword, value);
            }
        }
        if ended {
            break;
        }
    }
    let is_bintable = cards
        .get("XTENSION")
        .map(|v| v.trim() == "BINTABLE")
        .unwrap_or(false);
    let extname = cards.get("EXTNAME").cloned();
    Ok(Header {
        cards,
        data_offset: start + bytes_read,
        is_bintable,
        extname,
    })
}

fn data_block_len(naxis1: usize, naxis2: usize) -> u64 {
    let raw = (naxis1 * naxis2) as u64;
    raw.div_ceil(BLOCK as u64) * BLOCK as u64
}

/// Split a `TFORMn` value like `"4A"`, `"1J"`, `"2E"` into `(repeat, code)`.
fn split_tform(tform: &str) -> (usize, String) {
    let digits: String = tform.chars().take_while(|c| c.is_ascii_digit()).collect();
    let code = tform[digits.len()..].to_string();
    let repeat = if digits.is_empty() {
        1
    } else {
        digits.parse().unwrap_or(1)
    };
    (repeat, code)
}

struct ColumnMeta {
    ttype: String,
    tform_code: String,
    repeat: usize,
    width: usize,
    tdim: Option<(usize, usize)>,
    tunit: String,
}

/// The one concrete `HduSource`: parses FITS headers directly and reads
/// raw row bytes by seeking into the data unit of the active BINTABLE.
pub struct FitsFile {
    reader: BufReader<Box<dyn ReadSeek>>,
    row_byte_width: usize,
    row_count: usize,
    columns: Vec<ColumnMeta>,
    data_offset: u64,
}

trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

impl FitsFile {
    /// Open `path`, decompressing transparently if it is gzip-magic, and
    /// navigate to a BINTABLE HDU selected by `extnum` (1-based, after the
    /// primary HDU) or `extname`, or the first BINTABLE found if neither
    /// is given. `extnum` and `extname` are mutually exclusive per §6.
    pub fn open(
        path: &std::path::Path,
        extnum: Option<usize>,
        extname: Option<&str>,
    ) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let mut sniff_buf = [0u8; 2];
        let mut probe = BufReader::new(file);
        let _ = probe.read_exact(&mut sniff_buf);
        probe.seek(SeekFrom::Start(0))?;

        let reader: Box<dyn ReadSeek> = if crate::fits::is_gzip_magic(&sniff_buf) {
            let mut decoder = flate2::read::GzDecoder::new(probe);
            let mut buf = Vec::new();
            decoder.read_to_end(&mut buf)?;
            Box::new(std::io::Cursor::new(buf))
        } else {
            Box::new(probe)
        };
        let mut reader = BufReader::new(reader);

        let mut offset: u64 = 0;
        let primary = read_header(&mut reader, offset)?;
        let primary_naxis1 = primary
            .cards
            .get("NAXIS1")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let primary_naxis2 = primary
            .cards
            .get("NAXIS2")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        offset = primary.data_offset + data_block_len(primary_naxis1, primary_naxis2);

        let mut seen_tables = 0usize;
        loop {
            reader.seek(SeekFrom::Start(offset))?;
            let header = match read_header(&mut reader, offset) {
                Ok(h) => h,
                Err(_) => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "no matching BINTABLE HDU found",
                    ))
                }
            };
            let naxis1 = header
                .cards
                .get("NAXIS1")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            let naxis2 = header
                .cards
                .get("NAXIS2")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            let next_offset = header.data_offset + data_block_len(naxis1, naxis2);

            if header.is_bintable {
                seen_tables += 1;
                let matches = match (extnum, extname) {
                    (Some(n), None) => n == seen_tables,
                    (None, Some(name)) => {
                        header.extname.as_deref().map(|e| e == name).unwrap_or(false)
                    }
                    (None, None) => true,
                    (Some(_), Some(_)) => {
                        return Err(std::io::Error::new(
                            std::io::ErrorKind::InvalidInput,
                            "extnum and extname are mutually exclusive",
                        ))
                    }
                };
                if matches {
                    let tfields: usize = header
                        .cards
                        .get("TFIELDS")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                    let mut columns = Vec::with_capacity(tfields);
                    for i in 1..=tfields {
                        let tform = header
                            .cards
                            .get(&format!("TFORM{}", i))
                            .cloned()
                            .unwrap_or_default();
                        let (repeat, code) = split_tform(&tform);
                        let ttype = header
                            .cards
                            .get(&format!("TTYPE{}", i))
                            .cloned()
                            .unwrap_or_else(|| format!("col{}", i));
                        let tunit = header
                            .cards
                            .get(&format!("TUNIT{}", i))
                            .cloned()
                            .unwrap_or_default();
                        let tdim = header.cards.get(&format!("TDIM{}", i)).and_then(|v| {
                            let trimmed = v.trim_start_matches('(').trim_end_matches(')');
                            let mut parts = trimmed.split(',');
                            let r = parts.next()?.trim().parse().ok()?;
                            let c = parts.next()?.trim().parse().ok()?;
                            Some((r, c))
                        });
                        let scalar_width = scalar_byte_width(&code);
                        let width = if code == "A" { repeat } else { scalar_width };
                        columns.push(ColumnMeta {
                            ttype,
                            tform_code: code,
                            repeat,
                            width,
                            tdim,
                            tunit,
                        });
                    }
                    return Ok(FitsFile {
                        reader,
                        row_byte_width: naxis1,
                        row_count: naxis2,
                        columns,
                        data_offset: header.data_offset,
                    });
                }
            }
            offset = next_offset;
        }
    }
}

fn scalar_byte_width(code: &str) -> usize {
    match code {
        "L" | "B" | "S" => 1,
        "I" | "U" => 2,
        "J" | "V" | "E" => 4,
        "K" | "D" => 8,
        _ => 1,
    }
}

impl HduSource for FitsFile {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn row_count(&self) -> usize {
        self.row_count
    }

    fn optimal_rows(&self) -> usize {
        // One 2880-byte block's worth of rows, at least one row.
        (BLOCK / self.row_byte_width.max(1)).max(1)
    }

    fn ttype(&self, ordinal: usize) -> String {
        self.columns[ordinal - 1].ttype.clone()
    }

    fn tform_code(&self, ordinal: usize) -> String {
        self.columns[ordinal - 1].tform_code.clone()
    }

    fn repeat(&self, ordinal: usize) -> usize {
        self.columns[ordinal - 1].repeat
    }

    fn width(&self, ordinal: usize) -> usize {
        self.columns[ordinal - 1].width
    }

    fn display_width(&self, ordinal: usize) -> usize {
        self.columns[ordinal - 1].width
    }

    fn tdim(&self, ordinal: usize) -> Option<(usize, usize)> {
        self.columns[ordinal - 1].tdim
    }

    fn units(&self, ordinal: usize) -> String {
        self.columns[ordinal - 1].tunit.clone()
    }

    fn row_byte_width(&self) -> usize {
        self.row_byte_width
    }

    fn read_rows(&mut self, first_row: usize, nrows: usize) -> std::io::Result<Vec<u8>> {
        let nrows = nrows.min(self.row_count.saturating_sub(first_row));
        let start = self.data_offset + (first_row * self.row_byte_width) as u64;
        self.reader.seek(SeekFrom::Start(start))?;
        let mut buf = vec![0u8; nrows * self.row_byte_width];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}
