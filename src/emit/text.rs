use crate::byteorder::{host_is_little_endian, swap_width};
use crate::errors::ConvertError;
use crate::format::{QuoteMode, SqlDialect};
use crate::schema::column::FitsType;

use super::EmitContext;

fn to_host(raw: &[u8], width: usize) -> Vec<u8> {
    let mut buf = raw[..width].to_vec();
    if host_is_little_endian() {
        swap_width(&mut buf, width);
    }
    buf
}

fn format_logical(byte: u8) -> &'static str {
    if byte == b'T' || byte == b't' {
        "1"
    } else {
        "0"
    }
}

fn format_float(value: f32, dialect: Option<SqlDialect>) -> String {
    if value.is_nan() {
        match dialect {
            Some(SqlDialect::MySql) | Some(SqlDialect::Sqlite) => "'NaN'".to_string(),
            _ => "NaN".to_string(),
        }
    } else if value.is_infinite() {
        let word = if value > 0.0 { "Infinity" } else { "-Infinity" };
        match dialect {
            Some(SqlDialect::MySql) | Some(SqlDialect::Sqlite) => format!("'{}'", word),
            _ => word.to_string(),
        }
    } else {
        format!("{:.6}", value)
    }
}

fn format_double(value: f64, dialect: Option<SqlDialect>) -> String {
    if value.is_nan() {
        match dialect {
            Some(SqlDialect::MySql) | Some(SqlDialect::Sqlite) => "'NaN'".to_string(),
            _ => "NaN".to_string(),
        }
    } else if value.is_infinite() {
        let word = if value > 0.0 { "Infinity" } else { "-Infinity" };
        match dialect {
            Some(SqlDialect::MySql) | Some(SqlDialect::Sqlite) => format!("'{}'", word),
            _ => word.to_string(),
        }
    } else {
        format!("{:.16}", value)
    }
}

/// Format one scalar element (the raw big-endian bytes for a single
/// value) as decimal text. Does not apply array wrapping, IPAC padding,
/// or quoting — callers combine those as needed.
fn encode_scalar(
    cell_type: &FitsType,
    raw: &[u8],
    dialect: Option<SqlDialect>,
) -> Result<String, ConvertError> {
    match cell_type {
        FitsType::Logical => Ok(format_logical(raw[0]).to_string()),
        FitsType::Byte => Ok(raw[0].to_string()),
        FitsType::SByte => Ok((raw[0] as i8).to_string()),
        FitsType::Short => {
            let host = to_host(raw, 2);
            Ok(i16::from_ne_bytes([host[0], host[1]]).to_string())
        }
        FitsType::UShort => {
            let host = to_host(raw, 2);
            Ok(u16::from_ne_bytes([host[0], host[1]]).to_string())
        }
        FitsType::Int => {
            let host = to_host(raw, 4);
            Ok(i32::from_ne_bytes([host[0], host[1], host[2], host[3]]).to_string())
        }
        FitsType::UInt => {
            let host = to_host(raw, 4);
            Ok(u32::from_ne_bytes([host[0], host[1], host[2], host[3]]).to_string())
        }
        FitsType::LongLong => {
            let host = to_host(raw, 8);
            let mut arr = [0u8; 8];
            arr.copy_from_slice(&host);
            Ok(i64::from_ne_bytes(arr).to_string())
        }
        FitsType::Float => {
            let host = to_host(raw, 4);
            let value = f32::from_ne_bytes([host[0], host[1], host[2], host[3]]);
            Ok(format_float(value, dialect))
        }
        FitsType::Double => {
            let host = to_host(raw, 8);
            let mut arr = [0u8; 8];
            arr.copy_from_slice(&host);
            let value = f64::from_ne_bytes(arr);
            Ok(format_double(value, dialect))
        }
        FitsType::String => unreachable!("strings are encoded by encode_string"),
        FitsType::Unsupported(code) => Err(ConvertError::UnsupportedCell(code.clone())),
    }
}

fn apply_quote(text: &str, quote: QuoteMode) -> String {
    match quote.quote_byte() {
        None => text.to_string(),
        Some(q) => {
            let q = q as char;
            let escaped = text.replace(q, &format!("{}{}", q, q));
            format!("{}{}{}", q, escaped, q)
        }
    }
}

/// STRING cell: trim (unless `--nostrip`), then apply the active quote
/// mode. `raw` is the full field-width byte run.
pub fn encode_string(raw: &[u8], ctx: &EmitContext) -> String {
    let text = String::from_utf8_lossy(raw);
    let trimmed = if ctx.strip_strings {
        text.trim().to_string()
    } else {
        text.to_string()
    };
    apply_quote(&trimmed, ctx.quote)
}

/// Numeric cell, scalar or packed array. `raw` covers `n_elements *
/// width` bytes; `width` is one scalar's byte size. For `n_elements ==
/// 1` the value is emitted unwrapped; for more than one it is joined by
/// the active delimiter and wrapped `(...)` (quoted, generic delimited)
/// or `{...}` (unquoted, SQL dialects) per §4.4.
pub fn encode_numeric_cell(
    cell_type: &FitsType,
    raw: &[u8],
    width: usize,
    n_elements: usize,
    ctx: &EmitContext,
) -> Result<String, ConvertError> {
    let mut parts = Vec::with_capacity(n_elements);
    for i in 0..n_elements {
        let start = i * width;
        parts.push(encode_scalar(
            cell_type,
            &raw[start..start + width],
            ctx.dialect,
        )?);
    }
    if n_elements == 1 {
        return Ok(parts.remove(0));
    }
    let delim = ctx.delimiter as char;
    let joined = parts.join(&delim.to_string());
    if ctx.dialect.is_some() {
        Ok(format!("{{{}}}", joined))
    } else {
        Ok(apply_quote(&format!("({})", joined), ctx.quote))
    }
}

/// Right-pad `text` with spaces to `width` for fixed-width IPAC output.
pub fn pad_ipac(text: &str, width: usize) -> String {
    if text.len() >= width {
        text.to_string()
    } else {
        format!("{:<width$}", text, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Delimiter;

    fn ctx(quote: QuoteMode, dialect: Option<SqlDialect>) -> EmitContext {
        EmitContext {
            delimiter: Delimiter::Comma.byte(),
            quote,
            strip_strings: true,
            dialect,
            array_explode: false,
        }
    }

    #[test]
    fn string_strip_and_single_quote() {
        let raw = b"  hi";
        let out = encode_string(raw, &ctx(QuoteMode::Wrap(b'\''), None));
        assert_eq!(out, "'hi'");
    }

    #[test]
    fn string_nostrip_keeps_padding() {
        let c = EmitContext {
            strip_strings: false,
            ..ctx(QuoteMode::Wrap(b'\''), None)
        };
        let out = encode_string(b"  hi", &c);
        assert_eq!(out, "'  hi'");
    }

    #[test]
    fn int_scalar_round_trips() {
        let raw = 42i32.to_be_bytes();
        let out =
            encode_numeric_cell(&FitsType::Int, &raw, 4, 1, &ctx(QuoteMode::None, None)).unwrap();
        assert_eq!(out, "42");
    }

    #[test]
    fn float_nan_and_infinity_postgres() {
        let nan = f32::NAN.to_be_bytes();
        let out = encode_numeric_cell(
            &FitsType::Float,
            &nan,
            4,
            1,
            &ctx(QuoteMode::None, Some(SqlDialect::Postgres)),
        )
        .unwrap();
        assert_eq!(out, "NaN");

        let inf = f32::INFINITY.to_be_bytes();
        let out = encode_numeric_cell(
            &FitsType::Float,
            &inf,
            4,
            1,
            &ctx(QuoteMode::None, Some(SqlDialect::Postgres)),
        )
        .unwrap();
        assert_eq!(out, "Infinity");
    }

    #[test]
    fn array_wraps_with_parens_when_quoted() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1i16.to_be_bytes());
        raw.extend_from_slice(&2i16.to_be_bytes());
        let out =
            encode_numeric_cell(&FitsType::Short, &raw, 2, 2, &ctx(QuoteMode::Wrap(b'"'), None))
                .unwrap();
        assert_eq!(out, "\"(1,2)\"");
    }

    #[test]
    fn ipac_padding_right_aligns() {
        assert_eq!(pad_ipac("42", 6), "42    ");
        assert_eq!(pad_ipac("123456", 4), "123456");
    }
}
