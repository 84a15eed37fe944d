/// SQL dialect selected via `--sql=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Postgres,
    MySql,
    Sqlite,
}

/// Top-level output target. Delimited/IPAC write plain text; the two
/// `Sql` variants frame output as `COPY`/`INSERT` statements, optionally
/// (`Postgres` only) as the PG-binary wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Ipac,
    Delimited,
    Sql(SqlDialect),
}

impl OutputFormat {
    pub fn is_sql(&self) -> bool {
        matches!(self, OutputFormat::Sql(_))
    }

    pub fn dialect(&self) -> Option<SqlDialect> {
        match self {
            OutputFormat::Sql(d) => Some(*d),
            _ => None,
        }
    }
}

/// Single-byte cell delimiter. ASV uses the ASCII Unit Separator (0x1F),
/// matching the convention used by tools that need a delimiter guaranteed
/// absent from ordinary text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
    Pipe,
    UnitSeparator,
}

impl Delimiter {
    pub fn byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
            Delimiter::Pipe => b'|',
            Delimiter::UnitSeparator => 0x1F,
        }
    }
}

/// Cell quoting behavior. `Wrap` always escapes embedded occurrences of
/// the quote character by doubling them, which subsumes plain wrapping
/// when no embedded quote characters are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMode {
    None,
    Wrap(u8),
}

impl QuoteMode {
    pub fn quote_byte(self) -> Option<u8> {
        match self {
            QuoteMode::None => None,
            QuoteMode::Wrap(c) => Some(c),
        }
    }
}
