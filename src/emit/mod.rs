pub mod binary;
pub mod text;

/// Shared context the text and binary encoders need that isn't part of
/// the cell bytes themselves: delimiter, quoting, and target dialect.
#[derive(Debug, Clone, Copy)]
pub struct EmitContext {
    pub delimiter: u8,
    pub quote: crate::format::QuoteMode,
    pub strip_strings: bool,
    pub dialect: Option<crate::format::SqlDialect>,
    pub array_explode: bool,
}
