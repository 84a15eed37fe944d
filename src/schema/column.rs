use std::fmt;

/// FITS binary-table cell types this crate can decode. `Unsupported`
/// carries the raw `TFORM` code so diagnostics can name it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FitsType {
    String,
    Logical,
    Byte,
    SByte,
    Short,
    UShort,
    Int,
    UInt,
    LongLong,
    Float,
    Double,
    Unsupported(String),
}

impl FitsType {
    /// Byte width of one scalar element of this type. Strings are sized
    /// by `repeat`, not by this value — callers must special-case them.
    pub fn scalar_width(&self) -> usize {
        match self {
            FitsType::String => 1,
            FitsType::Logical | FitsType::Byte | FitsType::SByte => 1,
            FitsType::Short | FitsType::UShort => 2,
            FitsType::Int | FitsType::UInt => 4,
            FitsType::LongLong => 8,
            FitsType::Float => 4,
            FitsType::Double => 8,
            FitsType::Unsupported(_) => 0,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FitsType::Unsupported(_))
    }

    /// Parse a single-letter FITS `TFORM` type code (the part after the
    /// repeat count digits), e.g. `"J"` -> `Int`.
    pub fn from_code(code: &str) -> FitsType {
        match code {
            "A" => FitsType::String,
            "L" => FitsType::Logical,
            "B" => FitsType::Byte,
            "S" => FitsType::SByte,
            "I" => FitsType::Short,
            "U" => FitsType::UShort,
            "J" | "V" => FitsType::Int,
            "INT32" => FitsType::Int,
            "K" => FitsType::LongLong,
            "E" => FitsType::Float,
            "D" => FitsType::Double,
            "X" => FitsType::Unsupported("bit array (X)".into()),
            "C" => FitsType::Unsupported("single complex (C)".into()),
            "M" => FitsType::Unsupported("double complex (M)".into()),
            "P" | "Q" => FitsType::Unsupported("variable-length array".into()),
            other => FitsType::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for FitsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitsType::String => write!(f, "STRING"),
            FitsType::Logical => write!(f, "LOGICAL"),
            FitsType::Byte => write!(f, "BYTE"),
            FitsType::SByte => write!(f, "SBYTE"),
            FitsType::Short => write!(f, "SHORT"),
            FitsType::UShort => write!(f, "USHORT"),
            FitsType::Int => write!(f, "INT"),
            FitsType::UInt => write!(f, "UINT"),
            FitsType::LongLong => write!(f, "LONGLONG"),
            FitsType::Float => write!(f, "FLOAT"),
            FitsType::Double => write!(f, "DOUBLE"),
            FitsType::Unsupported(code) => write!(f, "{}", code),
        }
    }
}

/// Which target the column's type spelling is being rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Sql,
    Ipac,
}

/// A single input column as read from the active HDU.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// 1-based position within the table.
    pub ordinal: usize,
    pub name: String,
    pub display_width: usize,
    pub cell_type: FitsType,
    /// Scalar elements stored per row in this cell.
    pub repeat: usize,
    /// Byte width of one scalar (for STRING this equals `repeat`).
    pub width: usize,
    pub ndim: usize,
    pub nrows: usize,
    pub ncols: usize,
    pub units: String,
}

impl Column {
    /// The scalar target-format type name for this column, per the §3
    /// type-mapping table. Does not apply the `[repeat]` SQL array suffix
    /// or string/text distinction by repeat — callers combine this with
    /// `sql_type_name`/`ipac_type_name` as appropriate.
    pub fn target_type(&self, format: TargetFormat) -> String {
        scalar_type_name(&self.cell_type, self.repeat, format)
    }

    /// Full SQL type spelling for this column as it appears in
    /// `CREATE TABLE`, including the `[repeat]` array suffix for
    /// non-string array columns when array-explode is off.
    pub fn sql_type_name(&self, exploded: bool) -> String {
        let base = scalar_type_name(&self.cell_type, self.repeat, TargetFormat::Sql);
        if !exploded && self.cell_type != FitsType::String && self.repeat > 1 {
            format!("{}[{}]", base, self.repeat)
        } else {
            base
        }
    }

    /// Total on-disk byte length of one cell of this column: the field
    /// width for STRING, or `width * repeat` for every other type.
    pub fn field_byte_len(&self) -> usize {
        if self.cell_type == FitsType::String {
            self.width
        } else {
            self.width * self.repeat
        }
    }
}

/// §3 type-mapping table: FITS type (+ repeat, for STRING) -> SQL/IPAC
/// scalar type spelling.
pub fn scalar_type_name(cell_type: &FitsType, repeat: usize, format: TargetFormat) -> String {
    match (cell_type, format) {
        (FitsType::String, TargetFormat::Sql) if repeat > 1 => "text".to_string(),
        (FitsType::String, TargetFormat::Sql) => "char".to_string(),
        (FitsType::String, TargetFormat::Ipac) => "char".to_string(),
        (FitsType::Logical, TargetFormat::Sql)
        | (FitsType::Byte, TargetFormat::Sql)
        | (FitsType::SByte, TargetFormat::Sql)
        | (FitsType::Short, TargetFormat::Sql)
        | (FitsType::UShort, TargetFormat::Sql) => "smallint".to_string(),
        (FitsType::Logical, TargetFormat::Ipac)
        | (FitsType::Byte, TargetFormat::Ipac)
        | (FitsType::SByte, TargetFormat::Ipac)
        | (FitsType::Short, TargetFormat::Ipac)
        | (FitsType::UShort, TargetFormat::Ipac) => "int".to_string(),
        (FitsType::Int, TargetFormat::Sql) | (FitsType::UInt, TargetFormat::Sql) => {
            "integer".to_string()
        }
        (FitsType::Int, TargetFormat::Ipac) | (FitsType::UInt, TargetFormat::Ipac) => {
            "int".to_string()
        }
        (FitsType::LongLong, TargetFormat::Sql) => "bigint".to_string(),
        (FitsType::LongLong, TargetFormat::Ipac) => "int".to_string(),
        (FitsType::Float, TargetFormat::Sql) | (FitsType::Float, TargetFormat::Ipac) => {
            "real".to_string()
        }
        (FitsType::Double, TargetFormat::Sql) => "double precision".to_string(),
        (FitsType::Double, TargetFormat::Ipac) => "double".to_string(),
        (FitsType::Unsupported(code), _) => format!("unsupported({})", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_repeat_one_is_char() {
        assert_eq!(
            scalar_type_name(&FitsType::String, 1, TargetFormat::Sql),
            "char"
        );
    }

    #[test]
    fn string_array_is_text_for_sql() {
        assert_eq!(
            scalar_type_name(&FitsType::String, 4, TargetFormat::Sql),
            "text"
        );
    }

    #[test]
    fn longlong_maps_to_bigint_and_int() {
        assert_eq!(
            scalar_type_name(&FitsType::LongLong, 1, TargetFormat::Sql),
            "bigint"
        );
        assert_eq!(
            scalar_type_name(&FitsType::LongLong, 1, TargetFormat::Ipac),
            "int"
        );
    }

    #[test]
    fn sql_array_suffix_applied_when_not_exploded() {
        let col = Column {
            ordinal: 1,
            name: "flux".into(),
            display_width: 10,
            cell_type: FitsType::Short,
            repeat: 4,
            width: 2,
            ndim: 1,
            nrows: 1,
            ncols: 4,
            units: String::new(),
        };
        assert_eq!(col.sql_type_name(false), "smallint[4]");
        assert_eq!(col.sql_type_name(true), "smallint");
    }

    #[test]
    fn from_code_flags_unsupported_types() {
        assert!(!FitsType::from_code("X").is_supported());
        assert!(!FitsType::from_code("C").is_supported());
        assert!(!FitsType::from_code("M").is_supported());
        assert!(!FitsType::from_code("P").is_supported());
        assert!(FitsType::from_code("J").is_supported());
    }
}
