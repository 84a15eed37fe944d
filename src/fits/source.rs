/// Narrow collaborator boundary: everything the conversion engine needs
/// from a FITS binary-table HDU, and nothing else. FITS file opening and
/// HDU navigation are treated as an external component — `SchemaReader`
/// and `RowDriver` depend only on this trait, never on a concrete parser,
/// so the one real adapter (`FitsFile`) can be swapped for a mock in
/// tests.
pub trait HduSource {
    /// Number of columns in the active HDU.
    fn column_count(&self) -> usize;
    /// Number of rows in the active HDU.
    fn row_count(&self) -> usize;
    /// The FITS reader's recommended chunk size for sequential row reads.
    fn optimal_rows(&self) -> usize;
    /// `TTYPEn` column name.
    fn ttype(&self, ordinal: usize) -> String;
    /// `TFORMn` type code, e.g. `"J"`, `"4A"`'s letter part is pre-split —
    /// this returns just the type letter(s).
    fn tform_code(&self, ordinal: usize) -> String;
    /// Repeat count from `TFORMn`'s leading digits (cells per row).
    fn repeat(&self, ordinal: usize) -> usize;
    /// Physical byte width of one scalar element (or, for STRING, the
    /// on-disk field width in bytes, which equals `repeat`).
    fn width(&self, ordinal: usize) -> usize;
    /// Display width used for fixed-width text/IPAC output.
    fn display_width(&self, ordinal: usize) -> usize;
    /// Parsed `(nrows, ncols)` from `TDIMn`, when present.
    fn tdim(&self, ordinal: usize) -> Option<(usize, usize)>;
    /// `TUNITn`, or empty string when absent.
    fn units(&self, ordinal: usize) -> String;
    /// Byte width of one full table row (sum of all column field widths).
    fn row_byte_width(&self) -> usize;
    /// Read `nrows` rows of raw big-endian bytes starting at `first_row`
    /// (0-based). The returned buffer is exactly
    /// `nrows * row_byte_width()` bytes, or shorter at end of table.
    fn read_rows(&mut self, first_row: usize, nrows: usize) -> std::io::Result<Vec<u8>>;
}
