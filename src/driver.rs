use std::io::{self, Write};

use bytes::{BufMut, BytesMut};

use crate::config::{RunConfig, RunState};
use crate::emit::{binary, text, EmitContext};
use crate::errors::ConvertError;
use crate::fits::HduSource;
use crate::format::{OutputFormat, SqlDialect};
use crate::schema::column::{Column, FitsType};
use crate::schema::input::InputSchema;
use crate::schema::output::{OutputColumn, OutputKind, OutputSchema};

/// Reads HDU rows in chunks sized to the reader's recommended optimal
/// row count, dispatches each cell to its emitter, and appends synthetic
/// columns, per §4.5.
pub struct RowDriver<'a> {
    input: &'a InputSchema,
    output: &'a OutputSchema,
    offsets: Vec<usize>,
}

impl<'a> RowDriver<'a> {
    pub fn new(input: &'a InputSchema, output: &'a OutputSchema) -> Self {
        let mut offsets = Vec::with_capacity(input.columns.len());
        let mut acc = 0usize;
        for col in &input.columns {
            offsets.push(acc);
            acc += col.field_byte_len();
        }
        RowDriver {
            input,
            output,
            offsets,
        }
    }

    fn column(&self, ordinal: usize) -> &Column {
        &self.input.columns[ordinal - 1]
    }

    fn cell_slice<'b>(&self, row: &'b [u8], col: &Column, element: Option<(usize, usize)>) -> &'b [u8] {
        let base = self.offsets[col.ordinal - 1];
        let full = &row[base..base + col.field_byte_len()];
        match element {
            None => full,
            Some((i, j)) => {
                let flat = if col.ndim == 2 {
                    (i - 1) * col.ncols + (j - 1)
                } else {
                    i - 1
                };
                let start = flat * col.width;
                &full[start..start + col.width]
            }
        }
    }

    /// Run the full chunked read/emit loop for one HDU, writing to `out`.
    /// `is_last_file_in_bundle` gates the MySQL/SQLite row-comma logic:
    /// every row gets a trailing comma except the very last row of the
    /// bundle (or run, when concatenating).
    pub fn run<H: HduSource, W: Write>(
        &self,
        hdu: &mut H,
        out: &mut W,
        opts: &RunConfig,
        state: &mut RunState,
        is_last_file_in_bundle: bool,
    ) -> Result<(), ConvertError> {
        let row_count = hdu.row_count();
        let row_width = hdu.row_byte_width();
        let chunk_size = opts
            .chunk_override
            .unwrap_or_else(|| hdu.optimal_rows())
            .max(1);

        let mut firstrow = 0usize;
        while firstrow < row_count {
            let nelem = chunk_size.min(row_count - firstrow);
            let bytes = hdu.read_rows(firstrow, nelem)?;
            let mut buf = BytesMut::with_capacity(bytes.len() * 2);
            for r in 0..nelem {
                let row_start = r * row_width;
                let row = &bytes[row_start..row_start + row_width];
                let absolute_row = firstrow + r;
                let is_last_row_overall = is_last_file_in_bundle && absolute_row + 1 == row_count;
                self.emit_row(row, &mut buf, opts, state, is_last_row_overall)?;
            }
            out.write_all(&buf).map_err(ConvertError::from)?;
            firstrow += nelem;
        }
        Ok(())
    }

    fn emit_row(
        &self,
        row: &[u8],
        buf: &mut BytesMut,
        opts: &RunConfig,
        state: &mut RunState,
        is_last_row_overall: bool,
    ) -> Result<(), ConvertError> {
        let ctx = EmitContext {
            delimiter: opts.delimiter.byte(),
            quote: opts.quote,
            strip_strings: opts.strip_strings,
            dialect: opts.format.dialect(),
            array_explode: opts.explode,
        };

        if opts.binary {
            buf.put_i16(self.output.len() as i16);
            for oc in &self.output.columns {
                // §4.4/§7(4): an unsupported cell type is a per-cell
                // diagnostic, not a file-aborting error — the offsets are
                // precomputed, so skipping this cell's write already
                // leaves every other column's slice intact.
                if let Err(e) = self.emit_binary_cell(row, oc, buf, state, opts.strip_strings) {
                    log::error!("{}", e);
                }
            }
            return Ok(());
        }

        let is_tuple_dialect = matches!(
            opts.format,
            OutputFormat::Sql(SqlDialect::MySql) | OutputFormat::Sql(SqlDialect::Sqlite)
        );

        let mut cells: Vec<String> = Vec::with_capacity(self.output.len());
        for oc in &self.output.columns {
            match self.emit_text_cell(row, oc, &ctx, state, opts.format == OutputFormat::Ipac) {
                Ok(text) => cells.push(text),
                Err(e) => log::error!("{}", e),
            }
        }

        if is_tuple_dialect {
            buf.put_slice(b"(");
            buf.put_slice(cells.join(",").as_bytes());
            buf.put_slice(b")");
            if !is_last_row_overall {
                buf.put_slice(b",\n");
            }
        } else if opts.format == OutputFormat::Ipac {
            let bracketed: Vec<String> = cells.iter().map(|c| format!(" {} ", c)).collect();
            buf.put_slice(format!("|{}|\n", bracketed.join("|")).as_bytes());
        } else {
            let delim = ctx.delimiter as char;
            buf.put_slice(cells.join(&delim.to_string()).as_bytes());
            buf.put_slice(b"\n");
        }
        Ok(())
    }

    fn emit_binary_cell(
        &self,
        row: &[u8],
        oc: &OutputColumn,
        buf: &mut BytesMut,
        state: &mut RunState,
        strip_strings: bool,
    ) -> Result<(), ConvertError> {
        match oc.kind {
            OutputKind::Column { ordinal, element } => {
                let col = self.column(ordinal);
                let raw = self.cell_slice(row, col, element);
                if col.cell_type == FitsType::String && element.is_none() {
                    binary::encode_string(raw, strip_strings, buf);
                } else {
                    let n_elements = if element.is_some() { 1 } else { col.repeat };
                    binary::encode_cell(&col.cell_type, raw, col.width, n_elements, buf)?;
                }
            }
            OutputKind::Add => {
                buf.put_i32(4);
                buf.put_i32(1);
            }
            OutputKind::Sid => {
                buf.put_i32(8);
                buf.put_i64(state.next_serial() as i64);
            }
            OutputKind::Rid => {
                buf.put_i32(4);
                buf.put_f32(state.next_rid());
            }
        }
        Ok(())
    }

    fn emit_text_cell(
        &self,
        row: &[u8],
        oc: &OutputColumn,
        ctx: &EmitContext,
        state: &mut RunState,
        ipac: bool,
    ) -> Result<String, ConvertError> {
        let rendered = match oc.kind {
            OutputKind::Column { ordinal, element } => {
                let col = self.column(ordinal);
                let raw = self.cell_slice(row, col, element);
                if col.cell_type == FitsType::String && element.is_none() {
                    text::encode_string(raw, ctx)
                } else {
                    let n_elements = if element.is_some() { 1 } else { col.repeat };
                    text::encode_numeric_cell(&col.cell_type, raw, col.width, n_elements, ctx)?
                }
            }
            OutputKind::Add => "1".to_string(),
            OutputKind::Sid => state.next_serial().to_string(),
            OutputKind::Rid => format!("{:.6}", state.next_rid()),
        };
        if ipac {
            Ok(text::pad_ipac(&rendered, oc.ipac_width()))
        } else {
            Ok(rendered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::schema::output;

    struct MockHdu {
        row_count: usize,
        row_width: usize,
        data: Vec<u8>,
    }

    impl HduSource for MockHdu {
        fn column_count(&self) -> usize {
            1
        }
        fn row_count(&self) -> usize {
            self.row_count
        }
        fn optimal_rows(&self) -> usize {
            self.row_count
        }
        fn ttype(&self, _ordinal: usize) -> String {
            "v".to_string()
        }
        fn tform_code(&self, _ordinal: usize) -> String {
            "J".to_string()
        }
        fn repeat(&self, _ordinal: usize) -> usize {
            1
        }
        fn width(&self, _ordinal: usize) -> usize {
            4
        }
        fn display_width(&self, _ordinal: usize) -> usize {
            10
        }
        fn tdim(&self, _ordinal: usize) -> Option<(usize, usize)> {
            None
        }
        fn units(&self, _ordinal: usize) -> String {
            String::new()
        }
        fn row_byte_width(&self) -> usize {
            self.row_width
        }
        fn read_rows(&mut self, first_row: usize, nrows: usize) -> io::Result<Vec<u8>> {
            let start = first_row * self.row_width;
            let end = start + nrows * self.row_width;
            Ok(self.data[start..end].to_vec())
        }
    }

    fn base_cli() -> Cli {
        Cli {
            inputs: vec![],
            debug: false,
            verbose: false,
            noop: false,
            bundle: None,
            chunk: None,
            extnum: None,
            extname: None,
            input: None,
            output: None,
            rowrange: None,
            select: None,
            concat: false,
            noheader: true,
            nostrip: false,
            noquote: true,
            singlequote: false,
            explode: false,
            asv: false,
            bsv: false,
            csv: true,
            tsv: false,
            ipac: false,
            binary: false,
            oid: false,
            table: None,
            noload: false,
            sql: None,
            drop: false,
            create: false,
            truncate: false,
            sid: None,
            rid: None,
            add: None,
            dbname: None,
        }
    }

    #[test]
    fn scenario_one_int_column_csv_noheader() {
        let cli = base_cli();
        let opts = RunConfig::from_cli(&cli).unwrap();
        let mut state = RunState::new();

        let mut data = Vec::new();
        data.extend_from_slice(&42i32.to_be_bytes());
        data.extend_from_slice(&(-7i32).to_be_bytes());
        let mut hdu = MockHdu {
            row_count: 2,
            row_width: 4,
            data,
        };

        let input = InputSchema {
            columns: vec![Column {
                ordinal: 1,
                name: "v".to_string(),
                display_width: 10,
                cell_type: FitsType::Int,
                repeat: 1,
                width: 4,
                ndim: 1,
                nrows: 1,
                ncols: 1,
                units: String::new(),
            }],
        };
        let out_schema = output::build(&input, &opts);
        let driver = RowDriver::new(&input, &out_schema);

        let mut sink: Vec<u8> = Vec::new();
        driver.run(&mut hdu, &mut sink, &opts, &mut state, true).unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), "42\n-7\n");
    }

    #[test]
    fn unsupported_cell_is_skipped_not_fatal() {
        let cli = base_cli();
        let opts = RunConfig::from_cli(&cli).unwrap();
        let mut state = RunState::new();

        let mut data = Vec::new();
        data.extend_from_slice(&42i32.to_be_bytes());
        data.push(0xFF);
        let mut hdu = MockHdu {
            row_count: 1,
            row_width: 5,
            data,
        };

        let input = InputSchema {
            columns: vec![
                Column {
                    ordinal: 1,
                    name: "v".to_string(),
                    display_width: 10,
                    cell_type: FitsType::Int,
                    repeat: 1,
                    width: 4,
                    ndim: 1,
                    nrows: 1,
                    ncols: 1,
                    units: String::new(),
                },
                Column {
                    ordinal: 2,
                    name: "bits".to_string(),
                    display_width: 1,
                    cell_type: FitsType::Unsupported("X".to_string()),
                    repeat: 1,
                    width: 1,
                    ndim: 1,
                    nrows: 1,
                    ncols: 1,
                    units: String::new(),
                },
            ],
        };
        let out_schema = output::build(&input, &opts);
        let driver = RowDriver::new(&input, &out_schema);

        let mut sink: Vec<u8> = Vec::new();
        driver.run(&mut hdu, &mut sink, &opts, &mut state, true).unwrap();
        // The supported column's value still makes it out; the unsupported
        // cell is dropped instead of aborting the row or the file.
        assert_eq!(String::from_utf8(sink).unwrap(), "42\n");
    }

    #[test]
    fn ipac_row_is_bracketed_and_aligned_with_header() {
        let mut cli = base_cli();
        cli.csv = false;
        cli.ipac = true;
        let opts = RunConfig::from_cli(&cli).unwrap();
        let mut state = RunState::new();

        let data = 42i32.to_be_bytes().to_vec();
        let mut hdu = MockHdu {
            row_count: 1,
            row_width: 4,
            data,
        };

        let input = InputSchema {
            columns: vec![Column {
                ordinal: 1,
                name: "v".to_string(),
                display_width: 10,
                cell_type: FitsType::Int,
                repeat: 1,
                width: 4,
                ndim: 1,
                nrows: 1,
                ncols: 1,
                units: String::new(),
            }],
        };
        let out_schema = output::build(&input, &opts);
        let width = out_schema.columns[0].ipac_width();
        let driver = RowDriver::new(&input, &out_schema);

        let mut sink: Vec<u8> = Vec::new();
        driver.run(&mut hdu, &mut sink, &opts, &mut state, true).unwrap();
        let expected = format!("| {:<width$} |\n", "42", width = width);
        assert_eq!(String::from_utf8(sink).unwrap(), expected);
    }
}
