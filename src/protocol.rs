use std::io::{self, Write};

use const_format::concatcp;

use crate::config::RunConfig;
use crate::format::{OutputFormat, SqlDialect};
use crate::schema::output::OutputSchema;

const CREATE_TABLE_PREFIX: &str = concatcp!("CREATE TABLE ", "IF NOT EXISTS ");
const DROP_TABLE_PREFIX: &str = concatcp!("DROP TABLE ", "IF EXISTS ");
const PG_BINARY_SIGNATURE: &[u8] = b"PGCOPY\n\xFF\r\n\0";

/// Where a file sits in its bundle: `bnum` is the 0-based index within
/// the bundle, `is_last` marks the file whose trailer closes the bundle
/// (or the run, when `--concat` fuses every file into one bundle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framing {
    pub emit_preamble: bool,
    pub emit_trailer: bool,
}

/// The small state machine over `(bundle_index, file_index, total_files)`
/// from §9 Design Notes: decides, for one file, whether a preamble
/// and/or trailer is due.
pub fn framing_for(
    file_index: usize,
    total_files: usize,
    bundle_size: usize,
    concat: bool,
) -> Framing {
    let effective_bundle_size = if concat { total_files.max(1) } else { bundle_size.max(1) };
    let bnum = file_index % effective_bundle_size;
    let is_last_of_bundle = bnum + 1 == effective_bundle_size || file_index + 1 == total_files;
    Framing {
        emit_preamble: bnum == 0,
        emit_trailer: is_last_of_bundle,
    }
}

/// Emit the preamble for a bundle: CREATE/DROP/TRUNCATE (when
/// requested), then the format-specific statement or header row (§4.6).
pub fn write_preamble<W: Write>(
    out: &mut W,
    schema: &OutputSchema,
    opts: &RunConfig,
    table: &str,
) -> io::Result<()> {
    if opts.create {
        if let (Some(dbname), Some(SqlDialect::MySql)) = (&opts.dbname, opts.format.dialect()) {
            write!(out, "CREATE DATABASE IF NOT EXISTS {}; USE {};\n", dbname, dbname)?;
        }
        if opts.drop_first {
            write!(out, "{}{} CASCADE;\n", DROP_TABLE_PREFIX, table)?;
        }
        let cols = schema
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.sql_type))
            .collect::<Vec<_>>()
            .join(", ");
        write!(out, "{}{} ( {} );\n", CREATE_TABLE_PREFIX, table, cols)?;
    }
    if opts.truncate {
        write!(out, "TRUNCATE TABLE {};\n", table)?;
    }

    match opts.format {
        OutputFormat::Sql(SqlDialect::Postgres) => {
            if opts.binary {
                write!(out, "COPY {} FROM stdin WITH BINARY;\n", table)?;
                out.write_all(PG_BINARY_SIGNATURE)?;
                out.write_all(&0i32.to_be_bytes())?;
                out.write_all(&0i32.to_be_bytes())?;
            } else {
                let cols = schema.names().join(", ");
                write!(out, "COPY {} ({}) from stdin;\n", table, cols)?;
            }
        }
        OutputFormat::Sql(SqlDialect::MySql) | OutputFormat::Sql(SqlDialect::Sqlite) => {
            let cols = schema.names().join(", ");
            write!(out, "INSERT INTO {} ({}) VALUES\n", table, cols)?;
        }
        OutputFormat::Delimited => {
            if !opts.noheader {
                writeln!(out, "{}", schema.names().join(","))?;
            }
        }
        OutputFormat::Ipac => {
            let names = schema
                .columns
                .iter()
                .map(|c| format!(" {:<width$} ", c.name, width = c.ipac_width()))
                .collect::<Vec<_>>()
                .join("|");
            let types = schema
                .columns
                .iter()
                .map(|c| format!(" {:<width$} ", c.ipac_type, width = c.ipac_width()))
                .collect::<Vec<_>>()
                .join("|");
            writeln!(out, "|{}|", names)?;
            writeln!(out, "|{}|", types)?;
        }
    }
    Ok(())
}

/// Emit the trailer that closes a bundle (§4.6).
pub fn write_trailer<W: Write>(out: &mut W, opts: &RunConfig) -> io::Result<()> {
    match opts.format {
        OutputFormat::Sql(SqlDialect::Postgres) => {
            if opts.binary {
                out.write_all(&(-1i16).to_be_bytes())?;
            } else {
                out.write_all(b"\\.\n")?;
            }
        }
        OutputFormat::Sql(SqlDialect::MySql) | OutputFormat::Sql(SqlDialect::Sqlite) => {
            out.write_all(b";\n")?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_of_one_emits_preamble_and_trailer_every_file() {
        let f0 = framing_for(0, 3, 1, false);
        let f1 = framing_for(1, 3, 1, false);
        assert_eq!(f0, Framing { emit_preamble: true, emit_trailer: true });
        assert_eq!(f1, Framing { emit_preamble: true, emit_trailer: true });
    }

    #[test]
    fn concat_fuses_whole_run_into_one_bundle() {
        let f0 = framing_for(0, 2, 1, true);
        let f1 = framing_for(1, 2, 1, true);
        assert_eq!(f0, Framing { emit_preamble: true, emit_trailer: false });
        assert_eq!(f1, Framing { emit_preamble: false, emit_trailer: true });
    }

    #[test]
    fn bundle_of_two_groups_consecutive_files() {
        let framings: Vec<_> = (0..4).map(|i| framing_for(i, 4, 2, false)).collect();
        assert_eq!(
            framings,
            vec![
                Framing { emit_preamble: true, emit_trailer: false },
                Framing { emit_preamble: false, emit_trailer: true },
                Framing { emit_preamble: true, emit_trailer: false },
                Framing { emit_preamble: false, emit_trailer: true },
            ]
        );
    }
}
