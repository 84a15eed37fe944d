use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::cli::Cli;
use crate::errors::ConvertError;
use crate::format::{Delimiter, OutputFormat, QuoteMode, SqlDialect};

/// Immutable, fully-resolved run options. Built once from `Cli` by
/// [`RunConfig::from_cli`], which is where every mutual-exclusion and
/// implication rule in §6 is enforced, so nothing downstream needs to
/// re-check flag combinations.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub format: OutputFormat,
    pub delimiter: Delimiter,
    pub quote: QuoteMode,
    pub strip_strings: bool,
    pub explode: bool,
    pub noheader: bool,
    pub bundle: usize,
    pub chunk_override: Option<usize>,
    pub extnum: Option<usize>,
    pub extname: Option<String>,
    pub input: Option<std::path::PathBuf>,
    pub output: Option<std::path::PathBuf>,
    pub select: Option<String>,
    pub concat: bool,
    pub binary: bool,
    /// `--oid`: accepted but always assigned 0; `WITH OIDS` is effectively
    /// unreachable. Kept as a documented no-op per §9 Open Question 1.
    pub oid: bool,
    pub table: Option<String>,
    pub noload: bool,
    pub create: bool,
    pub drop_first: bool,
    pub truncate: bool,
    pub sid_col: Option<String>,
    pub rid_col: Option<String>,
    pub add_col: Option<String>,
    pub dbname: Option<String>,
    pub debug: bool,
    pub verbose: bool,
    pub noop: bool,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> Result<RunConfig, ConvertError> {
        if cli.rowrange.is_some() {
            return Err(ConvertError::Configuration(
                "--rowrange/-r is not implemented".to_string(),
            ));
        }
        if cli.extnum.is_some() && cli.extname.is_some() {
            return Err(ConvertError::ConflictingExtensionSelectors);
        }

        let format_flags = [cli.asv, cli.bsv, cli.csv, cli.tsv, cli.ipac]
            .iter()
            .filter(|b| **b)
            .count();
        if format_flags > 1 {
            return Err(ConvertError::Configuration(
                "only one of --asv/--bsv/--csv/--tsv/--ipac may be given".to_string(),
            ));
        }

        let dialect = match cli.sql.as_deref() {
            Some("postgres") => Some(SqlDialect::Postgres),
            Some("mysql") => Some(SqlDialect::MySql),
            Some("sqlite") => Some(SqlDialect::Sqlite),
            Some(other) => {
                return Err(ConvertError::Configuration(format!(
                    "unknown --sql dialect '{}'",
                    other
                )))
            }
            None => None,
        };

        let mut delimiter = if cli.tsv {
            Delimiter::Tab
        } else if cli.bsv {
            Delimiter::Pipe
        } else if cli.asv {
            Delimiter::UnitSeparator
        } else {
            Delimiter::Comma
        };
        let mut quote = if cli.noquote {
            QuoteMode::None
        } else if cli.singlequote {
            QuoteMode::Wrap(b'\'')
        } else {
            QuoteMode::Wrap(b'"')
        };

        let format = match (dialect, cli.ipac) {
            (Some(d), _) => {
                match d {
                    SqlDialect::Postgres => {
                        delimiter = Delimiter::Tab;
                        quote = QuoteMode::None;
                    }
                    SqlDialect::MySql => {
                        delimiter = Delimiter::Comma;
                        quote = QuoteMode::Wrap(b'"');
                    }
                    SqlDialect::Sqlite => {}
                }
                OutputFormat::Sql(d)
            }
            (None, true) => OutputFormat::Ipac,
            (None, false) => OutputFormat::Delimited,
        };

        if cli.binary && format != OutputFormat::Sql(SqlDialect::Postgres) {
            return Err(ConvertError::Configuration(
                "--binary requires --sql=postgres".to_string(),
            ));
        }

        let bundle = if cli.binary {
            1
        } else {
            cli.bundle.unwrap_or(1)
        };

        let create = cli.create || cli.drop;

        Ok(RunConfig {
            format,
            delimiter,
            quote,
            strip_strings: !cli.nostrip,
            explode: cli.explode,
            noheader: cli.noheader,
            bundle,
            chunk_override: cli.chunk,
            extnum: cli.extnum,
            extname: cli.extname.clone(),
            input: cli.input.clone(),
            output: cli.output.clone(),
            select: cli.select.clone(),
            concat: cli.concat,
            binary: cli.binary,
            oid: cli.oid,
            table: cli.table.clone(),
            noload: cli.noload,
            create,
            drop_first: cli.drop,
            truncate: cli.truncate,
            sid_col: cli.sid.clone(),
            rid_col: cli.rid.clone(),
            add_col: cli.add.clone(),
            dbname: cli.dbname.clone(),
            debug: cli.debug,
            verbose: cli.verbose,
            noop: cli.noop,
        })
    }
}

/// Mutable, process-wide run state: the serial counter backing the `sid`
/// synthetic column and the PRNG backing `rid`. Seeded once at startup
/// and never reset (§5).
pub struct RunState {
    serial: u64,
    rng: SmallRng,
}

impl RunState {
    pub fn new() -> RunState {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        RunState {
            serial: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Next value of the monotone, process-wide `sid` counter.
    pub fn next_serial(&mut self) -> u64 {
        let value = self.serial;
        self.serial += 1;
        value
    }

    /// Next `rid` value, uniformly distributed in `[0, 100)`.
    pub fn next_rid(&mut self) -> f32 {
        self.rng.random_range(0.0..100.0)
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_counter_is_monotone() {
        let mut state = RunState::new();
        let a = state.next_serial();
        let b = state.next_serial();
        let c = state.next_serial();
        assert_eq!([a, b, c], [0, 1, 2]);
    }

    #[test]
    fn rid_stays_in_range() {
        let mut state = RunState::new();
        for _ in 0..1000 {
            let rid = state.next_rid();
            assert!((0.0..100.0).contains(&rid));
        }
    }
}
