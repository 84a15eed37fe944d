use std::path::PathBuf;

use clap::Parser;

/// Convert FITS BINTABLE extensions into SQL/IPAC load streams.
///
/// Flag names and short forms mirror the legacy `fits2db` command-line
/// surface: positional arguments are input files, and most behavior is
/// selected through mutually-exclusive or implying flag combinations (see
/// `RunConfig::from_cli`).
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input FITS files (gzip-compressed inputs are detected automatically).
    pub inputs: Vec<PathBuf>,

    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
    #[arg(short = 'n', long = "noop")]
    pub noop: bool,

    #[arg(short = 'b', long = "bundle")]
    pub bundle: Option<usize>,
    #[arg(short = 'c', long = "chunk")]
    pub chunk: Option<usize>,
    #[arg(short = 'e', long = "extnum")]
    pub extnum: Option<usize>,
    #[arg(short = 'E', long = "extname")]
    pub extname: Option<String>,
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[arg(short = 'r', long = "rowrange")]
    pub rowrange: Option<String>,
    #[arg(short = 's', long = "select")]
    pub select: Option<String>,

    #[arg(short = 'C', long = "concat")]
    pub concat: bool,
    #[arg(short = 'H', long = "noheader")]
    pub noheader: bool,
    #[arg(short = 'N', long = "nostrip")]
    pub nostrip: bool,
    #[arg(short = 'Q', long = "noquote")]
    pub noquote: bool,
    #[arg(short = 'S', long = "singlequote")]
    pub singlequote: bool,
    #[arg(short = 'X', long = "explode")]
    pub explode: bool,

    #[arg(long = "asv")]
    pub asv: bool,
    #[arg(long = "bsv")]
    pub bsv: bool,
    #[arg(long = "csv")]
    pub csv: bool,
    #[arg(long = "tsv")]
    pub tsv: bool,
    #[arg(long = "ipac")]
    pub ipac: bool,

    #[arg(short = 'B', long = "binary")]
    pub binary: bool,
    #[arg(short = 'O', long = "oid")]
    pub oid: bool,
    #[arg(short = 't', long = "table")]
    pub table: Option<String>,
    #[arg(short = 'Z', long = "noload")]
    pub noload: bool,

    #[arg(long = "sql")]
    pub sql: Option<String>,
    #[arg(long = "drop")]
    pub drop: bool,
    #[arg(long = "create")]
    pub create: bool,
    #[arg(long = "truncate")]
    pub truncate: bool,
    #[arg(long = "sid")]
    pub sid: Option<String>,
    #[arg(long = "rid")]
    pub rid: Option<String>,
    #[arg(long = "add")]
    pub add: Option<String>,
    #[arg(long = "dbname")]
    pub dbname: Option<String>,
}
