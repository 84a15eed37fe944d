use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::{RunConfig, RunState};
use crate::driver::RowDriver;
use crate::errors::{exit_code, ConvertError};
use crate::fits::{self, FitsFile};
use crate::format::{Delimiter, OutputFormat};
use crate::protocol::{self, framing_for};
use crate::schema::{input, output, InputSchema};

/// Orchestrates one file at a time: derive names, open the HDU, run the
/// schema/preamble/row/trailer pipeline, close. See §4.7 for the
/// failure-semantics table this follows.
pub struct FileLoop;

impl FileLoop {
    /// Process every input path, returning the process exit code per §6.
    pub fn run(inputs: &[PathBuf], opts: &RunConfig, state: &mut RunState) -> i32 {
        if inputs.is_empty() {
            log::error!("Error: no input files");
            return exit_code::NO_INPUT;
        }

        let total = inputs.len();
        let mut bundle_writer: Option<Box<dyn Write>> = None;
        let mut bundle_schema: Option<InputSchema> = None;
        let mut bundle_table = String::new();
        let mut bundle_index = 0usize;
        let mut had_error = false;

        for (file_index, path) in inputs.iter().enumerate() {
            let framing = framing_for(file_index, total, opts.bundle, opts.concat);

            if !looks_like_input(path) {
                log::warn!("Error: {} is not a FITS or gzip file, skipping", path.display());
                had_error = true;
                continue;
            }

            let mut hdu = match FitsFile::open(path, opts.extnum, opts.extname.as_deref()) {
                Ok(h) => h,
                Err(e) => {
                    log::warn!("Error: cannot open {}: {}", path.display(), e);
                    had_error = true;
                    continue;
                }
            };

            let quoting = !matches!(opts.quote, crate::format::QuoteMode::None);

            if framing.emit_preamble {
                let schema =
                    input::read_input_schema(&hdu, 1, hdu.column_count(), quoting, opts.explode);
                bundle_schema = Some(schema);
                bundle_table = opts
                    .table
                    .clone()
                    .unwrap_or_else(|| derive_table_name(path));
                bundle_index += 1;
            } else if let Some(schema) = &bundle_schema {
                if !input::validate(&hdu, schema) {
                    log::warn!("Error: schema mismatch in bundle, skipping {}", path.display());
                    had_error = true;
                    continue;
                }
            }

            let schema = match &bundle_schema {
                Some(s) => s,
                None => {
                    log::warn!("Error: no established schema for {}, skipping", path.display());
                    had_error = true;
                    continue;
                }
            };

            let out_schema = output::build(schema, opts);
            let mut effective_opts = opts.clone();
            if out_schema.binary_disallowed && effective_opts.binary {
                log::warn!(
                    "Error: binary mode disabled for non-string array column, falling back to Postgres text"
                );
                effective_opts.binary = false;
            }

            if framing.emit_preamble {
                let writer = match open_output(path, bundle_index, &effective_opts, total == 1) {
                    Ok(w) => w,
                    Err(e) => {
                        log::error!("Error: cannot open output for {}: {}", path.display(), e);
                        return exit_code::CONFLICTING_OR_OUTPUT_OPEN;
                    }
                };
                bundle_writer = Some(writer);
                if let Some(writer) = bundle_writer.as_mut() {
                    if let Err(e) = protocol::write_preamble(writer, &out_schema, &effective_opts, &bundle_table)
                    {
                        log::error!("Error: {}", e);
                        return exit_code::CONFLICTING_OR_OUTPUT_OPEN;
                    }
                }
            }

            let result = {
                let writer = bundle_writer.as_mut().expect("preamble opens the writer");
                let driver = RowDriver::new(schema, &out_schema);
                driver.run(&mut hdu, writer, &effective_opts, state, framing.emit_trailer)
            };

            if let Err(e) = result {
                log::warn!("Error: {}", e);
                had_error = true;
            }

            if framing.emit_trailer {
                if let Some(mut writer) = bundle_writer.take() {
                    if let Err(e) = protocol::write_trailer(&mut writer, &effective_opts) {
                        log::error!("Error: {}", e);
                        return exit_code::CONFLICTING_OR_OUTPUT_OPEN;
                    }
                    let _ = writer.flush();
                }
            }
        }

        if had_error {
            exit_code::OPERATIONAL_ERROR
        } else {
            exit_code::SUCCESS
        }
    }
}

fn looks_like_input(path: &Path) -> bool {
    let mut buf = vec![0u8; 2880];
    match File::open(path).and_then(|mut f| f.read(&mut buf)) {
        Ok(n) => !matches!(fits::sniff(&buf[..n]), fits::Sniff::Unrecognized),
        Err(_) => false,
    }
}

/// File basename with its extension stripped and `-` rewritten to `_`.
fn derive_table_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "table".to_string());
    stem.replace('-', "_")
}

fn extension_for(opts: &RunConfig) -> &'static str {
    match opts.format {
        OutputFormat::Ipac => "ipac",
        OutputFormat::Sql(_) => "sql",
        OutputFormat::Delimited => match opts.delimiter {
            Delimiter::Comma => "csv",
            Delimiter::Tab => "tsv",
            Delimiter::Pipe => "bsv",
            Delimiter::UnitSeparator => "asv",
        },
    }
}

fn open_output(
    first_path: &Path,
    bundle_index: usize,
    opts: &RunConfig,
    single_input: bool,
) -> io::Result<Box<dyn Write>> {
    if let Some(path) = &opts.output {
        return Ok(Box::new(File::create(path)?));
    }
    if single_input {
        return Ok(Box::new(io::stdout()));
    }
    let base = derive_table_name(first_path);
    let filename = format!("{}[{:03}].{}", base, bundle_index, extension_for(opts));
    Ok(Box::new(File::create(filename)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_table_name_strips_extension_and_dashes() {
        assert_eq!(derive_table_name(Path::new("sdss-field-01.fits")), "sdss_field_01");
        assert_eq!(derive_table_name(Path::new("/a/b/survey.fits.gz")), "survey.fits");
    }

    #[test]
    fn rejects_nonexistent_path() {
        assert!(!looks_like_input(Path::new("/nonexistent/path.fits")));
    }
}
