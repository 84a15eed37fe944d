use crate::config::RunConfig;

use super::column::{scalar_type_name, FitsType, TargetFormat};
use super::input::InputSchema;

/// Which input cell (or synthetic source) an output column draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// One-to-one with an input column; `element` selects a single
    /// scalar `(row, col)` (1-based) out of an array cell when
    /// array-explode produced this column, or is `None` for a column
    /// emitted whole (scalar, or packed array when not exploded).
    Column {
        ordinal: usize,
        element: Option<(usize, usize)>,
    },
    Add,
    Sid,
    Rid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputColumn {
    pub name: String,
    pub sql_type: String,
    pub ipac_type: String,
    pub display_width: usize,
    pub kind: OutputKind,
}

impl OutputColumn {
    /// Column width shared by the IPAC name row, type row, and every data
    /// row, so the `|`-framed columns line up: wide enough for the name,
    /// the type spelling, and the formatted cell value.
    pub fn ipac_width(&self) -> usize {
        self.display_width
            .max(self.name.len())
            .max(self.ipac_type.len())
    }
}

/// Ordered sequence of [`OutputColumn`], the final column list used by
/// both the SQL `CREATE TABLE` statement and the PG-binary row header.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub columns: Vec<OutputColumn>,
    /// Set when `build` found a non-string array column that was not
    /// exploded; `--binary` must be downgraded to Postgres text with a
    /// diagnostic in that case (§4.6).
    pub binary_disallowed: bool,
}

impl OutputSchema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Build the output schema from `input` and the resolved run options,
/// per the §3 rules: array explosion, then synthetic add/sid/rid columns
/// appended in that order.
pub fn build(input: &InputSchema, opts: &RunConfig) -> OutputSchema {
    let mut columns = Vec::new();
    let mut binary_disallowed = false;

    for col in &input.columns {
        let is_array = col.cell_type != FitsType::String && col.repeat > 1;
        if opts.explode && is_array {
            let scalar_sql = scalar_type_name(&col.cell_type, 1, TargetFormat::Sql);
            let scalar_ipac = scalar_type_name(&col.cell_type, 1, TargetFormat::Ipac);
            if col.ndim == 2 {
                for i in 1..=col.nrows {
                    for j in 1..=col.ncols {
                        columns.push(OutputColumn {
                            name: format!("{}_{}_{}", col.name, i, j),
                            sql_type: scalar_sql.clone(),
                            ipac_type: scalar_ipac.clone(),
                            display_width: col.display_width,
                            kind: OutputKind::Column {
                                ordinal: col.ordinal,
                                element: Some((i, j)),
                            },
                        });
                    }
                }
            } else {
                for i in 1..=col.repeat {
                    columns.push(OutputColumn {
                        name: format!("{}_{}", col.name, i),
                        sql_type: scalar_sql.clone(),
                        ipac_type: scalar_ipac.clone(),
                        display_width: col.display_width,
                        kind: OutputKind::Column {
                            ordinal: col.ordinal,
                            element: Some((i, 1)),
                        },
                    });
                }
            }
        } else {
            if is_array {
                binary_disallowed = true;
            }
            columns.push(OutputColumn {
                name: col.name.clone(),
                sql_type: col.sql_type_name(opts.explode),
                ipac_type: scalar_type_name(&col.cell_type, col.repeat, TargetFormat::Ipac),
                display_width: col.display_width,
                kind: OutputKind::Column {
                    ordinal: col.ordinal,
                    element: None,
                },
            });
        }
    }

    if let Some(name) = &opts.add_col {
        columns.push(OutputColumn {
            name: name.clone(),
            sql_type: "integer".to_string(),
            ipac_type: "int".to_string(),
            display_width: 10,
            kind: OutputKind::Add,
        });
    }
    if let Some(name) = &opts.sid_col {
        columns.push(OutputColumn {
            name: name.clone(),
            sql_type: "bigint".to_string(),
            ipac_type: "int".to_string(),
            display_width: 12,
            kind: OutputKind::Sid,
        });
    }
    if let Some(name) = &opts.rid_col {
        columns.push(OutputColumn {
            name: name.clone(),
            sql_type: "real".to_string(),
            ipac_type: "real".to_string(),
            display_width: 14,
            kind: OutputKind::Rid,
        });
    }

    OutputSchema {
        columns,
        binary_disallowed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::schema::column::Column;

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
            noheader: false,
            nostrip: false,
            noquote: false,
            singlequote: false,
            explode: false,
            asv: false,
            bsv: false,
            csv: false,
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

    fn int_column(name: &str, repeat: usize) -> Column {
        Column {
            ordinal: 1,
            name: name.to_string(),
            display_width: 6,
            cell_type: FitsType::Short,
            repeat,
            width: 2,
            ndim: 1,
            nrows: 1,
            ncols: repeat,
            units: String::new(),
        }
    }

    #[test]
    fn array_column_not_exploded_stays_one_output_column() {
        let input = InputSchema {
            columns: vec![int_column("flux", 4)],
        };
        let cli = base_cli();
        let opts = RunConfig::from_cli(&cli).unwrap();
        let out = build(&input, &opts);
        assert_eq!(out.len(), 1);
        assert!(out.binary_disallowed);
        assert_eq!(out.columns[0].sql_type, "smallint[4]");
    }

    #[test]
    fn array_column_exploded_produces_one_column_per_element() {
        let input = InputSchema {
            columns: vec![int_column("flux", 4)],
        };
        let mut cli = base_cli();
        cli.explode = true;
        let opts = RunConfig::from_cli(&cli).unwrap();
        let out = build(&input, &opts);
        assert_eq!(out.len(), 4);
        assert!(!out.binary_disallowed);
        assert_eq!(out.names(), vec!["flux_1", "flux_2", "flux_3", "flux_4"]);
    }

    #[test]
    fn synthetic_columns_append_in_add_sid_rid_order() {
        let input = InputSchema {
            columns: vec![int_column("flux", 1)],
        };
        let mut cli = base_cli();
        cli.add = Some("add".to_string());
        cli.sid = Some("sid".to_string());
        cli.rid = Some("rid".to_string());
        let opts = RunConfig::from_cli(&cli).unwrap();
        let out = build(&input, &opts);
        assert_eq!(out.names(), vec!["flux", "add", "sid", "rid"]);
        assert_eq!(out.columns[1].kind, OutputKind::Add);
        assert_eq!(out.columns[2].kind, OutputKind::Sid);
        assert_eq!(out.columns[3].kind, OutputKind::Rid);
    }
}
