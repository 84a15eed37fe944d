use crate::fits::HduSource;

use super::column::{Column, FitsType};

/// Ordered sequence of [`Column`], indexed 1..N, populated from the
/// active HDU.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSchema {
    pub columns: Vec<Column>,
}

impl InputSchema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Read column metadata for ordinals `first_col..=last_col` out of `hdu`.
/// `quoting` increments STRING display width by 2 to account for the
/// quote characters fixed-width output reserves space for; `explode`
/// gates whether a present `TDIM` is honored as a 2-D shape.
pub fn read_input_schema(
    hdu: &impl HduSource,
    first_col: usize,
    last_col: usize,
    quoting: bool,
    explode: bool,
) -> InputSchema {
    let mut columns = Vec::with_capacity(last_col.saturating_sub(first_col) + 1);
    for ordinal in first_col..=last_col {
        let cell_type = FitsType::from_code(&hdu.tform_code(ordinal));
        let repeat = hdu.repeat(ordinal);
        let width = hdu.width(ordinal);

        let (ndim, nrows, ncols) = match hdu.tdim(ordinal) {
            Some((r, c)) if explode && cell_type != FitsType::String => (2, r, c),
            _ => (1, 1, repeat),
        };

        let mut display_width = hdu.display_width(ordinal);
        if quoting && cell_type == FitsType::String {
            display_width += 2;
        }

        columns.push(Column {
            ordinal,
            name: hdu.ttype(ordinal),
            display_width,
            cell_type,
            repeat,
            width,
            ndim,
            nrows,
            ncols,
            units: hdu.units(ordinal),
        });
    }
    InputSchema { columns }
}

/// Test whether `hdu`'s schema matches `schema` on the §3 invariant
/// fields: name, scalar type, ndim, nrows, ncols, and (for non-string
/// columns) repeat. Used to decide whether a later file in a bundle may
/// share the first file's preamble.
pub fn validate(hdu: &impl HduSource, schema: &InputSchema) -> bool {
    if hdu.column_count() != schema.len() {
        return false;
    }
    for column in &schema.columns {
        let ordinal = column.ordinal;
        let cell_type = FitsType::from_code(&hdu.tform_code(ordinal));
        if hdu.ttype(ordinal) != column.name {
            return false;
        }
        if cell_type != column.cell_type {
            return false;
        }
        let (ndim, nrows, ncols) = match hdu.tdim(ordinal) {
            Some((r, c)) if column.ndim == 2 && cell_type != FitsType::String => (2, r, c),
            _ => (1, 1, hdu.repeat(ordinal)),
        };
        if ndim != column.ndim || nrows != column.nrows || ncols != column.ncols {
            return false;
        }
        if cell_type != FitsType::String && hdu.repeat(ordinal) != column.repeat {
            return false;
        }
    }
    true
}
