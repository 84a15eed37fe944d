pub mod column;
pub mod input;
pub mod output;

pub use column::{scalar_type_name, Column, FitsType, TargetFormat};
pub use input::{read_input_schema, validate, InputSchema};
pub use output::{build, OutputColumn, OutputKind, OutputSchema};
