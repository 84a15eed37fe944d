use std::fmt;

/// Error taxonomy per §7: configuration, I/O, schema mismatch, unsupported
/// cell type, and FITS-library errors. Each maps to one of the exit codes
/// in §6.
#[derive(Debug)]
pub enum ConvertError {
    Configuration(String),
    /// `extnum`/`extname` both given. §6 singles this out for exit code 3
    /// ("conflicting extension selectors"), distinct from other
    /// configuration errors which exit 1.
    ConflictingExtensionSelectors,
    Io(std::io::Error),
    Schema(String),
    UnsupportedCell(String),
    FitsLibrary(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Configuration(msg) => write!(f, "Error: {}", msg),
            ConvertError::ConflictingExtensionSelectors => {
                write!(f, "Error: --extnum and --extname are mutually exclusive")
            }
            ConvertError::Io(err) => write!(f, "Error: {}", err),
            ConvertError::Schema(msg) => write!(f, "Error: schema mismatch: {}", msg),
            ConvertError::UnsupportedCell(msg) => {
                write!(f, "Error: Unsupported column type {}", msg)
            }
            ConvertError::FitsLibrary(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for ConvertError {}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::Io(err)
    }
}

impl ConvertError {
    /// Map this error to one of the §6 process exit codes.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::ConflictingExtensionSelectors => exit_code::CONFLICTING_OR_OUTPUT_OPEN,
            _ => exit_code::OPERATIONAL_ERROR,
        }
    }
}

/// Process exit codes per §6.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const OPERATIONAL_ERROR: i32 = 1;
    pub const NO_INPUT: i32 = 2;
    pub const CONFLICTING_OR_OUTPUT_OPEN: i32 = 3;
}
