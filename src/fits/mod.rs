mod adapter;
mod detect;
mod source;

pub use adapter::FitsFile;
pub use detect::{is_fits_header, is_gzip_magic, sniff, Sniff};
pub use source::HduSource;
