pub mod error;
pub mod extractor;
pub mod parse;
pub mod tool;

pub use error::{ExtractError, SampleError};
pub use extractor::{ExtractOptions, Extractor};
pub use parse::{default_identifier, parse_sample_line, parse_samples};
pub use tool::{ExifTool, MetadataTool};
