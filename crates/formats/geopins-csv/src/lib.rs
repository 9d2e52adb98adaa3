//! CSV codec for plain table pins.
//!
//! Writing goes through the Arrow CSV writer configured by
//! [`CsvWriterOptions`]; reading infers the schema from the file.

pub mod reader;
pub mod writer;

pub use reader::{CsvReadOptions, read_csv, read_csv_file};
pub use writer::{CsvWriterOptions, write_csv, write_csv_file, write_csv_to_bytes};
