//! Convert one table in an HTML document to CSV
//!
//! The pipeline:
//! - input: read a file, stdin or an HTTP(S) URL
//! - document: detect the encoding and parse (HTML5 error recovery)
//! - select: pick a table or rows by index, CSS selector or XPath
//! - table: extract cell text, fold nulls, read numbers, expand colspans
//! - csv_out: write RFC 4180 CSV

pub mod csv_out;
pub mod document;
pub mod error;
pub mod input;
pub mod number;
pub mod pipeline;
pub mod select;
pub mod table;

pub use csv_out::*;
pub use document::*;
pub use error::{ErrorKind, HtmltabError, InputError, ParseError};
pub use input::*;
pub use number::*;
pub use pipeline::*;
pub use select::*;
pub use table::*;
