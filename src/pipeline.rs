//! One conversion, start to finish
//!
//! input bytes -> document -> row elements -> table -> CSV. Everything is
//! buffered, so any failure aborts before a single byte of CSV is written.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::csv_out::write_csv_to_vec;
use crate::document::Document;
use crate::error::{HtmltabError, Result};
use crate::input::InputSource;
use crate::select::resolve;
use crate::table::{extract, ExtractOptions, OutputTable};

/// Everything that shapes one conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Integer index, CSS selector, or XPath expression
    pub select: String,
    pub extract: ExtractOptions,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            select: "1".to_string(),
            extract: ExtractOptions::default(),
        }
    }
}

/// Where the CSV goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

/// Parse `bytes`, select the rows and extract them
pub fn convert(bytes: &[u8], options: &Options) -> Result<OutputTable> {
    let document = Document::parse(bytes)?;
    let rows = resolve(&document, &options.select)?;
    Ok(extract(&rows, &options.extract))
}

/// [`convert`], then serialize to CSV in memory
pub fn convert_to_csv(bytes: &[u8], options: &Options) -> Result<Vec<u8>> {
    let table = convert(bytes, options)?;
    write_csv_to_vec(&table)
}

/// Read `input`, convert it and write the CSV to `output`
///
/// The output file is only created once conversion has succeeded.
pub fn run(input: &InputSource, output: &Output, options: &Options) -> Result<()> {
    let bytes = input.read()?;
    let csv = convert_to_csv(&bytes, options)?;
    debug!(bytes = csv.len(), "serialized csv");

    match output {
        Output::Stdout => write_stdout(&csv)?,
        Output::File(path) => {
            fs::write(path, &csv)?;
            info!(path = %path.display(), "wrote csv");
        }
    }
    Ok(())
}

/// A closed pipe (e.g. piping into `head`) is not an error
fn write_stdout(csv: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match stdout.write_all(csv).and_then(|()| stdout.flush()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("stdout closed early");
            Ok(())
        }
        Err(e) => Err(HtmltabError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const PAGE: &[u8] = br#"<!DOCTYPE html>
    <html><body>
        <table>
            <tr><th>Country</th><th>Population</th></tr>
            <tr><td>Iceland</td><td>387,758</td></tr>
            <tr><td>Atlantis</td><td>N/A</td></tr>
            <tr><td>NA</td><td>-</td></tr>
        </table>
    </body></html>"#;

    #[test]
    fn test_convert_to_csv() {
        let csv = convert_to_csv(PAGE, &Options::default()).unwrap();
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "Country,Population\r\nIceland,387758\r\nAtlantis,\r\n"
        );
    }

    #[test]
    fn test_failures_surface_kinds() {
        let err = convert(b"", &Options::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);

        let err = convert(b"<html></html>", &Options::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMatch);

        let options = Options {
            select: "!".to_string(),
            ..Options::default()
        };
        let err = convert(PAGE, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadSelector);
    }

    #[test]
    fn test_failed_run_leaves_no_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("in.html");
        let output_path = dir.path().join("out.csv");
        fs::write(&input_path, "<p>no tables here</p>").unwrap();

        let result = run(
            &InputSource::File(input_path),
            &Output::File(output_path.clone()),
            &Options::default(),
        );
        assert!(matches!(result, Err(HtmltabError::NoMatch)));
        assert!(!output_path.exists());
    }
}
