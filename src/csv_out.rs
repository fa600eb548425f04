use std::io::Write;

use csv::{Terminator, WriterBuilder};

use crate::error::HtmltabError;
use crate::table::OutputTable;

/// Write `table` as RFC 4180 CSV: minimal quoting, CRLF line endings
pub fn write_csv<W: Write>(table: &OutputTable, out: W) -> Result<(), HtmltabError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::CRLF)
        .from_writer(out);
    for row in &table.rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_csv_to_vec(table: &OutputTable) -> Result<Vec<u8>, HtmltabError> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}
