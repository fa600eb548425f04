//! Row extraction: `tr` elements to a rectangular table of cells

use std::fmt;

use bigdecimal::BigDecimal;
use scraper::ElementRef;
use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::document::element_text;
use crate::number::NumberFormat;

/// Cells spanning more columns than this are clamped, as browsers do
pub const MAX_COLSPAN: usize = 1000;

pub const DEFAULT_NULL_VALUES: [&str; 4] = ["NA", "N/A", ".", "-"];

/// One output cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    Number(BigDecimal),
    Text(String),
}

impl Cell {
    /// Whether the cell keeps its row alive: any number, or non-empty text
    pub fn is_present(&self) -> bool {
        match self {
            Cell::Null => false,
            Cell::Number(_) => true,
            Cell::Text(text) => !text.is_empty(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Number(number) => f.write_str(&number.to_plain_string()),
            Cell::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Null => serializer.serialize_none(),
            Cell::Number(number) => serializer.serialize_str(&number.to_plain_string()),
            Cell::Text(text) => serializer.serialize_str(text),
        }
    }
}

pub type Row = Vec<Cell>;

/// Extracted rows, every one padded to `width` cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTable {
    pub rows: Vec<Row>,
    pub width: usize,
}

/// How cell text is turned into cell values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Exact (case-sensitive) cell texts that become empty cells
    pub null_values: Vec<String>,
    /// Try to read number-like cells as numbers
    pub convert_numbers: bool,
    pub number_format: NumberFormat,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
            convert_numbers: true,
            number_format: NumberFormat::default(),
        }
    }
}

/// Extract every `th`/`td` of every row
///
/// Cells are repeated once per spanned column. Rows with no present cell
/// are dropped, and the rest are padded with nulls to the widest row.
pub fn extract(rows: &[ElementRef<'_>], options: &ExtractOptions) -> OutputTable {
    let mut table = OutputTable::default();

    for tr in rows {
        let mut row = Row::new();
        for cell_element in tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "th" | "td"))
        {
            let cell = cell_value(&element_text(cell_element), options);
            let span = colspan(cell_element.value().attr("colspan"));
            row.extend(std::iter::repeat(cell).take(span));
        }

        if !row.iter().any(Cell::is_present) {
            trace!(cells = row.len(), "dropped empty row");
            continue;
        }
        table.width = table.width.max(row.len());
        table.rows.push(row);
    }

    for row in &mut table.rows {
        row.resize(table.width, Cell::Null);
    }

    debug!(rows = table.rows.len(), width = table.width, "extracted table");
    table
}

/// Value of one cell from its collapsed text
pub fn cell_value(text: &str, options: &ExtractOptions) -> Cell {
    if options.null_values.iter().any(|null| null == text) {
        return Cell::Null;
    }
    if options.convert_numbers {
        if let Ok(number) = options.number_format.coerce(text) {
            return Cell::Number(number);
        }
    }
    Cell::Text(text.to_string())
}

/// Number of columns a cell covers, from its `colspan` attribute
///
/// Only plain digit strings count; anything else, and zero, mean 1.
pub fn colspan(attr: Option<&str>) -> usize {
    let Some(value) = attr else {
        return 1;
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return 1;
    }
    match value.parse::<usize>() {
        Ok(0) => 1,
        Ok(span) => span.min(MAX_COLSPAN),
        // Too many digits for usize
        Err(_) => MAX_COLSPAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::select::resolve;
    use std::str::FromStr;

    fn extract_html(html: &str, options: &ExtractOptions) -> OutputTable {
        let doc = Document::parse_str(html);
        let rows = resolve(&doc, "1").unwrap();
        extract(&rows, options)
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn num(s: &str) -> Cell {
        Cell::Number(BigDecimal::from_str(s).unwrap())
    }

    #[test]
    fn test_colspan() {
        assert_eq!(colspan(None), 1);
        assert_eq!(colspan(Some("")), 1);
        assert_eq!(colspan(Some("0")), 1);
        assert_eq!(colspan(Some("3")), 3);
        assert_eq!(colspan(Some("abc")), 1);
        assert_eq!(colspan(Some("-2")), 1);
        assert_eq!(colspan(Some("2.5")), 1);
        assert_eq!(colspan(Some(" 2")), 1);
        assert_eq!(colspan(Some("5000")), MAX_COLSPAN);
        assert_eq!(colspan(Some("99999999999999999999999999")), MAX_COLSPAN);
    }

    #[test]
    fn test_cells_and_numbers() {
        let table = extract_html(
            r#"<table>
                <tr><th>Name</th><th>Price</th><th>Share</th></tr>
                <tr><td>Widget</td><td>$1,200.50</td><td>12%</td></tr>
            </table>"#,
            &ExtractOptions::default(),
        );
        assert_eq!(
            table.rows,
            vec![
                vec![text("Name"), text("Price"), text("Share")],
                vec![text("Widget"), num("1200.50"), num("12")],
            ]
        );
        assert_eq!(table.width, 3);
    }

    #[test]
    fn test_keep_numbers() {
        let options = ExtractOptions {
            convert_numbers: false,
            ..ExtractOptions::default()
        };
        let table = extract_html("<table><tr><td>$1,200.50</td></tr></table>", &options);
        assert_eq!(table.rows, vec![vec![text("$1,200.50")]]);
    }

    #[test]
    fn test_colspan_repeats_value() {
        let table = extract_html(
            r#"<table>
                <tr><td colspan="3">wide</td></tr>
                <tr><td colspan="0">x</td><td colspan="abc">y</td><td>z</td></tr>
            </table>"#,
            &ExtractOptions::default(),
        );
        assert_eq!(
            table.rows,
            vec![
                vec![text("wide"), text("wide"), text("wide")],
                vec![text("x"), text("y"), text("z")],
            ]
        );
    }

    #[test]
    fn test_null_values_are_case_sensitive() {
        let table = extract_html(
            "<table><tr><td>NA</td><td>na</td><td>N/A</td><td>-</td><td>.</td><td>x</td></tr></table>",
            &ExtractOptions::default(),
        );
        assert_eq!(
            table.rows,
            vec![vec![Cell::Null, text("na"), Cell::Null, Cell::Null, Cell::Null, text("x")]]
        );
    }

    #[test]
    fn test_custom_null_values() {
        let options = ExtractOptions {
            null_values: vec!["0".to_string(), "na".to_string()],
            ..ExtractOptions::default()
        };
        let table = extract_html(
            "<table><tr><td>0</td><td>na</td><td>NA</td><td>1</td></tr></table>",
            &options,
        );
        assert_eq!(table.rows, vec![vec![Cell::Null, Cell::Null, text("NA"), num("1")]]);
    }

    #[test]
    fn test_empty_rows_dropped() {
        let table = extract_html(
            r#"<table>
                <tr><td>a</td><td>b</td></tr>
                <tr><td>NA</td><td></td></tr>
                <tr></tr>
                <tr><td> </td><td>-</td></tr>
                <tr><td>0</td><td></td></tr>
            </table>"#,
            &ExtractOptions::default(),
        );
        // A zero still counts as a value
        assert_eq!(
            table.rows,
            vec![vec![text("a"), text("b")], vec![num("0"), text("")]]
        );
    }

    #[test]
    fn test_ragged_rows_padded() {
        let table = extract_html(
            r#"<table>
                <tr><td>a</td></tr>
                <tr><td>b</td><td>c</td><td colspan="2">d</td></tr>
                <tr><td>e</td><td>f</td></tr>
            </table>"#,
            &ExtractOptions::default(),
        );
        assert_eq!(table.width, 4);
        assert!(table.rows.iter().all(|row| row.len() == 4));
        assert_eq!(table.rows[0], vec![text("a"), Cell::Null, Cell::Null, Cell::Null]);
        assert_eq!(table.rows[2], vec![text("e"), text("f"), Cell::Null, Cell::Null]);
    }

    #[test]
    fn test_nested_table_is_cell_text() {
        let table = extract_html(
            r#"<table>
                <tr><td>outer</td><td><table><tr><td>inner</td><td>2</td></tr></table></td></tr>
            </table>"#,
            &ExtractOptions::default(),
        );
        assert_eq!(table.rows, vec![vec![text("outer"), text("inner2")]]);
    }

    #[test]
    fn test_only_th_and_td_children() {
        let doc = Document::parse_str(
            "<table><tr id='r'><td>a</td><th>b</th></tr></table>",
        );
        let rows = resolve(&doc, "#r").unwrap();
        let table = extract(&rows, &ExtractOptions::default());
        assert_eq!(table.rows, vec![vec![text("a"), text("b")]]);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Null.to_string(), "");
        assert_eq!(num("-1357.91").to_string(), "-1357.91");
        assert_eq!(text("x").to_string(), "x");
    }
}
