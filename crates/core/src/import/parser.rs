//! Tabular row parsing for CSV files and Excel workbooks.
//!
//! [`RowReader`] yields one [`RawRow`] per data row, lazily. Only the first
//! worksheet of a workbook is read. Each call to [`RowReader::open`] starts
//! again from the top of the file.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use super::FileFormat;

// ── Types ────────────────────────────────────────────────────────────

/// One data row keyed by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based position among the data rows (header excluded).
    index: usize,
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(index: usize, cells: Vec<(String, String)>) -> Self {
        Self { index, cells }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The trimmed cell value for `column`, or `""` if the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.trim())
            .unwrap_or_default()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.trim().is_empty())
    }

    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Could not read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Spreadsheet contains no worksheets")]
    NoWorksheet,

    #[error("Could not read CSV: {0}")]
    Csv(#[from] csv::Error),
}

// ── Reader ───────────────────────────────────────────────────────────

enum RowSource<'a> {
    Sheet { range: Range<Data>, next_row: usize },
    Csv(csv::StringRecordsIntoIter<&'a [u8]>),
}

/// Lazy iterator over the data rows of one uploaded file.
pub struct RowReader<'a> {
    /// Header names paired with their column position. Blank headers are
    /// left out, which also drops the cells beneath them.
    columns: Vec<(usize, String)>,
    source: RowSource<'a>,
    next_index: usize,
}

impl<'a> RowReader<'a> {
    /// Open `bytes` as `format` and read its header row.
    pub fn open(bytes: &'a [u8], format: FileFormat) -> Result<Self, ParseError> {
        match format {
            FileFormat::Spreadsheet => Self::open_spreadsheet(bytes),
            FileFormat::Csv => Self::open_csv(bytes),
        }
    }

    fn open_spreadsheet(bytes: &'a [u8]) -> Result<Self, ParseError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(ParseError::NoWorksheet)??;

        let columns = if range.height() == 0 {
            Vec::new()
        } else {
            (0..range.width())
                .map(|col| (col, range.get((0, col)).map(cell_to_string).unwrap_or_default()))
                .filter(|(_, name)| !name.is_empty())
                .collect()
        };

        Ok(Self {
            columns,
            source: RowSource::Sheet { range, next_row: 1 },
            next_index: 1,
        })
    }

    fn open_csv(bytes: &'a [u8]) -> Result<Self, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let columns = reader
            .headers()?
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .map(|(col, name)| (col, name.to_string()))
            .collect();

        Ok(Self {
            columns,
            source: RowSource::Csv(reader.into_records()),
            next_index: 1,
        })
    }

    /// Header names in file order.
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Pull the next raw cell vector from the source, positional.
    fn next_cells(&mut self) -> Option<Result<Vec<String>, ParseError>> {
        match &mut self.source {
            RowSource::Sheet { range, next_row } => {
                if *next_row >= range.height() {
                    return None;
                }
                let row = *next_row;
                *next_row += 1;
                let cells = (0..range.width())
                    .map(|col| range.get((row, col)).map(cell_to_string).unwrap_or_default())
                    .collect();
                Some(Ok(cells))
            }
            RowSource::Csv(records) => {
                let record = records.next()?;
                Some(
                    record
                        .map(|r| r.iter().map(str::to_string).collect())
                        .map_err(ParseError::from),
                )
            }
        }
    }
}

impl Iterator for RowReader<'_> {
    type Item = Result<RawRow, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cells = match self.next_cells()? {
                Ok(cells) => cells,
                Err(e) => return Some(Err(e)),
            };
            let index = self.next_index;
            self.next_index += 1;

            let row = RawRow::new(
                index,
                self.columns
                    .iter()
                    .map(|(col, name)| (name.clone(), cells.get(*col).cloned().unwrap_or_default()))
                    .collect(),
            );
            if !row.is_blank() {
                return Some(Ok(row));
            }
        }
    }
}

/// Read only the header row.
pub fn read_headers(bytes: &[u8], format: FileFormat) -> Result<Vec<String>, ParseError> {
    Ok(RowReader::open(bytes, format)?.headers())
}

/// Read the header and every data row. Any error discards all rows.
pub fn read_all_rows(
    bytes: &[u8],
    format: FileFormat,
) -> Result<(Vec<String>, Vec<RawRow>), ParseError> {
    let reader = RowReader::open(bytes, format)?;
    let headers = reader.headers();
    let rows = reader.collect::<Result<Vec<_>, _>>()?;
    Ok((headers, rows))
}

/// Render a worksheet cell as text.
///
/// Whole-number floats drop their fraction (`5551234.0` becomes
/// `5551234`); date cells become RFC 3339 timestamps; error cells are blank.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|naive| naive.and_utc().to_rfc3339())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => String::new(),
    }
}
