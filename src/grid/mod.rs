// src/grid/mod.rs
//! Absolute-addressed view of one worksheet.
//!
//! calamine trims a sheet's range to its first used cell, so a relative
//! `(0, 0)` may sit anywhere on the sheet. Every layout in this crate is
//! written in absolute 0-based sheet coordinates (row 0 is Excel row 1), and
//! [`Grid`] only ever answers in those.

pub mod cell;

use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};
use std::{fs::File, io::BufReader, path::Path};
use tracing::debug;

use crate::extract::ExtractionFailure;
pub use cell::{cell_number, cell_text, clean_str, parse_number};

/// One worksheet's cells, addressed by absolute `(row, col)`.
#[derive(Debug, Clone)]
pub struct Grid {
    sheet: String,
    range: Range<Data>,
}

impl Grid {
    pub fn new(sheet: impl Into<String>, range: Range<Data>) -> Self {
        Self {
            sheet: sheet.into(),
            range,
        }
    }

    /// Name of the sheet the cells came from.
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// Number of rows from the top of the sheet to the last used row.
    pub fn height(&self) -> u32 {
        self.range.end().map_or(0, |(r, _)| r + 1)
    }

    /// Number of columns from column A to the last used column.
    pub fn width(&self) -> u32 {
        self.range.end().map_or(0, |(_, c)| c + 1)
    }

    /// The cell at `(row, col)`, `None` when blank or outside the used range.
    pub fn cell(&self, row: u32, col: u32) -> Option<&Data> {
        self.range
            .get_value((row, col))
            .filter(|c| !matches!(c, Data::Empty))
    }

    pub fn text(&self, row: u32, col: u32) -> Option<String> {
        self.cell(row, col).and_then(cell_text)
    }

    /// Trimmed text, `None` when the trimmed value is blank.
    pub fn label(&self, row: u32, col: u32) -> Option<String> {
        self.text(row, col)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn number(&self, row: u32, col: u32) -> Option<f64> {
        self.cell(row, col).and_then(cell_number)
    }

    /// First row in `rows` whose cell in `col` satisfies `pred`.
    pub fn find_row<F>(&self, col: u32, rows: std::ops::Range<u32>, pred: F) -> Option<u32>
    where
        F: Fn(&str) -> bool,
    {
        let end = rows.end.min(self.height());
        (rows.start..end).find(|&r| self.text(r, col).is_some_and(|t| pred(&t)))
    }

    /// Column in `row` whose trimmed text equals `label` exactly.
    pub fn find_header(&self, row: u32, label: &str) -> Option<u32> {
        (0..self.width()).find(|&c| self.label(row, c).as_deref() == Some(label))
    }
}

/// Open `sheet` of the `.xlsx` at `path` into a [`Grid`].
///
/// The workbook (and its file handle) is dropped before this returns, on the
/// success path and on every error path.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn open_xlsx_sheet(path: &Path, sheet: &str) -> Result<Grid, ExtractionFailure> {
    // 1) missing file is its own failure, not a generic open error
    if !path.is_file() {
        return Err(ExtractionFailure::WorkbookNotFound(path.to_path_buf()));
    }

    // 2) open the package
    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook(path).map_err(|e: XlsxError| ExtractionFailure::WorkbookOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    // 3) resolve the sheet by exact name
    if !workbook.sheet_names().iter().any(|n| n == sheet) {
        return Err(ExtractionFailure::SheetNotFound {
            workbook: path.display().to_string(),
            sheet: sheet.to_string(),
        });
    }
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| ExtractionFailure::WorkbookOpen {
            path: path.to_path_buf(),
            reason: format!("reading sheet `{}`: {}", sheet, e),
        })?;

    let grid = Grid::new(sheet, range);
    debug!(rows = grid.height(), cols = grid.width(), "sheet loaded");
    Ok(grid)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::Result;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    /// Build a grid from `(row, col, value)` triples.
    pub(crate) fn grid(sheet: &str, cells: &[(u32, u32, Data)]) -> Grid {
        if cells.is_empty() {
            return Grid::new(sheet, Range::empty());
        }
        // anchor at A1 so relative and absolute positions coincide
        let max_r = cells.iter().map(|(r, _, _)| *r).max().unwrap_or(0);
        let max_c = cells.iter().map(|(_, c, _)| *c).max().unwrap_or(0);
        let mut range = Range::new((0, 0), (max_r, max_c));
        for (r, c, v) in cells {
            range.set_value((*r, *c), v.clone());
        }
        Grid::new(sheet, range)
    }

    pub(crate) fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    pub(crate) fn n(v: f64) -> Data {
        Data::Float(v)
    }

    #[test]
    fn addressing_is_absolute() {
        let g = grid("Sheet1", &[(5, 2, s("hello")), (7, 4, n(3.0))]);
        assert_eq!(g.text(5, 2).as_deref(), Some("hello"));
        assert_eq!(g.number(7, 4), Some(3.0));
        assert_eq!(g.cell(0, 0), None);
        assert_eq!(g.height(), 8);
        assert_eq!(g.width(), 5);
        assert_eq!(g.cell(100, 100), None);
    }

    #[test]
    fn find_row_respects_window_and_sheet_end() {
        let g = grid(
            "Sheet1",
            &[(1, 0, s("Age")), (4, 0, s("Total")), (9, 0, s("Total"))],
        );
        assert_eq!(g.find_row(0, 0..5, |t| t == "Total"), Some(4));
        assert_eq!(g.find_row(0, 5..500, |t| t == "Total"), Some(9));
        assert_eq!(g.find_row(0, 0..4, |t| t == "Total"), None);
    }

    #[test]
    fn find_header_matches_trimmed_label() {
        let g = grid("Sheet1", &[(3, 0, s(" Age Cat1 ")), (3, 2, s("LB 2023"))]);
        assert_eq!(g.find_header(3, "Age Cat1"), Some(0));
        assert_eq!(g.find_header(3, "LB 2023"), Some(2));
        assert_eq!(g.find_header(3, "LB 2022"), None);
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let dir = tempdir().unwrap();
        let err = open_xlsx_sheet(&dir.path().join("nope.xlsx"), "Sheet1").unwrap_err();
        assert!(matches!(err, ExtractionFailure::WorkbookNotFound(_)));
    }

    #[test]
    fn garbage_file_is_an_open_failure() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive")?;
        let err = open_xlsx_sheet(&path, "Sheet1").unwrap_err();
        assert!(matches!(err, ExtractionFailure::WorkbookOpen { .. }));
        Ok(())
    }

    #[test]
    fn reads_real_xlsx_with_leading_blank_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("book.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Long Beach (2023)")?;
        sheet.write_string(98, 0, "Year")?;
        sheet.write_number(99, 0, 2011.0)?;
        sheet.write_number(99, 1, 462_257.0)?;
        workbook.save(&path)?;

        let g = open_xlsx_sheet(&path, "Long Beach (2023)")?;
        assert_eq!(g.sheet(), "Long Beach (2023)");
        assert_eq!(g.text(98, 0).as_deref(), Some("Year"));
        assert_eq!(g.number(99, 0), Some(2011.0));
        assert_eq!(g.number(99, 1), Some(462_257.0));

        let err = open_xlsx_sheet(&path, "RACE BY YEAR").unwrap_err();
        assert!(matches!(err, ExtractionFailure::SheetNotFound { .. }));
        Ok(())
    }
}
