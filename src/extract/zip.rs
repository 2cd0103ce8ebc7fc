// src/extract/zip.rs
//! Per-ZIP loaders. Both locate their blocks by scanning for markers.

use calamine::Data;
use tracing::debug;

use super::layout::{
    ZIP_AGE_FIRST_AGE_OFFSET, ZIP_AGE_SUBHEADER_OFFSET, ZIP_AGE_YEAR, ZIP_AGE_ZIP_OFFSET,
    ZIP_TREND_BLOCKS, ZIP_TREND_COLS, ZIP_TREND_HEADER_OFFSET, ZIP_TREND_TOTAL, ZIP_TREND_WINDOW,
};
use super::ExtractionFailure;
use crate::grid::Grid;
use crate::shape::{is_total_label, melt, zip_label_exact, WideTable};
use crate::tables::{ZipAgeRow, ZipTrendRow};

/// Population per ZIP per year, 2016..=2023.
///
/// Each year block holds its counts on a `Total` row somewhere in its first
/// [`ZIP_TREND_WINDOW`] rows. A block without one contributes nothing; the
/// other years are unaffected.
pub fn zip_trends(grid: &Grid) -> Result<Vec<ZipTrendRow>, ExtractionFailure> {
    let mut out = Vec::new();

    for (year, start) in ZIP_TREND_BLOCKS {
        let total_row = match ZIP_TREND_TOTAL.locate(grid, start..start + ZIP_TREND_WINDOW) {
            Ok(row) => row,
            Err(e) => {
                debug!(year, cause = %e, "skipping year block");
                continue;
            }
        };

        let header_row = start + ZIP_TREND_HEADER_OFFSET;
        for col in ZIP_TREND_COLS {
            let Some(zip_code) = grid.text(header_row, col).as_deref().and_then(zip_label_exact)
            else {
                continue;
            };
            if let Some(population) = grid.number(total_row, col) {
                out.push(ZipTrendRow {
                    zip_code,
                    year,
                    population,
                });
            }
        }
    }

    Ok(out)
}

/// 2023 population per age group per ZIP.
///
/// Below the `Year 2023` marker sits a row of ZIPs and a row of
/// sub-headers; a ZIP's count is the column whose sub-header is `Total`.
/// Age rows start a fixed offset below the marker and run until the first
/// cell in column 0 that is not text.
pub fn zip_age_distribution(grid: &Grid) -> Result<Vec<ZipAgeRow>, ExtractionFailure> {
    // 1) find the year block
    let marker_row = ZIP_AGE_YEAR.locate(grid, 0..grid.height())?;
    let zip_row = marker_row + ZIP_AGE_ZIP_OFFSET;
    let subheader_row = marker_row + ZIP_AGE_SUBHEADER_OFFSET;

    // 2) ZIP columns: sub-header "Total" under a 5-digit ZIP
    let zip_cols: Vec<(String, u32)> = (0..grid.width())
        .filter(|&c| grid.label(subheader_row, c).is_some_and(|h| is_total_label(&h)))
        .filter_map(|c| {
            grid.text(zip_row, c)
                .as_deref()
                .and_then(zip_label_exact)
                .map(|zip| (zip, c))
        })
        .collect();

    // 3) age rows
    let mut ages: Vec<(String, u32)> = Vec::new();
    let mut row = marker_row + ZIP_AGE_FIRST_AGE_OFFSET;
    while let Some(Data::String(label)) = grid.cell(row, 0) {
        let label = label.trim();
        if label.is_empty() {
            break;
        }
        ages.push((label.to_string(), row));
        row += 1;
    }
    debug!(
        marker_row,
        zips = zip_cols.len(),
        ages = ages.len(),
        "zip/age block located"
    );

    // 4) age-major: every ZIP for the first age, then the next
    let mut wide = WideTable::new(zip_cols.iter().map(|(zip, _)| zip.clone()).collect());
    for (age, age_row) in &ages {
        let values = zip_cols
            .iter()
            .map(|(_, col)| grid.number(*age_row, *col))
            .collect();
        wide.push_column(age.clone(), values);
    }

    Ok(melt(&wide)
        .into_iter()
        .map(|r| ZipAgeRow {
            age_group: r.category,
            zip_code: r.id,
            population: r.value,
        })
        .collect())
}
