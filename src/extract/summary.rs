// src/extract/summary.rs
//! Loaders over the city-wide 2023 summary sheet.

use super::layout::{
    HeaderedBlock, AGE_GROUP_ID_HEADER, AGE_GROUP_TRENDS, AGE_GROUP_YEAR_HEADERS,
    POPULATION_PYRAMID, POPULATION_TREND, POPULATION_TREND_HEADERS, ZIP_POPULATION,
};
use super::ExtractionFailure;
use crate::grid::Grid;
use crate::shape::{is_total_label, melt, zip_label_search, WideTable};
use crate::tables::{AgeGroupTrendRow, Gender, PopulationTrendRow, PyramidRow, ZipPopulationRow};

/// Fail unless the header row carries `expected`, left to right from column 0.
fn expect_headers(grid: &Grid, row: u32, expected: &[&str]) -> Result<(), ExtractionFailure> {
    for (col, want) in expected.iter().enumerate() {
        let found = grid.label(row, col as u32);
        if found.as_deref() != Some(*want) {
            return Err(ExtractionFailure::layout(
                grid.sheet(),
                format!(
                    "expected header `{}` at ({}, {}), found {:?}",
                    want, row, col, found
                ),
            ));
        }
    }
    Ok(())
}

/// Column of a named header, or a layout failure.
fn header_column(
    grid: &Grid,
    block: &HeaderedBlock,
    name: &str,
) -> Result<u32, ExtractionFailure> {
    grid.find_header(block.header_row, name).ok_or_else(|| {
        ExtractionFailure::layout(
            grid.sheet(),
            format!("header `{}` missing from row {}", name, block.header_row),
        )
    })
}

/// City population per year.
///
/// Rows with a blank or non-numeric Year or Total are dropped. A Year that
/// is numeric but not a whole number means the block has shifted.
pub fn population_trend(grid: &Grid) -> Result<Vec<PopulationTrendRow>, ExtractionFailure> {
    let block = POPULATION_TREND;
    expect_headers(grid, block.header_row, &POPULATION_TREND_HEADERS)?;

    let mut out = Vec::with_capacity(block.rows as usize);
    for row in block.data_rows() {
        let (Some(year), Some(total)) = (grid.number(row, 0), grid.number(row, 1)) else {
            continue;
        };
        if year.fract() != 0.0 || year < i32::MIN as f64 || year > i32::MAX as f64 {
            return Err(ExtractionFailure::Coercion {
                sheet: grid.sheet().to_string(),
                row,
                col: 0,
                detail: format!("year {} is not a whole number", year),
            });
        }
        out.push(PopulationTrendRow {
            year: year as i32,
            total: total.trunc() as i64,
        });
    }
    Ok(out)
}

/// 2023 population per ZIP. The summary row has no ZIP digits and drops out.
pub fn zip_population(grid: &Grid) -> Result<Vec<ZipPopulationRow>, ExtractionFailure> {
    let out = ZIP_POPULATION
        .data_rows()
        .filter_map(|row| {
            let zip_code = grid.text(row, 0).as_deref().and_then(zip_label_search)?;
            let population = grid.number(row, 1)?;
            Some(ZipPopulationRow {
                zip_code,
                population,
            })
        })
        .collect();
    Ok(out)
}

/// Age/gender pyramid with Male values negated.
pub fn population_pyramid(grid: &Grid) -> Result<Vec<PyramidRow>, ExtractionFailure> {
    let mut ages = Vec::new();
    let mut male = Vec::new();
    let mut female = Vec::new();

    for row in POPULATION_PYRAMID.data_rows() {
        let Some(age) = grid.label(row, 0) else {
            continue;
        };
        if is_total_label(&age) {
            continue;
        }
        ages.push(age);
        male.push(grid.number(row, 1).map(|v| -v));
        female.push(grid.number(row, 2));
    }

    let wide = WideTable::new(ages)
        .with_column(Gender::Male, male)
        .with_column(Gender::Female, female);

    Ok(melt(&wide)
        .into_iter()
        .map(|r| PyramidRow {
            age_group: r.id,
            gender: r.category,
            population: r.value,
        })
        .collect())
}

/// Population per age group for 2019..=2023, located by header text. A total
/// row inside the block is skipped.
pub fn age_group_trends(grid: &Grid) -> Result<Vec<AgeGroupTrendRow>, ExtractionFailure> {
    let block = AGE_GROUP_TRENDS;
    let id_col = header_column(grid, &block, AGE_GROUP_ID_HEADER)?;
    let year_cols = AGE_GROUP_YEAR_HEADERS
        .iter()
        .map(|(header, year)| header_column(grid, &block, header).map(|col| (*year, col)))
        .collect::<Result<Vec<_>, _>>()?;

    let rows: Vec<(u32, String)> = block
        .data_rows()
        .filter_map(|row| grid.label(row, id_col).map(|age| (row, age)))
        .filter(|(_, age)| !is_total_label(age))
        .collect();

    let mut wide = WideTable::new(rows.iter().map(|(_, age)| age.clone()).collect());
    for (year, col) in year_cols {
        let values = rows.iter().map(|(row, _)| grid.number(*row, col)).collect();
        wide.push_column(year, values);
    }

    Ok(melt(&wide)
        .into_iter()
        .map(|r| AgeGroupTrendRow {
            age_group: r.id,
            year: r.category.to_string(),
            population: r.value,
        })
        .collect())
}
