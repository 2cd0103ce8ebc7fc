// src/extract/race.rs
//! Race/ethnicity loaders. Columns map to [`Race`] categories by fixed
//! position, so relabeling is the category order in the layout records.

use super::layout::{
    RACE_AGE_FIRST_ROW, RACE_AGE_ROWS, RACE_FIRST_COL, RACE_GENDER_FEMALE_ROW,
    RACE_GENDER_MALE_ROW, RACE_TOTALS_ROW, RACE_TREND_BLOCKS, RACE_TREND_ROW, RACE_TREND_YEARS,
};
use super::ExtractionFailure;
use crate::grid::Grid;
use crate::shape::{is_total_label, melt, WideTable};
use crate::tables::{Gender, Race, RaceAgeRow, RaceGenderRow, RaceTotalRow, RaceTrendRow};

/// Values of `row` for `races`, one column each starting at [`RACE_FIRST_COL`].
fn race_row(grid: &Grid, row: u32, races: &[Race]) -> Vec<Option<f64>> {
    (0..races.len() as u32)
        .map(|i| grid.number(row, RACE_FIRST_COL + i))
        .collect()
}

/// 2023 totals per race, long labels.
pub fn race_totals(grid: &Grid) -> Result<Vec<RaceTotalRow>, ExtractionFailure> {
    let values = race_row(grid, RACE_TOTALS_ROW, &Race::ALL);
    Ok(Race::ALL
        .iter()
        .zip(values)
        .filter_map(|(race, v)| {
            v.map(|population| RaceTotalRow {
                race: *race,
                population,
            })
        })
        .collect())
}

/// Totals per race per year, 2017..=2023, race by race.
pub fn race_trends(grid: &Grid) -> Result<Vec<RaceTrendRow>, ExtractionFailure> {
    let years: Vec<String> = RACE_TREND_YEARS.map(|y| y.to_string()).collect();
    let mut wide = WideTable::new(years);
    for (race, first_col) in RACE_TREND_BLOCKS {
        let values = (0..wide.ids.len() as u32)
            .map(|i| grid.number(RACE_TREND_ROW, first_col + i))
            .collect();
        wide.push_column(race, values);
    }

    Ok(melt(&wide)
        .into_iter()
        .map(|r| RaceTrendRow {
            year: r.id,
            race: r.category,
            population: r.value,
        })
        .collect())
}

/// Age x race block for 2023, race by race. A total row inside the block is
/// skipped.
pub fn race_age_distribution(grid: &Grid) -> Result<Vec<RaceAgeRow>, ExtractionFailure> {
    let rows: Vec<(u32, String)> = (RACE_AGE_FIRST_ROW..RACE_AGE_FIRST_ROW + RACE_AGE_ROWS)
        .filter_map(|row| grid.label(row, 0).map(|age| (row, age)))
        .filter(|(_, age)| !is_total_label(age))
        .collect();

    let mut wide = WideTable::new(rows.iter().map(|(_, age)| age.clone()).collect());
    for (i, race) in Race::MAJOR.iter().enumerate() {
        let values = rows
            .iter()
            .map(|(row, _)| grid.number(*row, RACE_FIRST_COL + i as u32))
            .collect();
        wide.push_column(*race, values);
    }

    Ok(melt(&wide)
        .into_iter()
        .map(|r| RaceAgeRow {
            age_group: r.id,
            race: r.category,
            population: r.value,
        })
        .collect())
}

/// Male and female totals per race for 2023; every male row precedes the
/// female rows.
pub fn race_gender_distribution(grid: &Grid) -> Result<Vec<RaceGenderRow>, ExtractionFailure> {
    let wide = WideTable::new(Race::ALL.to_vec())
        .with_column(
            Gender::Male,
            race_row(grid, RACE_GENDER_MALE_ROW, &Race::ALL),
        )
        .with_column(
            Gender::Female,
            race_row(grid, RACE_GENDER_FEMALE_ROW, &Race::ALL),
        );

    Ok(melt(&wide)
        .into_iter()
        .map(|r| RaceGenderRow {
            race: r.id,
            gender: r.category,
            population: r.value,
        })
        .collect())
}
