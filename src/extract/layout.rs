// src/extract/layout.rs
//! Where each table lives inside its workbook.
//!
//! Rows and columns are absolute and 0-based (row 0 is Excel row 1). These
//! are tied to the published workbook revisions; a re-layout of a workbook
//! means editing the matching record here and nothing else.

use std::ops::Range;

use super::ExtractionFailure;
use crate::config::Workbook;
use crate::grid::Grid;
use crate::tables::Race;

#[derive(Debug, Clone, Copy)]
pub struct SheetRef {
    pub workbook: Workbook,
    pub sheet: &'static str,
}

pub const SUMMARY_2023: SheetRef = SheetRef {
    workbook: Workbook::Summary2023,
    sheet: "Long Beach (2023)",
};

pub const RACE_ETHNICITY_2023: SheetRef = SheetRef {
    workbook: Workbook::RaceEthnicity2023,
    sheet: "Race_Ethnicity (2023)",
};

pub const RACE_BY_YEAR: SheetRef = SheetRef {
    workbook: Workbook::RaceByYear,
    sheet: "RACE BY YEAR",
};

pub const ZIP_BY_YEAR: SheetRef = SheetRef {
    workbook: Workbook::ZipByYear,
    sheet: "Zip and Year",
};

pub const ZIP_GENDER_AGE: SheetRef = SheetRef {
    workbook: Workbook::ZipGenderAge,
    sheet: "Zip, Gender, Age by Year",
};

/// A header row followed by a fixed count of data rows.
///
/// Rows past the end of the sheet read as blank; rows past `rows` are never
/// looked at.
#[derive(Debug, Clone, Copy)]
pub struct HeaderedBlock {
    pub source: SheetRef,
    pub header_row: u32,
    pub rows: u32,
}

impl HeaderedBlock {
    pub fn data_rows(&self) -> Range<u32> {
        let first = self.header_row + 1;
        first..first + self.rows
    }
}

/// How a marker cell is recognised.
#[derive(Debug, Clone, Copy)]
pub enum Marker {
    /// Trimmed cell text equals the literal
    Exact(&'static str),
    /// Cell text contains the literal anywhere
    Contains(&'static str),
}

impl Marker {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Marker::Exact(lit) => text.trim() == *lit,
            Marker::Contains(lit) => text.contains(lit),
        }
    }

    pub fn literal(&self) -> &'static str {
        match self {
            Marker::Exact(lit) | Marker::Contains(lit) => lit,
        }
    }
}

/// Locate a variable-position block by scanning one column for a marker.
#[derive(Debug, Clone, Copy)]
pub struct MarkerScan {
    pub column: u32,
    pub marker: Marker,
}

impl MarkerScan {
    /// First row in `rows` carrying the marker. No fallback position is
    /// guessed when it is absent.
    pub fn locate(&self, grid: &Grid, rows: Range<u32>) -> Result<u32, ExtractionFailure> {
        grid.find_row(self.column, rows, |t| self.marker.matches(t))
            .ok_or_else(|| ExtractionFailure::MarkerNotFound {
                sheet: grid.sheet().to_string(),
                marker: self.marker.literal().to_string(),
            })
    }
}

// ============================================================================
// Summary 2023 sheet
// ============================================================================

/// `Year | Total | Male | Female`, 2011..=2023.
pub const POPULATION_TREND: HeaderedBlock = HeaderedBlock {
    source: SUMMARY_2023,
    header_row: 98,
    rows: 13,
};
pub const POPULATION_TREND_HEADERS: [&str; 2] = ["Year", "Total"];

/// `Zip Code | LB 2023`, eleven ZIPs and sometimes a total row.
pub const ZIP_POPULATION: HeaderedBlock = HeaderedBlock {
    source: SUMMARY_2023,
    header_row: 113,
    rows: 12,
};

/// `Age Group | Male | Female | Total`.
pub const POPULATION_PYRAMID: HeaderedBlock = HeaderedBlock {
    source: SUMMARY_2023,
    header_row: 50,
    rows: 20,
};

pub const AGE_GROUP_TRENDS: HeaderedBlock = HeaderedBlock {
    source: SUMMARY_2023,
    header_row: 14,
    rows: 8,
};
pub const AGE_GROUP_ID_HEADER: &str = "Age Cat1";
/// Sheet header → Year value.
pub const AGE_GROUP_YEAR_HEADERS: [(&str, &str); 5] = [
    ("LB 2023", "2023"),
    ("LB 2022", "2022"),
    ("LB 2021", "2021"),
    ("LB 2020", "2020"),
    ("LB 2019", "2019"),
];

// ============================================================================
// Race/Ethnicity 2023 sheet
// ============================================================================

/// TOTAL row; columns 1..=5 follow [`Race::ALL`].
pub const RACE_TOTALS_ROW: u32 = 40;
pub const RACE_FIRST_COL: u32 = 1;

/// Compact Age x Race block, no header: age label then [`Race::MAJOR`].
pub const RACE_AGE_FIRST_ROW: u32 = 58;
pub const RACE_AGE_ROWS: u32 = 5;

pub const RACE_GENDER_MALE_ROW: u32 = 83;
pub const RACE_GENDER_FEMALE_ROW: u32 = 93;

// ============================================================================
// Race by year sheet
// ============================================================================

pub const RACE_TREND_ROW: u32 = 2;
pub const RACE_TREND_YEARS: Range<i32> = 2017..2024;
/// First column of each race's seven-year block.
pub const RACE_TREND_BLOCKS: [(Race, u32); 4] = [
    (Race::Hispanic, 1),
    (Race::White, 9),
    (Race::Asian, 17),
    (Race::Black, 25),
];

// ============================================================================
// ZIP by year sheet
// ============================================================================

/// First row of each year's block.
pub const ZIP_TREND_BLOCKS: [(i32, u32); 8] = [
    (2016, 2),
    (2017, 40),
    (2018, 77),
    (2019, 115),
    (2020, 153),
    (2021, 191),
    (2022, 229),
    (2023, 266),
];
/// Rows searched for the Total marker, counted from the block start.
pub const ZIP_TREND_WINDOW: u32 = 25;
/// ZIP header row, relative to the block start.
pub const ZIP_TREND_HEADER_OFFSET: u32 = 2;
pub const ZIP_TREND_COLS: Range<u32> = 1..12;
pub const ZIP_TREND_TOTAL: MarkerScan = MarkerScan {
    column: 0,
    marker: Marker::Exact("Total"),
};

// ============================================================================
// ZIP, gender, age sheet
// ============================================================================

pub const ZIP_AGE_YEAR: MarkerScan = MarkerScan {
    column: 0,
    marker: Marker::Contains("Year 2023"),
};
/// Offsets from the year marker row.
pub const ZIP_AGE_ZIP_OFFSET: u32 = 1;
pub const ZIP_AGE_SUBHEADER_OFFSET: u32 = 2;
pub const ZIP_AGE_FIRST_AGE_OFFSET: u32 = 4;
