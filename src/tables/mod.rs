// src/tables/mod.rs
//! Record types for the ten tidy tables and their Arrow schemas.
//!
//! Field names in the schemas (and in serialized JSON) are the
//! human-readable column names the presentation layer charts by.

use arrow::{
    array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema, SchemaRef},
    error::ArrowError,
    record_batch::RecordBatch,
};
use serde::{Serialize, Serializer};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// Race/ethnicity categories, in the fixed column order the workbooks use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Race {
    Hispanic,
    White,
    Asian,
    Black,
    #[serde(rename = "NHPI")]
    Nhpi,
}

impl Race {
    /// The four categories broken out by year and by age.
    pub const MAJOR: [Race; 4] = [Race::Hispanic, Race::White, Race::Asian, Race::Black];
    /// All five categories of the 2023 totals.
    pub const ALL: [Race; 5] = [
        Race::Hispanic,
        Race::White,
        Race::Asian,
        Race::Black,
        Race::Nhpi,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Race::Hispanic => "Hispanic",
            Race::White => "White",
            Race::Asian => "Asian",
            Race::Black => "Black",
            Race::Nhpi => "NHPI",
        }
    }

    /// Label used by the 2023 totals breakdown.
    pub fn long_label(self) -> &'static str {
        match self {
            Race::Hispanic => "Hispanic or Latino",
            Race::White => "White (Not Hispanic)",
            Race::Asian => "Asian (Not Hispanic)",
            Race::Black => "Black (Not Hispanic)",
            Race::Nhpi => "NHPI (Not Hispanic)",
        }
    }
}

fn race_long_label<S: Serializer>(race: &Race, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(race.long_label())
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationTrendRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Total")]
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipPopulationRow {
    #[serde(rename = "ZIP Code")]
    pub zip_code: String,
    #[serde(rename = "Population")]
    pub population: f64,
}

/// Male populations are stored negated so both halves share one axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PyramidRow {
    #[serde(rename = "Age Group")]
    pub age_group: String,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "Population")]
    pub population: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeGroupTrendRow {
    #[serde(rename = "Age Group")]
    pub age_group: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Population")]
    pub population: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceTotalRow {
    #[serde(rename = "Race/Ethnicity", serialize_with = "race_long_label")]
    pub race: Race,
    #[serde(rename = "Population")]
    pub population: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceTrendRow {
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Race/Ethnicity")]
    pub race: Race,
    #[serde(rename = "Population")]
    pub population: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceAgeRow {
    #[serde(rename = "Age Group")]
    pub age_group: String,
    #[serde(rename = "Race/Ethnicity")]
    pub race: Race,
    #[serde(rename = "Population")]
    pub population: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceGenderRow {
    #[serde(rename = "Race/Ethnicity")]
    pub race: Race,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "Population")]
    pub population: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipTrendRow {
    #[serde(rename = "ZIP Code")]
    pub zip_code: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Population")]
    pub population: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipAgeRow {
    #[serde(rename = "Age Group")]
    pub age_group: String,
    #[serde(rename = "ZIP Code")]
    pub zip_code: String,
    #[serde(rename = "Population")]
    pub population: f64,
}

// ============================================================================
// Arrow conversion
// ============================================================================

/// A record type of one tidy table.
pub trait TidyRecord: Sized + Serialize {
    /// Stable snake_case table name, used for file names and log fields.
    const TABLE: &'static str;

    fn fields() -> Vec<Field>;

    fn columns(rows: &[Self]) -> Vec<ArrayRef>;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(Self::fields()))
    }

    fn field_names() -> Vec<String> {
        Self::fields().iter().map(|f| f.name().clone()).collect()
    }

    /// Rows as one batch. An empty slice gives a zero-row batch that still
    /// carries the full schema.
    fn record_batch(rows: &[Self]) -> Result<RecordBatch, ArrowError> {
        RecordBatch::try_new(Self::schema(), Self::columns(rows))
    }
}

fn text_field(name: &str) -> Field {
    Field::new(name, DataType::Utf8, false)
}

fn number_field(name: &str) -> Field {
    Field::new(name, DataType::Float64, false)
}

fn text_col<R>(rows: &[R], f: impl Fn(&R) -> &str) -> ArrayRef {
    Arc::new(rows.iter().map(|r| Some(f(r))).collect::<StringArray>())
}

fn number_col<R>(rows: &[R], f: impl Fn(&R) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(rows.iter().map(f)))
}

impl TidyRecord for PopulationTrendRow {
    const TABLE: &'static str = "population_trend";

    fn fields() -> Vec<Field> {
        vec![
            Field::new("Year", DataType::Int32, false),
            Field::new("Total", DataType::Int64, false),
        ]
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.total))),
        ]
    }
}

impl TidyRecord for ZipPopulationRow {
    const TABLE: &'static str = "zip_population_2023";

    fn fields() -> Vec<Field> {
        vec![text_field("ZIP Code"), number_field("Population")]
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            text_col(rows, |r| &r.zip_code),
            number_col(rows, |r| r.population),
        ]
    }
}

impl TidyRecord for PyramidRow {
    const TABLE: &'static str = "population_pyramid_2023";

    fn fields() -> Vec<Field> {
        vec![
            text_field("Age Group"),
            text_field("Gender"),
            number_field("Population"),
        ]
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            text_col(rows, |r| &r.age_group),
            text_col(rows, |r| r.gender.label()),
            number_col(rows, |r| r.population),
        ]
    }
}

impl TidyRecord for AgeGroupTrendRow {
    const TABLE: &'static str = "age_group_trends";

    fn fields() -> Vec<Field> {
        vec![
            text_field("Age Group"),
            text_field("Year"),
            number_field("Population"),
        ]
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            text_col(rows, |r| &r.age_group),
            text_col(rows, |r| &r.year),
            number_col(rows, |r| r.population),
        ]
    }
}

impl TidyRecord for RaceTotalRow {
    const TABLE: &'static str = "race_totals_2023";

    fn fields() -> Vec<Field> {
        vec![text_field("Race/Ethnicity"), number_field("Population")]
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            text_col(rows, |r| r.race.long_label()),
            number_col(rows, |r| r.population),
        ]
    }
}

impl TidyRecord for RaceTrendRow {
    const TABLE: &'static str = "race_trends";

    fn fields() -> Vec<Field> {
        vec![
            text_field("Year"),
            text_field("Race/Ethnicity"),
            number_field("Population"),
        ]
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            text_col(rows, |r| &r.year),
            text_col(rows, |r| r.race.label()),
            number_col(rows, |r| r.population),
        ]
    }
}

impl TidyRecord for RaceAgeRow {
    const TABLE: &'static str = "race_age_distribution_2023";

    fn fields() -> Vec<Field> {
        vec![
            text_field("Age Group"),
            text_field("Race/Ethnicity"),
            number_field("Population"),
        ]
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            text_col(rows, |r| &r.age_group),
            text_col(rows, |r| r.race.label()),
            number_col(rows, |r| r.population),
        ]
    }
}

impl TidyRecord for RaceGenderRow {
    const TABLE: &'static str = "race_gender_distribution_2023";

    fn fields() -> Vec<Field> {
        vec![
            text_field("Race/Ethnicity"),
            text_field("Gender"),
            number_field("Population"),
        ]
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            text_col(rows, |r| r.race.label()),
            text_col(rows, |r| r.gender.label()),
            number_col(rows, |r| r.population),
        ]
    }
}

impl TidyRecord for ZipTrendRow {
    const TABLE: &'static str = "zip_trends";

    fn fields() -> Vec<Field> {
        vec![
            text_field("ZIP Code"),
            Field::new("Year", DataType::Int32, false),
            number_field("Population"),
        ]
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            text_col(rows, |r| &r.zip_code),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
            number_col(rows, |r| r.population),
        ]
    }
}

impl TidyRecord for ZipAgeRow {
    const TABLE: &'static str = "zip_age_distribution_2023";

    fn fields() -> Vec<Field> {
        vec![
            text_field("Age Group"),
            text_field("ZIP Code"),
            number_field("Population"),
        ]
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            text_col(rows, |r| &r.age_group),
            text_col(rows, |r| &r.zip_code),
            number_col(rows, |r| r.population),
        ]
    }
}

// ============================================================================
// ZIP selection
// ============================================================================

/// Records keyed by a `"ZIP {5 digits}"` label.
pub trait HasZipCode {
    fn zip_code(&self) -> &str;
}

impl HasZipCode for ZipPopulationRow {
    fn zip_code(&self) -> &str {
        &self.zip_code
    }
}

impl HasZipCode for ZipTrendRow {
    fn zip_code(&self) -> &str {
        &self.zip_code
    }
}

impl HasZipCode for ZipAgeRow {
    fn zip_code(&self) -> &str {
        &self.zip_code
    }
}

/// Keep only the records whose ZIP label is in `selected`.
///
/// An empty selection selects nothing.
pub fn select_zip_codes<R: HasZipCode>(rows: Vec<R>, selected: &[String]) -> Vec<R> {
    rows.into_iter()
        .filter(|r| selected.iter().any(|s| s == r.zip_code()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(zip: &str, year: i32, population: f64) -> ZipTrendRow {
        ZipTrendRow {
            zip_code: zip.to_string(),
            year,
            population,
        }
    }

    #[test]
    fn empty_batch_keeps_schema() {
        let batch = PyramidRow::record_batch(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        let names: Vec<&str> = batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect();
        assert_eq!(names, vec!["Age Group", "Gender", "Population"]);
    }

    #[test]
    fn race_totals_use_long_labels() {
        let rows = vec![RaceTotalRow {
            race: Race::Nhpi,
            population: 123.0,
        }];
        let batch = RaceTotalRow::record_batch(&rows).unwrap();
        let labels = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(labels.value(0), "NHPI (Not Hispanic)");

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["Race/Ethnicity"], "NHPI (Not Hispanic)");
        assert_eq!(json["Population"], 123.0);
    }

    #[test]
    fn short_race_labels_serialize_as_shown() {
        let row = RaceGenderRow {
            race: Race::Nhpi,
            gender: Gender::Female,
            population: 1.0,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["Race/Ethnicity"], "NHPI");
        assert_eq!(json["Gender"], "Female");
    }

    #[test]
    fn zip_selection_filters_rows() {
        let rows = vec![
            trend("ZIP 90805", 2016, 1.0),
            trend("ZIP 90802", 2016, 2.0),
            trend("ZIP 90814", 2017, 3.0),
        ];
        let picked = select_zip_codes(
            rows.clone(),
            &["ZIP 90805".to_string(), "ZIP 90814".to_string()],
        );
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|r| r.zip_code != "ZIP 90802"));

        assert!(select_zip_codes(rows, &[]).is_empty());
    }
}
