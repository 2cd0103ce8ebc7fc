// src/extract/mod.rs
//! The extraction layer: ten loaders, one tidy table each.
//!
//! Every loader comes in two forms. `try_<loader>` returns the discriminated
//! [`Result`], so callers and tests can see why a table is missing.
//! `<loader>` is the dashboard-facing form: any [`ExtractionFailure`] is
//! logged and replaced with the empty table of the same schema, so one bad
//! workbook never takes the other tables down with it.

pub mod error;
pub mod layout;
pub mod race;
pub mod summary;
pub mod zip;

use std::path::PathBuf;
use tracing::{debug, warn};

pub use error::ExtractionFailure;

use crate::config::{Config, Workbook, WorkbookFiles};
use crate::grid::{open_xlsx_sheet, Grid};
use crate::tables::{
    AgeGroupTrendRow, PopulationTrendRow, PyramidRow, RaceAgeRow, RaceGenderRow, RaceTotalRow,
    RaceTrendRow, TidyRecord, ZipAgeRow, ZipPopulationRow, ZipTrendRow,
};
use layout::SheetRef;

/// Anything that can hand out a sheet of one of the five workbooks.
pub trait WorkbookSource {
    fn open_sheet(&self, sheet: SheetRef) -> Result<Grid, ExtractionFailure>;
}

/// Reads `.xlsx` files from disk. Every call re-opens the file.
#[derive(Debug, Clone)]
pub struct XlsxSource {
    dir: PathBuf,
    files: WorkbookFiles,
}

impl XlsxSource {
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.workbook_dir.clone(),
            files: config.workbooks.clone(),
        }
    }

    pub fn path(&self, workbook: Workbook) -> PathBuf {
        self.dir.join(self.files.file_name(workbook))
    }
}

impl WorkbookSource for XlsxSource {
    fn open_sheet(&self, sheet: SheetRef) -> Result<Grid, ExtractionFailure> {
        open_xlsx_sheet(&self.path(sheet.workbook), sheet.sheet)
    }
}

/// All ten tables from one pass over the workbooks.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    pub population_trend: Vec<PopulationTrendRow>,
    pub zip_population: Vec<ZipPopulationRow>,
    pub population_pyramid: Vec<PyramidRow>,
    pub age_group_trends: Vec<AgeGroupTrendRow>,
    pub race_totals: Vec<RaceTotalRow>,
    pub race_trends: Vec<RaceTrendRow>,
    pub race_age_distribution: Vec<RaceAgeRow>,
    pub race_gender_distribution: Vec<RaceGenderRow>,
    pub zip_trends: Vec<ZipTrendRow>,
    pub zip_age_distribution: Vec<ZipAgeRow>,
}

impl TableSet {
    /// `(table, rows)` for every table, in loader order.
    pub fn row_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            (PopulationTrendRow::TABLE, self.population_trend.len()),
            (ZipPopulationRow::TABLE, self.zip_population.len()),
            (PyramidRow::TABLE, self.population_pyramid.len()),
            (AgeGroupTrendRow::TABLE, self.age_group_trends.len()),
            (RaceTotalRow::TABLE, self.race_totals.len()),
            (RaceTrendRow::TABLE, self.race_trends.len()),
            (RaceAgeRow::TABLE, self.race_age_distribution.len()),
            (RaceGenderRow::TABLE, self.race_gender_distribution.len()),
            (ZipTrendRow::TABLE, self.zip_trends.len()),
            (ZipAgeRow::TABLE, self.zip_age_distribution.len()),
        ]
    }
}

/// Collapse a failed extraction into the empty table.
fn or_empty<R>(loader: &'static str, result: Result<Vec<R>, ExtractionFailure>) -> Vec<R> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!(loader, cause = %e, "extraction failed, using empty table");
            Vec::new()
        }
    }
}

pub struct Extractor<S = XlsxSource> {
    source: S,
}

impl Extractor<XlsxSource> {
    pub fn new(config: &Config) -> Self {
        Self {
            source: XlsxSource::new(config),
        }
    }
}

impl<S: WorkbookSource> Extractor<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Open the sheet and shape it. The grid is dropped before returning.
    fn load<R, F>(&self, sheet: SheetRef, shape: F) -> Result<Vec<R>, ExtractionFailure>
    where
        R: TidyRecord,
        F: FnOnce(&Grid) -> Result<Vec<R>, ExtractionFailure>,
    {
        let grid = self.source.open_sheet(sheet)?;
        let rows = shape(&grid)?;
        debug!(table = R::TABLE, rows = rows.len(), "table shaped");
        Ok(rows)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn try_population_trend(&self) -> Result<Vec<PopulationTrendRow>, ExtractionFailure> {
        self.load(layout::POPULATION_TREND.source, summary::population_trend)
    }

    pub fn population_trend(&self) -> Vec<PopulationTrendRow> {
        or_empty("population_trend", self.try_population_trend())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn try_zip_population(&self) -> Result<Vec<ZipPopulationRow>, ExtractionFailure> {
        self.load(layout::ZIP_POPULATION.source, summary::zip_population)
    }

    pub fn zip_population(&self) -> Vec<ZipPopulationRow> {
        or_empty("zip_population", self.try_zip_population())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn try_population_pyramid(&self) -> Result<Vec<PyramidRow>, ExtractionFailure> {
        self.load(layout::POPULATION_PYRAMID.source, summary::population_pyramid)
    }

    pub fn population_pyramid(&self) -> Vec<PyramidRow> {
        or_empty("population_pyramid", self.try_population_pyramid())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn try_age_group_trends(&self) -> Result<Vec<AgeGroupTrendRow>, ExtractionFailure> {
        self.load(layout::AGE_GROUP_TRENDS.source, summary::age_group_trends)
    }

    pub fn age_group_trends(&self) -> Vec<AgeGroupTrendRow> {
        or_empty("age_group_trends", self.try_age_group_trends())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn try_race_totals(&self) -> Result<Vec<RaceTotalRow>, ExtractionFailure> {
        self.load(layout::RACE_ETHNICITY_2023, race::race_totals)
    }

    pub fn race_totals(&self) -> Vec<RaceTotalRow> {
        or_empty("race_totals", self.try_race_totals())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn try_race_trends(&self) -> Result<Vec<RaceTrendRow>, ExtractionFailure> {
        self.load(layout::RACE_BY_YEAR, race::race_trends)
    }

    pub fn race_trends(&self) -> Vec<RaceTrendRow> {
        or_empty("race_trends", self.try_race_trends())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn try_race_age_distribution(&self) -> Result<Vec<RaceAgeRow>, ExtractionFailure> {
        self.load(layout::RACE_ETHNICITY_2023, race::race_age_distribution)
    }

    pub fn race_age_distribution(&self) -> Vec<RaceAgeRow> {
        or_empty("race_age_distribution", self.try_race_age_distribution())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn try_race_gender_distribution(&self) -> Result<Vec<RaceGenderRow>, ExtractionFailure> {
        self.load(layout::RACE_ETHNICITY_2023, race::race_gender_distribution)
    }

    pub fn race_gender_distribution(&self) -> Vec<RaceGenderRow> {
        or_empty(
            "race_gender_distribution",
            self.try_race_gender_distribution(),
        )
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn try_zip_trends(&self) -> Result<Vec<ZipTrendRow>, ExtractionFailure> {
        self.load(layout::ZIP_BY_YEAR, zip::zip_trends)
    }

    pub fn zip_trends(&self) -> Vec<ZipTrendRow> {
        or_empty("zip_trends", self.try_zip_trends())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn try_zip_age_distribution(&self) -> Result<Vec<ZipAgeRow>, ExtractionFailure> {
        self.load(layout::ZIP_GENDER_AGE, zip::zip_age_distribution)
    }

    pub fn zip_age_distribution(&self) -> Vec<ZipAgeRow> {
        or_empty("zip_age_distribution", self.try_zip_age_distribution())
    }

    /// Run every loader once. Never fails; broken sources yield empty tables.
    pub fn load_all(&self) -> TableSet {
        TableSet {
            population_trend: self.population_trend(),
            zip_population: self.zip_population(),
            population_pyramid: self.population_pyramid(),
            age_group_trends: self.age_group_trends(),
            race_totals: self.race_totals(),
            race_trends: self.race_trends(),
            race_age_distribution: self.race_age_distribution(),
            race_gender_distribution: self.race_gender_distribution(),
            zip_trends: self.zip_trends(),
            zip_age_distribution: self.zip_age_distribution(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::grid::tests::{grid, n, s};
    use anyhow::Result;
    use rust_xlsxwriter::Workbook as XlsxWriter;
    use std::collections::HashMap;
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    pub(crate) fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,acsgrid=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// In-memory sheets keyed by sheet name.
    struct MemorySource {
        sheets: HashMap<&'static str, Grid>,
    }

    impl WorkbookSource for MemorySource {
        fn open_sheet(&self, sheet: SheetRef) -> Result<Grid, ExtractionFailure> {
            self.sheets
                .get(sheet.sheet)
                .cloned()
                .ok_or_else(|| ExtractionFailure::SheetNotFound {
                    workbook: format!("{:?}", sheet.workbook),
                    sheet: sheet.sheet.to_string(),
                })
        }
    }

    /// Field names of `R`, checked against an empty batch's schema.
    fn names<R: TidyRecord>() -> Vec<String> {
        let batch = R::record_batch(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        let from_batch: Vec<String> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(from_batch, R::field_names());
        R::field_names()
    }

    #[test]
    fn missing_workbooks_yield_empty_tables_with_schema() {
        init_test_logging();
        let dir = tempdir().unwrap();
        let config = Config {
            workbook_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let extractor = Extractor::new(&config);

        assert!(matches!(
            extractor.try_population_trend(),
            Err(ExtractionFailure::WorkbookNotFound(_))
        ));

        let set = extractor.load_all();
        assert!(set.row_counts().iter().all(|(_, rows)| *rows == 0));
        assert_eq!(set.row_counts().len(), 10);

        assert_eq!(names::<PopulationTrendRow>(), vec!["Year", "Total"]);
        assert_eq!(names::<ZipPopulationRow>(), vec!["ZIP Code", "Population"]);
        assert_eq!(
            names::<PyramidRow>(),
            vec!["Age Group", "Gender", "Population"]
        );
        assert_eq!(
            names::<AgeGroupTrendRow>(),
            vec!["Age Group", "Year", "Population"]
        );
        assert_eq!(
            names::<RaceTotalRow>(),
            vec!["Race/Ethnicity", "Population"]
        );
        assert_eq!(
            names::<RaceTrendRow>(),
            vec!["Year", "Race/Ethnicity", "Population"]
        );
        assert_eq!(
            names::<RaceAgeRow>(),
            vec!["Age Group", "Race/Ethnicity", "Population"]
        );
        assert_eq!(
            names::<RaceGenderRow>(),
            vec!["Race/Ethnicity", "Gender", "Population"]
        );
        assert_eq!(
            names::<ZipTrendRow>(),
            vec!["ZIP Code", "Year", "Population"]
        );
        assert_eq!(
            names::<ZipAgeRow>(),
            vec!["Age Group", "ZIP Code", "Population"]
        );
    }

    #[test]
    fn one_broken_sheet_leaves_the_others_alone() {
        init_test_logging();
        let mut totals = Vec::new();
        for (i, v) in [12345.0, 54321.0, 9876.0, 4321.0, 123.0].iter().enumerate() {
            totals.push((layout::RACE_TOTALS_ROW, 1 + i as u32, n(*v)));
        }
        let mut sheets = HashMap::new();
        sheets.insert(
            layout::RACE_ETHNICITY_2023.sheet,
            grid(layout::RACE_ETHNICITY_2023.sheet, &totals),
        );
        // summary sheet present but shifted: no Year/Total header at row 98
        sheets.insert(
            layout::SUMMARY_2023.sheet,
            grid(layout::SUMMARY_2023.sheet, &[(0, 0, s("Year"))]),
        );
        let extractor = Extractor::with_source(MemorySource { sheets });

        assert!(matches!(
            extractor.try_population_trend(),
            Err(ExtractionFailure::Layout { .. })
        ));
        assert!(matches!(
            extractor.try_zip_trends(),
            Err(ExtractionFailure::SheetNotFound { .. })
        ));

        let set = extractor.load_all();
        assert!(set.population_trend.is_empty());
        assert!(set.zip_trends.is_empty());
        assert_eq!(set.race_totals.len(), 5);
    }

    #[test]
    fn reads_population_trend_from_real_workbook() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let config = Config {
            workbook_dir: dir.path().to_path_buf(),
            ..Config::default()
        };

        let mut book = XlsxWriter::new();
        let sheet = book.add_worksheet();
        sheet.set_name(layout::SUMMARY_2023.sheet)?;
        sheet.write_string(98, 0, "Year")?;
        sheet.write_string(98, 1, "Total")?;
        for (i, year) in (2011..=2023).enumerate() {
            let row = 99 + i as u32;
            sheet.write_number(row, 0, year as f64)?;
            if year != 2020 {
                sheet.write_number(row, 1, 450_000.0 + (i as f64) * 1_000.0)?;
            }
        }
        book.save(config.workbook_path(Workbook::Summary2023))?;

        let extractor = Extractor::new(&config);
        let rows = extractor.population_trend();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].year, 2011);
        assert_eq!(rows[0].total, 450_000);
        assert!(rows.iter().all(|r| r.year != 2020));

        // other loaders on the same workbook just see no data
        assert!(extractor.try_zip_population()?.is_empty());
        // a sheet the workbook lacks
        assert!(extractor.race_trends().is_empty());
        Ok(())
    }
}
