// src/config/mod.rs
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::shape::is_zip_label;

/// The five source workbooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Workbook {
    /// City-wide 2023 estimates: trend, ZIP, pyramid and age sheets
    Summary2023,
    RaceByYear,
    RaceEthnicity2023,
    ZipByYear,
    ZipGenderAge,
}

/// File name of each workbook, relative to [`Config::workbook_dir`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookFiles {
    pub summary_2023: String,
    pub race_by_year: String,
    pub race_ethnicity_2023: String,
    pub zip_by_year: String,
    pub zip_gender_age: String,
}

impl Default for WorkbookFiles {
    fn default() -> Self {
        Self {
            summary_2023: "Long Beach 2023 Estimates - Copy.xlsx".into(),
            race_by_year: "Long Beach race by year US Estimates - Copy.xlsx".into(),
            race_ethnicity_2023: "Long Beach gen and total US Estimates - Copy.xlsx".into(),
            zip_by_year: "Long Beach zip and year Estimates - Copy.xlsx".into(),
            zip_gender_age: "Long Beach zip gender year Estimates - Copy.xlsx".into(),
        }
    }
}

impl WorkbookFiles {
    pub fn file_name(&self, workbook: Workbook) -> &str {
        match workbook {
            Workbook::Summary2023 => &self.summary_2023,
            Workbook::RaceByYear => &self.race_by_year,
            Workbook::RaceEthnicity2023 => &self.race_ethnicity_2023,
            Workbook::ZipByYear => &self.zip_by_year,
            Workbook::ZipGenderAge => &self.zip_gender_age,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Parquet,
    Json,
}

/// Everything the extraction layer and the export binary need to know about
/// where things live. Missing YAML keys fall back to [`Config::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub workbook_dir: PathBuf,
    pub workbooks: WorkbookFiles,
    /// Canonical ZIP labels for the city
    pub zip_codes: Vec<String>,
    /// ZIP labels picked for the per-ZIP trend view
    pub zip_selection: Vec<String>,
    pub output_dir: PathBuf,
    pub format: ExportFormat,
}

impl Default for Config {
    fn default() -> Self {
        let zip_codes = [
            "90802", "90803", "90804", "90805", "90806", "90807", "90808", "90810", "90813",
            "90814", "90815",
        ]
        .iter()
        .map(|z| format!("ZIP {}", z))
        .collect();

        Self {
            workbook_dir: PathBuf::from("."),
            workbooks: WorkbookFiles::default(),
            zip_codes,
            zip_selection: vec!["ZIP 90805".into(), "ZIP 90814".into()],
            output_dir: PathBuf::from("tables"),
            format: ExportFormat::Parquet,
        }
    }
}

impl Config {
    /// Load a YAML config and validate it.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening config {:?}", path))?;
        let config: Config =
            serde_yaml::from_reader(file).with_context(|| format!("parsing config {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject ZIP labels that are not `"ZIP {5 digits}"`.
    pub fn validate(&self) -> Result<()> {
        for label in self.zip_codes.iter().chain(&self.zip_selection) {
            if !is_zip_label(label) {
                bail!("invalid ZIP label `{}`, expected `ZIP #####`", label);
            }
        }
        Ok(())
    }

    /// Full path of a workbook.
    pub fn workbook_path(&self, workbook: Workbook) -> PathBuf {
        self.workbook_dir.join(self.workbooks.file_name(workbook))
    }

    /// The configured selection, minus labels outside the canonical list.
    pub fn zip_selection(&self) -> Vec<String> {
        self.zip_selection
            .iter()
            .filter(|label| {
                let known = self.zip_codes.contains(label);
                if !known {
                    warn!(zip = %label, "ignoring ZIP outside the canonical list");
                }
                known
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.zip_codes.len(), 11);
        assert_eq!(cfg.zip_selection(), vec!["ZIP 90805", "ZIP 90814"]);
        assert_eq!(
            cfg.workbook_path(Workbook::RaceByYear),
            PathBuf::from("./Long Beach race by year US Estimates - Copy.xlsx")
        );
    }

    #[test]
    fn yaml_overrides_merge_with_defaults() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(
            tmp,
            "workbook_dir: /data/acs\nformat: json\nworkbooks:\n  zip_by_year: zips.xlsx\n"
        )?;

        let cfg = Config::from_yaml_file(tmp.path())?;
        assert_eq!(cfg.format, ExportFormat::Json);
        assert_eq!(
            cfg.workbook_path(Workbook::ZipByYear),
            PathBuf::from("/data/acs/zips.xlsx")
        );
        // untouched keys keep their defaults
        assert_eq!(
            cfg.workbooks.summary_2023,
            WorkbookFiles::default().summary_2023
        );
        assert_eq!(cfg.zip_codes, Config::default().zip_codes);
        Ok(())
    }

    #[test]
    fn malformed_zip_label_is_rejected() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "zip_selection: [\"90805\"]")?;
        assert!(Config::from_yaml_file(tmp.path()).is_err());
        Ok(())
    }

    #[test]
    fn unknown_selection_is_dropped() {
        let cfg = Config {
            zip_selection: vec!["ZIP 90805".into(), "ZIP 99999".into()],
            ..Config::default()
        };
        assert_eq!(cfg.zip_selection(), vec!["ZIP 90805"]);
    }
}
