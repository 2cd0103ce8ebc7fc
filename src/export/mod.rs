// src/export/mod.rs
//! Writes tidy tables to disk, one file per table.

use anyhow::{Context, Result};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::config::ExportFormat;
use crate::extract::TableSet;
use crate::tables::TidyRecord;

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Parquet => "parquet",
            ExportFormat::Json => "json",
        }
    }
}

/// Write `rows` as a single Snappy-compressed row group. An empty table still
/// produces a file carrying the schema.
pub fn write_parquet<R: TidyRecord>(path: &Path, rows: &[R]) -> Result<()> {
    let batch = R::record_batch(rows)
        .with_context(|| format!("building record batch for {}", R::TABLE))?;

    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), R::schema(), Some(props))
        .context("creating ArrowWriter")?;
    writer
        .write(&batch)
        .with_context(|| format!("writing batch to {:?}", path))?;
    writer
        .close()
        .with_context(|| format!("closing ArrowWriter for {:?}", path))?;
    Ok(())
}

/// Write `rows` as a pretty-printed JSON array of records.
pub fn write_json<R: TidyRecord>(path: &Path, rows: &[R]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, rows)
        .with_context(|| format!("serializing {} to {:?}", R::TABLE, path))?;
    writer
        .flush()
        .with_context(|| format!("flushing {:?}", path))?;
    Ok(())
}

/// Write one table as `<dir>/<name>.<ext>`.
///
/// The file is written under a `.tmp` name first and renamed into place, so a
/// reader never sees a half-written table. On failure the `.tmp` file is
/// removed and any existing table is left untouched.
pub fn write_table<R: TidyRecord>(
    dir: &Path,
    name: &str,
    rows: &[R],
    format: ExportFormat,
) -> Result<PathBuf> {
    let final_path = dir.join(format!("{}.{}", name, format.extension()));
    let tmp_path = final_path.with_extension(format!("{}.tmp", format.extension()));

    let written = match format {
        ExportFormat::Parquet => write_parquet(&tmp_path, rows),
        ExportFormat::Json => write_json(&tmp_path, rows),
    }
    .and_then(|()| {
        fs::rename(&tmp_path, &final_path).with_context(|| {
            format!(
                "failed to rename `{}` to `{}`",
                tmp_path.display(),
                final_path.display()
            )
        })
    });
    if let Err(e) = written {
        if let Err(rm) = fs::remove_file(&tmp_path) {
            warn!(path = %tmp_path.display(), error = %rm, "could not remove temp file");
        }
        return Err(e);
    }

    info!(table = name, rows = rows.len(), path = %final_path.display(), "table written");
    Ok(final_path)
}

/// Write all ten tables into `dir`, creating it if needed.
pub fn write_table_set(set: &TableSet, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating output dir {:?}", dir))?;

    fn one<R: TidyRecord>(dir: &Path, rows: &[R], format: ExportFormat) -> Result<PathBuf> {
        write_table(dir, R::TABLE, rows, format)
    }

    Ok(vec![
        one(dir, &set.population_trend, format)?,
        one(dir, &set.zip_population, format)?,
        one(dir, &set.population_pyramid, format)?,
        one(dir, &set.age_group_trends, format)?,
        one(dir, &set.race_totals, format)?,
        one(dir, &set.race_trends, format)?,
        one(dir, &set.race_age_distribution, format)?,
        one(dir, &set.race_gender_distribution, format)?,
        one(dir, &set.zip_trends, format)?,
        one(dir, &set.zip_age_distribution, format)?,
    ])
}
