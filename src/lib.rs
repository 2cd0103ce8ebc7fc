//! Extraction layer for the Long Beach ACS population workbooks.
//!
//! Ten loaders turn fixed regions of five Excel workbooks into tidy tables:
//! one record per observation, stable column names, and an empty table
//! (never an error) when a workbook is missing or laid out differently.

pub mod config;
pub mod export;
pub mod extract;
pub mod grid;
pub mod shape;
pub mod tables;

pub use config::{Config, ExportFormat, Workbook};
pub use extract::{ExtractionFailure, Extractor, TableSet, WorkbookSource, XlsxSource};
