use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a loader from producing its table.
///
/// Loaders never let one of these escape through their collapsing entry
/// points; see [`crate::extract::Extractor`].
#[derive(Error, Debug)]
pub enum ExtractionFailure {
    /// The workbook file does not exist
    #[error("workbook not found: {}", .0.display())]
    WorkbookNotFound(PathBuf),

    /// The file exists but calamine could not read it as a workbook
    #[error("failed to open workbook {}: {reason}", path.display())]
    WorkbookOpen { path: PathBuf, reason: String },

    /// The workbook has no sheet with this name
    #[error("sheet `{sheet}` not found in {workbook}")]
    SheetNotFound { workbook: String, sheet: String },

    /// A header or anchor the layout depends on is not where it should be
    #[error("unexpected layout in `{sheet}`: {detail}")]
    Layout { sheet: String, detail: String },

    /// A marker-scanning loader found no row carrying its marker
    #[error("marker `{marker}` not found in `{sheet}`")]
    MarkerNotFound { sheet: String, marker: String },

    /// A cell holds a value of the wrong shape for a typed field
    #[error("cell ({row}, {col}) in `{sheet}`: {detail}")]
    Coercion {
        sheet: String,
        row: u32,
        col: u32,
        detail: String,
    },
}

impl ExtractionFailure {
    pub(crate) fn layout(sheet: &str, detail: impl Into<String>) -> Self {
        Self::Layout {
            sheet: sheet.to_string(),
            detail: detail.into(),
        }
    }
}
