// src/shape/mod.rs
//! Reshape conventions shared by every loader: wide-to-long melts and their
//! inverse, ZIP label normalization, total-row detection.

use once_cell::sync::Lazy;
use regex::Regex;

// ASCII digits only: `\d` matches any Unicode decimal digit
static ZIP5_ANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{5})").expect("valid ZIP regex"));
static ZIP5_FULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}$").expect("valid ZIP regex"));
static ZIP_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ZIP [0-9]{5}$").expect("valid ZIP label regex"));

/// `"ZIP " + digits` for the first 5-digit run anywhere in `raw`.
///
/// `"90802 (Downtown)"` → `"ZIP 90802"`; `"Total"` → `None`.
pub fn zip_label_search(raw: &str) -> Option<String> {
    ZIP5_ANY
        .captures(raw)
        .map(|caps| format!("ZIP {}", &caps[1]))
}

/// `"ZIP " + digits` only when the trimmed cell is exactly five digits.
pub fn zip_label_exact(raw: &str) -> Option<String> {
    let t = raw.trim();
    ZIP5_FULL.is_match(t).then(|| format!("ZIP {}", t))
}

/// Whether `label` has the canonical `"ZIP {5 digits}"` form.
pub fn is_zip_label(label: &str) -> bool {
    ZIP_LABEL.is_match(label)
}

/// Whether a first-column label marks a summary row.
pub fn is_total_label(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("total")
}

/// A wide table: one identifier per row, one value column per category.
///
/// `None` is a value that failed numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable<I, C> {
    pub ids: Vec<I>,
    pub columns: Vec<(C, Vec<Option<f64>>)>,
}

impl<I, C> WideTable<I, C> {
    pub fn new(ids: Vec<I>) -> Self {
        Self {
            ids,
            columns: Vec::new(),
        }
    }

    /// Append a value column. Short columns are padded with missing values,
    /// long ones truncated to the identifier count.
    pub fn push_column(&mut self, category: C, mut values: Vec<Option<f64>>) {
        values.resize(self.ids.len(), None);
        self.columns.push((category, values));
    }

    pub fn with_column(mut self, category: C, values: Vec<Option<f64>>) -> Self {
        self.push_column(category, values);
        self
    }
}

/// One long-form observation.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord<I, C> {
    pub id: I,
    pub category: C,
    pub value: f64,
}

/// Wide-to-long: one record per (id, category) with a value.
///
/// Records come out category-major (every id for the first column, then the
/// next column) and missing values are dropped.
pub fn melt<I: Clone, C: Clone>(wide: &WideTable<I, C>) -> Vec<LongRecord<I, C>> {
    let mut out = Vec::with_capacity(wide.ids.len() * wide.columns.len());
    for (category, values) in &wide.columns {
        for (id, value) in wide.ids.iter().zip(values) {
            if let Some(value) = value {
                out.push(LongRecord {
                    id: id.clone(),
                    category: category.clone(),
                    value: *value,
                });
            }
        }
    }
    out
}

/// Long-to-wide, the inverse of [`melt`].
///
/// Ids and categories keep first-seen order; pairs with no record become
/// `None`. A repeated (id, category) pair keeps the last value.
pub fn pivot<I: Clone + PartialEq, C: Clone + PartialEq>(
    long: &[LongRecord<I, C>],
) -> WideTable<I, C> {
    let mut ids: Vec<I> = Vec::new();
    let mut categories: Vec<C> = Vec::new();
    for rec in long {
        if !ids.contains(&rec.id) {
            ids.push(rec.id.clone());
        }
        if !categories.contains(&rec.category) {
            categories.push(rec.category.clone());
        }
    }

    let mut columns: Vec<(C, Vec<Option<f64>>)> = categories
        .into_iter()
        .map(|c| (c, vec![None; ids.len()]))
        .collect();
    for rec in long {
        let row = ids.iter().position(|i| *i == rec.id);
        let col = columns.iter().position(|(c, _)| *c == rec.category);
        if let (Some(row), Some(col)) = (row, col) {
            columns[col].1[row] = Some(rec.value);
        }
    }

    WideTable { ids, columns }
}
