// src/grid/cell.rs
use calamine::Data;

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Render a cell the way a spreadsheet user reads it.
///
/// Whole floats print without a fractional part, so a ZIP stored as the
/// number `90802` renders as `"90802"` rather than `"90802.0"`.
/// Returns `None` for empty cells.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(format!("{dt}")),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(format!("{e:?}")),
    }
}

/// Coerce a cell to a finite number.
///
/// Numeric cells pass through; text is parsed after [`clean_str`]. Anything
/// else (blank, bool, error, date, `"N/A"`, `"nan"`) is missing.
pub fn cell_number(cell: &Data) -> Option<f64> {
    let v = match cell {
        Data::Int(i) => *i as f64,
        Data::Float(f) => *f,
        Data::String(s) => parse_number(s)?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Parse free text as a number, `None` when it is not one.
pub fn parse_number(raw: &str) -> Option<f64> {
    let v: f64 = clean_str(raw).parse().ok()?;
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_floats_render_as_integers() {
        assert_eq!(cell_text(&Data::Float(90802.0)).as_deref(), Some("90802"));
        assert_eq!(cell_text(&Data::Float(1.5)).as_deref(), Some("1.5"));
        assert_eq!(cell_text(&Data::Int(2023)).as_deref(), Some("2023"));
        assert_eq!(cell_text(&Data::Empty), None);
    }

    #[test]
    fn text_cells_are_parsed_as_numbers() {
        assert_eq!(cell_number(&Data::String(" 4321 ".into())), Some(4321.0));
        assert_eq!(cell_number(&Data::String("\"17\"".into())), Some(17.0));
        assert_eq!(cell_number(&Data::Float(12.5)), Some(12.5));
    }

    #[test]
    fn non_numeric_cells_are_missing() {
        assert_eq!(cell_number(&Data::String("N/A".into())), None);
        assert_eq!(cell_number(&Data::String("nan".into())), None);
        assert_eq!(cell_number(&Data::String("".into())), None);
        assert_eq!(cell_number(&Data::Bool(true)), None);
        assert_eq!(cell_number(&Data::Empty), None);
        assert_eq!(cell_number(&Data::Float(f64::NAN)), None);
    }
}
