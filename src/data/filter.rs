use std::collections::BTreeSet;

use super::model::{Column, LogTable};
use crate::error::{CoreError, Result};

// ---------------------------------------------------------------------------
// Depth mask: which rows fall inside a closed depth interval
// ---------------------------------------------------------------------------

/// Inclusive on both ends. Missing (NaN) depths never match.
pub fn depth_mask(depths: &[f64], min_depth: f64, max_depth: f64) -> Vec<bool> {
    depths
        .iter()
        .map(|&d| d >= min_depth && d <= max_depth)
        .collect()
}

/// Keep the rows of every column (and the row index) where `mask` is true.
pub fn apply_mask(table: &LogTable, mask: &[bool]) -> LogTable {
    let keep = |column: &Column| Column {
        name: column.name.clone(),
        values: column
            .values
            .iter()
            .zip(mask)
            .filter(|(_, &m)| m)
            .map(|(v, _)| v.clone())
            .collect(),
    };
    LogTable {
        index: table.index.as_ref().map(keep),
        columns: table.columns.iter().map(keep).collect(),
    }
}

// ---------------------------------------------------------------------------
// Projection onto a curve subset
// ---------------------------------------------------------------------------

/// Select `columns` (in table order) and keep the depth column first.
///
/// * `columns == None` → every column, depth moved to the front
/// * a depth axis stored as the row index stays the index
/// * an unknown curve name is an error
pub fn project(
    table: LogTable,
    depth_column: &str,
    columns: Option<&BTreeSet<String>>,
) -> Result<LogTable> {
    if let Some(wanted) = columns {
        if let Some(missing) = wanted
            .iter()
            .find(|name| table.column(name).is_none() && table.index_name() != Some(name.as_str()))
        {
            return Err(CoreError::UnknownCurve(missing.clone()));
        }
    }

    let LogTable { index, columns: all } = table;
    let mut depth = None;
    let mut selected = Vec::new();
    for column in all {
        if column.name == depth_column {
            depth = Some(column);
        } else if columns.map_or(true, |wanted| wanted.contains(&column.name)) {
            selected.push(column);
        }
    }
    if let Some(depth) = depth {
        selected.insert(0, depth);
    }
    Ok(LogTable {
        index,
        columns: selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn sample() -> LogTable {
        LogTable::new(vec![
            Column::from_f64("GR", [50.0, 60.0, 70.0, 80.0]),
            Column::from_f64("DEPTH", [1.0, 2.0, 3.0, 4.0]),
            Column::from_f64("RHOB", [2.1, 2.2, 2.3, 2.4]),
        ])
    }

    #[test]
    fn mask_is_inclusive() {
        let mask = depth_mask(&[1.0, 2.0, 3.0, f64::NAN], 2.0, 3.0);
        assert_eq!(mask, vec![false, true, true, false]);
    }

    #[test]
    fn apply_mask_keeps_selected_rows() {
        let filtered = apply_mask(&sample(), &[false, true, true, false]);
        assert_eq!(filtered.num_rows(), 2);
        assert_eq!(
            filtered.column("GR").map(|c| c.values.clone()),
            Some(vec![CellValue::Float(60.0), CellValue::Float(70.0)])
        );
    }

    #[test]
    fn project_prepends_depth() {
        let wanted: BTreeSet<String> = ["RHOB".to_string()].into();
        let projected = project(sample(), "DEPTH", Some(&wanted)).expect("project");
        assert_eq!(projected.column_names(), vec!["DEPTH", "RHOB"]);
    }

    #[test]
    fn project_all_moves_depth_first() {
        let projected = project(sample(), "DEPTH", None).expect("project");
        assert_eq!(projected.column_names(), vec!["DEPTH", "GR", "RHOB"]);
    }

    #[test]
    fn project_rejects_unknown_curve() {
        let wanted: BTreeSet<String> = ["NPHI".to_string()].into();
        let err = project(sample(), "DEPTH", Some(&wanted)).unwrap_err();
        assert!(matches!(err, CoreError::UnknownCurve(name) if name == "NPHI"));
    }
}
