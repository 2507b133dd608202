use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a curve column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes log readers produce.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Float(f64),
    Integer(i64),
    Text(String),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell. Text, bools, nulls and NaN count as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Parse a text token the way CSV cells are typed: empty is null,
    /// then integer, float, bool, and finally plain text.
    pub fn guess(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::Text(s.to_string())
    }

    /// Rough heap + inline footprint used for cache accounting.
    fn estimated_bytes(&self) -> usize {
        match self {
            CellValue::Text(s) => 24 + s.len(),
            _ => 8,
        }
    }
}

// ---------------------------------------------------------------------------
// Column – one named curve
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn from_f64(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, values.into_iter().map(CellValue::Float).collect())
    }

    /// Numeric values, `NaN` where a cell is missing or non-numeric.
    pub fn to_f64(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|v| v.as_f64().unwrap_or(f64::NAN))
            .collect()
    }

    fn estimated_bytes(&self) -> usize {
        64 + self.name.len() + self.values.iter().map(CellValue::estimated_bytes).sum::<usize>()
    }
}

// ---------------------------------------------------------------------------
// LogTable – what a reader hands back
// ---------------------------------------------------------------------------

/// A table of curves with an optional named row index (the depth axis of
/// LAS files lives there). All columns have the same number of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogTable {
    pub index: Option<Column>,
    pub columns: Vec<Column>,
}

impl LogTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            index: None,
            columns,
        }
    }

    pub fn with_index(mut self, index: Column) -> Self {
        self.index = Some(index);
        self
    }

    pub fn num_rows(&self) -> usize {
        self.index
            .as_ref()
            .or_else(|| self.columns.first())
            .map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index.as_ref().map(|c| c.name.as_str())
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric view of a column, falling back to the row index by name.
    pub fn numeric_values(&self, name: &str) -> Option<Vec<f64>> {
        self.column(name)
            .or_else(|| self.index.as_ref().filter(|c| c.name == name))
            .map(Column::to_f64)
    }

    /// Deep memory estimate of the table, index included.
    pub fn estimated_bytes(&self) -> usize {
        self.index.as_ref().map_or(0, Column::estimated_bytes)
            + self.columns.iter().map(Column::estimated_bytes).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_types_cells() {
        assert_eq!(CellValue::guess(""), CellValue::Null);
        assert_eq!(CellValue::guess("42"), CellValue::Integer(42));
        assert_eq!(CellValue::guess(" 1.5 "), CellValue::Float(1.5));
        assert_eq!(CellValue::guess("true"), CellValue::Bool(true));
        assert_eq!(CellValue::guess("SH"), CellValue::Text("SH".into()));
    }

    #[test]
    fn nan_and_text_are_missing() {
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::Text("1".into()).as_f64(), None);
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
    }

    #[test]
    fn numeric_values_falls_back_to_index() {
        let table = LogTable::new(vec![Column::from_f64("GR", [10.0, 20.0])])
            .with_index(Column::from_f64("DEPT", [100.0, 100.5]));
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.numeric_values("DEPT"), Some(vec![100.0, 100.5]));
        assert_eq!(table.numeric_values("GR"), Some(vec![10.0, 20.0]));
        assert_eq!(table.numeric_values("RHOB"), None);
    }

    #[test]
    fn estimate_grows_with_rows() {
        let small = LogTable::new(vec![Column::from_f64("GR", [1.0])]);
        let large = LogTable::new(vec![Column::from_f64("GR", vec![1.0; 100])]);
        assert!(large.estimated_bytes() > small.estimated_bytes());
        assert_eq!(
            large.estimated_bytes() - small.estimated_bytes(),
            99 * 8
        );
    }
}
