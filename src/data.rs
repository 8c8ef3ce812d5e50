//! Data
//!
//! Tabular containers the estimator works on. A `Dataset` is an ordered set of named `f64`
//! columns, where `NaN` marks a missing entry.
use crate::errors::DriftError;
use crate::utils::is_missing;
use serde::{Deserialize, Deserializer, Serialize};

/// Contiguous Column Major Matrix view.
///
/// Holds a borrowed buffer in column-major order (Fortran-style), so that each column
/// is a contiguous slice.
pub struct Matrix<'a, T> {
    /// The raw data stored in a single slice.
    pub data: &'a [T],
    /// Number of rows in the matrix.
    pub rows: usize,
    /// Number of columns in the matrix.
    pub cols: usize,
}

impl<'a, T> Matrix<'a, T> {
    /// Create a new Matrix.
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> Self {
        Matrix { data, rows, cols }
    }

    /// Get a single reference to an item in the matrix.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[j * self.rows + i]
    }

    /// Get an entire column in the matrix.
    ///
    /// * `col` - The index of the column to get.
    pub fn get_col(&self, col: usize) -> &[T] {
        let start = col * self.rows;
        &self.data[start..start + self.rows]
    }
}

// Missing values travel through JSON as `null`.
fn parse_missing_values<'de, D>(d: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(d).map(|x: Vec<Option<f64>>| x.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// A single named numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(deserialize_with = "parse_missing_values")]
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Values with missing entries dropped, and the number dropped.
    pub fn present(&self) -> (Vec<f64>, usize) {
        let present: Vec<f64> = self.values.iter().copied().filter(|v| !is_missing(v)).collect();
        let n_missing = self.values.len() - present.len();
        (present, n_missing)
    }
}

/// A table of named numeric columns. Column order is preserved, names are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new() -> Self {
        Dataset::default()
    }

    /// Add a column, consuming and returning the dataset.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, DriftError> {
        self.push_column(name, values)?;
        Ok(self)
    }

    /// Add a column in place.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), DriftError> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(DriftError::DuplicateColumn(name));
        }
        self.columns.push(Column::new(name, values));
        Ok(())
    }

    /// Build a dataset from a column-major matrix and one name per column.
    pub fn from_matrix<S: AsRef<str>>(names: &[S], data: &Matrix<f64>) -> Result<Self, DriftError> {
        if names.len() != data.cols {
            return Err(DriftError::ShapeMismatch(data.cols, names.len()));
        }
        let mut ds = Dataset::new();
        for (j, name) in names.iter().enumerate() {
            ds.push_column(name.as_ref(), data.get_col(j).to_vec())?;
        }
        Ok(ds)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Length of the longest column.
    pub fn n_rows(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_columns() {
        let v = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let m = Matrix::new(&v, 3, 2);
        assert_eq!(m.get_col(1), &[4.0, 5.0, 6.0]);
        assert_eq!(*m.get(2, 0), 3.0);
    }

    #[test]
    fn test_from_matrix() {
        let v = vec![1.0, 2.0, 3.0, 4.0];
        let m = Matrix::new(&v, 2, 2);
        let ds = Dataset::from_matrix(&["a", "b"], &m).unwrap();
        assert_eq!(ds.column_names(), vec!["a", "b"]);
        assert_eq!(ds.column("b").unwrap().values, vec![3.0, 4.0]);
        assert_eq!(ds.n_rows(), 2);

        let err = Dataset::from_matrix(&["a"], &m).unwrap_err();
        assert!(matches!(err, DriftError::ShapeMismatch(2, 1)));
    }

    #[test]
    fn test_duplicate_column() {
        let ds = Dataset::new().with_column("a", vec![1.0]).unwrap();
        let err = ds.with_column("a", vec![2.0]).unwrap_err();
        assert!(matches!(err, DriftError::DuplicateColumn(_)));
    }

    #[test]
    fn test_present_drops_missing() {
        let c = Column::new("x", vec![1.0, f64::NAN, 2.0, f64::INFINITY]);
        let (present, n_missing) = c.present();
        assert_eq!(present, vec![1.0, 2.0]);
        assert_eq!(n_missing, 2);
    }

    #[test]
    fn test_json_missing_values() {
        let ds = Dataset::new().with_column("x", vec![1.0, f64::NAN]).unwrap();
        let json = serde_json::to_string(&ds).unwrap();
        assert_eq!(json, r#"{"columns":[{"name":"x","values":[1.0,null]}]}"#);
        let back: Dataset = serde_json::from_str(&json).unwrap();
        let values = &back.column("x").unwrap().values;
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());
    }
}
