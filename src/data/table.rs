//! Predictor table and design matrices.
//!
//! A `PredictorTable` is an ordered set of named numeric columns that all have
//! the same number of rows. Design matrices are built from it on demand: an
//! intercept column named `const` followed by the requested predictors, in the
//! order requested.

use std::collections::HashMap;

use nalgebra::DMatrix;

use crate::error::{SelectionError, TableError};

/// Name of the intercept column in every design matrix.
pub const INTERCEPT: &str = "const";

/// Ordered mapping predictor name -> column.
#[derive(Debug, Clone, Default)]
pub struct PredictorTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    index: HashMap<String, usize>,
}

impl PredictorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, column)` pairs, keeping their order.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, column) in columns {
            table.push(name, column)?;
        }
        Ok(table)
    }

    /// Append a column.
    pub fn push(&mut self, name: impl Into<String>, column: Vec<f64>) -> Result<(), TableError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(TableError::DuplicateName(name));
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(TableError::LengthMismatch {
                    name,
                    expected: first.len(),
                    got: column.len(),
                });
            }
        }
        self.index.insert(name.clone(), self.names.len());
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Predictor names in table order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of rows (0 for an empty table).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.index.get(name).map(|&i| self.columns[i].as_slice())
    }

    /// Build `const + names` as a design matrix.
    ///
    /// `n_rows` is the number of observations; it is passed explicitly so an
    /// intercept-only design can be built from an empty table.
    pub fn design_matrix<S: AsRef<str>>(
        &self,
        names: &[S],
        n_rows: usize,
    ) -> Result<DesignMatrix, SelectionError> {
        let mut cols: Vec<&[f64]> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let column = self
                .column(name)
                .ok_or_else(|| SelectionError::UnknownPredictor(name.to_string()))?;
            cols.push(column);
        }

        let rows = cols.first().map_or(n_rows, |c| c.len());
        let p = cols.len() + 1;
        let matrix = DMatrix::from_fn(rows, p, |i, j| if j == 0 { 1.0 } else { cols[j - 1][i] });

        let mut column_names = Vec::with_capacity(p);
        column_names.push(INTERCEPT.to_string());
        column_names.extend(names.iter().map(|s| s.as_ref().to_string()));

        Ok(DesignMatrix {
            names: column_names,
            matrix,
        })
    }
}

/// A design matrix with named columns (intercept first).
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    pub names: Vec<String>,
    pub matrix: DMatrix<f64>,
}

impl DesignMatrix {
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }
}
