//! Column-major float matrices with WGSL column padding

use thiserror::Error;

use super::vector::{Vector, VectorError};

/// Construction and access failures for [`Matrix`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    #[error("cannot create a {columns}x{rows} matrix; matrices are grouped sequences of 2, 3, or 4 float vectors")]
    InvalidShape { columns: usize, rows: usize },
    #[error("cannot initialize a {columns}x{rows} matrix from {got} values; the data must match the size of the matrix")]
    SizeMismatch {
        columns: usize,
        rows: usize,
        got: usize,
    },
    #[error("cannot create a {columns}x{rows} identity matrix; identity matrices must be square")]
    NotSquare { columns: usize, rows: usize },
    #[error("column {index} is out of range for a matrix with {columns} columns")]
    ColumnOutOfRange { index: usize, columns: usize },
    #[error("row {index} is out of range for a matrix with {rows} rows")]
    RowOutOfRange { index: usize, rows: usize },
    #[error("cannot multiply a {a_columns}x{a_rows} matrix by a {b_columns}x{b_rows} matrix; the left column count must match the right row count")]
    DimensionMismatch {
        a_columns: usize,
        a_rows: usize,
        b_columns: usize,
        b_rows: usize,
    },
    #[error("cannot create a 2x2 translation matrix; translation matrices must be 3x3 or 4x4")]
    TranslationTooSmall,
    #[error("cannot translate a {size}x{size} matrix with {got} offsets; expected {expected}")]
    TranslationVectorSize {
        size: usize,
        expected: usize,
        got: usize,
    },
    #[error(transparent)]
    Vector(#[from] VectorError),
}

/// A column-major matrix of 2, 3, or 4 columns and rows.
///
/// When `rows == 3` every column is stored as four floats (last lane
/// zero) so `data()` matches the WGSL `mat{N}x3<f32>` buffer footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    columns: usize,
    rows: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Zero matrix of the given shape
    pub fn zeroed(columns: usize, rows: usize) -> Result<Self, MatrixError> {
        if !(2..=4).contains(&columns) || !(2..=4).contains(&rows) {
            return Err(MatrixError::InvalidShape { columns, rows });
        }
        let stride = if rows == 3 { 4 } else { rows };
        Ok(Self {
            columns,
            rows,
            data: vec![0.0; columns * stride],
        })
    }

    /// Matrix initialized from `columns * rows` column-major values
    pub fn new(columns: usize, rows: usize, values: &[f32]) -> Result<Self, MatrixError> {
        let mut matrix = Self::zeroed(columns, rows)?;
        if values.len() != columns * rows {
            return Err(MatrixError::SizeMismatch {
                columns,
                rows,
                got: values.len(),
            });
        }
        let stride = matrix.stride();
        for (column, chunk) in values.chunks_exact(rows).enumerate() {
            matrix.data[column * stride..column * stride + rows].copy_from_slice(chunk);
        }
        Ok(matrix)
    }

    /// Square identity matrix of the given size
    pub fn identity(size: usize) -> Result<Self, MatrixError> {
        let mut matrix = Self::zeroed(size, size)?;
        matrix.set_identity()?;
        Ok(matrix)
    }

    /// Overwrite with the identity; the matrix must be square
    pub fn set_identity(&mut self) -> Result<(), MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare {
                columns: self.columns,
                rows: self.rows,
            });
        }
        let stride = self.stride();
        self.data.fill(0.0);
        for i in 0..self.rows {
            self.data[i * stride + i] = 1.0;
        }
        Ok(())
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_square(&self) -> bool {
        self.columns == self.rows
    }

    /// Raw column-major lane data, padding included
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Floats per stored column
    fn stride(&self) -> usize {
        if self.rows == 3 { 4 } else { self.rows }
    }

    /// Column vector at a zero-based index
    pub fn column(&self, index: usize) -> Result<Vector, MatrixError> {
        if index >= self.columns {
            return Err(MatrixError::ColumnOutOfRange {
                index,
                columns: self.columns,
            });
        }
        let start = index * self.stride();
        Ok(Vector::new(self.rows, &self.data[start..start + self.rows])?)
    }

    /// Row vector at a zero-based index
    pub fn row(&self, index: usize) -> Result<Vector, MatrixError> {
        if index >= self.rows {
            return Err(MatrixError::RowOutOfRange {
                index,
                rows: self.rows,
            });
        }
        let stride = self.stride();
        let row: Vec<f32> = (0..self.columns)
            .map(|column| self.data[index + stride * column])
            .collect();
        Ok(Vector::new(self.columns, &row)?)
    }

    /// Matrix product `a * b`
    pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
        if a.columns != b.rows {
            return Err(MatrixError::DimensionMismatch {
                a_columns: a.columns,
                a_rows: a.rows,
                b_columns: b.columns,
                b_rows: b.rows,
            });
        }
        let mut values = Vec::with_capacity(b.columns * a.rows);
        for i in 0..b.columns {
            let column = b.column(i)?;
            for j in 0..a.rows {
                values.push(Vector::dot(&a.row(j)?, &column)?);
            }
        }
        Matrix::new(b.columns, a.rows, &values)
    }

    /// Square translation matrix of the given size; `offsets` fills the
    /// leading entries of the last column
    pub fn translation(size: usize, offsets: &[f32]) -> Result<Matrix, MatrixError> {
        if size == 2 {
            return Err(MatrixError::TranslationTooSmall);
        }
        let mut matrix = Matrix::identity(size)?;
        if offsets.len() != size - 1 {
            return Err(MatrixError::TranslationVectorSize {
                size,
                expected: size - 1,
                got: offsets.len(),
            });
        }
        let start = (size - 1) * matrix.stride();
        matrix.data[start..start + offsets.len()].copy_from_slice(offsets);
        Ok(matrix)
    }

    /// Compose a translation onto this matrix from the left:
    /// `self = translation(offsets) * self`
    pub fn translate(&mut self, offsets: &[f32]) -> Result<(), MatrixError> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare {
                columns: self.columns,
                rows: self.rows,
            });
        }
        let translation = Matrix::translation(self.columns, offsets)?;
        *self = Matrix::multiply(&translation, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_shapes() {
        let m = Matrix::zeroed(3, 2).unwrap();
        assert_eq!(m.columns(), 3);
        assert_eq!(m.rows(), 2);
        assert!(!m.is_square());
        assert_eq!(m.data(), &[0.0; 6]);

        let m = Matrix::zeroed(4, 4).unwrap();
        assert!(m.is_square());
        assert_eq!(m.data().len(), 16);
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        assert!(Matrix::zeroed(1, 3).is_err());
        assert!(Matrix::zeroed(3, 5).is_err());
    }

    #[test]
    fn test_three_row_matrices_pad_each_column() {
        let m = Matrix::new(3, 3, &[3.0, 5.0, 8.0, 2.0, 4.0, 8.0, 4.0, 0.0, 2.0]).unwrap();
        assert_eq!(
            m.data(),
            &[3.0, 5.0, 8.0, 0.0, 2.0, 4.0, 8.0, 0.0, 4.0, 0.0, 2.0, 0.0]
        );

        // Padded storage invariant: columns * 4 when rows == 3
        let m = Matrix::zeroed(2, 3).unwrap();
        assert_eq!(m.data().len(), 8);
    }

    #[test]
    fn test_data_length_mismatch_rejected() {
        assert_eq!(
            Matrix::new(2, 2, &[1.0, 2.0, 3.0]),
            Err(MatrixError::SizeMismatch {
                columns: 2,
                rows: 2,
                got: 3
            })
        );
    }

    #[test]
    fn test_identity() {
        assert_eq!(Matrix::identity(2).unwrap().data(), &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            Matrix::identity(3).unwrap().data(),
            &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
        assert_eq!(
            Matrix::identity(4).unwrap().data(),
            &[
                1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0
            ]
        );
    }

    #[test]
    fn test_identity_requires_square() {
        let mut m = Matrix::zeroed(3, 2).unwrap();
        assert_eq!(
            m.set_identity(),
            Err(MatrixError::NotSquare {
                columns: 3,
                rows: 2
            })
        );
    }

    #[test]
    fn test_column_and_row_access() {
        let m = Matrix::new(3, 2, &[1.0, 4.0, 0.0, 5.0, 2.0, 4.0]).unwrap();
        assert_eq!(m.column(1).unwrap().data(), &[0.0, 5.0]);
        assert_eq!(m.row(0).unwrap().data(), &[1.0, 0.0, 2.0]);
        assert_eq!(m.row(1).unwrap().data(), &[4.0, 5.0, 4.0]);
    }

    #[test]
    fn test_column_access_skips_padding() {
        let m = Matrix::new(3, 3, &[3.0, 5.0, 8.0, 2.0, 4.0, 8.0, 4.0, 0.0, 2.0]).unwrap();
        assert_eq!(m.column(1).unwrap().data(), &[2.0, 4.0, 8.0, 0.0]);
        assert_eq!(m.row(2).unwrap().data(), &[8.0, 8.0, 2.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_access() {
        let m = Matrix::zeroed(2, 3).unwrap();
        assert!(m.column(2).is_err());
        assert!(m.row(3).is_err());
    }

    #[test]
    fn test_multiply() {
        let a = Matrix::new(2, 2, &[1.0, -1.0, 0.0, 5.0]).unwrap();
        let b = Matrix::new(3, 2, &[1.0, 4.0, 0.0, 5.0, 2.0, 4.0]).unwrap();
        let c = Matrix::multiply(&a, &b).unwrap();
        assert_eq!(c.columns(), 3);
        assert_eq!(c.rows(), 2);
        assert_eq!(c.data(), &[1.0, 19.0, 0.0, 25.0, 2.0, 18.0]);
    }

    #[test]
    fn test_multiply_dimension_mismatch() {
        let a = Matrix::zeroed(3, 2).unwrap();
        let b = Matrix::zeroed(2, 2).unwrap();
        assert!(Matrix::multiply(&a, &b).is_err());
    }

    #[test]
    fn test_translation() {
        let m = Matrix::translation(3, &[5.0, 6.0]).unwrap();
        assert_eq!(
            m.data(),
            &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 5.0, 6.0, 1.0, 0.0]
        );

        let m = Matrix::translation(4, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            m.data(),
            &[
                1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 2.0, 3.0, 1.0
            ]
        );
    }

    #[test]
    fn test_translation_rejects_2x2() {
        assert_eq!(
            Matrix::translation(2, &[1.0]),
            Err(MatrixError::TranslationTooSmall)
        );
    }

    #[test]
    fn test_translation_offset_count_must_match() {
        assert_eq!(
            Matrix::translation(3, &[1.0, 2.0, 3.0]),
            Err(MatrixError::TranslationVectorSize {
                size: 3,
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn test_chained_translations_accumulate() {
        let mut m = Matrix::identity(3).unwrap();
        m.translate(&[5.0, 3.0]).unwrap();
        m.translate(&[0.0, 8.0]).unwrap();
        m.translate(&[-1.0, -4.0]).unwrap();
        assert_eq!(
            m.data(),
            &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 4.0, 7.0, 1.0, 0.0]
        );
    }
}
