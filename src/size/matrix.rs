//! Dense `u64` matrix with sticky overflow tracking
//!
//! Every arithmetic step is checked. An overflowing entry saturates to
//! `u64::MAX` and flags the matrix; any matrix computed from a flagged
//! operand is flagged too.

use crate::error::{LsysError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u64>,
    overflow: bool,
}

/// Checked accumulator: saturates and remembers that it did.
#[derive(Debug, Clone, Copy, Default)]
struct Acc {
    value: u64,
    overflow: bool,
}

impl Acc {
    fn add(&mut self, rhs: u64) {
        match self.value.checked_add(rhs) {
            Some(v) => self.value = v,
            None => {
                self.value = u64::MAX;
                self.overflow = true;
            }
        }
    }

    fn add_product(&mut self, a: u64, b: u64) {
        match a.checked_mul(b) {
            Some(p) => self.add(p),
            None => {
                self.value = u64::MAX;
                self.overflow = true;
            }
        }
    }
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
            overflow: false,
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut m = Self::zeros(size, size);
        for i in 0..size {
            m.set(i, i, 1);
        }
        m
    }

    /// Build from row-major data; `data.len()` must be `rows * cols`.
    pub fn from_rows(rows: usize, cols: usize, data: Vec<u64>) -> Result<Self> {
        crate::error::check_len("matrix data", rows * cols, data.len())?;
        Ok(Self {
            rows,
            cols,
            data,
            overflow: false,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u64) {
        self.data[row * self.cols + col] = value;
    }

    /// Checked in-place increment of one entry.
    pub fn increment(&mut self, row: usize, col: usize) {
        let slot = &mut self.data[row * self.cols + col];
        match slot.checked_add(1) {
            Some(v) => *slot = v,
            None => self.overflow = true,
        }
    }

    pub fn has_overflowed(&self) -> bool {
        self.overflow
    }

    pub fn mul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(LsysError::DimensionMismatch {
                lhs_rows: self.rows,
                lhs_cols: self.cols,
                rhs_rows: rhs.rows,
                rhs_cols: rhs.cols,
            });
        }

        let mut out = Matrix::zeros(self.rows, rhs.cols);
        out.overflow = self.overflow || rhs.overflow;

        for i in 0..self.rows {
            for j in 0..rhs.cols {
                let mut acc = Acc::default();
                for k in 0..self.cols {
                    acc.add_product(self.get(i, k), rhs.get(k, j));
                    if acc.overflow {
                        break;
                    }
                }
                out.set(i, j, acc.value);
                out.overflow |= acc.overflow;
            }
        }

        if out.overflow {
            out.data.fill(u64::MAX);
        }
        Ok(out)
    }

    /// Element-wise sum.
    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            return Err(LsysError::DimensionMismatch {
                lhs_rows: self.rows,
                lhs_cols: self.cols,
                rhs_rows: rhs.rows,
                rhs_cols: rhs.cols,
            });
        }

        let mut out = Matrix::zeros(self.rows, self.cols);
        out.overflow = self.overflow || rhs.overflow;
        for (slot, (&a, &b)) in out.data.iter_mut().zip(self.data.iter().zip(&rhs.data)) {
            let mut acc = Acc { value: a, overflow: false };
            acc.add(b);
            *slot = acc.value;
            out.overflow |= acc.overflow;
        }

        if out.overflow {
            out.data.fill(u64::MAX);
        }
        Ok(out)
    }

    /// `self^exponent` by repeated squaring. Square matrices only.
    pub fn pow(&self, mut exponent: usize) -> Result<Matrix> {
        if self.rows != self.cols {
            return Err(LsysError::DimensionMismatch {
                lhs_rows: self.rows,
                lhs_cols: self.cols,
                rhs_rows: self.rows,
                rhs_cols: self.cols,
            });
        }

        let mut result = Matrix::identity(self.rows);
        result.overflow = self.overflow;
        let mut base = self.clone();
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = result.mul(&base)?;
            }
            exponent >>= 1;
            if exponent > 0 {
                base = base.mul(&base)?;
            }
            if result.overflow {
                break;
            }
        }
        Ok(result)
    }

    /// Sum of every entry, saturating. The flag is set when this matrix had
    /// already overflowed or the sum does.
    pub fn grand_sum(&self) -> (u64, bool) {
        if self.overflow {
            return (u64::MAX, true);
        }
        let mut acc = Acc::default();
        for &v in &self.data {
            acc.add(v);
        }
        (acc.value, acc.overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul() {
        let a = Matrix::from_rows(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let b = Matrix::from_rows(3, 1, vec![1, 0, 2]).unwrap();
        let c = a.mul(&b).unwrap();
        assert_eq!((c.rows(), c.cols()), (2, 1));
        assert_eq!(c.get(0, 0), 7);
        assert_eq!(c.get(1, 0), 16);
        assert!(!c.has_overflowed());
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = Matrix::zeros(2, 3);
        assert!(matches!(
            a.mul(&Matrix::zeros(2, 3)),
            Err(LsysError::DimensionMismatch { .. })
        ));
        assert!(a.add(&Matrix::zeros(3, 2)).is_err());
        assert!(a.pow(2).is_err());
    }

    #[test]
    fn test_pow_matches_repeated_mul() {
        let fib = Matrix::from_rows(2, 2, vec![1, 1, 1, 0]).unwrap();
        let p = fib.pow(10).unwrap();
        assert_eq!(p.get(0, 1), 55);

        let mut naive = Matrix::identity(2);
        for _ in 0..10 {
            naive = naive.mul(&fib).unwrap();
        }
        assert_eq!(p, naive);
        assert_eq!(fib.pow(0).unwrap(), Matrix::identity(2));
    }

    #[test]
    fn test_overflow_is_sticky() {
        let big = Matrix::from_rows(1, 1, vec![u64::MAX / 2 + 1]).unwrap();
        let two = Matrix::from_rows(1, 1, vec![2]).unwrap();
        let overflowed = big.mul(&two).unwrap();
        assert!(overflowed.has_overflowed());
        assert_eq!(overflowed.get(0, 0), u64::MAX);

        let zero = Matrix::zeros(1, 1);
        let after_mul = overflowed.mul(&zero).unwrap();
        assert!(after_mul.has_overflowed());
        let after_add = zero.add(&after_mul).unwrap();
        assert!(after_add.has_overflowed());
        assert_eq!(after_add.grand_sum(), (u64::MAX, true));
    }

    #[test]
    fn test_pow_overflow() {
        let doubling = Matrix::from_rows(1, 1, vec![2]).unwrap();
        assert_eq!(doubling.pow(63).unwrap().get(0, 0), 1 << 63);
        assert!(!doubling.pow(63).unwrap().has_overflowed());
        assert!(doubling.pow(64).unwrap().has_overflowed());
        assert!(doubling.pow(1000).unwrap().has_overflowed());
    }

    #[test]
    fn test_grand_sum_overflow() {
        let m = Matrix::from_rows(1, 2, vec![u64::MAX, 1]).unwrap();
        assert!(!m.has_overflowed());
        assert_eq!(m.grand_sum(), (u64::MAX, true));
    }
}
