//! Fixed 4x4 single-precision matrix.

use std::ops::{Index, IndexMut};

/// Row-major 4x4 `f32` matrix, aligned to 16 bytes so that every row can be
/// fed to a 128-bit aligned load.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C, align(16))]
pub struct Mat4(pub [f32; 16]);

impl Mat4 {
    /// All-zero matrix.
    pub const ZERO: Mat4 = Mat4([0.0; 16]);

    /// Identity matrix.
    pub const IDENTITY: Mat4 = Mat4([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Matrix with every element set to `value`.
    #[must_use]
    pub const fn splat(value: f32) -> Self {
        Mat4([value; 16])
    }

    /// Build from four rows.
    #[must_use]
    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        let [r0, r1, r2, r3] = rows;
        Mat4([
            r0[0], r0[1], r0[2], r0[3], //
            r1[0], r1[1], r1[2], r1[3], //
            r2[0], r2[1], r2[2], r2[3], //
            r3[0], r3[1], r3[2], r3[3],
        ])
    }

    /// Element at `(row, col)`.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[row * 4 + col]
    }

    /// Row `i` as a slice of 4 elements.
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn row(&self, i: usize) -> &[f32; 4] {
        assert!(i < 4, "Mat4 row index out of range: {}", i);
        self.0[i * 4..][..4].try_into().unwrap()
    }

    /// Column `j` gathered into an array.
    #[inline]
    #[must_use]
    pub fn col(&self, j: usize) -> [f32; 4] {
        [self.0[j], self.0[4 + j], self.0[8 + j], self.0[12 + j]]
    }

    /// Transposed copy.
    #[must_use]
    pub fn transpose(&self) -> Self {
        Mat4::from_rows([self.col(0), self.col(1), self.col(2), self.col(3)])
    }

    /// Elements in row-major order.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> &[f32; 16] {
        &self.0
    }
}

impl From<[f32; 16]> for Mat4 {
    fn from(values: [f32; 16]) -> Self {
        Mat4(values)
    }
}

impl From<Mat4> for [f32; 16] {
    fn from(m: Mat4) -> Self {
        m.0
    }
}

impl Index<(usize, usize)> for Mat4 {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        &self.0[row * 4 + col]
    }
}

impl IndexMut<(usize, usize)> for Mat4 {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
        &mut self.0[row * 4 + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        assert_eq!(std::mem::align_of::<Mat4>(), 16);
        assert_eq!(std::mem::size_of::<Mat4>(), 64);
        let m = Mat4::IDENTITY;
        assert_eq!(m.row(2).as_ptr() as usize % 16, 0);
    }

    #[test]
    fn test_rows_and_cols() {
        let m = Mat4::from(core::array::from_fn::<f32, 16, _>(|i| i as f32));
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0, 7.0]);
        assert_eq!(m.col(2), [2.0, 6.0, 10.0, 14.0]);
        assert_eq!(m[(3, 1)], 13.0);
        assert_eq!(m.get(0, 3), 3.0);
        assert_eq!(m.transpose().row(2), &[2.0, 6.0, 10.0, 14.0]);
    }

    #[test]
    #[should_panic(expected = "Mat4 row index out of range: 4")]
    fn test_row_out_of_range() {
        let _ = Mat4::IDENTITY.row(4);
    }

    #[test]
    fn test_index_mut() {
        let mut m = Mat4::ZERO;
        m[(1, 2)] = 5.0;
        assert_eq!(m.0[6], 5.0);
    }
}
