//! Scalar (non-SIMD) reference implementations.
//!
//! These implementations are:
//! - **Portable**: Work on any platform without SIMD support
//! - **Sequential**: Every element is processed one at a time in index order
//! - **Testable**: Used to verify the SIMD backends
//!
//! Add, multiply and copy in every SIMD backend must be bit-exact against
//! these. Dot product and matrix multiply reduce in a different order on the
//! SIMD paths and are compared with a tolerance.
//!
//! The lengths used are those of the output (or, for `dot`, of `a`). Inputs
//! shorter than that panic on indexing.

use crate::matrix::Mat4;

/// Scalar vector add: `out[i] = a[i] + b[i]`.
pub fn add(a: &[f32], b: &[f32], out: &mut [f32]) {
    for i in 0..out.len() {
        out[i] = a[i] + b[i];
    }
}

/// Scalar vector multiply: `out[i] = a[i] * b[i]`.
pub fn multiply(a: &[f32], b: &[f32], out: &mut [f32]) {
    for i in 0..out.len() {
        out[i] = a[i] * b[i];
    }
}

/// Scalar dot product with a single running sum in index order.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    let mut result = 0.0f32;
    for i in 0..a.len() {
        result += a[i] * b[i];
    }
    result
}

/// Textbook `i, j, k` 4x4 matrix product.
pub fn matmul4x4(a: &Mat4, b: &Mat4, out: &mut Mat4) {
    for i in 0..4 {
        for j in 0..4 {
            let mut sum = 0.0f32;
            for k in 0..4 {
                sum += a.0[i * 4 + k] * b.0[k * 4 + j];
            }
            out.0[i * 4 + j] = sum;
        }
    }
}

/// Byte copy through the standard library primitive.
pub fn copy(dst: &mut [u8], src: &[u8]) {
    dst.copy_from_slice(&src[..dst.len()]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_multiply() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [0.5, -1.0, 2.0, 0.0, 10.0];
        let mut out = [0.0f32; 5];

        add(&a, &b, &mut out);
        assert_eq!(out, [1.5, 1.0, 5.0, 4.0, 15.0]);

        multiply(&a, &b, &mut out);
        assert_eq!(out, [0.5, -2.0, 6.0, 0.0, 50.0]);
    }

    #[test]
    fn test_empty() {
        let mut out: [f32; 0] = [];
        add(&[], &[], &mut out);
        assert_eq!(dot(&[], &[]), 0.0);
        let mut dst: [u8; 0] = [];
        copy(&mut dst, &[]);
    }

    #[test]
    fn test_dot() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert_eq!(dot(&a, &b), 32.0);
    }

    #[test]
    fn test_matmul_identity() {
        let b = Mat4::from_rows([
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ]);
        let mut out = Mat4::ZERO;
        matmul4x4(&Mat4::IDENTITY, &b, &mut out);
        assert_eq!(out, b);
        matmul4x4(&b, &Mat4::IDENTITY, &mut out);
        assert_eq!(out, b);
    }

    #[test]
    fn test_matmul_known_product() {
        let a = Mat4::from_rows([
            [1.0, 2.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 2.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let b = Mat4::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [3.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 4.0, 1.0],
        ]);
        let mut out = Mat4::ZERO;
        matmul4x4(&a, &b, &mut out);
        assert_eq!(out.row(0), &[7.0, 2.0, 0.0, 0.0]);
        assert_eq!(out.row(2), &[0.0, 0.0, 2.0, 0.0]);
        assert_eq!(out.row(3), &[0.0, 0.0, 4.0, 1.0]);
    }

    #[test]
    fn test_copy() {
        let src = [9u8, 8, 7, 6, 5];
        let mut dst = [0u8; 5];
        copy(&mut dst, &src);
        assert_eq!(dst, src);
    }
}
