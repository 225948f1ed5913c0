//! Wide-register abstraction shared by the accelerated backends.
//!
//! Each backend wraps its native register type (`__m128`, `__m256`,
//! `float32x4_t`, `wide::f32x4`) in a newtype implementing [`Lanes`], and its
//! widest byte move in a type implementing [`Chunk`]. The kernel bodies below
//! are written once against these traits and monomorphized per backend, so
//! every backend shares the same bulk/tail partitioning and reduction order.
//!
//! Nothing here is public: register types never cross the crate boundary.

#![allow(unsafe_code)]

use crate::matrix::Mat4;

/// Scratch buffer aligned for 128-bit stores.
#[derive(Clone, Copy)]
#[repr(C, align(16))]
pub(crate) struct Align16<T>(pub T);

/// Scratch buffer aligned for 256-bit stores.
#[derive(Clone, Copy)]
#[repr(C, align(32))]
pub(crate) struct Align32<T>(pub T);

/// A register of `WIDTH` single-precision lanes.
///
/// # Safety
///
/// Every method requires the instruction set behind the implementing type to
/// be available on the running CPU. Pointer arguments must be valid for
/// `WIDTH` elements; the `_aligned` variants additionally require
/// `WIDTH * 4`-byte alignment (16 bytes for 128-bit types).
pub(crate) trait Lanes: Copy {
    /// Number of f32 lanes.
    const WIDTH: usize;

    unsafe fn zero() -> Self;
    unsafe fn load(ptr: *const f32) -> Self;
    unsafe fn load_aligned(ptr: *const f32) -> Self;
    unsafe fn store(self, ptr: *mut f32);
    unsafe fn store_aligned(self, ptr: *mut f32);
    unsafe fn add(self, rhs: Self) -> Self;
    unsafe fn mul(self, rhs: Self) -> Self;

    /// Horizontal sum, lanes added left to right after one aligned store.
    unsafe fn sum(self) -> f32;
}

/// 4-lane registers with the extra operations the 4x4 matrix kernel needs.
pub(crate) trait Quad: Lanes {
    /// Gather four scalars into lanes 0..4.
    unsafe fn set(lanes: [f32; 4]) -> Self;

    /// Pairwise horizontal add:
    /// `[a0+a1, a2+a3, b0+b1, b2+b3]` for `a.hadd(b)`.
    unsafe fn hadd(self, rhs: Self) -> Self;

    /// Lane 0.
    unsafe fn first(self) -> f32;
}

/// One unaligned wide byte move.
pub(crate) trait Chunk {
    /// Bytes moved per call.
    const BYTES: usize;

    /// Copy `BYTES` bytes from `src` to `dst`.
    unsafe fn copy(src: *const u8, dst: *mut u8);
}

/// Sum `lanes` strictly left to right.
#[inline(always)]
pub(crate) fn sum_in_order(lanes: &[f32]) -> f32 {
    let mut total = lanes[0];
    for &x in &lanes[1..] {
        total += x;
    }
    total
}

// ============================================================================
// Kernel bodies
// ============================================================================

/// `out[i] = a[i] + b[i]`.
///
/// The length is taken from `out`; `a` and `b` are bounds-checked against it
/// before any wide access.
#[inline(always)]
pub(crate) unsafe fn add<V: Lanes>(a: &[f32], b: &[f32], out: &mut [f32]) {
    let len = out.len();
    let (a, b) = (&a[..len], &b[..len]);
    let bulk = len - len % V::WIDTH;

    let (pa, pb, po) = (a.as_ptr(), b.as_ptr(), out.as_mut_ptr());
    let mut i = 0;
    while i < bulk {
        let va = V::load(pa.add(i));
        let vb = V::load(pb.add(i));
        va.add(vb).store(po.add(i));
        i += V::WIDTH;
    }

    // Tail
    for j in bulk..len {
        out[j] = a[j] + b[j];
    }
}

/// `out[i] = a[i] * b[i]`.
#[inline(always)]
pub(crate) unsafe fn mul<V: Lanes>(a: &[f32], b: &[f32], out: &mut [f32]) {
    let len = out.len();
    let (a, b) = (&a[..len], &b[..len]);
    let bulk = len - len % V::WIDTH;

    let (pa, pb, po) = (a.as_ptr(), b.as_ptr(), out.as_mut_ptr());
    let mut i = 0;
    while i < bulk {
        let va = V::load(pa.add(i));
        let vb = V::load(pb.add(i));
        va.mul(vb).store(po.add(i));
        i += V::WIDTH;
    }

    for j in bulk..len {
        out[j] = a[j] * b[j];
    }
}

/// `sum(a[i] * b[i])` with `WIDTH` partial sums reduced once at the end.
#[inline(always)]
pub(crate) unsafe fn dot<V: Lanes>(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len();
    let b = &b[..len];
    let bulk = len - len % V::WIDTH;

    let (pa, pb) = (a.as_ptr(), b.as_ptr());
    let mut acc = V::zero();
    let mut i = 0;
    while i < bulk {
        let prod = V::load(pa.add(i)).mul(V::load(pb.add(i)));
        acc = acc.add(prod);
        i += V::WIDTH;
    }

    let mut result = acc.sum();
    for j in bulk..len {
        result += a[j] * b[j];
    }
    result
}

/// 4x4 matrix product, one horizontal reduction per output cell.
#[inline(always)]
pub(crate) unsafe fn matmul4x4<V: Quad>(a: &Mat4, b: &Mat4, out: &mut Mat4) {
    for i in 0..4 {
        // Mat4 is 16-byte aligned and each row is 16 bytes.
        let row = V::load_aligned(a.row(i).as_ptr());
        for j in 0..4 {
            let col = V::set(b.col(j));
            let prod = row.mul(col);
            let sum1 = prod.hadd(prod);
            let sum2 = sum1.hadd(sum1);
            out.0[i * 4 + j] = sum2.first();
        }
    }
}

/// Bulk copy in `C::BYTES` chunks, remainder through `copy_from_slice`.
#[inline(always)]
pub(crate) unsafe fn copy<C: Chunk>(dst: &mut [u8], src: &[u8]) {
    let len = dst.len();
    let src = &src[..len];
    let bulk = len - len % C::BYTES;

    let (ps, pd) = (src.as_ptr(), dst.as_mut_ptr());
    let mut i = 0;
    while i < bulk {
        C::copy(ps.add(i), pd.add(i));
        i += C::BYTES;
    }

    dst[bulk..].copy_from_slice(&src[bulk..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_in_order() {
        assert_eq!(sum_in_order(&[1.0, 2.0, 3.0, 4.0]), 10.0);
        // ((1e8 + 1) + -1e8) + 1 rounds differently from a pairwise sum
        assert_eq!(sum_in_order(&[1e8, 1.0, -1e8, 1.0]), 1.0);
    }

    #[test]
    fn test_scratch_alignment() {
        assert_eq!(std::mem::align_of::<Align16<[f32; 4]>>(), 16);
        assert_eq!(std::mem::align_of::<Align32<[f32; 8]>>(), 32);
    }
}
