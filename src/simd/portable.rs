//! Portable 4-lane kernels built on `wide::f32x4`.
//!
//! Stable Rust has no NEON intrinsics for 32-bit ARM, so the NEON tier on
//! `arm` targets is served by these kernels. `wide` only uses NEON
//! instructions on aarch64; on `arm` an `f32x4` is a plain 4-lane array
//! emulation that LLVM may auto-vectorize. The module is compiled on every
//! architecture so its lane semantics stay covered by the test suite
//! everywhere.
//!
//! Reduction order matches the intrinsic backends exactly: dot products keep
//! four partial sums and matrix cells are `(p0 + p1) + (p2 + p3)`.

#![allow(unsafe_code)]
#![cfg_attr(not(target_arch = "arm"), allow(dead_code))]

use wide::f32x4;

use crate::matrix::Mat4;
use crate::simd::lanes::{self, Chunk, Lanes, Quad};

/// Four f32 lanes in a `wide::f32x4`.
#[derive(Clone, Copy)]
pub(crate) struct F32x4(f32x4);

impl Lanes for F32x4 {
    const WIDTH: usize = 4;

    #[inline(always)]
    unsafe fn zero() -> Self {
        F32x4(f32x4::ZERO)
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> Self {
        F32x4(f32x4::from(core::ptr::read_unaligned(ptr as *const [f32; 4])))
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        F32x4(f32x4::from(core::ptr::read(ptr as *const [f32; 4])))
    }

    #[inline(always)]
    unsafe fn store(self, ptr: *mut f32) {
        core::ptr::write_unaligned(ptr as *mut [f32; 4], self.0.to_array())
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut f32) {
        core::ptr::write(ptr as *mut [f32; 4], self.0.to_array())
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        F32x4(self.0 + rhs.0)
    }

    #[inline(always)]
    unsafe fn mul(self, rhs: Self) -> Self {
        F32x4(self.0 * rhs.0)
    }

    #[inline(always)]
    unsafe fn sum(self) -> f32 {
        lanes::sum_in_order(&self.0.to_array())
    }
}

impl Quad for F32x4 {
    #[inline(always)]
    unsafe fn set(lanes: [f32; 4]) -> Self {
        F32x4(f32x4::from(lanes))
    }

    #[inline(always)]
    unsafe fn hadd(self, rhs: Self) -> Self {
        let [a0, a1, a2, a3] = self.0.to_array();
        let [b0, b1, b2, b3] = rhs.0.to_array();
        F32x4(f32x4::from([a0 + a1, a2 + a3, b0 + b1, b2 + b3]))
    }

    #[inline(always)]
    unsafe fn first(self) -> f32 {
        self.0.to_array()[0]
    }
}

/// 16-byte unaligned move as a single array value.
pub(crate) struct Bytes16;

impl Chunk for Bytes16 {
    const BYTES: usize = 16;

    #[inline(always)]
    unsafe fn copy(src: *const u8, dst: *mut u8) {
        let data = core::ptr::read_unaligned(src as *const [u8; 16]);
        core::ptr::write_unaligned(dst as *mut [u8; 16], data);
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Portable 4-lane vector add.
pub(crate) fn add(a: &[f32], b: &[f32], out: &mut [f32]) {
    // SAFETY: wide::f32x4 has no instruction-set requirement
    unsafe { lanes::add::<F32x4>(a, b, out) }
}

/// Portable 4-lane vector multiply.
pub(crate) fn multiply(a: &[f32], b: &[f32], out: &mut [f32]) {
    // SAFETY: wide::f32x4 has no instruction-set requirement
    unsafe { lanes::mul::<F32x4>(a, b, out) }
}

/// Portable 4-lane dot product.
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    // SAFETY: wide::f32x4 has no instruction-set requirement
    unsafe { lanes::dot::<F32x4>(a, b) }
}

/// Portable 4x4 matrix multiply.
pub(crate) fn matmul4x4(a: &Mat4, b: &Mat4, out: &mut Mat4) {
    // SAFETY: wide::f32x4 has no instruction-set requirement
    unsafe { lanes::matmul4x4::<F32x4>(a, b, out) }
}

/// Portable bulk copy, 16 bytes per step.
pub(crate) fn copy(dst: &mut [u8], src: &[u8]) {
    // SAFETY: plain unaligned reads/writes within bounds
    unsafe { lanes::copy::<Bytes16>(dst, src) }
}
