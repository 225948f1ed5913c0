//! NEON (128-bit) kernels for aarch64.
//!
//! NEON is mandatory on aarch64, so these entry points are unconditionally
//! safe to call on this architecture.

#![allow(unsafe_code)]

use core::arch::aarch64::*;

use crate::matrix::Mat4;
use crate::simd::lanes::{self, Align16, Chunk, Lanes, Quad};

/// Four f32 lanes in a `q` register.
#[derive(Clone, Copy)]
pub(crate) struct F32x4(float32x4_t);

impl Lanes for F32x4 {
    const WIDTH: usize = 4;

    #[inline(always)]
    unsafe fn zero() -> Self {
        F32x4(vdupq_n_f32(0.0))
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> Self {
        F32x4(vld1q_f32(ptr))
    }

    // ld1/st1 have no alignment requirement; the aligned forms are the same
    // instructions.
    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        F32x4(vld1q_f32(ptr))
    }

    #[inline(always)]
    unsafe fn store(self, ptr: *mut f32) {
        vst1q_f32(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut f32) {
        vst1q_f32(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        F32x4(vaddq_f32(self.0, rhs.0))
    }

    #[inline(always)]
    unsafe fn mul(self, rhs: Self) -> Self {
        F32x4(vmulq_f32(self.0, rhs.0))
    }

    #[inline(always)]
    unsafe fn sum(self) -> f32 {
        let mut tmp = Align16([0.0f32; 4]);
        self.store_aligned(tmp.0.as_mut_ptr());
        lanes::sum_in_order(&tmp.0)
    }
}

impl Quad for F32x4 {
    #[inline(always)]
    unsafe fn set(lanes: [f32; 4]) -> Self {
        F32x4(vld1q_f32(lanes.as_ptr()))
    }

    #[inline(always)]
    unsafe fn hadd(self, rhs: Self) -> Self {
        F32x4(vpaddq_f32(self.0, rhs.0))
    }

    #[inline(always)]
    unsafe fn first(self) -> f32 {
        vgetq_lane_f32::<0>(self.0)
    }
}

/// 16-byte move through a `q` register.
pub(crate) struct Bytes16;

impl Chunk for Bytes16 {
    const BYTES: usize = 16;

    #[inline(always)]
    unsafe fn copy(src: *const u8, dst: *mut u8) {
        vst1q_u8(dst, vld1q_u8(src));
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// NEON vector add.
pub(crate) fn add(a: &[f32], b: &[f32], out: &mut [f32]) {
    // SAFETY: NEON is part of the aarch64 baseline
    unsafe { lanes::add::<F32x4>(a, b, out) }
}

/// NEON vector multiply.
pub(crate) fn multiply(a: &[f32], b: &[f32], out: &mut [f32]) {
    // SAFETY: NEON is part of the aarch64 baseline
    unsafe { lanes::mul::<F32x4>(a, b, out) }
}

/// NEON dot product.
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    // SAFETY: NEON is part of the aarch64 baseline
    unsafe { lanes::dot::<F32x4>(a, b) }
}

/// NEON 4x4 matrix multiply.
pub(crate) fn matmul4x4(a: &Mat4, b: &Mat4, out: &mut Mat4) {
    // SAFETY: NEON is part of the aarch64 baseline
    unsafe { lanes::matmul4x4::<F32x4>(a, b, out) }
}

/// NEON bulk copy, 16 bytes per step.
pub(crate) fn copy(dst: &mut [u8], src: &[u8]) {
    // SAFETY: NEON is part of the aarch64 baseline
    unsafe { lanes::copy::<Bytes16>(dst, src) }
}
