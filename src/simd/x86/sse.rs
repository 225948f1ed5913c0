//! SSE (128-bit) kernels for x86 and x86_64.
//!
//! SSE2 is part of the x86_64 baseline, and on 32-bit x86 this module is only
//! compiled when `sse2` is a target feature, so the safe entry points here
//! never need a runtime check.
//!
//! The horizontal add used by the matrix kernel is `haddps` when the target
//! enables SSE3 and an equivalent shuffle pair otherwise. Both produce
//! `[a0+a1, a2+a3, b0+b1, b2+b3]`, so results do not depend on the target CPU.

#![allow(unsafe_code)]

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::matrix::Mat4;
use crate::simd::lanes::{self, Align16, Chunk, Lanes, Quad};

/// Four f32 lanes in an `xmm` register.
#[derive(Clone, Copy)]
pub(crate) struct F32x4(__m128);

impl Lanes for F32x4 {
    const WIDTH: usize = 4;

    #[inline(always)]
    unsafe fn zero() -> Self {
        F32x4(_mm_setzero_ps())
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> Self {
        F32x4(_mm_loadu_ps(ptr))
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        F32x4(_mm_load_ps(ptr))
    }

    #[inline(always)]
    unsafe fn store(self, ptr: *mut f32) {
        _mm_storeu_ps(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut f32) {
        _mm_store_ps(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        F32x4(_mm_add_ps(self.0, rhs.0))
    }

    #[inline(always)]
    unsafe fn mul(self, rhs: Self) -> Self {
        F32x4(_mm_mul_ps(self.0, rhs.0))
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
        let [e0, e1, e2, e3] = lanes;
        // _mm_set_ps takes lanes high to low
        F32x4(_mm_set_ps(e3, e2, e1, e0))
    }

    #[cfg(target_feature = "sse3")]
    #[inline(always)]
    unsafe fn hadd(self, rhs: Self) -> Self {
        F32x4(_mm_hadd_ps(self.0, rhs.0))
    }

    #[cfg(not(target_feature = "sse3"))]
    #[inline(always)]
    unsafe fn hadd(self, rhs: Self) -> Self {
        // even lanes: [a0, a2, b0, b2], odd lanes: [a1, a3, b1, b3]
        let even = _mm_shuffle_ps::<0b10_00_10_00>(self.0, rhs.0);
        let odd = _mm_shuffle_ps::<0b11_01_11_01>(self.0, rhs.0);
        F32x4(_mm_add_ps(even, odd))
    }

    #[inline(always)]
    unsafe fn first(self) -> f32 {
        _mm_cvtss_f32(self.0)
    }
}

/// 16-byte unaligned move through an `xmm` register.
pub(crate) struct Bytes16;

impl Chunk for Bytes16 {
    const BYTES: usize = 16;

    #[inline(always)]
    unsafe fn copy(src: *const u8, dst: *mut u8) {
        let data = _mm_loadu_si128(src as *const __m128i);
        _mm_storeu_si128(dst as *mut __m128i, data);
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// SSE vector add.
pub(crate) fn add(a: &[f32], b: &[f32], out: &mut [f32]) {
    // SAFETY: SSE2 is guaranteed whenever this module is compiled
    unsafe { lanes::add::<F32x4>(a, b, out) }
}

/// SSE vector multiply.
pub(crate) fn multiply(a: &[f32], b: &[f32], out: &mut [f32]) {
    // SAFETY: SSE2 is guaranteed whenever this module is compiled
    unsafe { lanes::mul::<F32x4>(a, b, out) }
}

/// SSE dot product.
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    // SAFETY: SSE2 is guaranteed whenever this module is compiled
    unsafe { lanes::dot::<F32x4>(a, b) }
}

/// SSE 4x4 matrix multiply.
pub(crate) fn matmul4x4(a: &Mat4, b: &Mat4, out: &mut Mat4) {
    // SAFETY: SSE2 is guaranteed whenever this module is compiled
    unsafe { lanes::matmul4x4::<F32x4>(a, b, out) }
}

/// SSE bulk copy, 16 bytes per step.
pub(crate) fn copy(dst: &mut [u8], src: &[u8]) {
    // SAFETY: SSE2 is guaranteed whenever this module is compiled
    unsafe { lanes::copy::<Bytes16>(dst, src) }
}
