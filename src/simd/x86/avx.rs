//! AVX (256-bit) kernels for x86 and x86_64.
//!
//! Eight f32 lanes per step for add, multiply and dot product, 32 bytes per
//! step for copy. There is no 256-bit matrix kernel: a 4x4 row fits a single
//! 128-bit register, so the dispatch table falls back to SSE for it.
//!
//! All inner functions carry `#[target_feature(enable = "avx")]` so they are
//! compiled for AVX even when the crate target does not enable it. The safe
//! wrappers are only reachable through a [`Kernels`](crate::simd::Kernels)
//! table built from capabilities that include the AVX tier.

#![allow(unsafe_code)]

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::simd::lanes::{self, Align32, Chunk, Lanes};

/// Eight f32 lanes in a `ymm` register.
#[derive(Clone, Copy)]
pub(crate) struct F32x8(__m256);

impl Lanes for F32x8 {
    const WIDTH: usize = 8;

    #[inline(always)]
    unsafe fn zero() -> Self {
        F32x8(_mm256_setzero_ps())
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> Self {
        F32x8(_mm256_loadu_ps(ptr))
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        F32x8(_mm256_load_ps(ptr))
    }

    #[inline(always)]
    unsafe fn store(self, ptr: *mut f32) {
        _mm256_storeu_ps(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut f32) {
        _mm256_store_ps(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        F32x8(_mm256_add_ps(self.0, rhs.0))
    }

    #[inline(always)]
    unsafe fn mul(self, rhs: Self) -> Self {
        F32x8(_mm256_mul_ps(self.0, rhs.0))
    }

    #[inline(always)]
    unsafe fn sum(self) -> f32 {
        let mut tmp = Align32([0.0f32; 8]);
        self.store_aligned(tmp.0.as_mut_ptr());
        lanes::sum_in_order(&tmp.0)
    }
}

/// 32-byte unaligned move through a `ymm` register.
pub(crate) struct Bytes32;

impl Chunk for Bytes32 {
    const BYTES: usize = 32;

    #[inline(always)]
    unsafe fn copy(src: *const u8, dst: *mut u8) {
        let data = _mm256_loadu_si256(src as *const __m256i);
        _mm256_storeu_si256(dst as *mut __m256i, data);
    }
}

// ============================================================================
// AVX-compiled bodies
// ============================================================================

/// # Safety
/// Requires AVX support.
#[target_feature(enable = "avx")]
unsafe fn add_avx(a: &[f32], b: &[f32], out: &mut [f32]) {
    lanes::add::<F32x8>(a, b, out)
}

/// # Safety
/// Requires AVX support.
#[target_feature(enable = "avx")]
unsafe fn multiply_avx(a: &[f32], b: &[f32], out: &mut [f32]) {
    lanes::mul::<F32x8>(a, b, out)
}

/// # Safety
/// Requires AVX support.
#[target_feature(enable = "avx")]
unsafe fn dot_avx(a: &[f32], b: &[f32]) -> f32 {
    lanes::dot::<F32x8>(a, b)
}

/// # Safety
/// Requires AVX support.
#[target_feature(enable = "avx")]
unsafe fn copy_avx(dst: &mut [u8], src: &[u8]) {
    lanes::copy::<Bytes32>(dst, src)
}

// ============================================================================
// Entry points
// ============================================================================

/// AVX vector add.
pub(crate) fn add(a: &[f32], b: &[f32], out: &mut [f32]) {
    // SAFETY: only installed in a dispatch table when Caps reports AVX
    unsafe { add_avx(a, b, out) }
}

/// AVX vector multiply.
pub(crate) fn multiply(a: &[f32], b: &[f32], out: &mut [f32]) {
    // SAFETY: only installed in a dispatch table when Caps reports AVX
    unsafe { multiply_avx(a, b, out) }
}

/// AVX dot product.
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    // SAFETY: only installed in a dispatch table when Caps reports AVX
    unsafe { dot_avx(a, b) }
}

/// AVX bulk copy, 32 bytes per step.
pub(crate) fn copy(dst: &mut [u8], src: &[u8]) {
    // SAFETY: only installed in a dispatch table when Caps reports AVX
    unsafe { copy_avx(dst, src) }
}
