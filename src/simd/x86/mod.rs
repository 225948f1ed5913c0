//! x86 and x86_64 SIMD implementations.
//!
//! - `sse`: 128-bit kernels, compiled whenever SSE2 is guaranteed by the target.
//! - `avx`: 256-bit kernels, always compiled on x86 and gated at dispatch time
//!   by the AVX capability tier.

#[cfg(any(target_arch = "x86_64", target_feature = "sse2"))]
pub(crate) mod sse;

pub(crate) mod avx;
