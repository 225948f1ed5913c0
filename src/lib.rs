//! # simd-kernels
//!
//! Architecture-aware numeric kernels with a scalar fallback.
//!
//! The crate resolves which wide-SIMD instruction-set tiers the build can use
//! (SSE and AVX on x86, NEON on ARM) and dispatches a small set of kernels to
//! the widest implementation available:
//!
//! - **Vector add / multiply** - elementwise over `f32` slices
//! - **Dot product** - `f32` slices, with per-lane partial sums
//! - **4x4 matrix multiply** - row-major [`Mat4`]
//! - **Bulk copy** - non-overlapping byte buffers
//!
//! Every kernel has a scalar reference implementation in [`simd::scalar`],
//! used on unknown architectures and whenever a tier is missing.
//!
//! ## Quick Start
//!
//! The free functions use a process-wide dispatch table built on first use:
//!
//! ```
//! let a = [1.0f32, 2.0, 3.0, 4.0, 5.0];
//! let b = [2.0f32; 5];
//!
//! let mut sum = [0.0f32; 5];
//! simd_kernels::add(&a, &b, &mut sum);
//! assert_eq!(sum, [3.0, 4.0, 5.0, 6.0, 7.0]);
//!
//! assert_eq!(simd_kernels::dot(&a, &b), 30.0);
//! ```
//!
//! ## Choosing a Backend
//!
//! Build a [`Kernels`] table directly to control selection:
//!
//! ```
//! use simd_kernels::{Backend, DispatchConfig, Kernels, Op};
//!
//! // Widest available backend per operation
//! let fast = Kernels::detect();
//! println!("dot runs on {}", fast.backend(Op::Dot));
//!
//! // Scalar reference, e.g. for reproducible summation order
//! let exact = Kernels::from_config(&DispatchConfig::new().force_scalar()).unwrap();
//! assert_eq!(exact.backend(Op::Dot), Backend::Scalar);
//! ```
//!
//! The process-wide table also honors the `SIMD_KERNELS_BACKEND` environment
//! variable (`auto`, `scalar`, `sse`, `avx`, `neon`). See [`config`].
//!
//! ## Capabilities
//!
//! | Target              | Tiers                                  |
//! |---------------------|----------------------------------------|
//! | `x86_64`            | SSE, plus AVX when enabled for the build |
//! | `x86`               | SSE with `sse2`, AVX when enabled      |
//! | `aarch64`           | NEON                                   |
//! | `arm`               | NEON with the `neon` target feature    |
//! | anything else       | none (scalar)                          |
//!
//! Enable the `runtime-detect` feature to also probe the running CPU for AVX
//! when the build itself does not enable it.
//!
//! ## Numerical Results
//!
//! Add, multiply and copy give identical results on every backend. Dot
//! product and matrix multiply accumulate in a different order on SIMD
//! backends and can differ from the scalar result by rounding.

// Intrinsics live in the backend modules, which opt in explicitly.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod caps;
pub mod config;
mod error;
pub mod matrix;
pub mod simd;

// ============================================================================
// Public API
// ============================================================================

/// Capability resolution types.
///
/// ```
/// use simd_kernels::{caps, Tier};
///
/// let caps = caps();
/// if caps.has(Tier::Avx) {
///     println!("256-bit kernels available");
/// }
/// ```
pub use caps::{caps, Arch, Caps, Tier};

/// Backend selection settings.
pub use config::DispatchConfig;

/// Error type for checked kernel calls and configuration.
///
/// # Example
///
/// ```
/// use simd_kernels::{Error, Kernels};
///
/// let mut out = [0.0f32; 3];
/// match Kernels::detect().try_add(&[1.0; 3], &[1.0; 2], &mut out) {
///     Err(Error::LengthMismatch { expected, actual }) => {
///         assert_eq!((expected, actual), (3, 2));
///     }
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
pub use error::Error;

/// Result type alias.
///
/// Equivalent to `std::result::Result<T, simd_kernels::Error>`.
pub use error::Result;

/// Row-major 4x4 `f32` matrix.
pub use matrix::Mat4;

/// Dispatch table and its selectors.
pub use simd::{kernels, Backend, Kernels, Op};

// ============================================================================
// Convenience functions over the process-wide table
// ============================================================================

/// `out[i] = a[i] + b[i]` using the process-wide [`kernels()`] table.
///
/// # Panics
///
/// Panics if `a`, `b` and `out` do not all have the same length.
#[track_caller]
pub fn add(a: &[f32], b: &[f32], out: &mut [f32]) {
    kernels().add(a, b, out)
}

/// `out[i] = a[i] * b[i]` using the process-wide [`kernels()`] table.
///
/// # Panics
///
/// Panics if `a`, `b` and `out` do not all have the same length.
#[track_caller]
pub fn multiply(a: &[f32], b: &[f32], out: &mut [f32]) {
    kernels().multiply(a, b, out)
}

/// Dot product using the process-wide [`kernels()`] table.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[track_caller]
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    kernels().dot(a, b)
}

/// `a * b` for 4x4 matrices using the process-wide [`kernels()`] table.
#[must_use]
pub fn matmul4x4(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = Mat4::ZERO;
    kernels().matmul4x4(a, b, &mut out);
    out
}

/// Copy `src` into `dst` using the process-wide [`kernels()`] table.
///
/// # Panics
///
/// Panics if `dst` and `src` have different lengths.
#[track_caller]
pub fn copy(dst: &mut [u8], src: &[u8]) {
    kernels().copy(dst, src)
}
