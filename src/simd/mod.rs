//! SIMD kernel implementations and dispatch.
//!
//! This module provides dispatch between scalar and SIMD implementations
//! based on resolved CPU capabilities. The design follows these principles:
//!
//! 1. **Scalar reference**: Every operation has a scalar implementation for
//!    correctness testing and fallback on unsupported platforms.
//!
//! 2. **Platform-specific optimizations**: x86 (SSE/AVX) and aarch64 (NEON)
//!    implementations live in separate submodules. 32-bit ARM uses the
//!    portable `wide` backend for its NEON tier.
//!
//! 3. **Resolve once**: Capabilities are resolved once, and function pointers
//!    are chosen per operation when a [`Kernels`] table is built. Calls through
//!    the table have no further checks beyond operand lengths.
//!
//! 4. **Zero-cost when unused**: Platform-specific code is only compiled for
//!    the target architecture.
//!
//! # Architecture
//!
//! ```text
//! simd/
//! ├── mod.rs         # This file - Backend, Op, Kernels dispatch table
//! ├── lanes.rs       # Wide-register traits and shared bulk/tail bodies
//! ├── scalar.rs      # Reference implementations
//! ├── portable.rs    # wide::f32x4 backend (NEON tier on 32-bit ARM)
//! ├── x86/
//! │   ├── sse.rs     # 128-bit SSE
//! │   └── avx.rs     # 256-bit AVX
//! └── aarch64/
//!     └── neon.rs    # 128-bit NEON
//! ```
//!
//! # Numerical equivalence
//!
//! Add, multiply and copy are bit-identical across backends. Dot product and
//! 4x4 matrix multiply sum in a different order on SIMD backends (per-lane
//! partial sums, pairwise horizontal adds), so their results can differ from
//! the scalar path by floating-point rounding. This is expected, not a bug.

pub(crate) mod lanes;
pub(crate) mod portable;
pub mod scalar;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub(crate) mod x86;

#[cfg(target_arch = "aarch64")]
pub(crate) mod aarch64;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::caps::{caps, Caps, Tier};
use crate::config::DispatchConfig;
use crate::error::{check_len, Error, Result};
use crate::matrix::Mat4;

/// Function pointer type for elementwise binary kernels.
///
/// Signature: (a, b, out) with `out[i] = a[i] OP b[i]` for `i < out.len()`.
pub type BinaryFn = fn(&[f32], &[f32], &mut [f32]);

/// Function pointer type for dot product.
pub type DotFn = fn(&[f32], &[f32]) -> f32;

/// Function pointer type for 4x4 matrix multiply: (a, b, out).
pub type MatMulFn = fn(&Mat4, &Mat4, &mut Mat4);

/// Function pointer type for bulk copy: (dst, src).
pub type CopyFn = fn(&mut [u8], &[u8]);

// ============================================================================
// Backends and operations
// ============================================================================

/// Implementation family a kernel can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// x86 256-bit AVX
    Avx,
    /// x86 128-bit SSE
    Sse,
    /// ARM 128-bit NEON
    Neon,
    /// Portable scalar reference
    Scalar,
}

impl Backend {
    /// All backends, in dispatch preference order.
    pub const ALL: [Backend; 4] = [Backend::Avx, Backend::Sse, Backend::Neon, Backend::Scalar];

    /// Capability tier this backend requires (`None` for scalar).
    #[must_use]
    pub const fn tier(self) -> Option<Tier> {
        match self {
            Backend::Avx => Some(Tier::Avx),
            Backend::Sse => Some(Tier::Sse),
            Backend::Neon => Some(Tier::Neon),
            Backend::Scalar => None,
        }
    }

    /// f32 lanes processed per step.
    #[must_use]
    pub const fn lanes(self) -> usize {
        match self {
            Backend::Avx => 8,
            Backend::Sse | Backend::Neon => 4,
            Backend::Scalar => 1,
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Backend::Avx => "avx",
            Backend::Sse => "sse",
            Backend::Neon => "neon",
            Backend::Scalar => "scalar",
        }
    }

    /// Can this backend run with `caps`?
    #[must_use]
    pub const fn is_available(self, caps: Caps) -> bool {
        match self.tier() {
            Some(tier) => caps.has(tier),
            None => true,
        }
    }

    /// Does this backend implement `op`?
    ///
    /// The 256-bit tier has no 4x4 matrix kernel.
    #[must_use]
    pub const fn supports(self, op: Op) -> bool {
        !matches!((self, op), (Backend::Avx, Op::MatMul4x4))
    }

    /// Best backend for `op` under `caps`.
    ///
    /// Candidates are tried in [`Backend::ALL`] order; scalar always matches.
    #[must_use]
    pub fn select(op: Op, caps: Caps) -> Backend {
        Backend::ALL
            .into_iter()
            .find(|b| b.supports(op) && b.is_available(caps))
            .unwrap_or(Backend::Scalar)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Backend::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownBackend(s.to_string()))
    }
}

/// The kernels a [`Kernels`] table dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Elementwise vector add
    Add,
    /// Elementwise vector multiply
    Multiply,
    /// Dot product
    Dot,
    /// Fixed 4x4 matrix multiply
    MatMul4x4,
    /// Bulk non-overlapping byte copy
    Copy,
}

impl Op {
    /// All operations.
    pub const ALL: [Op; 5] = [Op::Add, Op::Multiply, Op::Dot, Op::MatMul4x4, Op::Copy];

    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Multiply => "multiply",
            Op::Dot => "dot",
            Op::MatMul4x4 => "matmul4x4",
            Op::Copy => "copy",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Per-backend function lookup
// ============================================================================
//
// Arms only exist for backends compiled on this target. A backend whose tier
// is present in a Caps always has its arm compiled; anything else falls
// through to scalar.

fn add_fn(backend: Backend) -> BinaryFn {
    match backend {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        Backend::Avx => x86::avx::add,
        #[cfg(any(target_arch = "x86_64", all(target_arch = "x86", target_feature = "sse2")))]
        Backend::Sse => x86::sse::add,
        #[cfg(target_arch = "aarch64")]
        Backend::Neon => aarch64::neon::add,
        #[cfg(target_arch = "arm")]
        Backend::Neon => portable::add,
        _ => scalar::add,
    }
}

fn multiply_fn(backend: Backend) -> BinaryFn {
    match backend {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        Backend::Avx => x86::avx::multiply,
        #[cfg(any(target_arch = "x86_64", all(target_arch = "x86", target_feature = "sse2")))]
        Backend::Sse => x86::sse::multiply,
        #[cfg(target_arch = "aarch64")]
        Backend::Neon => aarch64::neon::multiply,
        #[cfg(target_arch = "arm")]
        Backend::Neon => portable::multiply,
        _ => scalar::multiply,
    }
}

fn dot_fn(backend: Backend) -> DotFn {
    match backend {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        Backend::Avx => x86::avx::dot,
        #[cfg(any(target_arch = "x86_64", all(target_arch = "x86", target_feature = "sse2")))]
        Backend::Sse => x86::sse::dot,
        #[cfg(target_arch = "aarch64")]
        Backend::Neon => aarch64::neon::dot,
        #[cfg(target_arch = "arm")]
        Backend::Neon => portable::dot,
        _ => scalar::dot,
    }
}

fn matmul_fn(backend: Backend) -> MatMulFn {
    match backend {
        #[cfg(any(target_arch = "x86_64", all(target_arch = "x86", target_feature = "sse2")))]
        Backend::Sse => x86::sse::matmul4x4,
        #[cfg(target_arch = "aarch64")]
        Backend::Neon => aarch64::neon::matmul4x4,
        #[cfg(target_arch = "arm")]
        Backend::Neon => portable::matmul4x4,
        _ => scalar::matmul4x4,
    }
}

fn copy_fn(backend: Backend) -> CopyFn {
    match backend {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        Backend::Avx => x86::avx::copy,
        #[cfg(any(target_arch = "x86_64", all(target_arch = "x86", target_feature = "sse2")))]
        Backend::Sse => x86::sse::copy,
        #[cfg(target_arch = "aarch64")]
        Backend::Neon => aarch64::neon::copy,
        #[cfg(target_arch = "arm")]
        Backend::Neon => portable::copy,
        _ => scalar::copy,
    }
}

// ============================================================================
// Dispatch table
// ============================================================================

/// A kernel chosen for one operation.
#[derive(Clone, Copy)]
struct Selected<F> {
    backend: Backend,
    func: F,
}

impl<F> Selected<F> {
    fn new(op: Op, caps: Caps, lookup: fn(Backend) -> F) -> Self {
        let backend = Backend::select(op, caps);
        Selected {
            backend,
            func: lookup(backend),
        }
    }
}

/// SIMD kernel dispatch table.
///
/// Holds one function pointer per operation, each pointing at the best
/// implementation the capabilities allow. Build once and reuse; the table is
/// `Copy` and safe to share between threads.
///
/// # Example
///
/// ```
/// use simd_kernels::{Kernels, Mat4};
///
/// let kernels = Kernels::detect();
///
/// let a = [1.0f32, 2.0, 3.0, 4.0, 5.0];
/// let b = [10.0f32; 5];
/// let mut out = [0.0f32; 5];
/// kernels.add(&a, &b, &mut out);
/// assert_eq!(out, [11.0, 12.0, 13.0, 14.0, 15.0]);
///
/// let mut m = Mat4::ZERO;
/// kernels.matmul4x4(&Mat4::IDENTITY, &Mat4::splat(2.0), &mut m);
/// assert_eq!(m, Mat4::splat(2.0));
/// ```
#[derive(Clone, Copy)]
pub struct Kernels {
    caps: Caps,
    add: Selected<BinaryFn>,
    multiply: Selected<BinaryFn>,
    dot: Selected<DotFn>,
    matmul: Selected<MatMulFn>,
    copy: Selected<CopyFn>,
}

impl Kernels {
    /// Build a table for the given capabilities.
    #[must_use]
    pub fn for_caps(caps: Caps) -> Self {
        let kernels = Kernels {
            caps,
            add: Selected::new(Op::Add, caps, add_fn),
            multiply: Selected::new(Op::Multiply, caps, multiply_fn),
            dot: Selected::new(Op::Dot, caps, dot_fn),
            matmul: Selected::new(Op::MatMul4x4, caps, matmul_fn),
            copy: Selected::new(Op::Copy, caps, copy_fn),
        };
        log::debug!("kernel dispatch for {}: {:?}", caps, kernels);
        kernels
    }

    /// Best available implementations for the current CPU.
    #[must_use]
    pub fn detect() -> Self {
        Self::for_caps(caps())
    }

    /// Scalar implementations only.
    #[must_use]
    pub fn scalar() -> Self {
        Self::for_caps(caps().without(Tier::Sse).without(Tier::Neon))
    }

    /// Build a table from the process capabilities narrowed by `config`.
    pub fn from_config(config: &DispatchConfig) -> Result<Self> {
        Ok(Self::for_caps(config.apply(caps())?))
    }

    /// Capabilities this table was built from.
    #[must_use]
    pub fn caps(&self) -> Caps {
        self.caps
    }

    /// Backend selected for `op`.
    #[must_use]
    pub fn backend(&self, op: Op) -> Backend {
        match op {
            Op::Add => self.add.backend,
            Op::Multiply => self.multiply.backend,
            Op::Dot => self.dot.backend,
            Op::MatMul4x4 => self.matmul.backend,
            Op::Copy => self.copy.backend,
        }
    }

    /// Name of the backend selected for `op` (e.g. `"sse"`).
    #[must_use]
    pub fn name(&self, op: Op) -> &'static str {
        self.backend(op).name()
    }

    /// Returns true if every operation uses the scalar backend.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        Op::ALL.iter().all(|&op| self.backend(op) == Backend::Scalar)
    }

    // ------------------------------------------------------------------------
    // Checked API
    // ------------------------------------------------------------------------

    /// `out[i] = a[i] + b[i]`, or an error if the lengths differ.
    pub fn try_add(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        check_len(out.len(), a.len())?;
        check_len(out.len(), b.len())?;
        (self.add.func)(a, b, out);
        Ok(())
    }

    /// `out[i] = a[i] * b[i]`, or an error if the lengths differ.
    pub fn try_multiply(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> Result<()> {
        check_len(out.len(), a.len())?;
        check_len(out.len(), b.len())?;
        (self.multiply.func)(a, b, out);
        Ok(())
    }

    /// `sum(a[i] * b[i])`, or an error if the lengths differ.
    pub fn try_dot(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        check_len(a.len(), b.len())?;
        Ok((self.dot.func)(a, b))
    }

    /// Copy `src` into `dst`, or an error if the lengths differ.
    pub fn try_copy(&self, dst: &mut [u8], src: &[u8]) -> Result<()> {
        check_len(dst.len(), src.len())?;
        (self.copy.func)(dst, src);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Panicking API
    // ------------------------------------------------------------------------

    /// `out[i] = a[i] + b[i]`.
    ///
    /// # Panics
    ///
    /// Panics if `a`, `b` and `out` do not all have the same length.
    #[track_caller]
    pub fn add(&self, a: &[f32], b: &[f32], out: &mut [f32]) {
        expect_ok(self.try_add(a, b, out))
    }

    /// `out[i] = a[i] * b[i]`.
    ///
    /// # Panics
    ///
    /// Panics if `a`, `b` and `out` do not all have the same length.
    #[track_caller]
    pub fn multiply(&self, a: &[f32], b: &[f32], out: &mut [f32]) {
        expect_ok(self.try_multiply(a, b, out))
    }

    /// Dot product of `a` and `b`.
    ///
    /// On SIMD backends the sum is reduced in a different order than the
    /// scalar path, so results may differ by rounding.
    ///
    /// # Panics
    ///
    /// Panics if `a` and `b` have different lengths.
    #[track_caller]
    #[must_use]
    pub fn dot(&self, a: &[f32], b: &[f32]) -> f32 {
        expect_ok(self.try_dot(a, b))
    }

    /// `out = a * b` for 4x4 matrices.
    pub fn matmul4x4(&self, a: &Mat4, b: &Mat4, out: &mut Mat4) {
        (self.matmul.func)(a, b, out)
    }

    /// Copy `src` into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `dst` and `src` have different lengths.
    #[track_caller]
    pub fn copy(&self, dst: &mut [u8], src: &[u8]) {
        expect_ok(self.try_copy(dst, src))
    }
}

#[track_caller]
fn expect_ok<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("{}", e),
    }
}

impl Default for Kernels {
    fn default() -> Self {
        *kernels()
    }
}

impl fmt::Debug for Kernels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Backend names rather than function pointer addresses
        f.debug_struct("Kernels")
            .field("add", &self.add.backend)
            .field("multiply", &self.multiply.backend)
            .field("dot", &self.dot.backend)
            .field("matmul4x4", &self.matmul.backend)
            .field("copy", &self.copy.backend)
            .finish()
    }
}

/// Process-wide dispatch table, built on first use.
///
/// Honors the `SIMD_KERNELS_BACKEND` environment variable (see
/// [`DispatchConfig::from_env`]). An invalid or unsatisfiable value is logged
/// and automatic selection is used instead.
pub fn kernels() -> &'static Kernels {
    static KERNELS: OnceLock<Kernels> = OnceLock::new();
    KERNELS.get_or_init(|| {
        let config = DispatchConfig::from_env().unwrap_or_else(|e| {
            log::warn!("ignoring {}: {}", crate::config::BACKEND_ENV, e);
            DispatchConfig::new()
        });
        Kernels::from_config(&config).unwrap_or_else(|e| {
            log::warn!("ignoring {}: {}", crate::config::BACKEND_ENV, e);
            Kernels::detect()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_returns_valid_kernels() {
        let kernels = Kernels::detect();

        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let b = [2.0f32; 7];
        let mut out = [0.0f32; 7];
        kernels.multiply(&a, &b, &mut out);
        assert_eq!(out, [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0]);
        assert_eq!(kernels.dot(&a, &b), 56.0);
    }

    #[test]
    fn test_scalar_table_is_scalar() {
        let kernels = Kernels::scalar();
        assert!(kernels.is_scalar());
        assert!(kernels.caps().is_scalar());
        for op in Op::ALL {
            assert_eq!(kernels.name(op), "scalar");
        }
    }

    #[test]
    fn test_scalar_matches_detect_for_add() {
        let scalar = Kernels::scalar();
        let detect = Kernels::detect();

        let a: Vec<f32> = (0..37).map(|i| i as f32 * 0.1).collect();
        let b: Vec<f32> = (0..37).map(|i| 1.0 - i as f32 * 0.03).collect();
        let mut out_scalar = vec![0.0; 37];
        let mut out_detect = vec![0.0; 37];
        scalar.add(&a, &b, &mut out_scalar);
        detect.add(&a, &b, &mut out_detect);

        assert_eq!(out_scalar, out_detect);
    }

    #[test]
    fn test_select_prefers_widest() {
        let caps = caps();
        let add = Backend::select(Op::Add, caps);
        match caps.widest() {
            Some(Tier::Avx) => assert_eq!(add, Backend::Avx),
            Some(Tier::Sse) => assert_eq!(add, Backend::Sse),
            Some(Tier::Neon) => assert_eq!(add, Backend::Neon),
            None => assert_eq!(add, Backend::Scalar),
        }
    }

    #[test]
    fn test_matmul_never_uses_avx() {
        assert!(!Backend::Avx.supports(Op::MatMul4x4));
        let kernels = Kernels::detect();
        assert_ne!(kernels.backend(Op::MatMul4x4), Backend::Avx);
        if kernels.caps().has(Tier::Sse) {
            assert_eq!(kernels.backend(Op::MatMul4x4), Backend::Sse);
        }
    }

    #[test]
    fn test_backend_availability() {
        let scalar_caps = Caps::scalar();
        assert!(Backend::Scalar.is_available(scalar_caps));
        assert!(!Backend::Sse.is_available(scalar_caps));
        assert!(!Backend::Avx.is_available(scalar_caps));
        assert!(!Backend::Neon.is_available(scalar_caps));
        for op in Op::ALL {
            assert_eq!(Backend::select(op, scalar_caps), Backend::Scalar);
        }
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("sse".parse::<Backend>(), Ok(Backend::Sse));
        assert_eq!("AVX".parse::<Backend>(), Ok(Backend::Avx));
        assert_eq!(" neon ".parse::<Backend>(), Ok(Backend::Neon));
        assert_eq!("Scalar".parse::<Backend>(), Ok(Backend::Scalar));
        assert_eq!(
            "avx512".parse::<Backend>(),
            Err(Error::UnknownBackend("avx512".into()))
        );
        for backend in Backend::ALL {
            assert_eq!(backend.to_string().parse::<Backend>(), Ok(backend));
        }
    }

    #[test]
    fn test_backend_lanes() {
        assert_eq!(Backend::Avx.lanes(), 8);
        assert_eq!(Backend::Sse.lanes(), 4);
        assert_eq!(Backend::Neon.lanes(), 4);
        assert_eq!(Backend::Scalar.lanes(), 1);
    }

    #[test]
    fn test_try_api_reports_mismatch() {
        let kernels = Kernels::detect();
        let mut out = [0.0f32; 4];
        assert_eq!(
            kernels.try_add(&[1.0; 4], &[1.0; 3], &mut out),
            Err(Error::LengthMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert!(kernels.try_dot(&[1.0; 5], &[1.0; 4]).is_err());
        let mut dst = [0u8; 2];
        assert!(kernels.try_copy(&mut dst, &[1, 2, 3]).is_err());
    }

    #[test]
    #[should_panic(expected = "Operand length mismatch")]
    fn test_multiply_panics_on_mismatch() {
        let kernels = Kernels::detect();
        let mut out = [0.0f32; 3];
        kernels.multiply(&[1.0; 4], &[1.0; 4], &mut out);
    }

    #[test]
    fn test_debug_shows_backends() {
        let debug = format!("{:?}", Kernels::scalar());
        assert!(debug.contains("Kernels"));
        assert!(debug.contains("Scalar"));
        assert!(!debug.contains("0x"));
    }
}
