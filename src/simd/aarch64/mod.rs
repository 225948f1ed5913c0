//! aarch64 SIMD implementations.

pub(crate) mod neon;
