//! Dispatch configuration: forcing or narrowing the backend choice.
//!
//! By default every operation runs on the widest backend the resolved
//! capabilities allow. A [`DispatchConfig`] can pin a specific backend, which
//! is useful for benchmarking, debugging, and reproducing the exact
//! scalar summation order.
//!
//! The process-wide table ([`crate::kernels`]) reads its configuration from
//! the `SIMD_KERNELS_BACKEND` environment variable:
//!
//! | Value    | Effect                                               |
//! |----------|------------------------------------------------------|
//! | `auto`   | Widest available backend (same as unset)             |
//! | `scalar` | Scalar reference for every operation                 |
//! | `sse`    | SSE; AVX is disabled                                 |
//! | `avx`    | AVX where implemented, SSE for the rest              |
//! | `neon`   | NEON                                                 |
//!
//! Values are case-insensitive. Configuration can only remove tiers; asking
//! for a backend the target cannot run is an error.

use std::env;

use crate::caps::{Caps, Tier};
use crate::error::{Error, Result};
use crate::simd::Backend;

/// Environment variable read by [`DispatchConfig::from_env`].
pub const BACKEND_ENV: &str = "SIMD_KERNELS_BACKEND";

/// Backend selection settings.
///
/// # Example
///
/// ```
/// use simd_kernels::{Backend, DispatchConfig, Kernels, Op};
///
/// let config = DispatchConfig::new().force_scalar();
/// let kernels = Kernels::from_config(&config).unwrap();
/// assert_eq!(kernels.backend(Op::Dot), Backend::Scalar);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchConfig {
    backend: Option<Backend>,
}

impl DispatchConfig {
    /// Automatic selection.
    #[must_use]
    pub const fn new() -> Self {
        DispatchConfig { backend: None }
    }

    /// Pin every operation to `backend` (or its narrower fallback for
    /// operations it does not implement).
    #[must_use]
    pub const fn backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Go back to automatic selection.
    #[must_use]
    pub const fn auto(mut self) -> Self {
        self.backend = None;
        self
    }

    /// Use the scalar reference for everything.
    #[must_use]
    pub const fn force_scalar(self) -> Self {
        self.backend(Backend::Scalar)
    }

    /// The pinned backend, or `None` for automatic selection.
    #[must_use]
    pub const fn requested_backend(&self) -> Option<Backend> {
        self.backend
    }

    /// Parse a backend setting (`auto`, `scalar`, `sse`, `avx`, `neon`).
    ///
    /// An empty value means `auto`.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("auto") {
            return Ok(Self::new());
        }
        Ok(Self::new().backend(value.parse()?))
    }

    /// Read the setting from [`BACKEND_ENV`]. Unset means `auto`.
    pub fn from_env() -> Result<Self> {
        match env::var_os(BACKEND_ENV) {
            Some(value) => Self::parse(&value.to_string_lossy()),
            None => Ok(Self::new()),
        }
    }

    /// Narrow `caps` according to this configuration.
    ///
    /// Returns [`Error::BackendUnavailable`] if the pinned backend's tier is
    /// not in `caps`. The result never contains a tier `caps` lacks.
    pub fn apply(&self, caps: Caps) -> Result<Caps> {
        let Some(backend) = self.backend else {
            return Ok(caps);
        };

        if !backend.is_available(caps) {
            return Err(Error::BackendUnavailable(backend));
        }

        let narrowed = match backend {
            Backend::Scalar => caps.without(Tier::Sse).without(Tier::Neon),
            Backend::Sse => caps.without(Tier::Avx),
            Backend::Avx | Backend::Neon => caps,
        };
        log::debug!("backend pinned to {}: {} -> {}", backend, caps, narrowed);
        Ok(narrowed)
    }
}
