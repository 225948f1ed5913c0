//! `SIMD_KERNELS_BACKEND=scalar` pins the process-wide table.
//!
//! The global table is built once per process, so this lives in its own test
//! binary with a single test.

use simd_kernels::config::BACKEND_ENV;
use simd_kernels::{Backend, DispatchConfig, Op};

#[test]
fn test_env_forces_scalar() {
    std::env::set_var(BACKEND_ENV, "Scalar");

    let config = DispatchConfig::from_env().unwrap();
    assert_eq!(config.requested_backend(), Some(Backend::Scalar));

    let kernels = simd_kernels::kernels();
    assert!(kernels.is_scalar());
    assert_eq!(kernels.backend(Op::Dot), Backend::Scalar);

    // Sequential summation order through the free function
    let a = [1e8f32, 1.0, 1.0, 1.0, -1e8, 0.0, 0.0, 0.0];
    assert_eq!(simd_kernels::dot(&a, &[1.0; 8]), 0.0);
}
