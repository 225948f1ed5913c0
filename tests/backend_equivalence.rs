//! Every backend available on this machine against the scalar reference.
//!
//! Backends the target cannot run are skipped (they report
//! `BackendUnavailable` from the config layer).

use simd_kernels::{Backend, DispatchConfig, Error, Kernels, Mat4, Op};

const LENGTHS: [usize; 9] = [0, 1, 3, 4, 5, 7, 8, 1023, 1024];
const COPY_SIZES: [usize; 6] = [0, 1, 15, 16, 17, 1_000_000];

/// All tables this machine can build, scalar first.
fn available_tables() -> Vec<(Backend, Kernels)> {
    let mut tables = Vec::new();
    for backend in [Backend::Scalar, Backend::Sse, Backend::Avx, Backend::Neon] {
        match Kernels::from_config(&DispatchConfig::new().backend(backend)) {
            Ok(kernels) => tables.push((backend, kernels)),
            Err(Error::BackendUnavailable(b)) => {
                assert_eq!(b, backend);
                eprintln!("{} not available, skipping", backend);
            }
            Err(e) => panic!("unexpected error for {}: {}", backend, e),
        }
    }
    tables
}

fn test_vectors(len: usize) -> (Vec<f32>, Vec<f32>) {
    let a = (0..len).map(|i| (i % 17) as f32 * 0.25 - 2.0).collect();
    let b = (0..len).map(|i| (i % 11) as f32 * 0.5 + 0.5).collect();
    (a, b)
}

fn assert_close(actual: f32, expected: f32, context: &str) {
    let tolerance = 1e-5 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "{}: {} vs {} (tolerance {})",
        context,
        actual,
        expected,
        tolerance
    );
}

#[test]
fn test_scalar_always_available() {
    let tables = available_tables();
    assert_eq!(tables[0].0, Backend::Scalar);
    assert!(tables[0].1.is_scalar());
}

#[test]
fn test_pinned_backend_is_used() {
    for (backend, kernels) in available_tables() {
        assert_eq!(kernels.backend(Op::Add), backend);
        assert_eq!(kernels.backend(Op::Dot), backend);
        assert_eq!(kernels.backend(Op::Copy), backend);
        if backend == Backend::Avx {
            assert_eq!(kernels.backend(Op::MatMul4x4), Backend::Sse);
        } else {
            assert_eq!(kernels.backend(Op::MatMul4x4), backend);
        }
    }
}

#[test]
fn test_add_multiply_bit_exact() {
    let scalar = Kernels::scalar();
    for (backend, kernels) in available_tables() {
        for len in LENGTHS {
            let (a, b) = test_vectors(len);
            let mut expected = vec![0.0f32; len];
            let mut actual = vec![f32::NAN; len];

            scalar.add(&a, &b, &mut expected);
            kernels.add(&a, &b, &mut actual);
            assert_eq!(actual, expected, "{} add len {}", backend, len);

            scalar.multiply(&a, &b, &mut expected);
            kernels.multiply(&a, &b, &mut actual);
            assert_eq!(actual, expected, "{} multiply len {}", backend, len);
        }
    }
}

#[test]
fn test_add_special_values() {
    let a = [f32::INFINITY, -0.0, 1e38, f32::MIN_POSITIVE, 3.0];
    let b = [1.0, 0.0, 1e38, -f32::MIN_POSITIVE, f32::NEG_INFINITY];
    let scalar = Kernels::scalar();
    let mut expected = [0.0f32; 5];
    scalar.add(&a, &b, &mut expected);

    for (backend, kernels) in available_tables() {
        let mut actual = [0.0f32; 5];
        kernels.add(&a, &b, &mut actual);
        for (x, y) in actual.iter().zip(&expected) {
            assert_eq!(x.to_bits(), y.to_bits(), "{}", backend);
        }
    }
}

#[test]
fn test_dot_within_tolerance() {
    let scalar = Kernels::scalar();
    for (backend, kernels) in available_tables() {
        for len in LENGTHS {
            let (a, b) = test_vectors(len);
            let expected = scalar.dot(&a, &b);
            let actual = kernels.dot(&a, &b);
            assert_close(actual, expected, &format!("{} dot len {}", backend, len));
        }
    }
}

#[test]
fn test_dot_empty_is_zero() {
    for (_, kernels) in available_tables() {
        assert_eq!(kernels.dot(&[], &[]), 0.0);
    }
}

#[test]
fn test_matmul_identity() {
    let b = Mat4::from_rows([
        [1.0, -2.0, 3.5, 4.0],
        [0.25, 6.0, -7.0, 8.0],
        [9.0, 10.0, 11.0, -12.5],
        [13.0, 0.0, 15.0, 16.0],
    ]);
    for (backend, kernels) in available_tables() {
        let mut out = Mat4::ZERO;
        kernels.matmul4x4(&Mat4::IDENTITY, &b, &mut out);
        assert_eq!(out, b, "{} I*b", backend);
        kernels.matmul4x4(&b, &Mat4::IDENTITY, &mut out);
        assert_eq!(out, b, "{} b*I", backend);
    }
}

#[test]
fn test_matmul_constant() {
    for c in [1.0f32, 1.5, -3.0, 0.0] {
        let m = Mat4::splat(c);
        for (backend, kernels) in available_tables() {
            let mut out = Mat4::ZERO;
            kernels.matmul4x4(&m, &m, &mut out);
            assert_eq!(out, Mat4::splat(4.0 * c * c), "{} c={}", backend, c);
        }
    }
}

#[test]
fn test_matmul_matches_scalar() {
    let a = Mat4::from_rows([
        [0.1, 0.2, 0.3, 0.4],
        [1.5, -2.5, 3.5, -4.5],
        [7.0, 0.0, 0.0, 1.0],
        [-0.3, 0.7, 1.1, 2.9],
    ]);
    let b = a.transpose();
    let mut expected = Mat4::ZERO;
    Kernels::scalar().matmul4x4(&a, &b, &mut expected);

    for (backend, kernels) in available_tables() {
        let mut out = Mat4::ZERO;
        kernels.matmul4x4(&a, &b, &mut out);
        for (i, (x, y)) in out.0.iter().zip(expected.0.iter()).enumerate() {
            assert_close(*x, *y, &format!("{} cell {}", backend, i));
        }
    }
}

#[test]
fn test_copy_sizes() {
    for (backend, kernels) in available_tables() {
        for size in COPY_SIZES {
            let src: Vec<u8> = (0..size).map(|i| (i * 131 + 7) as u8).collect();
            let mut dst = vec![0u8; size];
            kernels.copy(&mut dst, &src);
            assert!(dst == src, "{} copy size {}", backend, size);
        }
    }
}

#[test]
fn test_copy_unaligned_subslices() {
    let src: Vec<u8> = (0..200u8).collect();
    for (backend, kernels) in available_tables() {
        for offset in 1..4 {
            let mut dst = vec![0u8; 200];
            let len = 200 - offset - 3;
            kernels.copy(&mut dst[offset..offset + len], &src[3..3 + len]);
            assert_eq!(&dst[offset..offset + len], &src[3..3 + len], "{}", backend);
            assert!(dst[..offset].iter().all(|&b| b == 0));
            assert!(dst[offset + len..].iter().all(|&b| b == 0));
        }
    }
}

#[test]
fn test_output_untouched_beyond_length() {
    let (a, b) = test_vectors(13);
    for (backend, kernels) in available_tables() {
        let mut buffer = vec![-1.0f32; 20];
        kernels.add(&a, &b, &mut buffer[..13]);
        assert!(buffer[13..].iter().all(|&v| v == -1.0), "{}", backend);
    }
}
