// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for password generation and output hashing in the
// pdfseal-security crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use pdfseal_security::{PasswordGenerator, hash_bytes};

/// Password generation draws every character from the OS random source, so
/// this is dominated by `getrandom` syscalls.
fn bench_password_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("password_generate");
    for length in [8usize, 24, 64] {
        let generator = PasswordGenerator::new(length).expect("valid length");
        group.bench_function(format!("len {length}"), |b| {
            b.iter(|| black_box(generator.generate()));
        });
    }
    group.finish();
}

/// SHA-256 over sizes typical of converted exam papers.
fn bench_integrity_hash(c: &mut Criterion) {
    let sizes: &[(&str, usize)] = &[("10 KiB", 10 * 1024), ("1 MiB", 1024 * 1024)];

    let mut group = c.benchmark_group("integrity_hash_sha256");
    for &(label, size) in sizes {
        let data = vec![0xABu8; size];
        group.bench_function(label, |b| {
            b.iter(|| black_box(hash_bytes(black_box(&data))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_password_generation, bench_integrity_hash);
criterion_main!(benches);
