// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for output-name resolution in pdfseal-document.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use pdfseal_document::{FilenameResolver, MappingTable};

const MAPPINGS: &str = "\
Midterm Exam,UTS
Final Exam,UAS
Quiz,KUIS
Assignment,TUGAS
Practicum,PRAK
Remedial Exam,REMED
Biology,BIO
Mathematics,MTK
";

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Phrase hit, key-term hit and default fallback over a realistic table.
fn bench_resolve(c: &mut Criterion) {
    let resolver = FilenameResolver::new(MappingTable::parse(MAPPINGS));
    let names = [
        "Midterm Exam Biology 2024.docx",
        "Rekap UAS kelas 7.docx",
        "Lembar jawaban siswa.docx",
    ];

    c.bench_function("resolve (3 names, 8 mappings)", |b| {
        b.iter(|| {
            for name in names {
                black_box(resolver.resolve(black_box(name)));
            }
        });
    });
}

/// Building the resolver compiles one regex per mapping.
fn bench_build(c: &mut Criterion) {
    c.bench_function("build resolver (8 mappings)", |b| {
        b.iter(|| FilenameResolver::new(MappingTable::parse(black_box(MAPPINGS))));
    });
}

criterion_group!(benches, bench_resolve, bench_build);
criterion_main!(benches);
